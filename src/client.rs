use crate::error::{HubspotError, Result};
use crate::token::AccessToken;
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::redirect::Policy;
use std::env;
use std::time::Duration;

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

/// Host of the unauthenticated form-submission endpoint
pub const DEFAULT_FORMS_BASE_URL: &str = "https://forms.hubspot.com";

/// Create the default HTTP client for API requests. Redirects are not
/// followed; a 3xx answer is classified like any other non-success status.
pub fn create_api_client() -> Client {
    ClientBuilder::new()
        .redirect(Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create HTTP client")
}

/// Create the HTTP client for form submissions, which follows redirects
pub fn create_forms_client() -> Client {
    ClientBuilder::new()
        .redirect(Policy::limited(10))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create forms HTTP client")
}

/// Configuration shared by every request made through a connection.
/// Set once at start-up; the connection only reads it.
#[derive(Debug, Clone)]
pub struct Config {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Base URL for form submissions
    pub forms_base_url: String,
    /// API key sent as the `hapikey` query parameter
    pub hapikey: Option<String>,
    /// Bearer credential; takes precedence over the API key
    pub access_token: Option<AccessToken>,
    /// Portal (account) id for templates containing `:portal_id`
    pub portal_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            forms_base_url: DEFAULT_FORMS_BASE_URL.to_string(),
            hapikey: None,
            access_token: None,
            portal_id: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from `HUBSPOT_API_KEY`, `HUBSPOT_ACCESS_TOKEN`,
    /// `HUBSPOT_PORTAL_ID` and `HUBSPOT_BASE_URL`. Unset variables leave the
    /// corresponding field at its default.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        let mut config = Config::default();
        if let Some(base_url) = var("HUBSPOT_BASE_URL") {
            config.base_url = base_url;
        }
        config.hapikey = var("HUBSPOT_API_KEY");
        config.access_token = var("HUBSPOT_ACCESS_TOKEN").map(AccessToken::fixed);
        config.portal_id = var("HUBSPOT_PORTAL_ID");
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_forms_base_url(mut self, forms_base_url: impl Into<String>) -> Self {
        self.forms_base_url = forms_base_url.into();
        self
    }

    pub fn with_hapikey(mut self, hapikey: impl Into<String>) -> Self {
        self.hapikey = Some(hapikey.into());
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<AccessToken>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_portal_id(mut self, portal_id: impl ToString) -> Self {
        self.portal_id = Some(portal_id.to_string());
        self
    }

    /// Whether a bearer credential is configured
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// The API key, or a configuration error if none is set
    pub fn ensure_hapikey(&self) -> Result<&str> {
        self.hapikey
            .as_deref()
            .ok_or_else(|| HubspotError::missing_config("hapikey"))
    }

    /// The portal id, or a configuration error if none is set
    pub fn ensure_portal_id(&self) -> Result<&str> {
        self.portal_id
            .as_deref()
            .ok_or_else(|| HubspotError::missing_config("portal_id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::new();
        assert_eq!(config.base_url, "https://api.hubapi.com");
        assert_eq!(config.forms_base_url, "https://forms.hubspot.com");
        assert!(!config.has_access_token());
    }

    #[test]
    fn test_ensure_fails_fast() {
        let config = Config::new();
        assert!(matches!(config.ensure_hapikey(), Err(HubspotError::Configuration(_))));
        assert!(matches!(config.ensure_portal_id(), Err(HubspotError::Configuration(_))));
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_base_url("http://localhost:8080")
            .with_hapikey("demo")
            .with_portal_id(62515)
            .with_access_token("tok");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.ensure_hapikey().unwrap(), "demo");
        assert_eq!(config.ensure_portal_id().unwrap(), "62515");
        assert!(config.has_access_token());
    }
}
