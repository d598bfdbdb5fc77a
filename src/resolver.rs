use crate::client::Config;
use crate::error::{HubspotError, Result};
use crate::params::{encode_query, escape, Params};

/// Per-call options recognized by the URL resolver
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Overrides the configured base URL
    pub base_url: Option<String>,
    /// Set to false to never inject the API key
    pub hapikey: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            base_url: None,
            hapikey: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn without_hapikey(mut self) -> Self {
        self.hapikey = false;
        self
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `path` contains the placeholder `:name` (not just a prefix of a
/// longer placeholder)
fn has_placeholder(path: &str, name: &str) -> bool {
    let needle = format!(":{}", name);
    path.match_indices(&needle)
        .any(|(pos, _)| !path[pos + needle.len()..].starts_with(is_name_char))
}

/// Replace every `:name` placeholder with `value`. Returns None when the
/// placeholder does not occur.
fn substitute(path: &str, name: &str, value: &str) -> Option<String> {
    let needle = format!(":{}", name);
    let mut out = String::with_capacity(path.len() + value.len());
    let mut rest = path;
    let mut found = false;

    while let Some(pos) = rest.find(&needle) {
        let after = &rest[pos + needle.len()..];
        out.push_str(&rest[..pos]);
        if after.starts_with(is_name_char) {
            out.push_str(&needle);
        } else {
            out.push_str(value);
            found = true;
        }
        rest = after;
    }
    out.push_str(rest);

    found.then_some(out)
}

/// Resolve a path template and parameter bag into an absolute URL.
///
/// Parameters matching a `:name` placeholder are escaped into the path and
/// dropped from the bag; the rest become the query string. The API key is
/// appended unless a bearer token is configured or `options.hapikey` is false
/// (without a bearer token the key must still be configured),
/// and `portal_id` is filled from the configuration when the template needs it.
pub fn resolve_url(
    config: &Config,
    template: &str,
    mut params: Params,
    options: &RequestOptions,
) -> Result<String> {
    // bearer wins over the API key; without one the key must be configured
    // even when this call does not send it
    if !config.has_access_token() {
        let hapikey = config.ensure_hapikey()?;
        if options.hapikey {
            params.insert("hapikey", hapikey);
        }
    }

    let base_url = options.base_url.as_deref().unwrap_or(&config.base_url);

    if has_placeholder(template, "portal_id") {
        params.insert("portal_id", config.ensure_portal_id()?);
    }

    let mut path = template.to_string();
    let mut remaining = Params::new();
    for (key, value) in params {
        let substituted = if key.is_empty() {
            None
        } else {
            substitute(&path, &key, &escape(&value.to_string()))
        };
        match substituted {
            Some(resolved) => path = resolved,
            None => {
                remaining.insert(key, value);
            }
        }
    }

    if path.contains(':') {
        return Err(HubspotError::MissingInterpolation(format!(
            "Interpolation not resolved: {}",
            path
        )));
    }

    let query = encode_query(&remaining)?;
    if !query.is_empty() {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(&query);
    }

    Ok(format!("{}{}", base_url, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn keyed() -> Config {
        Config::new()
            .with_base_url("https://api.example.com")
            .with_hapikey("demo")
    }

    #[test]
    fn test_path_substitution_and_query() {
        let params = Params::new().with("id", 42).with("count", 3);
        let url = resolve_url(&keyed(), "/contacts/:id", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/contacts/42?count=3&hapikey=demo");
    }

    #[test]
    fn test_bearer_suppresses_hapikey() {
        let config = Config::new()
            .with_base_url("https://api.example.com")
            .with_access_token("tok");
        let params = Params::new().with("id", 42).with("count", 3);
        let url = resolve_url(&config, "/contacts/:id", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/contacts/42?count=3");
    }

    #[test]
    fn test_missing_hapikey_fails_fast() {
        let config = Config::new();
        let err = resolve_url(&config, "/contacts", Params::new(), &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, HubspotError::Configuration(_)));
    }

    #[test]
    fn test_options_suppress_hapikey() {
        let options = RequestOptions::new()
            .without_hapikey()
            .with_base_url("https://forms.example.com");
        let url = resolve_url(&keyed(), "/uploads/form", Params::new(), &options).unwrap();
        assert_eq!(url, "https://forms.example.com/uploads/form");
    }

    #[test]
    fn test_suppressed_hapikey_still_required() {
        let options = RequestOptions::new().without_hapikey();
        let err = resolve_url(&Config::new(), "/uploads/form", Params::new(), &options).unwrap_err();
        assert!(matches!(err, HubspotError::Configuration(_)));
    }

    #[test]
    fn test_bearer_with_suppressed_hapikey_needs_no_key() {
        let config = Config::new().with_access_token("tok");
        let options = RequestOptions::new().without_hapikey();
        let url = resolve_url(&config, "/uploads/form", Params::new(), &options).unwrap();
        assert_eq!(url, "https://api.hubapi.com/uploads/form");
    }

    #[test]
    fn test_json_bag_keeps_order() {
        let config = keyed().with_access_token("tok");
        let params = match serde_json::json!({"zeta": 1, "id": 5, "alpha": 2}) {
            serde_json::Value::Object(map) => Params::from(map),
            _ => unreachable!(),
        };
        let url = resolve_url(&config, "/things/:id", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/things/5?zeta=1&alpha=2");
    }

    #[test]
    fn test_portal_id_from_config() {
        let config = keyed().with_portal_id(62515);
        let params = Params::new().with("form_guid", "abc-123");
        let url = resolve_url(&config, "/forms/:portal_id/:form_guid", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/forms/62515/abc-123?hapikey=demo");
    }

    #[test]
    fn test_portal_id_required() {
        let err = resolve_url(&keyed(), "/forms/:portal_id", Params::new(), &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, HubspotError::Configuration(_)));
    }

    #[test]
    fn test_unresolved_placeholder() {
        let params = Params::new().with("count", 3);
        let err = resolve_url(&keyed(), "/contacts/:id", params, &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, HubspotError::MissingInterpolation(_)));
    }

    #[test]
    fn test_key_does_not_match_longer_placeholder() {
        let params = Params::new().with("contact", 1);
        let err = resolve_url(&keyed(), "/x/:contact_id", params, &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, HubspotError::MissingInterpolation(_)));
    }

    #[test]
    fn test_substituted_value_is_escaped() {
        let params = Params::new().with("email", "a b@c.com");
        let url = resolve_url(&keyed(), "/contact/email/:email/profile", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/contact/email/a+b%40c.com/profile?hapikey=demo");
    }

    #[test]
    fn test_value_with_colon_is_not_a_placeholder() {
        let params = Params::new().with("id", "a:b");
        let url = resolve_url(&keyed(), "/things/:id", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/things/a%3Ab?hapikey=demo");
    }

    #[test]
    fn test_repeated_placeholder() {
        let params = Params::new().with("id", 7);
        let url = resolve_url(&keyed(), "/a/:id/b/:id", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/a/7/b/7?hapikey=demo");
    }

    #[test]
    fn test_existing_query_component() {
        let config = keyed().with_access_token("tok");
        let params = Params::new().with("count", 3);
        let url = resolve_url(&config, "/contacts?mode=all", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/contacts?mode=all&count=3");
    }

    #[test]
    fn test_time_in_query() {
        let config = keyed().with_access_token("tok");
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let params = Params::new().with("created", created);
        let url = resolve_url(&config, "/events", params, &RequestOptions::new()).unwrap();
        assert_eq!(url, "https://api.example.com/events?created=1577836800000");
    }

    #[test]
    fn test_query_encoding_errors_propagate() {
        let params = Params::new().with("timerange", "yesterday");
        let err = resolve_url(&keyed(), "/events", params, &RequestOptions::new()).unwrap_err();
        assert!(matches!(err, HubspotError::InvalidParams(_)));
    }
}
