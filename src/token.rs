use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Something that can produce the bearer token to send with a request.
///
/// Implemented for fixed strings and for zero-argument closures, so a caller
/// can plug token refresh in without the connection knowing about expiry.
pub trait TokenSource: Send + Sync {
    /// Produce the token to use for the current request
    fn current_token(&self) -> Result<String>;
}

struct FixedToken(String);

impl TokenSource for FixedToken {
    fn current_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

struct ProviderToken<F>(F);

impl<F> TokenSource for ProviderToken<F>
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn current_token(&self) -> Result<String> {
        (self.0)()
    }
}

/// AccessToken is the configured bearer credential, either a static value
/// or a provider invoked once per request.
#[derive(Clone)]
pub struct AccessToken {
    source: Arc<dyn TokenSource>,
}

impl AccessToken {
    /// Use the same token for every request
    pub fn fixed(token: impl Into<String>) -> Self {
        AccessToken {
            source: Arc::new(FixedToken(token.into())),
        }
    }

    /// Call `provider` every time a request needs a token
    pub fn provider<F>(provider: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        AccessToken {
            source: Arc::new(ProviderToken(provider)),
        }
    }

    /// Wrap a custom token source
    pub fn from_source(source: Arc<dyn TokenSource>) -> Self {
        AccessToken { source }
    }

    /// Resolve the current token value
    pub fn current_token(&self) -> Result<String> {
        self.source.current_token()
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        AccessToken::fixed(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        AccessToken::fixed(token)
    }
}

// Implement Debug manually to avoid exposing the token
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("source", &"<redacted>")
            .finish()
    }
}
