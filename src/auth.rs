use crate::client::Config;
use crate::error::Result;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

/// Build the authorization headers for one request.
///
/// Without an access token the map is empty and the API key is expected in
/// the query string instead. A token provider is invoked once per call.
pub fn authorization_header(config: &Config) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let Some(ref access_token) = config.access_token else {
        return Ok(headers);
    };

    let token = access_token.current_token()?;
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);

    Ok(headers)
}
