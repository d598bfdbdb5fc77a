use crate::error::{HubspotError, Result};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Sentinel `errorType` the API uses to signal rate limiting
pub const RATE_LIMIT: &str = "RATE_LIMIT";

/// Response is a fully-read HTTP response: status, headers and raw body.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Only the field used for error classification
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorType")]
    error_type: Option<String>,
}

impl Response {
    pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        Response {
            status,
            headers,
            body,
        }
    }

    /// Read a blocking reqwest response to the end
    pub(crate) fn read(response: reqwest::blocking::Response) -> Result<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();
        Ok(Response::new(status, headers, body))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON. An empty body parses to `null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// The `errorType` field of a JSON error body, if there is one
    pub fn error_type(&self) -> Result<Option<String>> {
        let parsed: ErrorBody = serde_json::from_slice(&self.body)?;
        Ok(parsed.error_type)
    }

    /// Get a value from the parsed body by a slash-separated path.
    /// For example, "properties/email/value" walks nested objects and
    /// numeric segments index into arrays.
    pub fn get(&self, path: &str) -> Option<Value> {
        let body = self.json().ok()?;
        lookup(&body, path).cloned()
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in path.split('/').filter(|s| !s.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Result of a successful call: the decoded body or, when the caller
/// opted out of parsing, the raw response.
#[derive(Debug, Clone)]
pub enum Payload {
    Parsed(Value),
    Raw(Response),
}

impl Payload {
    /// Decoded body, parsing a raw response on demand
    pub fn json(&self) -> Result<Value> {
        match self {
            Payload::Parsed(value) => Ok(value.clone()),
            Payload::Raw(response) => response.json(),
        }
    }

    /// Deserialize the body into `T`
    pub fn parse<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            Payload::Parsed(value) => value,
            Payload::Raw(response) => response.json()?,
        };
        Ok(serde_json::from_value(value)?)
    }

    pub fn into_raw(self) -> Option<Response> {
        match self {
            Payload::Raw(response) => Some(response),
            Payload::Parsed(_) => None,
        }
    }

    pub fn into_parsed(self) -> Option<Value> {
        match self {
            Payload::Parsed(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }
}

/// Turn a response into a payload or a typed error.
///
/// Non-2xx responses become `RateLimited` when the body carries
/// `errorType: RATE_LIMIT` and `Request` otherwise, including when the
/// body cannot be read as JSON.
pub fn classify(response: Response, want_parsed: bool) -> Result<Payload> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }

    if want_parsed {
        Ok(Payload::Parsed(response.json()?))
    } else {
        Ok(Payload::Raw(response))
    }
}

/// Build the typed error for a failed response
pub fn error_from_response(response: Response) -> HubspotError {
    let error_type = match response.error_type() {
        Ok(error_type) => error_type,
        Err(e) => {
            tracing::debug!(status = response.status(), error = %e, "unreadable error body");
            None
        }
    };

    if error_type.as_deref() == Some(RATE_LIMIT) {
        HubspotError::RateLimited { response }
    } else {
        HubspotError::Request { response }
    }
}
