use crate::auth::authorization_header;
use crate::client::{create_api_client, create_forms_client, Config};
use crate::error::{HubspotError, Result};
use crate::params::Params;
use crate::resolver::{resolve_url, RequestOptions};
use crate::response::{classify, error_from_response, Payload, Response};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Parameter that makes `post_json` return the raw response
pub const NO_PARSE: &str = "no_parse";

/// Outgoing request body
#[derive(Debug, Clone)]
pub enum Body {
    Json(Value),
    Form(String),
}

impl Body {
    fn content_type(&self) -> &'static str {
        match self {
            Body::Json(_) => "application/json",
            Body::Form(_) => "application/x-www-form-urlencoded",
        }
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Body::Json(value) => Ok(serde_json::to_vec(&value)?),
            Body::Form(encoded) => Ok(encoded.into_bytes()),
        }
    }

    fn log_text(&self) -> String {
        match self {
            Body::Json(value) => value.to_string(),
            Body::Form(encoded) => encoded.clone(),
        }
    }
}

/// Read the response and log the exchange
fn dispatch(request: RequestBuilder, url: &str, body: Option<&str>) -> Result<Response> {
    let response = Response::read(request.send()?)?;

    tracing::info!(
        url = %url,
        body = body.unwrap_or_default(),
        status = response.status(),
        response = %response.text(),
        "hubspot request"
    );

    Ok(response)
}

/// Connection issues requests against the HubSpot API and classifies the
/// responses.
#[derive(Debug, Clone)]
pub struct Connection {
    /// HTTP client
    pub client: Client,
    /// Configuration
    pub config: Config,
}

impl Connection {
    /// Create a new connection with the given configuration
    pub fn new(config: Config) -> Self {
        Connection {
            client: create_api_client(),
            config,
        }
    }

    /// Create a connection that reuses an existing HTTP client
    pub fn with_client(client: Client, config: Config) -> Self {
        Connection { client, config }
    }

    /// Resolve the URL, attach authorization and send the request.
    ///
    /// The response is returned as-is, without classification.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        params: Params,
        body: Option<Body>,
        options: &RequestOptions,
    ) -> Result<Response> {
        let url = resolve_url(&self.config, path, params, options)?;
        let mut request = self
            .client
            .request(method, &url)
            .headers(authorization_header(&self.config)?);

        let logged = body.as_ref().map(Body::log_text);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, body.content_type())
                .body(body.into_bytes()?);
        }

        dispatch(request, &url, logged.as_deref())
    }

    /// GET a resource and return the parsed body
    pub fn get_json(&self, path: &str, params: Params) -> Result<Value> {
        let response = self.request(Method::GET, path, params, None, &RequestOptions::new())?;
        classify(response, true)?.json()
    }

    /// POST a JSON body.
    ///
    /// A truthy `no_parse` parameter returns the raw response instead of the
    /// decoded body; it is never sent as part of the query string.
    pub fn post_json<B>(&self, path: &str, mut params: Params, body: &B) -> Result<Payload>
    where
        B: Serialize + ?Sized,
    {
        let parse = !params.remove(NO_PARSE).is_some_and(|v| v.is_truthy());
        let body = Body::Json(serde_json::to_value(body)?);
        let response = self.request(Method::POST, path, params, Some(body), &RequestOptions::new())?;
        classify(response, parse)
    }

    /// PUT a JSON body and return the parsed response
    pub fn put_json<B>(&self, path: &str, params: Params, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let body = Body::Json(serde_json::to_value(body)?);
        let response = self.request(Method::PUT, path, params, Some(body), &RequestOptions::new())?;
        classify(response, true)?.json()
    }

    /// DELETE a resource. The raw response is returned since delete bodies
    /// are usually empty.
    pub fn delete_json(&self, path: &str, params: Params) -> Result<Response> {
        let response = self.request(Method::DELETE, path, params, None, &RequestOptions::new())?;
        if !response.is_success() {
            return Err(error_from_response(response));
        }
        Ok(response)
    }
}

/// FormsConnection posts form-url-encoded submissions to the separate,
/// unauthenticated forms endpoint.
#[derive(Debug, Clone)]
pub struct FormsConnection {
    /// HTTP client (follows redirects)
    pub client: Client,
    /// Configuration; the forms base URL, portal id and credentials are read
    pub config: Config,
}

impl FormsConnection {
    pub fn new(config: Config) -> Self {
        FormsConnection {
            client: create_forms_client(),
            config,
        }
    }

    /// Submit a form. The API key is never injected (it must still be
    /// configured unless a bearer token is) and no authorization header is
    /// sent; the raw response is returned whatever its status.
    pub fn submit<B>(&self, path: &str, params: Params, form: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let options = RequestOptions::new()
            .without_hapikey()
            .with_base_url(self.config.forms_base_url.clone());
        let url = resolve_url(&self.config, path, params, &options)?;

        let encoded = serde_urlencoded::to_string(form)
            .map_err(|e| HubspotError::InvalidParams(e.to_string()))?;
        let body = Body::Form(encoded);
        let logged = body.log_text();

        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, body.content_type())
            .body(body.into_bytes()?);

        dispatch(request, &url, Some(&logged))
    }
}
