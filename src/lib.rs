//! # hubspot - request core for the HubSpot REST API
//!
//! This crate turns a path template, a parameter bag and a body into an HTTP
//! call against the HubSpot API, and turns the answer back into parsed data
//! or a typed error. Resource-specific call sites (contacts, deals, forms...)
//! are built on top of it.
//!
//! ## Features
//!
//! - Path templates with `:name` placeholders filled from the parameter bag
//! - Query encoding rules for lists, ranges, timestamps and `batch_` keys
//! - Authentication by bearer token (static or provider) or `hapikey`
//! - Typed errors for configuration, templating, rate limiting and failed requests
//!
//! ## Basic Usage
//!
//! ```no_run
//! use hubspot::{Config, Connection, Params};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new().with_hapikey("demo");
//!     let conn = Connection::new(config);
//!
//!     let contact = conn.get_json(
//!         "/contacts/v1/contact/vid/:vid/profile",
//!         Params::new().with("vid", 42).with("property", vec!["email", "firstname"]),
//!     )?;
//!
//!     println!("{}", contact["properties"]["email"]["value"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! A bearer token always wins over the API key. Tokens can be fixed or
//! produced on every request:
//!
//! ```no_run
//! use hubspot::{AccessToken, Config};
//!
//! let config = Config::new().with_access_token(AccessToken::provider(|| {
//!     // fetch or refresh the token here
//!     Ok("short-lived-token".to_string())
//! }));
//! ```

pub mod auth;
pub mod client;
pub mod connection;
pub mod error;
pub mod params;
pub mod resolver;
pub mod response;
pub mod time;
pub mod token;

// Re-export main types for convenience
pub use auth::authorization_header;
pub use client::Config;
pub use connection::{Body, Connection, FormsConnection, NO_PARSE};
pub use error::{HubspotError, Result};
pub use params::{encode_param, encode_query, KeyRule, ParamValue, Params, Scalar};
pub use resolver::{resolve_url, RequestOptions};
pub use response::{classify, Payload, Response};
pub use time::Time;
pub use token::{AccessToken, TokenSource};

// Re-export serde_json for convenience
pub use serde_json::json;
