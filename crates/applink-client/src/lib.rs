//! # applink-client
//!
//! HTTP transport for the Heroku AppLink Salesforce Data API client.
//!
//! The Data API core never talks to the network directly. It hands a fully
//! shaped [`HttpRequest`] to a [`Transport`] and gets back the status code and
//! decoded body. This crate provides:
//! - The [`Transport`] seam (one request in, one response out)
//! - [`HttpTransport`], a pooled reqwest implementation
//! - Timeout and User-Agent configuration
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         DataApi                             │
//! │  - Builds requests (query, create, composite graph, ...)    │
//! │  - Parses responses into records / reference-id maps        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Transport (HttpTransport)                  │
//! │  - send(method, url, headers, body) -> (status, body)       │
//! │  - Connection pooling, timeouts, JSON decoding              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use heroku_applink_client::{ClientConfig, HttpRequest, HttpTransport, RequestMethod, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), heroku_applink_client::Error> {
//!     let transport = HttpTransport::new(ClientConfig::default())?;
//!     let response = transport
//!         .send(HttpRequest::new(RequestMethod::Get, "https://example.my.salesforce.com/services/data"))
//!         .await?;
//!     println!("{}", response.status);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::{HttpTransport, Transport};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{HttpRequest, RequestMethod};
pub use response::{HttpResponse, ResponseBody};

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("heroku-applink-rust/", env!("CARGO_PKG_VERSION"));
