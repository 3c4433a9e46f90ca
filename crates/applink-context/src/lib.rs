//! # applink-context
//!
//! Request-scoped context for Salesforce calls made through Heroku AppLink.
//!
//! AppLink forwards every invocation with an `x-client-context` header: a
//! base64 JSON document naming the calling org and user and carrying an
//! access token for them. [`ClientContext::from_header`] decodes it and
//! builds a [`DataApi`](heroku_applink_data_api::DataApi) authorized as that
//! user.
//!
//! ## Example
//!
//! ```rust,ignore
//! use heroku_applink_context::{ClientContext, CLIENT_CONTEXT_HEADER};
//! use heroku_applink_client::HttpTransport;
//!
//! // Once per process
//! let transport = HttpTransport::default_transport()?;
//!
//! // Once per inbound request
//! let header = request.headers()[CLIENT_CONTEXT_HEADER].to_str()?;
//! let context = ClientContext::from_header(header, transport.clone())?;
//! let accounts = context
//!     .data_api
//!     .query("SELECT Id, Name FROM Account")
//!     .await?;
//! ```

mod context;
mod error;

pub use context::{ClientContext, Org, OrgType, User, CLIENT_CONTEXT_HEADER};
pub use error::{Error, ErrorKind, Result};
