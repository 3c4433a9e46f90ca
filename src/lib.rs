//! # heroku-applink
//!
//! Salesforce Data API client for services invoked through Heroku AppLink.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Tracing spans skip tokens and request bodies
//! - The Authorization header is redacted when requests are logged
//!
//! ## Crates
//!
//! - **heroku-applink-client** - HTTP transport seam with a pooled reqwest implementation
//! - **heroku-applink-data-api** - Query, CRUD and Unit of Work over the composite graph API
//! - **heroku-applink-context** - Decodes the `x-client-context` header into a request-scoped context
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use heroku_applink::{ClientContext, HttpTransport, Record, UnitOfWork};
//!
//! async fn handle(header: &str, transport: HttpTransport) -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ClientContext::from_header(header, transport)?;
//!
//!     let mut uow = UnitOfWork::new();
//!     let account = uow.register_create(Record::new("Account").with_field("Name", "Acme"));
//!     uow.register_create(
//!         Record::new("Contact")
//!             .with_field("LastName", "Doe")
//!             .with_field("AccountId", &account),
//!     );
//!
//!     let ids = context.data_api.commit_unit_of_work(uow).await?;
//!     println!("Account {}", ids[&account]);
//!     Ok(())
//! }
//! ```

// Re-export all crates for convenient access
#[cfg(feature = "client")]
pub use heroku_applink_client as client;
#[cfg(feature = "context")]
pub use heroku_applink_context as context;
#[cfg(feature = "data-api")]
pub use heroku_applink_data_api as data_api;

// Re-export commonly used types at the top level
#[cfg(feature = "client")]
pub use heroku_applink_client::{ClientConfig, HttpTransport, Transport};
#[cfg(feature = "context")]
pub use heroku_applink_context::ClientContext;
#[cfg(feature = "data-api")]
pub use heroku_applink_data_api::{
    DataApi, DataCloudApi, DataCloudQueryResult, FieldValue, QueriedRecord, Record,
    RecordQueryResult, ReferenceId, UnitOfWork,
};
