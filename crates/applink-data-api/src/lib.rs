//! # applink-data-api
//!
//! Salesforce Data API for Heroku AppLink: SOQL queries, single-record CRUD
//! and a Unit of Work that commits many mutations as one composite graph.
//!
//! ## Features
//!
//! - **Query** - SOQL with relationship sub-queries and cursor pagination
//! - **Binary fields** - Blob fields are downloaded while a page is parsed
//! - **CRUD** - Create, update and delete individual records
//! - **Unit of Work** - Creates that reference each other, submitted in one
//!   round trip through the composite graph API
//! - **Data Cloud** - SQL queries against the Data Cloud Query API
//!
//! ## Example
//!
//! ```rust,ignore
//! use heroku_applink_data_api::{DataApi, Record, UnitOfWork};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), heroku_applink_data_api::Error> {
//!     let data_api = DataApi::new(
//!         "https://myorg.my.salesforce.com",
//!         "62.0",
//!         "access_token_here",
//!     )?;
//!
//!     // Query
//!     let result = data_api.query("SELECT Id, Name FROM Account LIMIT 10").await?;
//!     for account in &result.records {
//!         println!("{:?}", account.get("Name"));
//!     }
//!
//!     // Create
//!     let id = data_api
//!         .create(&Record::new("Account").with_field("Name", "New Account"))
//!         .await?;
//!
//!     // Unit of Work
//!     let mut uow = UnitOfWork::new();
//!     let contact = uow.register_create(
//!         Record::new("Contact")
//!             .with_field("LastName", "Doe")
//!             .with_field("AccountId", id.as_str()),
//!     );
//!     let ids = data_api.commit_unit_of_work(uow).await?;
//!     println!("Contact Id: {}", ids[&contact]);
//!
//!     Ok(())
//! }
//! ```

mod data_api;
mod data_cloud;
mod error;
mod fields;
mod parse;
mod record;
mod reference_id;
pub mod requests;
mod unit_of_work;

// Façade
pub use data_api::DataApi;
pub use data_cloud::{DataCloudApi, DataCloudColumn, DataCloudQueryResult};

// Error types
pub use error::{Error, ErrorKind, InnerSalesforceRestApiError, Result, SalesforceRestApiError};

// Records and field values
pub use fields::{
    is_binary_field, normalize_field_value, normalize_record_fields, BinaryFields,
    DEFAULT_BINARY_FIELDS,
};
pub use record::{FieldValue, QueriedRecord, Record, RecordQueryResult};
pub use reference_id::ReferenceId;

// Response parsing
pub use parse::{
    parse_errors, parse_queried_record, parse_record_query_result, process_records_response,
    FileDownloader, MAX_QUERY_DEPTH,
};

// Unit of Work
pub use unit_of_work::UnitOfWork;

// Re-export the transport seam so callers need only this crate
pub use heroku_applink_client::{ClientConfig, HttpTransport, Transport};
