//! Request builders for the Salesforce REST API.
//!
//! Each builder knows its URL, HTTP method and body, and how to turn the
//! decoded response into a typed result. The [`DataApi`](crate::DataApi)
//! façade executes them one at a time; [`CompositeGraphRestApiRequest`]
//! embeds them as sub-requests of a single graph.

mod composite;
mod data_cloud;
mod query;
mod sobject;

use std::future::Future;

use heroku_applink_client::RequestMethod;
use serde_json::Value;

use crate::error::Result;

pub use composite::CompositeGraphRestApiRequest;
pub use data_cloud::{DataCloudNextBatchRequest, DataCloudQueryRequest};
pub use query::{QueryNextRecordsRestApiRequest, QueryRecordsRestApiRequest};
pub use sobject::{
    CreateRecordRestApiRequest, DeleteRecordRestApiRequest, RecordMutation,
    UpdateRecordRestApiRequest,
};

/// A single REST API call.
pub trait RestApiRequest: Send + Sync {
    /// The typed result of a successful call.
    type Output: Send;

    /// The request URL under `org_domain_url`.
    ///
    /// Called with an empty domain to produce the relative URL of a
    /// composite sub-request.
    fn url(&self, org_domain_url: &str, api_version: &str) -> String;

    fn http_method(&self) -> RequestMethod;

    /// The JSON body, or `None` for body-less requests.
    fn request_body(&self) -> Option<Value>;

    /// Turn the status code and decoded body into the typed result.
    fn process_response(
        &self,
        status: u16,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Self::Output>> + Send;
}

/// Build `<domain>/services/data/v<version>/<path>`.
pub(crate) fn data_url(org_domain_url: &str, api_version: &str, path: &str) -> String {
    format!(
        "{}/services/data/v{}/{}",
        org_domain_url.trim_end_matches('/'),
        api_version.trim_start_matches('v'),
        path.trim_start_matches('/')
    )
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        assert_eq!(
            data_url("https://example.my.salesforce.com/", "62.0", "sobjects/Account"),
            "https://example.my.salesforce.com/services/data/v62.0/sobjects/Account"
        );
        assert_eq!(
            data_url("https://example.my.salesforce.com", "v62.0", "/query"),
            "https://example.my.salesforce.com/services/data/v62.0/query"
        );
        assert_eq!(data_url("", "62.0", "sobjects/Account"), "/services/data/v62.0/sobjects/Account");
    }
}
