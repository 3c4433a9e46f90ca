use heroku_applink_client::RequestMethod;
use serde_json::{json, Value};

use super::{is_success, RestApiRequest};
use crate::data_cloud::DataCloudQueryResult;
use crate::error::{Error, Result};
use crate::parse::error_from_response;

const QUERY_PATH: &str = "api/v2/query";

fn query_url(org_domain_url: &str, suffix: &str) -> String {
    format!(
        "{}/{}{}",
        org_domain_url.trim_end_matches('/'),
        QUERY_PATH,
        suffix
    )
}

fn process_query_response(status: u16, body: Option<Value>) -> Result<DataCloudQueryResult> {
    if !is_success(status) {
        return Err(error_from_response(status, body));
    }

    let body = body.ok_or_else(|| {
        Error::unexpected_payload("expected a Data Cloud query result, got an empty body")
    })?;
    Ok(serde_json::from_value(body)?)
}

/// `POST /api/v2/query`: run an ANSI SQL query against Data Cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCloudQueryRequest {
    sql: String,
}

impl DataCloudQueryRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl RestApiRequest for DataCloudQueryRequest {
    type Output = DataCloudQueryResult;

    /// Data Cloud endpoints are not versioned under `/services/data`.
    fn url(&self, org_domain_url: &str, _api_version: &str) -> String {
        query_url(org_domain_url, "")
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Post
    }

    fn request_body(&self) -> Option<Value> {
        Some(json!({ "sql": self.sql }))
    }

    async fn process_response(
        &self,
        status: u16,
        body: Option<Value>,
    ) -> Result<DataCloudQueryResult> {
        process_query_response(status, body)
    }
}

/// `GET /api/v2/query/<nextBatchId>`: the next batch of a Data Cloud query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataCloudNextBatchRequest {
    next_batch_id: String,
}

impl DataCloudNextBatchRequest {
    pub fn new(next_batch_id: impl Into<String>) -> Self {
        Self {
            next_batch_id: next_batch_id.into(),
        }
    }

    pub fn next_batch_id(&self) -> &str {
        &self.next_batch_id
    }
}

impl RestApiRequest for DataCloudNextBatchRequest {
    type Output = DataCloudQueryResult;

    fn url(&self, org_domain_url: &str, _api_version: &str) -> String {
        query_url(org_domain_url, &format!("/{}", self.next_batch_id))
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn request_body(&self) -> Option<Value> {
        None
    }

    async fn process_response(
        &self,
        status: u16,
        body: Option<Value>,
    ) -> Result<DataCloudQueryResult> {
        process_query_response(status, body)
    }
}
