use std::sync::Arc;

use heroku_applink_client::RequestMethod;
use serde_json::Value;

use super::{data_url, RestApiRequest};
use crate::error::Result;
use crate::fields::BinaryFields;
use crate::parse::{process_records_response, FileDownloader};
use crate::record::RecordQueryResult;

/// `GET /query?q=<soql>`: the first page of a SOQL query.
///
/// Binary fields in the result are fetched through `downloader` while the
/// page is parsed.
pub struct QueryRecordsRestApiRequest<D> {
    soql: String,
    query_string: String,
    downloader: D,
    binary_fields: Arc<BinaryFields>,
}

impl<D: FileDownloader> QueryRecordsRestApiRequest<D> {
    /// Build a query request. Fails only if the SOQL cannot be form-encoded.
    pub fn new(soql: impl Into<String>, downloader: D) -> Result<Self> {
        let soql = soql.into();
        let query_string = serde_urlencoded::to_string([("q", soql.as_str())])?;
        Ok(Self {
            soql,
            query_string,
            downloader,
            binary_fields: Arc::new(BinaryFields::default()),
        })
    }

    /// Replace the set of fields treated as binary.
    pub fn with_binary_fields(mut self, binary_fields: Arc<BinaryFields>) -> Self {
        self.binary_fields = binary_fields;
        self
    }

    pub fn soql(&self) -> &str {
        &self.soql
    }
}

impl<D: FileDownloader> RestApiRequest for QueryRecordsRestApiRequest<D> {
    type Output = RecordQueryResult;

    fn url(&self, org_domain_url: &str, api_version: &str) -> String {
        data_url(
            org_domain_url,
            api_version,
            &format!("query?{}", self.query_string),
        )
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn request_body(&self) -> Option<Value> {
        None
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<RecordQueryResult> {
        process_records_response(status, body, &self.downloader, &self.binary_fields).await
    }
}

/// `GET <nextRecordsUrl>`: a follow-up page of a query.
pub struct QueryNextRecordsRestApiRequest<D> {
    next_records_url: String,
    downloader: D,
    binary_fields: Arc<BinaryFields>,
}

impl<D: FileDownloader> QueryNextRecordsRestApiRequest<D> {
    /// `next_records_url` is the server cursor exactly as returned.
    pub fn new(next_records_url: impl Into<String>, downloader: D) -> Self {
        Self {
            next_records_url: next_records_url.into(),
            downloader,
            binary_fields: Arc::new(BinaryFields::default()),
        }
    }

    pub fn with_binary_fields(mut self, binary_fields: Arc<BinaryFields>) -> Self {
        self.binary_fields = binary_fields;
        self
    }
}

impl<D: FileDownloader> RestApiRequest for QueryNextRecordsRestApiRequest<D> {
    type Output = RecordQueryResult;

    fn url(&self, org_domain_url: &str, _api_version: &str) -> String {
        if self.next_records_url.starts_with("https://")
            || self.next_records_url.starts_with("http://")
        {
            return self.next_records_url.clone();
        }
        format!(
            "{}{}",
            org_domain_url.trim_end_matches('/'),
            self.next_records_url
        )
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn request_body(&self) -> Option<Value> {
        None
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<RecordQueryResult> {
        process_records_response(status, body, &self.downloader, &self.binary_fields).await
    }
}
