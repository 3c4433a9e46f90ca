//! The request-scoped Data API façade.
//!
//! ## Security
//!
//! - The access token is redacted in Debug output
//! - Tokens and request bodies are skipped in tracing spans

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use heroku_applink_client::{
    ClientConfig, HttpRequest, HttpTransport, RequestMethod, ResponseBody, Transport,
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::data_cloud::DataCloudApi;
use crate::error::{Error, ErrorKind, Result};
use crate::fields::BinaryFields;
use crate::parse::{error_from_response, FileDownloader};
use crate::record::{Record, RecordQueryResult};
use crate::reference_id::ReferenceId;
use crate::requests::{
    CreateRecordRestApiRequest, DeleteRecordRestApiRequest, QueryNextRecordsRestApiRequest,
    QueryRecordsRestApiRequest, RestApiRequest, UpdateRecordRestApiRequest,
};
use crate::unit_of_work::UnitOfWork;

/// Salesforce Data API bound to one org, user token and API version.
///
/// Construct one per inbound request and pass it to the code that needs it.
/// Every public operation is a single request/response exchange through the
/// transport; nothing is retried.
///
/// # Example
///
/// ```rust,ignore
/// use heroku_applink_data_api::{DataApi, Record, UnitOfWork};
///
/// let data_api = DataApi::new("https://example.my.salesforce.com", "62.0", token)?;
///
/// let accounts = data_api.query("SELECT Id, Name FROM Account").await?;
///
/// let mut uow = UnitOfWork::new();
/// let account = uow.register_create(Record::new("Account").with_field("Name", "Acme"));
/// uow.register_create(
///     Record::new("Contact")
///         .with_field("LastName", "Doe")
///         .with_field("AccountId", &account),
/// );
/// let ids = data_api.commit_unit_of_work(uow).await?;
/// println!("Account Id: {}", ids[&account]);
/// ```
#[derive(Clone)]
pub struct DataApi<T = HttpTransport> {
    org_domain_url: String,
    api_version: String,
    access_token: String,
    transport: T,
    binary_fields: Arc<BinaryFields>,
}

impl<T> std::fmt::Debug for DataApi<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataApi")
            .field("org_domain_url", &self.org_domain_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl DataApi<HttpTransport> {
    /// Create a Data API backed by a new pooled HTTP transport.
    pub fn new(
        org_domain_url: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(
            org_domain_url,
            api_version,
            access_token,
            ClientConfig::default(),
        )
    }

    /// Create a Data API with a custom transport configuration.
    pub fn with_config(
        org_domain_url: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(
            org_domain_url,
            api_version,
            access_token,
            transport,
        ))
    }
}

impl<T: Transport> DataApi<T> {
    /// Create a Data API over an existing transport.
    ///
    /// Pass a clone of a shared [`HttpTransport`] to reuse its connection pool.
    pub fn with_transport(
        org_domain_url: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            org_domain_url: org_domain_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into().trim_start_matches('v').to_string(),
            access_token: access_token.into(),
            transport,
            binary_fields: Arc::new(BinaryFields::default()),
        }
    }

    /// Replace the fields whose query values are downloaded as bytes.
    pub fn with_binary_fields(mut self, binary_fields: BinaryFields) -> Self {
        self.binary_fields = Arc::new(binary_fields);
        self
    }

    pub fn org_domain_url(&self) -> &str {
        &self.org_domain_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn binary_fields(&self) -> &BinaryFields {
        &self.binary_fields
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Query records with SOQL. Returns the first page.
    ///
    /// Binary fields in the result are downloaded before this returns.
    #[instrument(skip(self))]
    pub async fn query(&self, soql: &str) -> Result<RecordQueryResult> {
        let request = QueryRecordsRestApiRequest::new(soql, self.downloader())?
            .with_binary_fields(Arc::clone(&self.binary_fields));
        self.execute(&request).await
    }

    /// Fetch the page after `previous`.
    ///
    /// If `previous` has no cursor there is nothing left to fetch, and an
    /// empty page is returned without a network call.
    #[instrument(skip(self, previous), fields(next_records_url = ?previous.next_records_url))]
    pub async fn query_more(&self, previous: &RecordQueryResult) -> Result<RecordQueryResult> {
        let Some(ref next_records_url) = previous.next_records_url else {
            return Ok(RecordQueryResult {
                done: previous.done,
                total_size: previous.total_size,
                records: Vec::new(),
                next_records_url: None,
            });
        };

        let request = QueryNextRecordsRestApiRequest::new(next_records_url, self.downloader())
            .with_binary_fields(Arc::clone(&self.binary_fields));
        self.execute(&request).await
    }

    /// Create a record and return its new Id.
    #[instrument(skip(self, record), fields(sobject = %record.sobject_type))]
    pub async fn create(&self, record: &Record) -> Result<String> {
        let request = CreateRecordRestApiRequest::new(record.clone());
        self.execute(&request).await
    }

    /// Update a record and return its Id.
    ///
    /// Fails without a network call if the record has no concrete `Id`.
    #[instrument(skip(self, record), fields(sobject = %record.sobject_type))]
    pub async fn update(&self, record: &Record) -> Result<String> {
        let request = UpdateRecordRestApiRequest::standalone(record.clone())?;
        self.execute(&request).await
    }

    /// Delete a record and return its Id.
    #[instrument(skip(self))]
    pub async fn delete(&self, sobject_type: &str, id: &str) -> Result<String> {
        let request = DeleteRecordRestApiRequest::new(sobject_type, id);
        self.execute(&request).await
    }

    /// Submit every operation in `unit_of_work` as one composite graph.
    ///
    /// Returns the resolved record Id for each registered reference id. The
    /// unit is consumed, so it cannot be committed twice. An empty unit
    /// commits nothing.
    #[instrument(skip(self, unit_of_work), fields(operations = unit_of_work.len()))]
    pub async fn commit_unit_of_work(
        &self,
        unit_of_work: UnitOfWork,
    ) -> Result<HashMap<ReferenceId, String>> {
        if unit_of_work.is_empty() {
            debug!("Empty unit of work; nothing to commit");
            return Ok(HashMap::new());
        }

        let request = unit_of_work.into_composite_request(self.api_version.clone());
        self.execute(&request).await
    }

    /// Download the content behind a binary field URL.
    ///
    /// `url` is usually relative to the org domain, as returned in query
    /// results; absolute URLs are used as given.
    #[instrument(skip(self))]
    pub async fn download_file(&self, url: &str) -> Result<Bytes> {
        let request = HttpRequest::new(RequestMethod::Get, self.absolute_url(url))
            .headers(bearer_headers(&self.access_token))
            .raw_response();
        let response = self.transport.send(request).await?;

        if response.is_success() {
            return Ok(response.body.into_bytes());
        }

        let status = response.status;
        Err(error_from_response(status, decode_body(response.body)?))
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.org_domain_url, url)
        } else {
            format!("{}/{}", self.org_domain_url, url)
        }
    }

    /// A Data Cloud Query API client for the same org and token.
    ///
    /// Requests go through a clone of this transport.
    pub fn data_cloud_api(&self) -> DataCloudApi<T>
    where
        T: Clone,
    {
        DataCloudApi::with_transport(
            self.org_domain_url.clone(),
            self.access_token.clone(),
            self.transport.clone(),
        )
    }

    fn downloader(&self) -> TransportDownloader<'_, T> {
        TransportDownloader { data_api: self }
    }

    async fn execute<R: RestApiRequest>(&self, request: &R) -> Result<R::Output> {
        execute(
            &self.transport,
            &self.org_domain_url,
            &self.api_version,
            &self.access_token,
            request,
        )
        .await
    }
}

/// `Authorization: Bearer <token>` plus a JSON content type.
pub(crate) fn bearer_headers(access_token: &str) -> [(&'static str, String); 2] {
    [
        ("Authorization", format!("Bearer {}", access_token)),
        ("Content-Type", "application/json".to_string()),
    ]
}

/// Send one request through `transport` and hand the decoded body back to
/// the request builder.
pub(crate) async fn execute<T: Transport, R: RestApiRequest>(
    transport: &T,
    org_domain_url: &str,
    api_version: &str,
    access_token: &str,
    request: &R,
) -> Result<R::Output> {
    let method = request.http_method();
    let url = request.url(org_domain_url, api_version);
    debug!(%method, %url, "Executing request");

    let http_request = HttpRequest::new(method, url)
        .headers(bearer_headers(access_token))
        .json_body(request.request_body());
    let response = transport.send(http_request).await?;

    let status = response.status;
    let body = decode_body(response.body)?;
    request.process_response(status, body).await
}

/// Decode a response body as JSON. An empty body is `None`.
fn decode_body(body: ResponseBody) -> Result<Option<Value>> {
    match body {
        ResponseBody::Empty | ResponseBody::Json(Value::Null) => Ok(None),
        ResponseBody::Json(value) => Ok(Some(value)),
        ResponseBody::Bytes(raw) => serde_json::from_slice(&raw).map(Some).map_err(|e| {
            Error::with_source(
                ErrorKind::UnexpectedPayload(format!("response body is not valid JSON: {}", e)),
                e,
            )
        }),
    }
}

/// Downloads binary fields through the owning [`DataApi`].
struct TransportDownloader<'a, T> {
    data_api: &'a DataApi<T>,
}

impl<T: Transport> FileDownloader for TransportDownloader<'_, T> {
    async fn download(&self, url: &str) -> Result<Bytes> {
        self.data_api.download_file(url).await
    }
}
