//! Data Cloud Query API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use heroku_applink_client::{ClientConfig, HttpTransport, Transport};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::data_api::execute;
use crate::error::Result;
use crate::requests::{DataCloudNextBatchRequest, DataCloudQueryRequest};

/// Type information for one result column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCloudColumn {
    #[serde(rename = "type")]
    pub column_type: String,
    /// Position of the column within each row of `data`.
    pub place_in_order: usize,
    pub type_code: i32,
}

/// One batch of a Data Cloud query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCloudQueryResult {
    /// Rows, each an array of column values.
    pub data: Vec<Value>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub row_count: u64,
    pub query_id: String,
    #[serde(default)]
    pub next_batch_id: Option<String>,
    pub done: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, DataCloudColumn>,
}

impl DataCloudQueryResult {
    /// Column names in row order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<(&str, usize)> = self
            .metadata
            .iter()
            .map(|(name, column)| (name.as_str(), column.place_in_order))
            .collect();
        columns.sort_by_key(|(_, place)| *place);
        columns.into_iter().map(|(name, _)| name).collect()
    }

    pub fn has_more(&self) -> bool {
        !self.done && self.next_batch_id.is_some()
    }
}

/// Data Cloud Query API bound to one org and user token.
///
/// Shares its transport with [`DataApi`](crate::DataApi); see
/// [`DataApi::data_cloud_api`](crate::DataApi::data_cloud_api).
#[derive(Clone)]
pub struct DataCloudApi<T = HttpTransport> {
    org_domain_url: String,
    access_token: String,
    transport: T,
}

impl<T> std::fmt::Debug for DataCloudApi<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCloudApi")
            .field("org_domain_url", &self.org_domain_url)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl DataCloudApi<HttpTransport> {
    pub fn new(org_domain_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(org_domain_url, access_token, ClientConfig::default())
    }

    pub fn with_config(
        org_domain_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Ok(Self::with_transport(org_domain_url, access_token, transport))
    }
}

impl<T: Transport> DataCloudApi<T> {
    pub fn with_transport(
        org_domain_url: impl Into<String>,
        access_token: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            org_domain_url: org_domain_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            transport,
        }
    }

    pub fn org_domain_url(&self) -> &str {
        &self.org_domain_url
    }

    /// Run a SQL query and return its first batch.
    #[instrument(skip(self))]
    pub async fn query(&self, sql: &str) -> Result<DataCloudQueryResult> {
        self.execute(&DataCloudQueryRequest::new(sql)).await
    }

    /// Fetch the batch after `previous`, or `None` once the query is done.
    #[instrument(skip(self, previous), fields(query_id = %previous.query_id))]
    pub async fn next_batch(
        &self,
        previous: &DataCloudQueryResult,
    ) -> Result<Option<DataCloudQueryResult>> {
        match previous.next_batch_id {
            Some(ref next_batch_id) if !previous.done => self
                .execute(&DataCloudNextBatchRequest::new(next_batch_id.as_str()))
                .await
                .map(Some),
            _ => Ok(None),
        }
    }

    async fn execute<R: crate::requests::RestApiRequest>(&self, request: &R) -> Result<R::Output> {
        execute(&self.transport, &self.org_domain_url, "", &self.access_token, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heroku_applink_client::{HttpRequest, HttpResponse, RequestMethod};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        responses: Mutex<Vec<HttpResponse>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl Transport for RecordingTransport {
        async fn send(&self, request: HttpRequest) -> heroku_applink_client::Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().remove(0))
        }
    }

    fn batch(done: bool, next_batch_id: Option<&str>) -> serde_json::Value {
        json!({
            "data": [["Acme"]],
            "startTime": "2025-03-04T10:15:30Z",
            "endTime": "2025-03-04T10:15:31Z",
            "rowCount": 1,
            "queryId": "q-1",
            "nextBatchId": next_batch_id,
            "done": done,
            "metadata": {"Name__c": {"type": "VARCHAR", "placeInOrder": 0, "typeCode": 12}}
        })
    }

    #[tokio::test]
    async fn test_query_and_next_batch() {
        let transport = RecordingTransport {
            responses: Mutex::new(vec![
                HttpResponse::json(200, batch(false, Some("batch-2"))),
                HttpResponse::json(200, batch(true, None)),
            ]),
            ..Default::default()
        };
        let api = DataCloudApi::with_transport("https://acme.my.salesforce.com/", "tok", &transport);

        let first = api.query("SELECT Name__c FROM Account_Home__dlm").await.unwrap();
        assert!(first.has_more());

        let second = api.next_batch(&first).await.unwrap().unwrap();
        assert!(second.done);
        assert!(api.next_batch(&second).await.unwrap().is_none());

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, RequestMethod::Post);
        assert_eq!(requests[0].url, "https://acme.my.salesforce.com/api/v2/query");
        assert_eq!(
            requests[0].body,
            Some(json!({"sql": "SELECT Name__c FROM Account_Home__dlm"}))
        );
        assert_eq!(requests[0].header_value("Authorization"), Some("Bearer tok"));
        assert_eq!(requests[1].method, RequestMethod::Get);
        assert_eq!(requests[1].url, "https://acme.my.salesforce.com/api/v2/query/batch-2");
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = DataCloudApi::with_transport("https://acme.my.salesforce.com", "tok-secret", RecordingTransport::default());
        let debug = format!("{:?}", api);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok-secret"));
    }
}
