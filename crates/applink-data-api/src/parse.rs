//! Response parsing shared by the request builders.
//!
//! Query results are parsed by shape: any field value carrying `done`,
//! `totalSize` and `records` is itself a query result (a relationship
//! sub-query) and is parsed recursively. Binary fields are dereferenced
//! through a [`FileDownloader`] while the row is being built.

use std::future::Future;

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorKind, InnerSalesforceRestApiError, Result, SalesforceRestApiError};
use crate::fields::BinaryFields;
use crate::record::{FieldValue, QueriedRecord, RecordQueryResult};

/// Deepest sub-query nesting accepted before the payload is rejected.
pub const MAX_QUERY_DEPTH: usize = 16;

/// Fetches the content behind a binary field URL.
pub trait FileDownloader: Send + Sync {
    /// Download `url` (relative to the org domain, or absolute).
    fn download(&self, url: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

impl<F, Fut> FileDownloader for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Bytes>> + Send,
{
    fn download(&self, url: &str) -> impl Future<Output = Result<Bytes>> + Send {
        self(url.to_string())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawApiError {
    message: String,
    error_code: String,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

/// Parse a Salesforce error list (`[{message, errorCode, fields?}, ...]`).
pub fn parse_errors(body: Value) -> Result<Vec<InnerSalesforceRestApiError>> {
    if !body.is_array() {
        return Err(Error::unexpected_payload(format!(
            "expected a list of errors, got {}",
            json_kind(&body)
        )));
    }

    let raw: Vec<RawApiError> = serde_json::from_value(body).map_err(|e| {
        Error::with_source(
            ErrorKind::UnexpectedPayload(format!("malformed error list: {}", e)),
            e,
        )
    })?;

    Ok(raw
        .into_iter()
        .map(|e| InnerSalesforceRestApiError::new(e.message, e.error_code, e.fields.unwrap_or_default()))
        .collect())
}

/// Build the error for a non-success status: a REST API error when the body is
/// a well-formed error list, an unexpected-payload error otherwise.
pub(crate) fn error_from_response(status: u16, body: Option<Value>) -> Error {
    let Some(body) = body else {
        return Error::unexpected_payload(format!(
            "expected a list of errors for status {}, got an empty body",
            status
        ));
    };

    match parse_errors(body) {
        Ok(api_errors) => SalesforceRestApiError::new(api_errors).into(),
        Err(err) => err,
    }
}

/// Parse a query or query-more response.
pub async fn process_records_response<D: FileDownloader>(
    status: u16,
    body: Option<Value>,
    downloader: &D,
    binary_fields: &BinaryFields,
) -> Result<RecordQueryResult> {
    if !(200..300).contains(&status) {
        return Err(error_from_response(status, body));
    }

    match body {
        Some(body @ Value::Object(_)) => {
            parse_record_query_result(body, downloader, binary_fields).await
        }
        Some(other) => Err(Error::unexpected_payload(format!(
            "expected a query result object, got {}",
            json_kind(&other)
        ))),
        None => Err(Error::unexpected_payload(
            "expected a query result object, got an empty body",
        )),
    }
}

/// Parse a query result object into a [`RecordQueryResult`] tree.
pub fn parse_record_query_result<'a, D: FileDownloader>(
    body: Value,
    downloader: &'a D,
    binary_fields: &'a BinaryFields,
) -> BoxFuture<'a, Result<RecordQueryResult>> {
    parse_query_result_at(body, downloader, binary_fields, 0)
}

/// Parse one query row into a [`QueriedRecord`].
pub async fn parse_queried_record<D: FileDownloader>(
    row: Value,
    downloader: &D,
    binary_fields: &BinaryFields,
) -> Result<QueriedRecord> {
    parse_queried_record_at(row, downloader, binary_fields, 0).await
}

fn parse_query_result_at<'a, D: FileDownloader>(
    body: Value,
    downloader: &'a D,
    binary_fields: &'a BinaryFields,
    depth: usize,
) -> BoxFuture<'a, Result<RecordQueryResult>> {
    Box::pin(async move {
        if depth > MAX_QUERY_DEPTH {
            return Err(Error::unexpected_payload(format!(
                "query result nesting exceeds {} levels",
                MAX_QUERY_DEPTH
            )));
        }

        let Value::Object(mut object) = body else {
            return Err(Error::unexpected_payload(format!(
                "expected a query result object, got {}",
                json_kind(&body)
            )));
        };

        let done = object
            .get("done")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::unexpected_payload("query result is missing boolean 'done'"))?;
        let total_size = object
            .get("totalSize")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                Error::unexpected_payload("query result is missing integer 'totalSize'")
            })?;
        let next_records_url = match object.remove("nextRecordsUrl") {
            None | Some(Value::Null) => None,
            Some(Value::String(url)) => Some(url),
            Some(other) => {
                return Err(Error::unexpected_payload(format!(
                    "'nextRecordsUrl' must be a string, got {}",
                    json_kind(&other)
                )))
            }
        };
        let rows = match object.remove("records") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(Error::unexpected_payload(
                    "query result is missing the 'records' array",
                ))
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(parse_queried_record_at(row, downloader, binary_fields, depth).await?);
        }

        Ok(RecordQueryResult {
            done,
            total_size,
            records,
            next_records_url,
        })
    })
}

async fn parse_queried_record_at<D: FileDownloader>(
    row: Value,
    downloader: &D,
    binary_fields: &BinaryFields,
    depth: usize,
) -> Result<QueriedRecord> {
    let Value::Object(mut object) = row else {
        return Err(Error::unexpected_payload(format!(
            "expected a record object, got {}",
            json_kind(&row)
        )));
    };

    let sobject_type = object
        .remove("attributes")
        .as_ref()
        .and_then(|attributes| attributes.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::unexpected_payload("record is missing 'attributes.type'"))?;

    let mut record = QueriedRecord {
        sobject_type,
        ..Default::default()
    };

    for (name, value) in object {
        if is_query_result(&value) {
            let sub_query =
                parse_query_result_at(value, downloader, binary_fields, depth + 1).await?;
            record.sub_query_results.insert(name, sub_query);
            continue;
        }

        let field = match value {
            Value::String(url) if binary_fields.contains(&record.sobject_type, &name) => {
                FieldValue::Binary(downloader.download(&url).await?)
            }
            other => FieldValue::from(other),
        };
        record.fields.insert(name, field);
    }

    Ok(record)
}

fn is_query_result(value: &Value) -> bool {
    value.as_object().is_some_and(has_query_result_keys)
}

fn has_query_result_keys(object: &Map<String, Value>) -> bool {
    object.contains_key("done") && object.contains_key("totalSize") && object.contains_key("records")
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
