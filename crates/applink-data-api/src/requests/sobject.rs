use heroku_applink_client::RequestMethod;
use serde_json::Value;

use super::{data_url, RestApiRequest};
use crate::error::{Error, Result};
use crate::fields::normalize_record_fields;
use crate::parse::{error_from_response, json_kind};
use crate::record::{FieldValue, Record};

const ID_FIELD: &str = "Id";

/// Serialize every field except `Id`.
fn body_without_id(record: &Record) -> Value {
    let mut body = normalize_record_fields(&record.fields);
    body.remove(ID_FIELD);
    Value::Object(body)
}

/// `POST /sobjects/<type>`: create a record and return its new Id.
#[derive(Debug, Clone)]
pub struct CreateRecordRestApiRequest {
    record: Record,
}

impl CreateRecordRestApiRequest {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }
}

impl RestApiRequest for CreateRecordRestApiRequest {
    type Output = String;

    fn url(&self, org_domain_url: &str, api_version: &str) -> String {
        data_url(
            org_domain_url,
            api_version,
            &format!("sobjects/{}", self.record.sobject_type),
        )
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Post
    }

    fn request_body(&self) -> Option<Value> {
        Some(body_without_id(&self.record))
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<String> {
        if status != 201 {
            return Err(error_from_response(status, body));
        }

        match body {
            Some(Value::Object(mut object)) => match object.remove("id") {
                Some(Value::String(id)) => Ok(id),
                _ => Err(Error::unexpected_payload(
                    "create response is missing a string 'id'",
                )),
            },
            Some(other) => Err(Error::unexpected_payload(format!(
                "expected a create result object, got {}",
                json_kind(&other)
            ))),
            None => Err(Error::unexpected_payload(
                "expected a create result object, got an empty body",
            )),
        }
    }
}

/// `PATCH /sobjects/<type>/<id>`: update a record and echo its Id.
#[derive(Debug, Clone)]
pub struct UpdateRecordRestApiRequest {
    record: Record,
    id: String,
}

impl UpdateRecordRestApiRequest {
    /// Fails with a missing-field error unless the record carries an `Id`.
    ///
    /// The `Id` may be a [`ReferenceId`](crate::ReferenceId) when the record
    /// is created earlier in the same unit of work.
    pub fn new(record: Record) -> Result<Self> {
        let id = match record.id() {
            Some(FieldValue::String(id)) if !id.is_empty() => id.clone(),
            Some(FieldValue::Reference(reference_id)) => reference_id.placeholder(),
            _ => {
                return Err(Error::missing_field(format!(
                    "{} record has no Id; updates require one",
                    record.sobject_type
                )))
            }
        };
        Ok(Self { record, id })
    }

    /// Like [`new`](Self::new), but the `Id` must be a concrete record Id.
    ///
    /// A reference id only resolves inside a composite graph, so a request
    /// sent on its own rejects it.
    pub fn standalone(record: Record) -> Result<Self> {
        if let Some(FieldValue::Reference(reference_id)) = record.id() {
            return Err(Error::missing_field(format!(
                "{} record Id is the reference {}; commit it in a unit of work instead",
                record.sobject_type, reference_id
            )));
        }
        Self::new(record)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// The Id addressed by this update.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl RestApiRequest for UpdateRecordRestApiRequest {
    type Output = String;

    fn url(&self, org_domain_url: &str, api_version: &str) -> String {
        data_url(
            org_domain_url,
            api_version,
            &format!("sobjects/{}/{}", self.record.sobject_type, self.id),
        )
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Patch
    }

    fn request_body(&self) -> Option<Value> {
        Some(body_without_id(&self.record))
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<String> {
        if status == 204 {
            Ok(self.id.clone())
        } else {
            Err(error_from_response(status, body))
        }
    }
}

/// `DELETE /sobjects/<type>/<id>`: delete a record and echo its Id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRecordRestApiRequest {
    sobject_type: String,
    id: String,
}

impl DeleteRecordRestApiRequest {
    pub fn new(sobject_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sobject_type: sobject_type.into(),
            id: id.into(),
        }
    }

    pub fn sobject_type(&self) -> &str {
        &self.sobject_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl RestApiRequest for DeleteRecordRestApiRequest {
    type Output = String;

    fn url(&self, org_domain_url: &str, api_version: &str) -> String {
        data_url(
            org_domain_url,
            api_version,
            &format!("sobjects/{}/{}", self.sobject_type, self.id),
        )
    }

    fn http_method(&self) -> RequestMethod {
        RequestMethod::Delete
    }

    fn request_body(&self) -> Option<Value> {
        None
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<String> {
        if status == 204 {
            Ok(self.id.clone())
        } else {
            Err(error_from_response(status, body))
        }
    }
}

/// A record mutation that can run on its own or inside a composite graph.
#[derive(Debug, Clone)]
pub enum RecordMutation {
    Create(CreateRecordRestApiRequest),
    Update(UpdateRecordRestApiRequest),
    Delete(DeleteRecordRestApiRequest),
}

impl RestApiRequest for RecordMutation {
    type Output = String;

    fn url(&self, org_domain_url: &str, api_version: &str) -> String {
        match self {
            RecordMutation::Create(request) => request.url(org_domain_url, api_version),
            RecordMutation::Update(request) => request.url(org_domain_url, api_version),
            RecordMutation::Delete(request) => request.url(org_domain_url, api_version),
        }
    }

    fn http_method(&self) -> RequestMethod {
        match self {
            RecordMutation::Create(request) => request.http_method(),
            RecordMutation::Update(request) => request.http_method(),
            RecordMutation::Delete(request) => request.http_method(),
        }
    }

    fn request_body(&self) -> Option<Value> {
        match self {
            RecordMutation::Create(request) => request.request_body(),
            RecordMutation::Update(request) => request.request_body(),
            RecordMutation::Delete(request) => request.request_body(),
        }
    }

    async fn process_response(&self, status: u16, body: Option<Value>) -> Result<String> {
        match self {
            RecordMutation::Create(request) => request.process_response(status, body).await,
            RecordMutation::Update(request) => request.process_response(status, body).await,
            RecordMutation::Delete(request) => request.process_response(status, body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::reference_id::ReferenceId;
    use serde_json::json;

    const BASE: &str = "https://example.my.salesforce.com";

    #[test]
    fn test_create_record_request() {
        let request = CreateRecordRestApiRequest::new(Record::new("Account").with_field("Name", "Test"));
        assert_eq!(
            request.url(BASE, "60.0"),
            "https://example.my.salesforce.com/services/data/v60.0/sobjects/Account"
        );
        assert_eq!(request.http_method(), RequestMethod::Post);
        assert_eq!(request.request_body(), Some(json!({"Name": "Test"})));
    }

    #[test]
    fn test_update_record_request() {
        let record = Record::new("Account")
            .with_field("Id", "001")
            .with_field("Name", "Updated");
        let request = UpdateRecordRestApiRequest::new(record).unwrap();
        assert_eq!(
            request.url(BASE, "60.0"),
            "https://example.my.salesforce.com/services/data/v60.0/sobjects/Account/001"
        );
        assert_eq!(request.http_method(), RequestMethod::Patch);
        assert_eq!(request.request_body(), Some(json!({"Name": "Updated"})));
    }

    #[test]
    fn test_update_body_never_contains_id() {
        let ids = [
            FieldValue::from("001ABC"),
            FieldValue::from(ReferenceId::new("referenceIdA")),
        ];
        for id in ids {
            let record = Record::new("Contact")
                .with_field("Id", id)
                .with_field("LastName", "Doe")
                .with_field("Photo", b"\x89PNG".to_vec());
            let body = UpdateRecordRestApiRequest::new(record)
                .unwrap()
                .request_body()
                .unwrap();
            assert!(body.get("Id").is_none());
            assert_eq!(body["LastName"], "Doe");
        }
    }

    #[test]
    fn test_update_with_reference_id() {
        let reference_id = ReferenceId::new("referenceIdA");
        let record = Record::new("Account").with_field("Id", &reference_id);
        let request = UpdateRecordRestApiRequest::new(record).unwrap();
        assert_eq!(request.id(), "@{referenceIdA.id}");
        assert_eq!(request.url("", "60.0"), "/services/data/v60.0/sobjects/Account/@{referenceIdA.id}");
    }

    #[test]
    fn test_standalone_update_rejects_reference_id() {
        let reference_id = ReferenceId::new("referenceIdA");
        let err = UpdateRecordRestApiRequest::standalone(
            Record::new("Account").with_field("Id", &reference_id),
        )
        .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingField(_)));

        let request = UpdateRecordRestApiRequest::standalone(
            Record::new("Account").with_field("Id", "001xx"),
        )
        .unwrap();
        assert_eq!(request.id(), "001xx");
    }

    #[test]
    fn test_update_without_id_fails() {
        let err = UpdateRecordRestApiRequest::new(Record::new("Account").with_field("Name", "X"))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingField(_)));

        let err = UpdateRecordRestApiRequest::new(Record::new("Account").with_field("Id", FieldValue::Null))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingField(_)));
    }

    #[test]
    fn test_delete_record_request() {
        let request = DeleteRecordRestApiRequest::new("Account", "001");
        assert_eq!(
            request.url(BASE, "60.0"),
            "https://example.my.salesforce.com/services/data/v60.0/sobjects/Account/001"
        );
        assert_eq!(request.http_method(), RequestMethod::Delete);
        assert!(request.request_body().is_none());
    }

    #[tokio::test]
    async fn test_create_record_process_response_success() {
        let request = CreateRecordRestApiRequest::new(Record::new("Account").with_field("Name", "Test"));
        let id = request
            .process_response(201, Some(json!({"id": "001XYZ", "success": true, "errors": []})))
            .await
            .unwrap();
        assert_eq!(id, "001XYZ");
    }

    #[tokio::test]
    async fn test_create_record_process_response_non_201() {
        let request = CreateRecordRestApiRequest::new(Record::new("Account"));
        let body = json!([{"message": "Invalid field", "errorCode": "INVALID_FIELD", "fields": ["Name"]}]);
        let err = request.process_response(400, Some(body)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("INVALID_FIELD"));
        assert!(message.contains("Invalid field"));
    }

    #[tokio::test]
    async fn test_create_record_process_response_invalid_structure() {
        let request = CreateRecordRestApiRequest::new(Record::new("Account"));
        for body in [Some(json!({"unexpected": "value"})), Some(json!(["001"])), None] {
            let err = request.process_response(201, body).await.unwrap_err();
            assert!(matches!(err.kind, ErrorKind::UnexpectedPayload(_)));
        }
    }

    #[tokio::test]
    async fn test_update_record_process_response_success() {
        let record = Record::new("Account")
            .with_field("Id", "001ABC")
            .with_field("Name", "X");
        let request = UpdateRecordRestApiRequest::new(record).unwrap();
        assert_eq!(request.process_response(204, None).await.unwrap(), "001ABC");
    }

    #[tokio::test]
    async fn test_update_record_process_response_failure() {
        let request = UpdateRecordRestApiRequest::new(Record::new("Account").with_field("Id", "001")).unwrap();
        let body = json!([{"message": "Invalid field", "errorCode": "INVALID_FIELD", "fields": []}]);
        let err = request.process_response(400, Some(body)).await.unwrap_err();
        assert!(err.to_string().contains("INVALID_FIELD"));
    }

    #[tokio::test]
    async fn test_delete_record_process_response() {
        let request = DeleteRecordRestApiRequest::new("Account", "001DEL");
        assert_eq!(request.process_response(204, None).await.unwrap(), "001DEL");

        let body = json!([{"message": "entity is deleted", "errorCode": "ENTITY_IS_DELETED"}]);
        let err = request.process_response(404, Some(body)).await.unwrap_err();
        assert_eq!(err.api_errors().unwrap()[0].error_code, "ENTITY_IS_DELETED");

        let err = request.process_response(500, None).await.unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnexpectedPayload(_)));
    }

    #[tokio::test]
    async fn test_record_mutation_delegates() {
        let mutation = RecordMutation::Delete(DeleteRecordRestApiRequest::new("Account", "001"));
        assert_eq!(mutation.http_method(), RequestMethod::Delete);
        assert_eq!(mutation.url("", "60.0"), "/services/data/v60.0/sobjects/Account/001");
        assert_eq!(mutation.process_response(204, None).await.unwrap(), "001");
    }
}
