//! Client-side ledger of pending record mutations.

use crate::error::Result;
use crate::record::Record;
use crate::reference_id::ReferenceId;
use crate::requests::{
    CompositeGraphRestApiRequest, CreateRecordRestApiRequest, DeleteRecordRestApiRequest,
    RecordMutation, UpdateRecordRestApiRequest,
};

/// Collects creates, updates and deletes to submit as one composite graph.
///
/// Every registration mints a fresh [`ReferenceId`]. Later records can use it
/// as a field value to point at a record created earlier in the same unit:
///
/// ```
/// use heroku_applink_data_api::{Record, UnitOfWork};
///
/// let mut uow = UnitOfWork::new();
/// let account = uow.register_create(Record::new("Account").with_field("Name", "Acme"));
/// let contact = uow.register_create(
///     Record::new("Contact")
///         .with_field("LastName", "Doe")
///         .with_field("AccountId", &account),
/// );
/// assert_eq!(uow.len(), 2);
/// assert_ne!(account, contact);
/// ```
///
/// Registration takes `&mut self`, so a unit has a single writer. Committing
/// through [`DataApi::commit_unit_of_work`](crate::DataApi::commit_unit_of_work)
/// consumes it, and a unit cannot be copied, so the same operations are never
/// submitted twice:
///
/// ```compile_fail
/// use heroku_applink_data_api::{DataApi, UnitOfWork};
///
/// async fn commit_twice(data_api: &DataApi, uow: UnitOfWork) {
///     let _ = data_api.commit_unit_of_work(uow).await;
///     let _ = data_api.commit_unit_of_work(uow).await;
/// }
/// ```
///
/// ```compile_fail
/// use heroku_applink_data_api::UnitOfWork;
///
/// let uow = UnitOfWork::new();
/// let _copy = uow.clone();
/// ```
#[derive(Debug, Default)]
pub struct UnitOfWork {
    operations: Vec<(ReferenceId, RecordMutation)>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record to create.
    pub fn register_create(&mut self, record: Record) -> ReferenceId {
        self.push(RecordMutation::Create(CreateRecordRestApiRequest::new(record)))
    }

    /// Register a record to update. Fails before anything is registered if
    /// the record has no `Id`.
    pub fn register_update(&mut self, record: Record) -> Result<ReferenceId> {
        let request = UpdateRecordRestApiRequest::new(record)?;
        Ok(self.push(RecordMutation::Update(request)))
    }

    /// Register a record to delete.
    pub fn register_delete(
        &mut self,
        sobject_type: impl Into<String>,
        id: impl Into<String>,
    ) -> ReferenceId {
        self.push(RecordMutation::Delete(DeleteRecordRestApiRequest::new(
            sobject_type,
            id,
        )))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Reference ids in registration order.
    pub fn reference_ids(&self) -> impl Iterator<Item = &ReferenceId> {
        self.operations.iter().map(|(reference_id, _)| reference_id)
    }

    /// Compile the ledger into a composite graph request.
    pub fn into_composite_request(
        self,
        api_version: impl Into<String>,
    ) -> CompositeGraphRestApiRequest<RecordMutation> {
        CompositeGraphRestApiRequest::new(api_version, self.operations)
    }

    fn push(&mut self, mutation: RecordMutation) -> ReferenceId {
        let reference_id = ReferenceId::generate();
        self.operations.push((reference_id.clone(), mutation));
        reference_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::requests::RestApiRequest;
    use heroku_applink_client::RequestMethod;

    #[test]
    fn test_registrations_mint_distinct_ids() {
        let mut uow = UnitOfWork::new();
        let record = Record::new("Account").with_field("Name", "Same");

        let a = uow.register_create(record.clone());
        let b = uow.register_create(record);
        let c = uow
            .register_update(Record::new("Account").with_field("Id", "001"))
            .unwrap();
        let d = uow.register_delete("Account", "001");

        let ids = [a, b, c, d];
        for (i, x) in ids.iter().enumerate() {
            for y in &ids[i + 1..] {
                assert_ne!(x, y);
            }
        }
        assert_eq!(uow.len(), 4);
        assert_eq!(uow.reference_ids().cloned().collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_register_update_without_id_fails_fast() {
        let mut uow = UnitOfWork::new();
        let err = uow
            .register_update(Record::new("Account").with_field("Name", "No Id"))
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingField(_)));
        assert!(uow.is_empty());
    }

    #[test]
    fn test_into_composite_request_preserves_order() {
        let mut uow = UnitOfWork::new();
        let account = uow.register_create(Record::new("Account").with_field("Name", "Acme"));
        uow.register_update(
            Record::new("Account")
                .with_field("Id", &account)
                .with_field("Description", "updated in the same graph"),
        )
        .unwrap();
        uow.register_delete("Contact", "003DEL");

        let request = uow.into_composite_request("62.0");
        assert_eq!(request.len(), 3);
        assert_eq!(request.http_method(), RequestMethod::Post);

        let body = request.request_body().unwrap();
        let nodes = body["graphs"][0]["compositeRequest"].as_array().unwrap();
        assert_eq!(nodes[0]["method"], "POST");
        assert_eq!(nodes[0]["referenceId"], account.id());
        assert_eq!(nodes[1]["method"], "PATCH");
        assert_eq!(
            nodes[1]["url"],
            format!("/services/data/v62.0/sobjects/Account/{}", account.placeholder())
        );
        assert_eq!(nodes[2]["method"], "DELETE");
        assert_eq!(nodes[2]["url"], "/services/data/v62.0/sobjects/Contact/003DEL");
    }
}
