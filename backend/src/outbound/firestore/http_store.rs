//! Reqwest-backed Firestore record store.
//!
//! Talks to the Firestore REST v1 API. Creation and status changes are
//! single `:commit` writes with server-side transforms, so `createdAt`,
//! `updatedAt`, and the audit trail append are applied atomically by the
//! server. Listings use `:runQuery` ordered by `createdAt` descending.

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, warn};
use uuid::Uuid;

use super::client::{FirestoreClient, FirestoreConfig, is_unavailable};
use super::dto::{
    CollectionSelectorDto, CommitRequestDto, DocumentDto, DocumentMaskDto, FIELD_CATEGORY,
    FIELD_CREATED_AT, FIELD_PRIORITY, FIELD_STATUS, FIELD_STATUS_HISTORY, FIELD_UPDATED_AT,
    FIELD_USER_ID, FieldTransformDto, PreconditionDto, RunQueryRequestDto, RunQueryResponseDto,
    StructuredQueryDto, WriteDto, decode_document, encode_event, encode_insert,
    encode_string_field, equality_filter, newest_first,
};
use crate::domain::ports::{ComplaintScope, RecordStore, RecordStoreError};
use crate::domain::{Complaint, ComplaintId, ComplaintInsert, ComplaintUpdate};
use crate::outbound::status_message;

/// Collection holding complaint documents.
pub const COMPLAINTS_COLLECTION: &str = "complaints";

/// Record store adapter backed by a Firestore `complaints` collection.
pub struct FirestoreRecordStore {
    client: FirestoreClient,
}

impl FirestoreRecordStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: FirestoreConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: FirestoreClient::new(config)?,
        })
    }

    fn document_name(&self, id: &str) -> String {
        self.client.document_name(COMPLAINTS_COLLECTION, id)
    }

    async fn commit(&self, id: &str, write: WriteDto) -> Result<(), RecordStoreError> {
        let (status, body) = self
            .client
            .post_json("commit", &CommitRequestDto { writes: vec![write] })
            .await
            .map_err(map_transport_error)?;
        match status {
            _ if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RecordStoreError::not_found(id)),
            _ => Err(map_status_error(status, &body)),
        }
    }
}

/// Build the structured query for a listing scope.
fn build_query(scope: &ComplaintScope) -> RunQueryRequestDto {
    let filter = match scope {
        ComplaintScope::All => None,
        ComplaintScope::Owner(user_id) => Some(equality_filter(FIELD_USER_ID, user_id.as_ref())),
        ComplaintScope::Status(status) => Some(equality_filter(FIELD_STATUS, status.id())),
        ComplaintScope::Category(category) => {
            Some(equality_filter(FIELD_CATEGORY, category.id()))
        }
    };
    RunQueryRequestDto {
        structured_query: StructuredQueryDto {
            from: vec![CollectionSelectorDto {
                collection_id: COMPLAINTS_COLLECTION.to_owned(),
            }],
            filter,
            order_by: vec![newest_first()],
        },
    }
}

/// Build the single write applying `update` to document `name`.
fn build_update_write(name: String, update: &ComplaintUpdate) -> WriteDto {
    let (field, value, mut transforms) = match update {
        ComplaintUpdate::Status(event) => (
            FIELD_STATUS,
            event.status().id(),
            vec![FieldTransformDto::array_union(
                FIELD_STATUS_HISTORY,
                vec![encode_event(event)],
            )],
        ),
        ComplaintUpdate::Priority(priority) => (FIELD_PRIORITY, priority.id(), Vec::new()),
    };
    transforms.push(FieldTransformDto::request_time(FIELD_UPDATED_AT));
    WriteDto {
        update: encode_string_field(name, field, value),
        update_mask: Some(DocumentMaskDto {
            field_paths: vec![field.to_owned()],
        }),
        update_transforms: transforms,
        current_document: PreconditionDto { exists: true },
    }
}

fn decode_complaint(document: &DocumentDto) -> Result<Complaint, RecordStoreError> {
    let record = decode_document(document).map_err(RecordStoreError::decode)?;
    Complaint::try_from(record).map_err(|error| {
        RecordStoreError::decode(format!("complaint {}: {error}", document.name))
    })
}

/// Decode a `runQuery` response. Documents that fail to decode are logged
/// and left out so one bad record does not hide the rest of the listing.
fn parse_query_results(body: &[u8]) -> Result<Vec<Complaint>, RecordStoreError> {
    let results: Vec<RunQueryResponseDto> = serde_json::from_slice(body).map_err(|error| {
        RecordStoreError::decode(format!("invalid runQuery payload: {error}"))
    })?;
    Ok(results
        .iter()
        .filter_map(|result| result.document.as_ref())
        .filter_map(|document| match decode_complaint(document) {
            Ok(complaint) => Some(complaint),
            Err(error) => {
                warn!(document = %document.name, error = %error, "skipping undecodable complaint");
                None
            }
        })
        .collect())
}

#[async_trait]
impl RecordStore for FirestoreRecordStore {
    async fn insert(&self, complaint: &ComplaintInsert) -> Result<ComplaintId, RecordStoreError> {
        let raw_id = Uuid::new_v4().simple().to_string();
        let id = ComplaintId::new(raw_id.as_str())
            .map_err(|error| RecordStoreError::query(error.to_string()))?;
        let write = WriteDto {
            update: encode_insert(self.document_name(&raw_id), complaint),
            update_mask: None,
            update_transforms: vec![
                FieldTransformDto::request_time(FIELD_CREATED_AT),
                FieldTransformDto::request_time(FIELD_UPDATED_AT),
            ],
            current_document: PreconditionDto { exists: false },
        };
        self.commit(&raw_id, write).await?;
        debug!(complaint_id = %id, "firestore document created");
        Ok(id)
    }

    async fn find_by_id(&self, id: &ComplaintId) -> Result<Option<Complaint>, RecordStoreError> {
        let (status, body) = self
            .client
            .get_document(COMPLAINTS_COLLECTION, id.as_ref())
            .await
            .map_err(map_transport_error)?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        let document: DocumentDto = serde_json::from_slice(&body).map_err(|error| {
            RecordStoreError::decode(format!("invalid document payload: {error}"))
        })?;
        decode_complaint(&document).map(Some)
    }

    async fn list(&self, scope: &ComplaintScope) -> Result<Vec<Complaint>, RecordStoreError> {
        let (status, body) = self
            .client
            .post_json("runQuery", &build_query(scope))
            .await
            .map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        let complaints = parse_query_results(&body)?;
        debug!(?scope, count = complaints.len(), "firestore query completed");
        Ok(complaints)
    }

    async fn update(
        &self,
        id: &ComplaintId,
        update: &ComplaintUpdate,
    ) -> Result<(), RecordStoreError> {
        let write = build_update_write(self.document_name(id.as_ref()), update);
        self.commit(id.as_ref(), write).await
    }
}

fn map_transport_error(error: reqwest::Error) -> RecordStoreError {
    if error.is_timeout() {
        RecordStoreError::connection(format!("request timed out: {error}"))
    } else {
        RecordStoreError::connection(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RecordStoreError {
    let message = status_message(status, body);
    if is_unavailable(status) {
        RecordStoreError::connection(message)
    } else {
        RecordStoreError::query(message)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network Firestore mapping helpers.

    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    use super::super::client::test_config;
    use super::*;
    use crate::domain::{Category, ComplaintStatus, Priority, StatusEvent, UserId};

    #[test]
    fn complaint_documents_live_in_the_complaints_collection() {
        let store = FirestoreRecordStore::new(test_config()).expect("client should build");

        assert_eq!(
            store.document_name("abc"),
            "projects/cleantrack-demo/databases/(default)/documents/complaints/abc"
        );
    }

    #[rstest]
    #[case::all(ComplaintScope::All, None)]
    #[case::owner(
        ComplaintScope::Owner(UserId::new("u-7").expect("valid user id")),
        Some(("userId", "u-7"))
    )]
    #[case::status(ComplaintScope::Status(ComplaintStatus::InProgress), Some(("status", "in_progress")))]
    #[case::category(ComplaintScope::Category(Category::RoadDamage), Some(("category", "road_damage")))]
    fn query_filters_on_scope_and_orders_newest_first(
        #[case] scope: ComplaintScope,
        #[case] expected_filter: Option<(&str, &str)>,
    ) {
        let body = serde_json::to_value(build_query(&scope)).expect("serialize");
        let query = &body["structuredQuery"];

        assert_eq!(query["from"], json!([{ "collectionId": "complaints" }]));
        assert_eq!(
            query["orderBy"],
            json!([{ "field": { "fieldPath": "createdAt" }, "direction": "DESCENDING" }])
        );
        match expected_filter {
            None => assert!(query.get("where").is_none()),
            Some((field, value)) => assert_eq!(
                query["where"],
                json!({ "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": { "stringValue": value }
                } })
            ),
        }
    }

    #[test]
    fn status_update_sets_field_and_appends_event_atomically() {
        let event = StatusEvent::new(
            ComplaintStatus::Resolved,
            Some("Fixed".to_owned()),
            "Ward Office",
            Utc.with_ymd_and_hms(2026, 4, 3, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        );

        let write = serde_json::to_value(build_update_write(
            "doc".to_owned(),
            &ComplaintUpdate::Status(event),
        ))
        .expect("serialize");

        assert_eq!(write["update"]["fields"], json!({ "status": { "stringValue": "resolved" } }));
        assert_eq!(write["updateMask"], json!({ "fieldPaths": ["status"] }));
        assert_eq!(write["currentDocument"], json!({ "exists": true }));
        assert_eq!(write["updateTransforms"][0]["fieldPath"], "statusHistory");
        assert_eq!(
            write["updateTransforms"][0]["appendMissingElements"]["values"][0]["mapValue"]
                ["fields"]["note"],
            json!({ "stringValue": "Fixed" })
        );
        assert_eq!(
            write["updateTransforms"][1],
            json!({ "fieldPath": "updatedAt", "setToServerValue": "REQUEST_TIME" })
        );
    }

    #[test]
    fn priority_update_leaves_history_alone() {
        let write = serde_json::to_value(build_update_write(
            "doc".to_owned(),
            &ComplaintUpdate::Priority(Priority::High),
        ))
        .expect("serialize");

        assert_eq!(write["update"]["fields"], json!({ "priority": { "stringValue": "high" } }));
        assert_eq!(
            write["updateTransforms"],
            json!([{ "fieldPath": "updatedAt", "setToServerValue": "REQUEST_TIME" }])
        );
    }

    #[rstest]
    #[case::unavailable(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case::gateway_timeout(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case::forbidden(StatusCode::FORBIDDEN, false)]
    #[case::bad_request(StatusCode::BAD_REQUEST, false)]
    #[case::server_error(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn maps_http_statuses_to_store_errors(#[case] status: StatusCode, #[case] connection: bool) {
        let error = map_status_error(status, b"{\"error\": {\"status\": \"UNAVAILABLE\"}}");

        if connection {
            assert!(matches!(error, RecordStoreError::Connection { .. }), "{error}");
        } else {
            assert!(matches!(error, RecordStoreError::Query { .. }), "{error}");
        }
    }

    #[test]
    fn query_results_skip_progress_entries() {
        let body = json!([
            { "readTime": "2026-04-02T10:00:00Z" },
            {
                "document": {
                    "name": "projects/p/databases/(default)/documents/complaints/c1",
                    "fields": {
                        "title": { "stringValue": "Pothole" },
                        "category": { "stringValue": "road_damage" },
                        "status": { "stringValue": "pending" },
                        "priority": { "stringValue": "low" },
                        "statusHistory": { "arrayValue": { "values": [
                            { "mapValue": { "fields": {
                                "status": { "stringValue": "pending" },
                                "note": { "stringValue": "Complaint submitted" },
                                "updatedBy": { "stringValue": "system" },
                                "updatedAt": { "stringValue": "2026-04-02T09:00:00.000Z" }
                            } } }
                        ] } },
                        "userId": { "stringValue": "u1" },
                        "createdAt": { "timestampValue": "2026-04-02T09:00:00Z" }
                    }
                },
                "readTime": "2026-04-02T10:00:00Z"
            }
        ]);

        let complaints = parse_query_results(body.to_string().as_bytes()).expect("decode");

        assert_eq!(complaints.len(), 1);
        assert_eq!(complaints[0].id().as_ref(), "c1");
        assert_eq!(complaints[0].priority(), Priority::Low);
        assert_eq!(complaints[0].updated_at(), complaints[0].created_at());
    }

    #[test]
    fn undecodable_documents_are_left_out_of_listings() {
        let body = json!([
            { "document": {
                "name": "projects/p/databases/(default)/documents/complaints/c2",
                "fields": {
                    "status": { "stringValue": "resolved" },
                    "userId": { "stringValue": "u1" },
                    "createdAt": { "timestampValue": "2026-04-02T09:00:00Z" }
                }
            } },
            { "document": {
                "name": "projects/p/databases/(default)/documents/complaints/c3",
                "fields": {
                    "title": { "stringValue": "Overflowing bins" },
                    "category": { "stringValue": "garbage" },
                    "status": { "stringValue": "pending" },
                    "statusHistory": { "arrayValue": { "values": [
                        { "mapValue": { "fields": {
                            "status": { "stringValue": "pending" },
                            "note": { "stringValue": "Complaint submitted" },
                            "updatedBy": { "stringValue": "system" },
                            "updatedAt": { "stringValue": "2026-04-01T08:00:00.000Z" }
                        } } }
                    ] } },
                    "userId": { "stringValue": "u2" },
                    "createdAt": { "timestampValue": "2026-04-01T08:00:00Z" }
                }
            } }
        ]);

        let complaints = parse_query_results(body.to_string().as_bytes()).expect("listing loads");

        assert_eq!(complaints.len(), 1);
        assert_eq!(complaints[0].id().as_ref(), "c3");
        assert_eq!(complaints[0].category(), Category::Garbage);
    }

    #[test]
    fn malformed_query_payloads_are_decode_errors() {
        let error = parse_query_results(b"{\"error\": \"not a list\"}").expect_err("bad payload");

        assert!(matches!(error, RecordStoreError::Decode { .. }), "{error}");
    }
}
