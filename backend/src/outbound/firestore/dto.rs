//! Firestore REST wire types and the complaint and user profile codecs.
//!
//! Documents travel as typed value maps (`{"stringValue": "..."}`,
//! `{"arrayValue": {"values": [...]}}`). Record timestamps are server
//! `timestampValue`s; audit event timestamps are ISO-8601 strings. The
//! decoder accepts either encoding for both.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Category, ComplaintId, ComplaintInsert, ComplaintRecord, ComplaintStatus, Location, Priority,
    Role, StatusEvent, UserId, UserProfile,
};

pub(super) const FIELD_TITLE: &str = "title";
pub(super) const FIELD_DESCRIPTION: &str = "description";
pub(super) const FIELD_CATEGORY: &str = "category";
pub(super) const FIELD_IMAGES: &str = "images";
pub(super) const FIELD_LOCATION: &str = "location";
pub(super) const FIELD_STATUS: &str = "status";
pub(super) const FIELD_PRIORITY: &str = "priority";
pub(super) const FIELD_STATUS_HISTORY: &str = "statusHistory";
pub(super) const FIELD_USER_ID: &str = "userId";
pub(super) const FIELD_USER_NAME: &str = "userName";
pub(super) const FIELD_CREATED_AT: &str = "createdAt";
pub(super) const FIELD_UPDATED_AT: &str = "updatedAt";
const FIELD_NAME: &str = "name";
const FIELD_EMAIL: &str = "email";
const FIELD_ROLE: &str = "role";

/// A single Firestore value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum ValueDto {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValueDto),
    MapValue(MapValueDto),
}

impl ValueDto {
    fn string(value: impl Into<String>) -> Self {
        Self::StringValue(value.into())
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::NullValue(()) => "null",
            Self::BooleanValue(_) => "boolean",
            Self::IntegerValue(_) => "integer",
            Self::DoubleValue(_) => "double",
            Self::TimestampValue(_) => "timestamp",
            Self::StringValue(_) => "string",
            Self::ArrayValue(_) => "array",
            Self::MapValue(_) => "map",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct ArrayValueDto {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ValueDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct MapValueDto {
    #[serde(default)]
    pub fields: BTreeMap<String, ValueDto>,
}

/// A Firestore document as read or written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(super) struct DocumentDto {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, ValueDto>,
}

#[derive(Debug, Serialize)]
pub(super) struct CommitRequestDto {
    pub writes: Vec<WriteDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WriteDto {
    pub update: DocumentDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_mask: Option<DocumentMaskDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub update_transforms: Vec<FieldTransformDto>,
    pub current_document: PreconditionDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DocumentMaskDto {
    pub field_paths: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PreconditionDto {
    pub exists: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FieldTransformDto {
    pub field_path: String,
    #[serde(flatten)]
    pub transform: TransformDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum TransformDto {
    SetToServerValue(ServerValueDto),
    AppendMissingElements(ArrayValueDto),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum ServerValueDto {
    RequestTime,
}

impl FieldTransformDto {
    pub(super) fn request_time(field_path: &str) -> Self {
        Self {
            field_path: field_path.to_owned(),
            transform: TransformDto::SetToServerValue(ServerValueDto::RequestTime),
        }
    }

    pub(super) fn array_union(field_path: &str, values: Vec<ValueDto>) -> Self {
        Self {
            field_path: field_path.to_owned(),
            transform: TransformDto::AppendMissingElements(ArrayValueDto { values }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RunQueryRequestDto {
    pub structured_query: StructuredQueryDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StructuredQueryDto {
    pub from: Vec<CollectionSelectorDto>,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterDto>,
    pub order_by: Vec<OrderDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CollectionSelectorDto {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FilterDto {
    pub field_filter: FieldFilterDto,
}

#[derive(Debug, Serialize)]
pub(super) struct FieldFilterDto {
    pub field: FieldReferenceDto,
    pub op: &'static str,
    pub value: ValueDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FieldReferenceDto {
    pub field_path: String,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderDto {
    pub field: FieldReferenceDto,
    pub direction: &'static str,
}

/// One streamed element of a `:runQuery` response. Elements without a
/// document only carry progress metadata.
#[derive(Debug, Deserialize)]
pub(super) struct RunQueryResponseDto {
    #[serde(default)]
    pub document: Option<DocumentDto>,
}

pub(super) fn equality_filter(field_path: &str, value: impl Into<String>) -> FilterDto {
    FilterDto {
        field_filter: FieldFilterDto {
            field: FieldReferenceDto {
                field_path: field_path.to_owned(),
            },
            op: "EQUAL",
            value: ValueDto::string(value),
        },
    }
}

pub(super) fn newest_first() -> OrderDto {
    OrderDto {
        field: FieldReferenceDto {
            field_path: FIELD_CREATED_AT.to_owned(),
        },
        direction: "DESCENDING",
    }
}

fn encode_location(location: Option<&Location>) -> ValueDto {
    let Some(location) = location else {
        return ValueDto::NullValue(());
    };
    let mut fields = BTreeMap::new();
    if let Some(latitude) = location.latitude {
        fields.insert("latitude".to_owned(), ValueDto::DoubleValue(latitude));
    }
    if let Some(longitude) = location.longitude {
        fields.insert("longitude".to_owned(), ValueDto::DoubleValue(longitude));
    }
    if let Some(address) = &location.address {
        fields.insert("address".to_owned(), ValueDto::string(address.as_str()));
    }
    ValueDto::MapValue(MapValueDto { fields })
}

/// Encode one audit event as a map value.
pub(super) fn encode_event(event: &StatusEvent) -> ValueDto {
    let fields = BTreeMap::from([
        (FIELD_STATUS.to_owned(), ValueDto::string(event.status().id())),
        ("note".to_owned(), ValueDto::string(event.note())),
        ("updatedBy".to_owned(), ValueDto::string(event.updated_by())),
        (
            FIELD_UPDATED_AT.to_owned(),
            ValueDto::string(
                event
                    .updated_at()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ),
    ]);
    ValueDto::MapValue(MapValueDto { fields })
}

/// Encode a new complaint. `createdAt` and `updatedAt` are left to server
/// transforms.
pub(super) fn encode_insert(name: String, complaint: &ComplaintInsert) -> DocumentDto {
    let images = complaint
        .images
        .iter()
        .map(|url| ValueDto::string(url.as_str()))
        .collect();
    let history = complaint.status_history.iter().map(encode_event).collect();
    let fields = BTreeMap::from([
        (FIELD_TITLE.to_owned(), ValueDto::string(complaint.title.as_str())),
        (
            FIELD_DESCRIPTION.to_owned(),
            ValueDto::string(complaint.description.as_str()),
        ),
        (FIELD_CATEGORY.to_owned(), ValueDto::string(complaint.category.id())),
        (
            FIELD_IMAGES.to_owned(),
            ValueDto::ArrayValue(ArrayValueDto { values: images }),
        ),
        (
            FIELD_LOCATION.to_owned(),
            encode_location(complaint.location.as_ref()),
        ),
        (FIELD_STATUS.to_owned(), ValueDto::string(complaint.status.id())),
        (FIELD_PRIORITY.to_owned(), ValueDto::string(complaint.priority.id())),
        (
            FIELD_STATUS_HISTORY.to_owned(),
            ValueDto::ArrayValue(ArrayValueDto { values: history }),
        ),
        (
            FIELD_USER_ID.to_owned(),
            ValueDto::string(complaint.user_id.as_ref()),
        ),
        (
            FIELD_USER_NAME.to_owned(),
            ValueDto::string(complaint.user_name.as_str()),
        ),
    ]);
    DocumentDto { name, fields }
}

/// Encode a single-field document used with an update mask.
pub(super) fn encode_string_field(name: String, field: &str, value: &str) -> DocumentDto {
    DocumentDto {
        name,
        fields: BTreeMap::from([(field.to_owned(), ValueDto::string(value))]),
    }
}

struct Fields<'a> {
    context: &'a str,
    fields: &'a BTreeMap<String, ValueDto>,
}

impl<'a> Fields<'a> {
    fn new(context: &'a str, fields: &'a BTreeMap<String, ValueDto>) -> Self {
        Self { context, fields }
    }

    fn get(&self, key: &str) -> Option<&'a ValueDto> {
        match self.fields.get(key) {
            None | Some(ValueDto::NullValue(())) => None,
            Some(value) => Some(value),
        }
    }

    fn mismatch(&self, key: &str, expected: &str, found: &ValueDto) -> String {
        format!(
            "{}: field `{key}` should be {expected}, found {}",
            self.context,
            found.kind()
        )
    }

    fn optional_string(&self, key: &str) -> Result<Option<&'a str>, String> {
        match self.get(key) {
            None => Ok(None),
            Some(ValueDto::StringValue(value)) => Ok(Some(value.as_str())),
            Some(other) => Err(self.mismatch(key, "a string", other)),
        }
    }

    fn string(&self, key: &str) -> Result<&'a str, String> {
        self.optional_string(key)?
            .ok_or_else(|| format!("{}: missing field `{key}`", self.context))
    }

    fn optional_double(&self, key: &str) -> Result<Option<f64>, String> {
        match self.get(key) {
            None => Ok(None),
            Some(ValueDto::DoubleValue(value)) => Ok(Some(*value)),
            Some(ValueDto::IntegerValue(raw)) => raw
                .parse::<i64>()
                .map(|value| Some(value as f64))
                .map_err(|error| format!("{}: field `{key}`: {error}", self.context)),
            Some(other) => Err(self.mismatch(key, "a number", other)),
        }
    }

    fn optional_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>, String> {
        match self.get(key) {
            None => Ok(None),
            Some(ValueDto::TimestampValue(raw) | ValueDto::StringValue(raw)) => {
                DateTime::parse_from_rfc3339(raw)
                    .map(|parsed| Some(parsed.with_timezone(&Utc)))
                    .map_err(|error| format!("{}: field `{key}`: {error}", self.context))
            }
            Some(other) => Err(self.mismatch(key, "a timestamp", other)),
        }
    }

    fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, String> {
        self.optional_timestamp(key)?
            .ok_or_else(|| format!("{}: missing field `{key}`", self.context))
    }

    fn array(&self, key: &str) -> Result<&'a [ValueDto], String> {
        match self.get(key) {
            None => Ok(&[]),
            Some(ValueDto::ArrayValue(array)) => Ok(array.values.as_slice()),
            Some(other) => Err(self.mismatch(key, "an array", other)),
        }
    }
}

fn decode_location(fields: &Fields<'_>) -> Result<Option<Location>, String> {
    match fields.get(FIELD_LOCATION) {
        None => Ok(None),
        Some(ValueDto::MapValue(map)) => {
            let context = format!("{}.{FIELD_LOCATION}", fields.context);
            let nested = Fields::new(&context, &map.fields);
            Ok(Some(Location {
                latitude: nested.optional_double("latitude")?,
                longitude: nested.optional_double("longitude")?,
                address: nested.optional_string("address")?.map(str::to_owned),
            }))
        }
        Some(other) => Err(fields.mismatch(FIELD_LOCATION, "a map", other)),
    }
}

fn decode_event(context: &str, value: &ValueDto) -> Result<StatusEvent, String> {
    let ValueDto::MapValue(map) = value else {
        return Err(format!("{context}: expected a map, found {}", value.kind()));
    };
    let fields = Fields::new(context, &map.fields);
    let status = fields
        .string(FIELD_STATUS)?
        .parse::<ComplaintStatus>()
        .map_err(|error| format!("{context}: {error}"))?;
    Ok(StatusEvent::from_stored(
        status,
        fields.optional_string("note")?.unwrap_or_default().to_owned(),
        fields
            .optional_string("updatedBy")?
            .unwrap_or_default()
            .to_owned(),
        fields.timestamp(FIELD_UPDATED_AT)?,
    ))
}

/// Last path segment of a document resource name.
pub(super) fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Decode a stored document into a raw complaint record.
pub(super) fn decode_document(document: &DocumentDto) -> Result<ComplaintRecord, String> {
    let raw_id = document_id(&document.name);
    let context = format!("complaint {raw_id}");
    let fields = Fields::new(&context, &document.fields);

    let id = ComplaintId::new(raw_id).map_err(|error| format!("{context}: {error}"))?;
    let status = fields
        .string(FIELD_STATUS)?
        .parse::<ComplaintStatus>()
        .map_err(|error| format!("{context}: {error}"))?;
    let priority = match fields.optional_string(FIELD_PRIORITY)? {
        Some(raw) => raw
            .parse::<Priority>()
            .map_err(|error| format!("{context}: {error}"))?,
        None => Priority::default(),
    };
    let user_id = UserId::new(fields.string(FIELD_USER_ID)?)
        .map_err(|error| format!("{context}: {error}"))?;

    let images = fields
        .array(FIELD_IMAGES)?
        .iter()
        .map(|value| match value {
            ValueDto::StringValue(url) => Ok(url.clone()),
            other => Err(format!(
                "{context}: image entries should be strings, found {}",
                other.kind()
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let status_history = fields
        .array(FIELD_STATUS_HISTORY)?
        .iter()
        .enumerate()
        .map(|(index, value)| decode_event(&format!("{context}.statusHistory[{index}]"), value))
        .collect::<Result<Vec<_>, _>>()?;

    let created_at = fields.timestamp(FIELD_CREATED_AT)?;
    let updated_at = fields
        .optional_timestamp(FIELD_UPDATED_AT)?
        .unwrap_or(created_at);

    Ok(ComplaintRecord {
        id,
        title: fields.optional_string(FIELD_TITLE)?.unwrap_or_default().to_owned(),
        description: fields
            .optional_string(FIELD_DESCRIPTION)?
            .unwrap_or_default()
            .to_owned(),
        category: Category::lookup(fields.optional_string(FIELD_CATEGORY)?.unwrap_or_default()),
        images,
        location: decode_location(&fields)?,
        status,
        priority,
        status_history,
        user_id,
        user_name: fields
            .optional_string(FIELD_USER_NAME)?
            .unwrap_or_default()
            .to_owned(),
        created_at,
        updated_at,
    })
}

/// Decode a `users/{uid}` profile document. A missing or unknown `role`
/// is a citizen.
pub(super) fn decode_profile(document: &DocumentDto) -> Result<UserProfile, String> {
    let context = format!("user {}", document_id(&document.name));
    let fields = Fields::new(&context, &document.fields);
    Ok(UserProfile {
        name: fields.optional_string(FIELD_NAME)?.map(str::to_owned),
        email: fields.optional_string(FIELD_EMAIL)?.map(str::to_owned),
        role: fields
            .optional_string(FIELD_ROLE)?
            .map_or(Role::User, Role::lookup),
    })
}

/// Encode a timestamp the way the server reports one.
#[cfg(test)]
pub(super) fn timestamp_value(at: DateTime<Utc>) -> ValueDto {
    ValueDto::TimestampValue(at.to_rfc3339_opts(SecondsFormat::Micros, true))
}
