//! Wire envelopes wrapped around entities.
//!
//! # Design
//! Create and update calls wrap the entity under `properties`. Object reads
//! return the entity under `properties` next to record metadata, and list
//! endpoints return items under `results` with an optional cursor. These
//! types are generic over the entity so every resource reuses them.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::field::{take_field, BoolField, Field, IntField, StringField, TimeField};

/// Request body for create and update calls: `{"properties": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPayload<P> {
    pub properties: P,
}

impl<P> RequestPayload<P> {
    pub fn new(properties: P) -> Self {
        Self { properties }
    }
}

/// A CRM object as returned by object endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = "E: Serialize"))]
pub struct ObjectResource<E> {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub id: StringField,
    pub properties: E,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub created_at: TimeField,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub updated_at: TimeField,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub archived: BoolField,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub archived_at: TimeField,
    /// Associated records keyed by target object type, when requested.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub associations: BTreeMap<String, ListResponse<AssociatedObject>>,
}

impl<'de, E> Deserialize<'de> for ObjectResource<E>
where
    E: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut obj = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            id: take_field(&mut obj, "id").map_err(<D::Error as de::Error>::custom)?,
            properties: take_nested::<_, D::Error>(&mut obj, "properties")?,
            created_at: take_field(&mut obj, "createdAt").map_err(<D::Error as de::Error>::custom)?,
            updated_at: take_field(&mut obj, "updatedAt").map_err(<D::Error as de::Error>::custom)?,
            archived: take_field(&mut obj, "archived").map_err(<D::Error as de::Error>::custom)?,
            archived_at: take_field(&mut obj, "archivedAt").map_err(<D::Error as de::Error>::custom)?,
            associations: take_nested::<_, D::Error>(&mut obj, "associations")?,
        })
    }
}

/// Missing or null decodes as `T::default()`.
fn take_nested<'de, T, Er>(obj: &mut Map<String, Value>, name: &str) -> Result<T, Er>
where
    T: Deserialize<'de> + Default,
    Er: de::Error,
{
    match obj.remove(name) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(raw) => T::deserialize(raw).map_err(|e| Er::custom(format_args!("`{name}`: {e}"))),
    }
}

/// A collection response: `{"results": [...], "paging": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            paging: None,
        }
    }
}

impl<T> ListResponse<T> {
    /// Cursor for the next page, if the remote reported one.
    pub fn next_after(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .map(|n| n.after.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPage {
    pub after: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Entry of an object's inline `associations` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedObject {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Entry of an association listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRecord {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub to_object_id: IntField,
    pub association_types: Vec<AssociationLabel>,
}

impl<'de> Deserialize<'de> for AssociationRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut obj = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            to_object_id: take_field(&mut obj, "toObjectId").map_err(<D::Error as de::Error>::custom)?,
            association_types: take_nested::<_, D::Error>(&mut obj, "associationTypes")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationLabel {
    pub category: String,
    pub type_id: u32,
    #[serde(default)]
    pub label: Option<String>,
}
