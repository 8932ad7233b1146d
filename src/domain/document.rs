//! Backend documents and their conversion into typed entities.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::types::DocumentId;

/// Key/value payload of a document.
pub type DocumentData = Map<String, Value>;

/// System attribute names merged into the payload when shaping a document.
pub const ID_ATTRIBUTE: &str = "$id";
pub const CREATED_AT_ATTRIBUTE: &str = "$createdAt";
pub const UPDATED_AT_ATTRIBUTE: &str = "$updatedAt";
pub const VERSION_ATTRIBUTE: &str = "$version";

/// Opaque record stored in a named collection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub collection: String,
    pub data: DocumentData,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Starts at 1 and increases by one on every update.
    pub version: i32,
}

impl Document {
    /// Returns a string attribute of the payload.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Converts the document into a typed entity.
    ///
    /// System attributes are exposed to the entity under the `$id`,
    /// `$createdAt`, `$updatedAt` and `$version` keys.
    pub fn shape<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut data = self.data.clone();
        data.insert(ID_ATTRIBUTE.into(), Value::String(self.id.to_string()));
        data.insert(
            CREATED_AT_ATTRIBUTE.into(),
            serde_json::to_value(self.created_at)?,
        );
        data.insert(
            UPDATED_AT_ATTRIBUTE.into(),
            serde_json::to_value(self.updated_at)?,
        );
        data.insert(VERSION_ATTRIBUTE.into(), Value::from(self.version));
        serde_json::from_value(Value::Object(data))
    }
}

/// Serializes a write payload into document data, dropping system attributes.
pub fn to_document_data<T: Serialize>(payload: &T) -> Result<DocumentData, serde_json::Error> {
    match serde_json::to_value(payload)? {
        Value::Object(mut data) => {
            data.retain(|key, _| !key.starts_with('$'));
            Ok(data)
        }
        other => Err(serde::ser::Error::custom(format!(
            "document payload must be an object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    struct Named {
        #[serde(rename = "$id")]
        id: DocumentId,
        name: String,
        #[serde(rename = "$version")]
        version: i32,
    }

    fn document(data: Value) -> Document {
        let now = Utc::now().naive_utc();
        Document {
            id: DocumentId::new("doc1").unwrap(),
            collection: "patients".into(),
            data: data.as_object().cloned().unwrap_or_default(),
            created_at: now,
            updated_at: now,
            version: 3,
        }
    }

    #[test]
    fn shape_exposes_system_attributes() {
        let named: Named = document(json!({"name": "Lan"})).shape().unwrap();
        assert_eq!(named.id.as_str(), "doc1");
        assert_eq!(named.name, "Lan");
        assert_eq!(named.version, 3);
    }

    #[test]
    fn shape_fails_on_missing_fields() {
        assert!(document(json!({})).shape::<Named>().is_err());
    }

    #[test]
    fn document_data_drops_system_attributes() {
        let named = Named {
            id: DocumentId::new("doc1").unwrap(),
            name: "Lan".into(),
            version: 1,
        };
        let data = to_document_data(&named).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data["name"], json!("Lan"));
    }

    #[test]
    fn document_data_requires_an_object() {
        assert!(to_document_data(&42).is_err());
    }
}
