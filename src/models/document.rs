use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::document::{Document as DomainDocument, DocumentData};
use crate::domain::types::DocumentId;
use crate::repository::errors::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::document::Document`].
pub struct Document {
    pub id: String,
    pub collection: String,
    pub data: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub version: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
/// Insertable form of [`Document`].
pub struct NewDocument<'a> {
    pub id: &'a str,
    pub collection: &'a str,
    pub data: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub version: i32,
}

impl TryFrom<Document> for DomainDocument {
    type Error = RepositoryError;

    fn try_from(document: Document) -> RepositoryResult<Self> {
        let data: DocumentData = serde_json::from_str(&document.data)?;
        Ok(Self {
            id: DocumentId::new(document.id)?,
            collection: document.collection,
            data,
            created_at: document.created_at,
            updated_at: document.updated_at,
            version: document.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn db_document(data: &str) -> Document {
        let now = Utc::now().naive_utc();
        Document {
            id: "p1".into(),
            collection: "patients".into(),
            data: data.into(),
            created_at: now,
            updated_at: now,
            version: 2,
        }
    }

    #[test]
    fn document_into_domain() {
        let domain = DomainDocument::try_from(db_document(r#"{"name": "Lan"}"#)).unwrap();
        assert_eq!(domain.id.as_str(), "p1");
        assert_eq!(domain.get_str("name"), Some("Lan"));
        assert_eq!(domain.version, 2);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let result = DomainDocument::try_from(db_document("[1, 2]"));
        assert!(matches!(result, Err(RepositoryError::ValidationError(_))));
    }
}
