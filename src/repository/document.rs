use chrono::Utc;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Integer, Text};
use diesel::sqlite::Sqlite;
use serde_json::Value;

use crate::domain::document::{Document, DocumentData};
use crate::domain::types::DocumentId;
use crate::models::document::{Document as DbDocument, NewDocument as DbNewDocument};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, DocumentQuery, DocumentReader, DocumentUpdate, DocumentWriter, FilterValue,
    OrderBy, Predicate,
};
use crate::schema::documents;

type DocumentPredicate = Box<dyn BoxableExpression<documents::table, Sqlite, SqlType = Bool>>;

/// JSON path literal for a payload field.
///
/// Field names are restricted to `[A-Za-z0-9_]` so they can be inlined.
fn json_path(field: &str) -> RepositoryResult<String> {
    if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(format!("'$.{field}'"))
    } else {
        Err(RepositoryError::ValidationError(format!(
            "Invalid field name: {field:?}"
        )))
    }
}

fn to_sql(predicate: &Predicate) -> RepositoryResult<DocumentPredicate> {
    match predicate {
        Predicate::Equal { field, value } => {
            let path = json_path(field)?;
            let expr: DocumentPredicate = match value {
                FilterValue::Text(value) => Box::new(
                    sql::<Bool>(&format!("json_extract(documents.data, {path}) = "))
                        .bind::<Text, _>(value.clone()),
                ),
                FilterValue::Integer(value) => Box::new(
                    sql::<Bool>(&format!("json_extract(documents.data, {path}) = "))
                        .bind::<BigInt, _>(*value),
                ),
                // Missing booleans read as false.
                FilterValue::Bool(value) => Box::new(
                    sql::<Bool>(&format!(
                        "coalesce(json_extract(documents.data, {path}), 0) = "
                    ))
                    .bind::<Integer, _>(i32::from(*value)),
                ),
            };
            Ok(expr)
        }
        Predicate::Contains { field, term } => {
            let path = json_path(field)?;
            let expr: DocumentPredicate = Box::new(
                sql::<Bool>(&format!(
                    "instr(unicode_lower(CAST(coalesce(json_extract(documents.data, {path}), '') \
                     AS TEXT)), unicode_lower("
                ))
                .bind::<Text, _>(term.clone())
                .sql(")) > 0"),
            );
            Ok(expr)
        }
        Predicate::Any(predicates) => {
            let mut iter = predicates.iter();
            let Some(first) = iter.next() else {
                let never: DocumentPredicate = Box::new(sql::<Bool>("0"));
                return Ok(never);
            };
            let mut expr = to_sql(first)?;
            for predicate in iter {
                expr = Box::new(expr.or(to_sql(predicate)?));
            }
            Ok(expr)
        }
    }
}

fn project(mut document: Document, select: Option<&[String]>) -> Document {
    if let Some(fields) = select {
        document.data.retain(|key, _| fields.iter().any(|f| f == key));
    }
    document
}

impl DocumentReader for DieselRepository {
    fn get_document(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> RepositoryResult<Option<Document>> {
        let mut conn = self.conn()?;
        let document = documents::table
            .find(id.as_str())
            .filter(documents::collection.eq(collection))
            .first::<DbDocument>(&mut conn)
            .optional()?;

        document.map(Document::try_from).transpose()
    }

    fn list_documents(&self, query: &DocumentQuery) -> RepositoryResult<Vec<Document>> {
        let mut items = documents::table
            .filter(documents::collection.eq(query.collection.clone()))
            .into_boxed::<Sqlite>();

        for predicate in &query.predicates {
            items = items.filter(to_sql(predicate)?);
        }

        items = match &query.order {
            OrderBy::UpdatedAtDesc => items.order(documents::updated_at.desc()),
            OrderBy::CreatedAtDesc => items.order(documents::created_at.desc()),
            OrderBy::FieldDesc(field) => items.order(sql::<Text>(&format!(
                "json_extract(documents.data, {}) DESC",
                json_path(field)?
            ))),
            OrderBy::CodeDesc(field) => {
                let value = format!("json_extract(documents.data, {})", json_path(field)?);
                items.order(sql::<Text>(&format!(
                    "length({value}) DESC, {value} DESC"
                )))
            }
        };
        // Ties keep the most recently inserted document first.
        items = items.then_order_by(sql::<BigInt>("documents.rowid").desc());

        items = match (query.limit, query.offset) {
            (Some(limit), offset) => items.limit(limit as i64).offset(offset as i64),
            (None, 0) => items,
            (None, offset) => items.limit(-1).offset(offset as i64),
        };

        let mut conn = self.conn()?;
        let select = query.select.as_deref();
        items
            .load::<DbDocument>(&mut conn)?
            .into_iter()
            .map(|doc| Document::try_from(doc).map(|doc| project(doc, select)))
            .collect()
    }
}

impl DocumentWriter for DieselRepository {
    fn create_document(
        &self,
        collection: &str,
        data: &DocumentData,
    ) -> RepositoryResult<Document> {
        let mut conn = self.conn()?;
        let id = DocumentId::generate();
        let now = Utc::now().naive_utc();
        let insertable = DbNewDocument {
            id: id.as_str(),
            collection,
            data: serde_json::to_string(data)?,
            created_at: now,
            updated_at: now,
            version: 1,
        };

        let created = diesel::insert_into(documents::table)
            .values(&insertable)
            .get_result::<DbDocument>(&mut conn)?;

        Document::try_from(created)
    }

    fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        update: &DocumentUpdate,
    ) -> RepositoryResult<Document> {
        let mut conn = self.conn()?;

        let updated = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let current = documents::table
                .find(id.as_str())
                .filter(documents::collection.eq(collection))
                .first::<DbDocument>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            if let Some(expected) = update.expected_version
                && expected != current.version
            {
                return Err(RepositoryError::Conflict {
                    expected,
                    found: current.version,
                });
            }

            let mut data: DocumentData = serde_json::from_str(&current.data)?;
            for (key, value) in &update.data {
                data.insert(key.clone(), value.clone());
            }

            let updated = diesel::update(documents::table.find(id.as_str()))
                .set((
                    documents::data.eq(Value::Object(data).to_string()),
                    documents::updated_at.eq(Utc::now().naive_utc()),
                    documents::version.eq(current.version + 1),
                ))
                .get_result::<DbDocument>(conn)?;

            Ok(updated)
        })?;

        Document::try_from(updated)
    }

    fn delete_document(&self, collection: &str, id: &DocumentId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            documents::table
                .filter(documents::id.eq(id.as_str()))
                .filter(documents::collection.eq(collection)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_path_accepts_plain_identifiers() {
        assert_eq!(json_path("treatment_status").unwrap(), "'$.treatment_status'");
        assert_eq!(json_path("isDeleted").unwrap(), "'$.isDeleted'");
    }

    #[test]
    fn json_path_rejects_injection() {
        assert!(json_path("name') OR 1=1 --").is_err());
        assert!(json_path("").is_err());
        assert!(json_path("a.b").is_err());
    }

    #[test]
    fn projection_keeps_selected_fields() {
        let mut data = DocumentData::new();
        data.insert("name".into(), Value::from("Lan"));
        data.insert("phone".into(), Value::from("+84901234567"));
        let document = Document {
            id: DocumentId::new("d1").unwrap(),
            collection: "patients".into(),
            data,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
            version: 1,
        };
        let projected = project(document, Some(&["name".to_string()]));
        assert_eq!(projected.data.len(), 1);
        assert!(projected.data.contains_key("name"));
    }
}
