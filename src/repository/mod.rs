//! Document backend contract and its Diesel implementation.
//!
//! The backend stores opaque JSON documents in named collections and accepts
//! composable predicates (equality, case-insensitive "contains", OR groups),
//! ordering, limit/offset and field selection.

use serde::{Deserialize, Serialize};

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::document::{Document, DocumentData};
use crate::domain::types::DocumentId;
use crate::repository::errors::RepositoryResult;

pub mod document;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

/// Value compared by an equality predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equal { field: String, value: FilterValue },
    /// Case-insensitive substring match.
    Contains { field: String, term: String },
    /// Matches when any of the inner predicates matches.
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Predicate::Equal {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains(field: impl Into<String>, term: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            term: term.into(),
        }
    }

    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(predicates.into_iter().collect())
    }
}

/// Result ordering; every variant is descending, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    UpdatedAtDesc,
    CreatedAtDesc,
    FieldDesc(String),
    /// Sequential codes sharing a prefix: longer values first, so `BN10000`
    /// sorts above `BN9999`.
    CodeDesc(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentQuery {
    pub collection: String,
    pub predicates: Vec<Predicate>,
    pub order: OrderBy,
    pub limit: Option<usize>,
    pub offset: usize,
    /// Payload fields to return; `None` returns the whole payload.
    pub select: Option<Vec<String>>,
}

impl DocumentQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            predicates: Vec::new(),
            order: OrderBy::UpdatedAtDesc,
            limit: None,
            offset: 0,
            select: None,
        }
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.predicates.extend(predicates);
        self
    }

    pub fn order(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

/// Changes applied by [`DocumentWriter::update_document`].
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpdate {
    /// Fields merged into the stored payload.
    pub data: DocumentData,
    /// When set, the update fails with a conflict unless the stored version matches.
    pub expected_version: Option<i32>,
}

impl DocumentUpdate {
    pub fn new(data: DocumentData) -> Self {
        Self {
            data,
            expected_version: None,
        }
    }

    pub fn expect_version(mut self, version: i32) -> Self {
        self.expected_version = Some(version);
        self
    }
}

pub trait DocumentReader {
    fn get_document(&self, collection: &str, id: &DocumentId)
    -> RepositoryResult<Option<Document>>;
    fn list_documents(&self, query: &DocumentQuery) -> RepositoryResult<Vec<Document>>;
}

pub trait DocumentWriter {
    fn create_document(&self, collection: &str, data: &DocumentData)
    -> RepositoryResult<Document>;
    fn update_document(
        &self,
        collection: &str,
        id: &DocumentId,
        update: &DocumentUpdate,
    ) -> RepositoryResult<Document>;
    fn delete_document(&self, collection: &str, id: &DocumentId) -> RepositoryResult<()>;
}

/// Diesel-backed document store shared by all handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}
