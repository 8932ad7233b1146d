//! Uniform list contract shared by every entity.
//!
//! [`list_documents`] turns a [`ListRequest`] into backend queries and always
//! returns a [`ListResult`]: read failures are logged and surface as an empty
//! page, never as an error.

use std::thread;

use serde::{Deserialize, Serialize};

use crate::domain::document::{Document, ID_ATTRIBUTE};
use crate::domain::patient::code_sequence;
use crate::models::config::CollectionIds;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DocumentQuery, DocumentReader, FilterValue, OrderBy, Predicate};
use crate::services::entity::Entity;

/// Batch size of the exact-count re-scan.
pub const COUNT_BATCH_SIZE: usize = 100;
/// Status tab value meaning "no status filter".
pub const ALL_STATUSES: &str = "all";

/// Equality filter supplied by the page (branch scope, category, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: FilterValue,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// How [`ListResult::total`] is obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TotalPolicy {
    /// Count every matching document by paging through them.
    #[default]
    Exact,
    /// Read the numeric suffix of the highest code in the collection.
    ///
    /// Only an approximation of the number of documents; it ignores
    /// search and status and assumes codes are dense.
    HighestCode { field: String },
}

/// Raw list parameters as received from a page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    pub filters: Vec<FieldFilter>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub total: TotalPolicy,
}

impl ListRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.push(FieldFilter::new(field, value));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn total(mut self, policy: TotalPolicy) -> Self {
        self.total = policy;
        self
    }
}

/// Normalized list parameters; built fresh for every fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    pub limit: usize,
    pub offset: usize,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl ListQuery {
    /// Applies defaults and drops blank search and the `all` status.
    pub fn normalize(request: &ListRequest, default_limit: usize) -> Self {
        let limit = request
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(default_limit.max(1));
        let search = request
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let status = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(ALL_STATUSES))
            .map(str::to_string);

        Self {
            filters: request.filters.clone(),
            limit,
            offset: request.offset.unwrap_or(0),
            search,
            status,
        }
    }

    /// Predicates matching filter, status and search, ignoring pagination.
    pub fn predicates<E: Entity>(&self) -> Vec<Predicate> {
        let mut predicates = E::base_predicates();
        predicates.extend(
            self.filters
                .iter()
                .map(|f| Predicate::equal(f.field.clone(), f.value.clone())),
        );
        if let Some(status) = &self.status {
            predicates.push(Predicate::equal(E::STATUS_FIELD, status.as_str()));
        }
        if let Some(term) = &self.search {
            predicates.push(Predicate::any(
                E::SEARCH_FIELDS
                    .iter()
                    .map(|field| Predicate::contains(*field, term.as_str())),
            ));
        }
        predicates
    }

    pub fn page_query<E: Entity>(&self, collection: &str) -> DocumentQuery {
        DocumentQuery::new(collection)
            .predicates(self.predicates::<E>())
            .order(E::ORDER)
            .limit(self.limit)
            .offset(self.offset)
    }

    /// Same predicates as the page query, without pagination, ids only.
    pub fn count_query<E: Entity>(&self, collection: &str) -> DocumentQuery {
        DocumentQuery::new(collection)
            .predicates(self.predicates::<E>())
            .order(E::ORDER)
            .select([ID_ATTRIBUTE])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult<T> {
    pub data: Vec<T>,
    /// Matches across all pages, not the length of `data`.
    pub total: usize,
}

impl<T> ListResult<T> {
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
        }
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Lists one page of `E` along with the total number of matches.
///
/// Never fails: backend errors are logged and produce an empty result.
pub fn list_documents<E, R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
) -> ListResult<E>
where
    E: Entity,
    R: DocumentReader + Sync + ?Sized,
{
    let query = ListQuery::normalize(request, E::DEFAULT_LIMIT);
    let collection = E::collection(collections);

    match fetch_page::<E, R>(repo, collection, &query, &request.total) {
        Ok(result) => result,
        Err(err) => {
            log::error!("Failed to list {} documents: {err}", E::NAME);
            ListResult::empty()
        }
    }
}

fn fetch_page<E, R>(
    repo: &R,
    collection: &str,
    query: &ListQuery,
    policy: &TotalPolicy,
) -> RepositoryResult<ListResult<E>>
where
    E: Entity,
    R: DocumentReader + Sync + ?Sized,
{
    let page_query = query.page_query::<E>(collection);

    let (documents, total) = thread::scope(|scope| {
        let counter = scope.spawn(|| total_matching::<E, R>(repo, collection, query, policy));
        let documents = repo.list_documents(&page_query);
        let total = counter
            .join()
            .map_err(|_| RepositoryError::Unexpected("count worker panicked".to_string()))?;
        Ok::<_, RepositoryError>((documents?, total?))
    })?;

    Ok(ListResult {
        data: shape_documents(documents),
        total,
    })
}

fn total_matching<E, R>(
    repo: &R,
    collection: &str,
    query: &ListQuery,
    policy: &TotalPolicy,
) -> RepositoryResult<usize>
where
    E: Entity,
    R: DocumentReader + ?Sized,
{
    match policy {
        TotalPolicy::Exact => {
            count_matching(repo, &query.count_query::<E>(collection), COUNT_BATCH_SIZE)
        }
        TotalPolicy::HighestCode { field } => {
            let highest = highest_code(repo, collection, E::base_predicates(), field)?;
            Ok(highest.and_then(|code| code_sequence(&code)).unwrap_or(0) as usize)
        }
    }
}

/// Counts the documents matching `query` by reading them in batches.
///
/// Stops at the first batch shorter than `batch_size`. The limit and offset
/// of `query` are ignored.
pub fn count_matching<R>(
    repo: &R,
    query: &DocumentQuery,
    batch_size: usize,
) -> RepositoryResult<usize>
where
    R: DocumentReader + ?Sized,
{
    let batch_size = batch_size.max(1);
    let mut total = 0;
    let mut offset = 0;

    loop {
        let batch = query.clone().limit(batch_size).offset(offset);
        let found = repo.list_documents(&batch)?.len();
        total += found;
        if found < batch_size {
            return Ok(total);
        }
        offset += batch_size;
    }
}

/// Returns the highest value of `field` in the collection.
pub fn highest_code<R>(
    repo: &R,
    collection: &str,
    predicates: Vec<Predicate>,
    field: &str,
) -> RepositoryResult<Option<String>>
where
    R: DocumentReader + ?Sized,
{
    let query = DocumentQuery::new(collection)
        .predicates(predicates)
        .order(OrderBy::CodeDesc(field.to_string()))
        .limit(1)
        .select([field]);

    Ok(repo
        .list_documents(&query)?
        .first()
        .and_then(|doc| doc.get_str(field))
        .map(str::to_string))
}

/// Shapes documents into `E`, skipping the ones that do not fit.
pub fn shape_documents<E: Entity>(documents: Vec<Document>) -> Vec<E> {
    documents
        .into_iter()
        .filter_map(|doc| match doc.shape::<E>() {
            Ok(entity) => Some(entity),
            Err(err) => {
                log::warn!("Skipping malformed {} document {}: {err}", E::NAME, doc.id);
                None
            }
        })
        .collect()
}
