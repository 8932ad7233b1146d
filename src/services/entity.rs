use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::models::config::CollectionIds;
use crate::repository::{OrderBy, Predicate};

/// Default page size of list pages.
pub const DEFAULT_LIST_LIMIT: usize = 20;
/// Page size used by lookups that fetch a whole collection.
pub const FETCH_ALL_LIMIT: usize = 9999;

/// Binds a typed entity to its collection and list semantics.
pub trait Entity: DeserializeOwned + Serialize + Send + 'static {
    /// Singular name used in logs and errors.
    const NAME: &'static str;
    /// Fields combined into the OR group of a free-text search.
    const SEARCH_FIELDS: &'static [&'static str];
    /// Field compared against the status tab value.
    const STATUS_FIELD: &'static str;
    const DEFAULT_LIMIT: usize = DEFAULT_LIST_LIMIT;
    const ORDER: OrderBy = OrderBy::UpdatedAtDesc;
    /// Whether documents carry a branch and are listed per branch.
    const BRANCH_SCOPED: bool = true;

    fn collection(ids: &CollectionIds) -> &str;

    /// Predicates applied to every query of this entity.
    fn base_predicates() -> Vec<Predicate> {
        Vec::new()
    }
}
