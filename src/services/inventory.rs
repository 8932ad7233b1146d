use std::collections::BTreeSet;

use crate::domain::inventory::{InventoryItem, NewInventoryItem, StockLevel, stock_status};
use crate::domain::types::DocumentId;
use crate::models::config::CollectionIds;
use crate::repository::{DocumentReader, DocumentWriter};
use crate::services::documents::{create_record, get_record, update_record};
use crate::services::entity::{Entity, FETCH_ALL_LIMIT};
use crate::services::listing::{ListRequest, ListResult, list_documents};
use crate::services::{ServiceError, ServiceResult};

/// Category filter value meaning "every category".
pub const ALL_CATEGORIES: &str = "all";

impl Entity for InventoryItem {
    const NAME: &'static str = "inventory item";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name"];
    const STATUS_FIELD: &'static str = "status";

    fn collection(ids: &CollectionIds) -> &str {
        &ids.inventory
    }
}

/// Lists inventory, optionally narrowed to one category.
pub fn list_inventory<R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
    category: Option<&str>,
) -> ListResult<InventoryItem>
where
    R: DocumentReader + Sync + ?Sized,
{
    let mut request = request.clone();
    if let Some(category) = category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
    {
        request = request.filter("category", category);
    }
    list_documents::<InventoryItem, R>(repo, collections, &request)
}

/// Distinct categories present in the inventory, sorted.
pub fn inventory_categories<R>(repo: &R, collections: &CollectionIds) -> Vec<String>
where
    R: DocumentReader + Sync + ?Sized,
{
    let items = list_documents::<InventoryItem, R>(
        repo,
        collections,
        &ListRequest::new().limit(FETCH_ALL_LIMIT),
    );
    items
        .data
        .into_iter()
        .filter_map(|item| item.category)
        .filter(|c| !c.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Adds an item; its status is derived from the quantities.
pub fn create_inventory_item<R>(
    repo: &R,
    collections: &CollectionIds,
    mut item: NewInventoryItem,
) -> ServiceResult<InventoryItem>
where
    R: DocumentWriter + ?Sized,
{
    item.status = stock_status(item.quantity, item.min_quantity).to_string();
    create_record::<InventoryItem, _, _>(repo, collections, &item)
}

/// Sets the quantity on hand and the status that goes with it.
///
/// Without `expected_version` the write is checked against the version
/// read here.
pub fn set_stock_quantity<R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
    quantity: i64,
    expected_version: Option<i32>,
) -> ServiceResult<InventoryItem>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let current = get_record::<InventoryItem, _>(repo, collections, id)?
        .ok_or(ServiceError::NotFound(InventoryItem::NAME))?;
    let level = StockLevel {
        quantity,
        status: stock_status(quantity, current.min_quantity).to_string(),
    };
    update_record::<InventoryItem, _, _>(
        repo,
        collections,
        id,
        &level,
        Some(expected_version.unwrap_or(current.version)),
    )
}
