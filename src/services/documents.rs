//! Generic read-one and write paths.
//!
//! Unlike listing, write failures are returned to the caller with the
//! entity and operation attached.

use serde::Serialize;

use crate::domain::document::{Document, to_document_data};
use crate::domain::types::DocumentId;
use crate::models::config::CollectionIds;
use crate::repository::{DocumentReader, DocumentUpdate, DocumentWriter};
use crate::services::entity::Entity;
use crate::services::{Operation, ServiceError, ServiceResult};

fn shape<E: Entity>(document: Document) -> ServiceResult<E> {
    document.shape::<E>().map_err(|err| {
        ServiceError::Internal(format!("Malformed {} {}: {err}", E::NAME, document.id))
    })
}

/// Fetches a single entity by id.
pub fn get_record<E, R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
) -> ServiceResult<Option<E>>
where
    E: Entity,
    R: DocumentReader + ?Sized,
{
    repo.get_document(E::collection(collections), id)
        .map_err(ServiceError::from)?
        .map(shape::<E>)
        .transpose()
}

pub fn create_record<E, P, R>(
    repo: &R,
    collections: &CollectionIds,
    payload: &P,
) -> ServiceResult<E>
where
    E: Entity,
    P: Serialize,
    R: DocumentWriter + ?Sized,
{
    let data = to_document_data(payload)
        .map_err(|err| ServiceError::Internal(format!("Failed to encode {}: {err}", E::NAME)))?;

    let document = repo
        .create_document(E::collection(collections), &data)
        .map_err(|err| {
            log::error!("Failed to create {}: {err}", E::NAME);
            ServiceError::mutation(E::NAME, Operation::Create, err)
        })?;

    shape(document)
}

/// Merges `payload` into the stored entity.
///
/// With `expected_version` set the write fails with
/// [`ServiceError::Conflict`] if the entity changed in the meantime.
pub fn update_record<E, P, R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
    payload: &P,
    expected_version: Option<i32>,
) -> ServiceResult<E>
where
    E: Entity,
    P: Serialize,
    R: DocumentWriter + ?Sized,
{
    let data = to_document_data(payload)
        .map_err(|err| ServiceError::Internal(format!("Failed to encode {}: {err}", E::NAME)))?;
    let mut update = DocumentUpdate::new(data);
    if let Some(version) = expected_version {
        update = update.expect_version(version);
    }

    let document = repo
        .update_document(E::collection(collections), id, &update)
        .map_err(|err| {
            log::error!("Failed to update {} {id}: {err}", E::NAME);
            ServiceError::mutation(E::NAME, Operation::Update, err)
        })?;

    shape(document)
}

pub fn delete_record<E, R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
) -> ServiceResult<()>
where
    E: Entity,
    R: DocumentWriter + ?Sized,
{
    repo.delete_document(E::collection(collections), id)
        .map_err(|err| {
            log::error!("Failed to delete {} {id}: {err}", E::NAME);
            ServiceError::mutation(E::NAME, Operation::Delete, err)
        })
}
