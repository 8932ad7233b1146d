//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::document::{Document, DocumentData};
use crate::domain::types::DocumentId;
use crate::repository::errors::RepositoryResult;
use crate::repository::{DocumentQuery, DocumentReader, DocumentUpdate, DocumentWriter};

mock! {
    pub Repository {}

    impl DocumentReader for Repository {
        fn get_document(
            &self,
            collection: &str,
            id: &DocumentId,
        ) -> RepositoryResult<Option<Document>>;
        fn list_documents(&self, query: &DocumentQuery) -> RepositoryResult<Vec<Document>>;
    }

    impl DocumentWriter for Repository {
        fn create_document(
            &self,
            collection: &str,
            data: &DocumentData,
        ) -> RepositoryResult<Document>;
        fn update_document(
            &self,
            collection: &str,
            id: &DocumentId,
            update: &DocumentUpdate,
        ) -> RepositoryResult<Document>;
        fn delete_document(&self, collection: &str, id: &DocumentId) -> RepositoryResult<()>;
    }
}
