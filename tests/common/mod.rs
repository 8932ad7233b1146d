#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

use dental_dashboard::db::{DbPool, establish_connection_pool, run_migrations};
use dental_dashboard::domain::document::DocumentData;
use dental_dashboard::domain::types::DocumentId;
use dental_dashboard::repository::{DieselRepository, DocumentWriter};

/// Temporary SQLite database with the schema applied.
pub struct TestDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("create pool");
        run_migrations(&pool).expect("run migrations");
        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

pub fn data(value: Value) -> DocumentData {
    value.as_object().cloned().expect("object payload")
}

/// Inserts a document and returns its id.
pub fn insert(repo: &DieselRepository, collection: &str, value: Value) -> DocumentId {
    repo.create_document(collection, &data(value))
        .expect("insert document")
        .id
}

/// Pins the timestamps of a document so ordering does not depend on timing.
pub fn set_timestamps(db: &TestDb, id: &DocumentId, at: NaiveDateTime) {
    use dental_dashboard::schema::documents;

    let mut conn = db.pool.get().expect("connection");
    diesel::update(documents::table.find(id.as_str()))
        .set((documents::created_at.eq(at), documents::updated_at.eq(at)))
        .execute(&mut conn)
        .expect("update timestamps");
}

pub fn patient(code: &str, name: &str) -> Value {
    json!({
        "code": code,
        "name": name,
        "phone": "+84912000000",
        "treatment_status": "new",
        "isDeleted": false,
    })
}
