use diesel::prelude::*;
use diesel::sql_types::Text;

mod common;

#[derive(QueryableByName)]
struct Name {
    #[diesel(sql_type = Text)]
    name: String,
}

#[test]
fn test_creates_database_with_schema() {
    let test_db = common::TestDb::new("test_creates_database_with_schema.db");
    assert!(test_db.path().exists());

    let mut conn = test_db.pool().get().unwrap();
    let tables = diesel::sql_query("SELECT name FROM sqlite_master WHERE type = 'table'")
        .load::<Name>(&mut conn)
        .unwrap();
    assert!(tables.iter().any(|t| t.name == "documents"));
}

#[test]
fn test_migrations_are_idempotent() {
    let test_db = common::TestDb::new("test_migrations_are_idempotent.db");
    dental_dashboard::db::run_migrations(&test_db.pool()).unwrap();
}
