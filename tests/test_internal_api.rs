extern crate secondchance;

use r2d2::ManageConnection;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use rusqlite::Transaction;
use secondchance::api_model;
use secondchance::api_model::UpdateItemFields;
use secondchance::database_migrate_refinery;
use secondchance::internal_api::*;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use std::path::PathBuf;

/// Each test gets its own shared-cache in-memory database,
/// named after the test to keep them isolated from each other.
fn new_pool(name: &str) -> Pool<SqliteConnectionManager> {
    let uri = format!("file:{}?mode=memory&cache=shared", name);
    let sqlite = SqliteConnectionManager::file(PathBuf::from(uri))
        .with_flags(OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_READ_WRITE);

    let mut refinery_connection = sqlite
        .connect()
        .expect("Failed to open a connection for refinery database migrations");
    database_migrate_refinery::embedded::migrations::runner()
        .run(&mut refinery_connection)
        .expect("Failed to run refinery migrations");

    // The pool opens its connections while `refinery_connection` is still
    // alive, which keeps the shared in-memory database from being dropped.
    r2d2::Pool::new(sqlite).expect("Failed to create r2d2 SQLite connection pool")
}

fn with_tx<T>(
    pool: &Pool<SqliteConnectionManager>,
    func: impl FnOnce(&Transaction) -> T,
) -> T {
    let mut conn = pool.get().unwrap();
    let tx = conn.transaction().unwrap();
    let result = func(&tx);
    tx.commit().unwrap();
    result
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected JSON object, got {}", other),
    }
}

fn chair_fields() -> Map<String, Value> {
    fields(json!({
        "name": "Chair",
        "description": "Wooden chair",
        "price": "25.50"
    }))
}

fn update_fields(value: Value) -> UpdateItemFields {
    serde_json::from_value(value).unwrap()
}

#[test]
fn empty_collection_seeds_id_one() {
    let pool = new_pool("memdb_seed");
    let created = with_tx(&pool, |tx| {
        create_item_tx(tx, api_model::parse_create_fields(chair_fields()).unwrap(), None)
    })
    .unwrap();
    assert_eq!(created.id, "1");
}

#[test]
fn created_ids_increase_numerically() {
    let pool = new_pool("memdb_ids");
    let mut previous = 0;
    for _ in 0..3 {
        let created = with_tx(&pool, |tx| {
            create_item_tx(tx, api_model::parse_create_fields(chair_fields()).unwrap(), None)
        })
        .unwrap();
        let id: i64 = created.id.parse().unwrap();
        assert!(id > previous, "id {} not above {}", id, previous);
        previous = id;
    }
}

#[test]
fn create_then_get_round_trip() {
    let pool = new_pool("memdb_round_trip");
    let created = with_tx(&pool, |tx| {
        create_item_tx(tx, api_model::parse_create_fields(chair_fields()).unwrap(), None)
    })
    .unwrap();

    assert_eq!(created.name, "Chair");
    assert_eq!(created.description, "Wooden chair");
    assert_eq!(created.price, 25.5);
    assert_eq!(created.image_url, None);
    assert_eq!(created.updated_at, None);
    assert!(created.date_added > 0);

    let fetched = with_tx(&pool, |tx| get_item_tx(tx, &created.id))
        .unwrap()
        .expect("created item must be fetchable by its id");
    assert_eq!(fetched, created);
}

#[test]
fn create_records_image_url() {
    let pool = new_pool("memdb_image");
    let created = with_tx(&pool, |tx| {
        create_item_tx(
            tx,
            api_model::parse_create_fields(chair_fields()).unwrap(),
            Some("/images/chair.jpg".to_string()),
        )
    })
    .unwrap();
    assert_eq!(created.image_url.as_deref(), Some("/images/chair.jpg"));
}

#[test]
fn create_computes_age_years() {
    let pool = new_pool("memdb_age");
    let item_fields = fields(json!({
        "name": "Bike",
        "price": "80",
        "age_days": "100"
    }));
    let created = with_tx(&pool, |tx| {
        create_item_tx(tx, api_model::parse_create_fields(item_fields).unwrap(), None)
    })
    .unwrap();
    assert_eq!(created.age_days, 100);
    assert_eq!(created.age_years, 0.3);
}

#[test]
fn update_overwrites_fields_and_recomputes_age_years() {
    let pool = new_pool("memdb_update");
    let created = with_tx(&pool, |tx| {
        create_item_tx(tx, api_model::parse_create_fields(chair_fields()).unwrap(), None)
    })
    .unwrap();

    let outcome = with_tx(&pool, |tx| {
        update_item_tx(
            tx,
            &created.id,
            update_fields(json!({
                "category": "Furniture",
                "condition": "Used",
                "age_days": "730",
                "description": "desc"
            })),
        )
    })
    .unwrap();
    assert_eq!(outcome, UpdateOutcome::Persisted);

    let updated = with_tx(&pool, |tx| get_item_tx(tx, &created.id))
        .unwrap()
        .unwrap();
    assert_eq!(updated.category, "Furniture");
    assert_eq!(updated.condition, "Used");
    assert_eq!(updated.description, "desc");
    assert_eq!(updated.age_days, 730);
    assert_eq!(updated.age_years, 2.0);
    assert!(updated.updated_at.is_some());
    // Untouched fields survive the update.
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Chair");
    assert_eq!(updated.price, 25.5);
    assert_eq!(updated.date_added, created.date_added);
}

#[test]
fn update_of_missing_item_reports_not_found() {
    let pool = new_pool("memdb_update_missing");
    let outcome = with_tx(&pool, |tx| {
        update_item_tx(
            tx,
            "999",
            update_fields(json!({
                "category": "Furniture",
                "condition": "Used",
                "age_days": 1,
                "description": "desc"
            })),
        )
    })
    .unwrap();
    assert_eq!(outcome, UpdateOutcome::NotFound);
}

#[test]
fn delete_is_idempotent_in_effect() {
    let pool = new_pool("memdb_delete");
    let created = with_tx(&pool, |tx| {
        create_item_tx(tx, api_model::parse_create_fields(chair_fields()).unwrap(), None)
    })
    .unwrap();

    let first = with_tx(&pool, |tx| delete_item_tx(tx, &created.id)).unwrap();
    assert!(first);
    let gone = with_tx(&pool, |tx| get_item_tx(tx, &created.id)).unwrap();
    assert_eq!(gone, None);
    // The second delete reports not-found instead of failing.
    let second = with_tx(&pool, |tx| delete_item_tx(tx, &created.id)).unwrap();
    assert!(!second);
}

#[test]
fn get_of_missing_item_is_none_not_an_error() {
    let pool = new_pool("memdb_get_missing");
    let result = with_tx(&pool, |tx| get_item_tx(tx, "12345")).unwrap();
    assert_eq!(result, None);
}

#[test]
fn list_returns_all_items_in_insertion_order() {
    let pool = new_pool("memdb_list");
    assert!(with_tx(&pool, |tx| list_items_tx(tx)).unwrap().is_empty());

    for name in &["First", "Second", "Third"] {
        let item_fields = fields(json!({ "name": name, "price": "1" }));
        with_tx(&pool, |tx| {
            create_item_tx(tx, api_model::parse_create_fields(item_fields).unwrap(), None)
        })
        .unwrap();
    }

    let items = with_tx(&pool, |tx| list_items_tx(tx)).unwrap();
    let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}
