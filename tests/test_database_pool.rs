extern crate secondchance;

use rusqlite::params;
use secondchance::database_pool::DatabasePool;

#[test]
fn connects_lazily_and_memoizes_the_pool() {
    let database_file = std::env::temp_dir()
        .join("secondchance_test_pool.db")
        .to_str()
        .unwrap()
        .to_string();
    let _ = std::fs::remove_file(&database_file);

    let pool = DatabasePool::new(database_file.clone());
    let first = pool.connect().expect("First connect must succeed") as *const _;
    let second = pool.connect().expect("Second connect must reuse the pool") as *const _;
    assert_eq!(first, second, "connect must return the memoized pool");

    // The migrated schema is usable through checked-out connections.
    let conn = pool.conn().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM secondChanceItems;", params![], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(count, 0);

    let _ = std::fs::remove_file(&database_file);
}

#[test]
fn failed_connection_is_an_error_not_a_crash() {
    // /dev/null is a file, so no database directory can be created below it.
    let pool = DatabasePool::new("/dev/null/nope/secondchance.db");
    let err = pool.connect().unwrap_err();
    assert!(err.code.is_server_error(), "unexpected error: {}", err);
}
