use crate::db::connection::{init_db, Database};
use astra::{Body, Request, Response};
use std::io::Read;

/// Fresh database in its own temp dir, schema applied.
/// Keep the `TempDir` alive for as long as the database is used.
pub fn init_test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = Database::new(dir.path().join("router.sqlite3").to_string_lossy());
    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    (dir, db)
}

pub fn get(uri: &str) -> Request {
    http::Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn body_json(mut resp: Response) -> serde_json::Value {
    let mut body_bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut body_bytes)
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}
