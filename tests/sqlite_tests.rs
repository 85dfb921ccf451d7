#![cfg(feature = "sqlite")]

use std::sync::Arc;

use dbconnect::{
   Connection, ConnectionRequest, DriverRegistry, Error, ResolveOptions, Resolver, Scheme, SqliteConnection,
   SqliteDriver,
};
use serde_json::json;
use tempfile::TempDir;

fn resolver() -> Resolver {
   let registry = DriverRegistry::builder()
      .register_scheme(Scheme::Sqlite, SqliteDriver)
      .build()
      .expect("Failed to build registry");

   Resolver::new(registry)
}

fn sqlite(conn: &Arc<dyn Connection>) -> &SqliteConnection {
   conn.as_any().downcast_ref::<SqliteConnection>().unwrap()
}

#[tokio::test]
async fn test_resolve_uri_opens_pool() {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let db_path = temp_dir.path().join("test.db");
   let uri = format!("sqlite://{}", db_path.display());
   let resolver = resolver();

   let conn = resolver.resolve(uri.as_str()).await.unwrap();
   let db = sqlite(&conn);

   sqlx::query("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
      .execute(db.pool())
      .await
      .unwrap();
   sqlx::query("INSERT INTO t (name) VALUES ('a')")
      .execute(db.pool())
      .await
      .unwrap();

   // Second resolution shares the pool and sees the data
   let again = resolver.resolve(uri.as_str()).await.unwrap();
   assert!(Arc::ptr_eq(&conn, &again));

   let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t")
      .fetch_one(sqlite(&again).pool())
      .await
      .unwrap();
   assert_eq!(count, 1);
   assert!(db_path.exists());
}

#[tokio::test]
async fn test_resolve_config_with_bounded_pool() {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let db_path = temp_dir.path().join("bounded.db");
   let resolver = resolver();

   let request = ConnectionRequest::try_from(json!({
      "driver": "sqlite",
      "filepath": db_path.to_string_lossy(),
   }))
   .unwrap();

   let conn = resolver
      .resolve_with(request, ResolveOptions::default().with_thread_count(Some(2)))
      .await
      .unwrap();

   assert_eq!(sqlite(&conn).pool().options().get_max_connections(), 2);
   assert_eq!(sqlite(&conn).filepath(), db_path.to_string_lossy());
}

#[tokio::test]
async fn test_closed_pool_is_reopened() {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let uri = format!("sqlite://{}", temp_dir.path().join("closed.db").display());
   let resolver = resolver();

   let first = resolver.resolve(uri.as_str()).await.unwrap();
   sqlite(&first).close().await;
   assert!(first.is_closed());

   let second = resolver.resolve(uri.as_str()).await.unwrap();
   assert!(!Arc::ptr_eq(&first, &second));
   assert!(!second.is_closed());
}

#[tokio::test]
async fn test_in_memory_database() {
   let resolver = resolver();

   let conn = resolver.resolve("sqlite::memory:").await.unwrap();

   let (one,): (i64,) = sqlx::query_as("SELECT 1")
      .fetch_one(sqlite(&conn).pool())
      .await
      .unwrap();
   assert_eq!(one, 1);
}

#[tokio::test]
async fn test_read_only_missing_file_fails() {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let uri = format!(
      "sqlite://{}?read_only=true",
      temp_dir.path().join("missing.db").display()
   );

   let resolver = resolver();

   let err = resolver.resolve(uri.as_str()).await.unwrap_err();

   assert!(matches!(err, Error::Construction { ref driver, .. } if driver == "sqlite"));
   assert_eq!(resolver.cached_connections(), 0);
}

#[tokio::test]
async fn test_unknown_parameter_rejected() {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let uri = format!(
      "sqlite://{}?journal=wal",
      temp_dir.path().join("unknown.db").display()
   );

   let err = resolver().resolve(uri.as_str()).await.unwrap_err();

   assert_eq!(err.error_code(), "CONSTRUCTION_FAILED");
   assert!(err.to_string().contains("journal"));
}

#[tokio::test]
async fn test_user_in_sqlite_uri_rejected() {
   let err = resolver().resolve("sqlite://me@localhost/app.db").await.unwrap_err();
   assert_eq!(err.error_code(), "UNEXPECTED_COMPONENT");
}
