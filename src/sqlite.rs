//! Bundled SQLite driver backed by an sqlx connection pool

use std::any::Any;
use std::str::FromStr;
use std::sync::Arc;

use dbconnect_dsn::DriverSchema;
use futures::future::BoxFuture;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::connection::Connection;
use crate::driver::{ConnectArgs, Driver, ThreadPool};
use crate::error::{BoxError, Result};
use crate::schemes::Scheme;

const MEMORY: &str = ":memory:";

/// Errors raised while opening a SQLite pool.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
   #[error("sqlite connections require a 'filepath' parameter")]
   MissingFilepath,

   #[error("invalid value for '{name}': {value}")]
   InvalidValue { name: String, value: JsonValue },

   #[error("unknown sqlite parameter '{0}'")]
   UnknownParameter(String),

   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),
}

/// Opens [`SqliteConnection`]s.
///
/// Parameters:
///
/// - `filepath`: database file, or `:memory:` (required)
/// - `read_only`: open without write access (default `false`)
/// - `create_if_missing`: create the file if it does not exist (default `true`, ignored when read-only)
///
/// Boolean parameters accept JSON booleans or the strings `true`/`false`/`1`/`0`,
/// so they work from URI query strings and configuration mappings alike. A
/// bounded thread pool caps the pool's connection count.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

/// Options pulled out of [`ConnectArgs`].
#[derive(Debug, PartialEq)]
struct SqliteOptions {
   filepath: String,
   read_only: bool,
   create_if_missing: bool,
   max_connections: Option<u32>,
}

impl SqliteOptions {
   fn from_args(args: ConnectArgs) -> std::result::Result<Self, SqliteError> {
      let mut filepath = None;
      let mut read_only = false;
      let mut create_if_missing = true;

      for (name, value) in args.params {
         match name.as_str() {
            "filepath" => match value {
               JsonValue::String(path) if !path.is_empty() => filepath = Some(path),
               value => return Err(SqliteError::InvalidValue { name, value }),
            },
            "read_only" => read_only = flag(name, value)?,
            "create_if_missing" => create_if_missing = flag(name, value)?,
            _ => return Err(SqliteError::UnknownParameter(name)),
         }
      }

      let max_connections = match args.thread_pool {
         Some(ThreadPool::Bounded(n)) => Some(u32::try_from(n).unwrap_or(u32::MAX)),
         Some(ThreadPool::Unbounded) | None => None,
      };

      Ok(Self {
         filepath: filepath.ok_or(SqliteError::MissingFilepath)?,
         read_only,
         create_if_missing: create_if_missing && !read_only,
         max_connections,
      })
   }

   fn connect_options(&self) -> std::result::Result<SqliteConnectOptions, SqliteError> {
      let options = if self.filepath == MEMORY {
         SqliteConnectOptions::from_str("sqlite::memory:")?
      } else {
         SqliteConnectOptions::new().filename(&self.filepath)
      };

      Ok(options
         .read_only(self.read_only)
         .create_if_missing(self.create_if_missing))
   }
}

fn flag(name: String, value: JsonValue) -> std::result::Result<bool, SqliteError> {
   match &value {
      JsonValue::Bool(b) => Ok(*b),
      JsonValue::String(s) if s == "true" || s == "1" => Ok(true),
      JsonValue::String(s) if s == "false" || s == "0" => Ok(false),
      _ => Err(SqliteError::InvalidValue { name, value }),
   }
}

impl Driver for SqliteDriver {
   fn schema(&self) -> Result<DriverSchema> {
      Scheme::Sqlite.schema()
   }

   fn connect(&self, args: ConnectArgs) -> BoxFuture<'_, std::result::Result<Arc<dyn Connection>, BoxError>> {
      Box::pin(async move {
         let options = SqliteOptions::from_args(args)?;

         let mut pool_options = SqlitePoolOptions::new().min_connections(0);
         if let Some(max) = options.max_connections {
            pool_options = pool_options.max_connections(max);
         }

         let pool = pool_options
            .connect_with(options.connect_options()?)
            .await
            .map_err(SqliteError::from)?;

         debug!(
            read_only = options.read_only,
            max_connections = ?options.max_connections,
            "Opened SQLite pool"
         );

         let conn: Arc<dyn Connection> = Arc::new(SqliteConnection {
            pool,
            filepath: options.filepath,
         });
         Ok::<_, BoxError>(conn)
      })
   }
}

/// An open SQLite pool.
#[derive(Debug)]
pub struct SqliteConnection {
   pool: SqlitePool,
   filepath: String,
}

impl SqliteConnection {
   /// The pool to run queries against.
   pub fn pool(&self) -> &SqlitePool {
      &self.pool
   }

   pub fn filepath(&self) -> &str {
      &self.filepath
   }

   /// Close every pooled connection. The resolver treats the connection as
   /// gone from then on.
   pub async fn close(&self) {
      self.pool.close().await;
   }
}

impl Connection for SqliteConnection {
   fn driver(&self) -> &str {
      "sqlite"
   }

   fn is_closed(&self) -> bool {
      self.pool.is_closed()
   }

   fn as_any(&self) -> &dyn Any {
      self
   }
}
