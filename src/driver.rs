//! Driver trait and construction arguments

use std::sync::Arc;

use dbconnect_dsn::DriverSchema;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::connection::Connection;
use crate::error::{BoxError, Result};

/// Thread-pool sizing handed to drivers that accept one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadPool {
   /// At most this many worker threads (always at least 1).
   Bounded(usize),
   /// Let the driver pick.
   Unbounded,
}

/// Everything a driver receives when asked for a connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectArgs {
   /// Resolved parameters. Absent optional parameters have already been removed.
   pub params: IndexMap<String, JsonValue>,

   /// Only set for drivers registered as thread-pool capable.
   pub thread_pool: Option<ThreadPool>,
}

impl ConnectArgs {
   /// Look up a parameter as a string.
   pub fn str(&self, name: &str) -> Option<&str> {
      self.params.get(name).and_then(JsonValue::as_str)
   }
}

/// A database backend that can build connections from named parameters.
///
/// # Example
///
/// ```
/// use std::any::Any;
/// use std::sync::Arc;
///
/// use dbconnect::{BoxError, ConnectArgs, Connection, Driver, DriverSchema};
/// use futures::future::BoxFuture;
///
/// struct EchoConnection(String);
///
/// impl Connection for EchoConnection {
///    fn driver(&self) -> &str {
///       "echo"
///    }
///
///    fn is_closed(&self) -> bool {
///       false
///    }
///
///    fn as_any(&self) -> &dyn Any {
///       self
///    }
/// }
///
/// struct EchoDriver;
///
/// impl Driver for EchoDriver {
///    fn schema(&self) -> dbconnect::Result<DriverSchema> {
///       Ok(DriverSchema::new("echo://<host>/<database>", &["database"], &[])?)
///    }
///
///    fn connect(&self, args: ConnectArgs) -> BoxFuture<'_, Result<Arc<dyn Connection>, BoxError>> {
///       Box::pin(async move {
///          let database = args.str("database").ok_or("database is required")?.to_string();
///          Ok::<_, BoxError>(Arc::new(EchoConnection(database)) as Arc<dyn Connection>)
///       })
///    }
/// }
/// ```
pub trait Driver: Send + Sync {
   /// The parameter schema this driver accepts.
   fn schema(&self) -> Result<DriverSchema>;

   /// Build a new connection.
   fn connect(&self, args: ConnectArgs) -> BoxFuture<'_, std::result::Result<Arc<dyn Connection>, BoxError>>;
}
