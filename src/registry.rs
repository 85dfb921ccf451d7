//! Driver registration and lookup

use std::fmt;
use std::sync::Arc;

use dbconnect_dsn::{DriverSchema, NetworkMapper, ParamMapper};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::driver::Driver;
use crate::error::{Error, Result};
use crate::schemes::Scheme;

/// A registered driver: its schema, constructor, capability flag and mapper.
pub struct DriverEntry {
   name: String,
   schema: DriverSchema,
   driver: Arc<dyn Driver>,
   supports_thread_pool: bool,
   mapper: Arc<dyn ParamMapper>,
}

impl DriverEntry {
   pub fn name(&self) -> &str {
      &self.name
   }

   pub fn schema(&self) -> &DriverSchema {
      &self.schema
   }

   pub fn driver(&self) -> &Arc<dyn Driver> {
      &self.driver
   }

   /// Whether the driver accepts a thread-pool size at construction.
   pub fn supports_thread_pool(&self) -> bool {
      self.supports_thread_pool
   }

   pub fn mapper(&self) -> &Arc<dyn ParamMapper> {
      &self.mapper
   }
}

impl fmt::Debug for DriverEntry {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("DriverEntry")
         .field("name", &self.name)
         .field("schema", &self.schema)
         .field("supports_thread_pool", &self.supports_thread_pool)
         .field("mapper", &self.mapper)
         .finish_non_exhaustive()
   }
}

struct PendingEntry {
   name: String,
   schema: Result<DriverSchema>,
   driver: Arc<dyn Driver>,
   supports_thread_pool: bool,
   mapper: Arc<dyn ParamMapper>,
}

/// Collects driver registrations and validates them once in [`build`](Self::build).
///
/// # Example
///
/// ```
/// # use std::sync::Arc;
/// # use dbconnect::{BoxError, ConnectArgs, Connection, Driver, DriverSchema};
/// # use futures::future::BoxFuture;
/// # struct PgDriver;
/// # impl Driver for PgDriver {
/// #    fn schema(&self) -> dbconnect::Result<DriverSchema> {
/// #       dbconnect::Scheme::Postgresql.schema()
/// #    }
/// #    fn connect(&self, _: ConnectArgs) -> BoxFuture<'_, Result<Arc<dyn Connection>, BoxError>> {
/// #       Box::pin(async { Err::<Arc<dyn Connection>, BoxError>("offline".into()) })
/// #    }
/// # }
/// use dbconnect::{DriverRegistry, Scheme};
///
/// let registry = DriverRegistry::builder()
///    .register_scheme(Scheme::Postgresql, PgDriver)
///    .build()?;
///
/// assert!(registry.lookup("postgresql").is_ok());
/// assert!(registry.lookup("ftp").is_err());
/// # Ok::<(), dbconnect::Error>(())
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
   pending: Vec<PendingEntry>,
}

impl RegistryBuilder {
   pub fn new() -> Self {
      Self::default()
   }

   /// Register a driver that uses the generic host/port/user/password mapping.
   pub fn register(
      self,
      name: impl Into<String>,
      schema: DriverSchema,
      driver: impl Driver + 'static,
      supports_thread_pool: bool,
   ) -> Self {
      self.register_with_mapper(name, schema, driver, supports_thread_pool, NetworkMapper)
   }

   /// Register a driver with its own parameter mapper.
   pub fn register_with_mapper(
      mut self,
      name: impl Into<String>,
      schema: DriverSchema,
      driver: impl Driver + 'static,
      supports_thread_pool: bool,
      mapper: impl ParamMapper + 'static,
   ) -> Self {
      self.pending.push(PendingEntry {
         name: name.into(),
         schema: Ok(schema),
         driver: Arc::new(driver),
         supports_thread_pool,
         mapper: Arc::new(mapper),
      });
      self
   }

   /// Register a driver for a built-in scheme, taking the scheme's schema,
   /// capability and mapper.
   pub fn register_scheme(mut self, scheme: Scheme, driver: impl Driver + 'static) -> Self {
      self.pending.push(PendingEntry {
         name: scheme.name().to_string(),
         schema: scheme.schema(),
         driver: Arc::new(driver),
         supports_thread_pool: scheme.supports_thread_pool(),
         mapper: scheme.mapper(),
      });
      self
   }

   /// Validate every registration and freeze the table.
   ///
   /// Fails with [`Error::SchemaMismatch`] when a registered schema differs
   /// from the one the driver declares, and with [`Error::DuplicateDriver`]
   /// when a name is registered twice.
   pub fn build(self) -> Result<DriverRegistry> {
      let mut entries = IndexMap::with_capacity(self.pending.len());

      for pending in self.pending {
         let schema = pending.schema?;

         if pending.driver.schema()? != schema {
            return Err(Error::SchemaMismatch {
               driver: pending.name,
            });
         }

         if entries.contains_key(&pending.name) {
            return Err(Error::DuplicateDriver(pending.name));
         }

         trace!(
            driver = %pending.name,
            thread_pool = pending.supports_thread_pool,
            "Registered driver"
         );

         entries.insert(
            pending.name.clone(),
            DriverEntry {
               name: pending.name,
               schema,
               driver: pending.driver,
               supports_thread_pool: pending.supports_thread_pool,
               mapper: pending.mapper,
            },
         );
      }

      debug!(drivers = entries.len(), "Driver registry built");
      Ok(DriverRegistry { entries })
   }
}

/// Immutable name → driver table.
#[derive(Debug)]
pub struct DriverRegistry {
   entries: IndexMap<String, DriverEntry>,
}

impl DriverRegistry {
   pub fn builder() -> RegistryBuilder {
      RegistryBuilder::new()
   }

   /// Find the entry registered under `name`.
   pub fn lookup(&self, name: &str) -> Result<&DriverEntry> {
      self
         .entries
         .get(name)
         .ok_or_else(|| Error::UnsupportedDriver(name.to_string()))
   }

   /// Registered names with their usage strings, in registration order.
   pub fn schemes(&self) -> impl Iterator<Item = (&str, &str)> {
      self
         .entries
         .values()
         .map(|entry| (entry.name.as_str(), entry.schema.usage()))
   }

   pub fn contains(&self, name: &str) -> bool {
      self.entries.contains_key(name)
   }

   pub fn len(&self) -> usize {
      self.entries.len()
   }

   pub fn is_empty(&self) -> bool {
      self.entries.is_empty()
   }
}
