//! # dbconnect
//!
//! Resolves a connection request (a URI string or a configuration mapping)
//! into a driver connection, checking that every parameter the driver needs is
//! present and supplied exactly once, and reusing live connections for
//! identical requests.
//!
//! ## Core Types
//!
//! - **[`Resolver`]**: the entry point; caches shared connections per request
//! - **[`DriverRegistry`]**: immutable name → driver table, validated once by [`RegistryBuilder::build`]
//! - **[`Driver`]** / **[`Connection`]**: what backends implement
//! - **[`Scheme`]**: URI layouts of well-known backends
//! - **[`ConnectionRequest`]**: a URI or a configuration mapping
//! - **[`Error`]**: every failure a resolution can end in
//!
//! ## Architecture
//!
//! - **Tokenizing and matching** live in [`dbconnect_dsn`]: URI path segments are paired with a
//!   driver's positional parameters, query entries fill the rest, and no name may be set twice
//! - **Caching** lives in [`dbconnect_cache`]: entries never own a connection, and closed
//!   connections read as misses
//! - **Construction** passes a thread-pool size only to drivers registered as capable of using one
//!
//! ## Usage
//!
//! ```no_run
//! use dbconnect::{DriverRegistry, Resolver, ResolveOptions, Scheme, SqliteDriver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dbconnect::Result<()> {
//!    let registry = DriverRegistry::builder()
//!       .register_scheme(Scheme::Sqlite, SqliteDriver)
//!       .build()?;
//!
//!    let resolver = Resolver::builder(registry)
//!       .on_connect(|conn| tracing::info!(driver = conn.driver(), "connected"))
//!       .build();
//!
//!    // Identical shared requests return the same instance while it is alive
//!    let db = resolver.resolve("sqlite:///tmp/example.db").await?;
//!    let db2 = resolver.resolve("sqlite:///tmp/example.db").await?;
//!    assert!(Arc::ptr_eq(&db, &db2));
//!
//!    // Unshared requests always construct
//!    let private = resolver
//!       .resolve_with("sqlite:///tmp/example.db", ResolveOptions::default().unshared())
//!       .await?;
//!    assert!(!Arc::ptr_eq(&db, &private));
//!    Ok(())
//! }
//! ```

mod config;
mod connection;
mod driver;
mod error;
mod factory;
mod registry;
mod request;
mod resolver;
mod schemes;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use config::{ResolveOptions, ResolverConfig};
pub use connection::Connection;
pub use driver::{ConnectArgs, Driver, ThreadPool};
pub use error::{BoxError, Error, Result};
pub use factory::construct;
pub use registry::{DriverEntry, DriverRegistry, RegistryBuilder};
pub use request::ConnectionRequest;
pub use resolver::{ConnectHook, Resolver, ResolverBuilder};
pub use schemes::Scheme;
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteDriver, SqliteError};

pub use dbconnect_dsn::{
   AccountMapper, DriverSchema, DsnRequest, FileMapper, NetworkMapper, ParamMapper, ParamSpec,
   PathMapper, ProjectMapper, ResolvedParams, TokenMapper, match_path,
};
