//! Scheme-specific parameter mapping strategies
//!
//! Most drivers take the host, port and credentials of a URI as-is and match
//! the path against their schema; that is [`NetworkMapper`], the default.
//! Drivers whose URI components mean something else supply their own mapper:
//!
//! | Mapper | URI host becomes | Other derivations |
//! |---|---|---|
//! | [`NetworkMapper`] | `host` | `port`, `user`, `password` |
//! | [`AccountMapper`] | `account` | `user`, `password`; port rejected |
//! | [`ProjectMapper`] | `project` | – |
//! | [`TokenMapper`] | `server_hostname` | `http_path` = path, `access_token` = password; user rejected |
//! | [`FileMapper`] | part of `filepath` | `dbname` = user |
//! | [`PathMapper`] | part of `filepath` | user rejected |
//!
//! Every mapper produces the same [`ResolvedParams`] contract as the generic
//! matcher: no name is set twice and required names are present.

use std::fmt::Debug;

use tracing::trace;

use crate::Result;
use crate::error::Error;
use crate::matcher::match_path;
use crate::params::ResolvedParams;
use crate::request::DsnRequest;
use crate::schema::DriverSchema;

/// Maps a tokenized URI to driver parameters.
pub trait ParamMapper: Debug + Send + Sync {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams>;
}

/// Generic host/port/user/password mapping on top of [`match_path`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkMapper;

impl ParamMapper for NetworkMapper {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
      let usage = schema.usage();
      let mut params = match_path(schema, dsn)?;

      params.insert_present("host", dsn.host(), usage)?;
      params.insert_present("port", dsn.port(), usage)?;
      params.insert_present("user", dsn.user(), usage)?;
      params.insert_present("password", dsn.password(), usage)?;

      Ok(params)
   }
}

/// Cloud warehouses addressed by account: the URI host is the account identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountMapper;

impl ParamMapper for AccountMapper {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
      let usage = schema.usage();
      if dsn.port().is_some() {
         return Err(unexpected("port", usage));
      }

      let mut params = match_path(schema, dsn)?;
      params.insert_present("account", dsn.host(), usage)?;
      params.insert_present("user", dsn.user(), usage)?;
      params.insert_present("password", dsn.password(), usage)?;

      Ok(params)
   }
}

/// Project-scoped services: the URI host is the project identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMapper;

impl ParamMapper for ProjectMapper {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
      let mut params = match_path(schema, dsn)?;
      params.insert_present("project", dsn.host(), schema.usage())?;

      Ok(params)
   }
}

/// Token-authenticated HTTP endpoints.
///
/// The whole path is an access path rather than positional parameters, so the
/// schema's positional names are expected as query entries instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenMapper;

impl ParamMapper for TokenMapper {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
      let usage = schema.usage();
      if dsn.user().is_some() {
         return Err(unexpected("user", usage));
      }

      let mut params = ResolvedParams::new();
      params.insert_present("server_hostname", dsn.host(), usage)?;
      params.insert_present("http_path", Some(dsn.path()).filter(|p| !p.is_empty()), usage)?;
      params.insert_present("access_token", dsn.password(), usage)?;
      extend_with_query(&mut params, dsn, usage)?;

      trace!(resolved = params.len(), "Mapped token URI");
      Ok(params)
   }
}

/// Embedded databases named by `<dbname>@<filepath>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMapper;

impl ParamMapper for FileMapper {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
      let usage = schema.usage();

      let mut params = ResolvedParams::new();
      params.insert_present("filepath", dsn.location(), usage)?;
      params.insert_present("dbname", dsn.user(), usage)?;
      extend_with_query(&mut params, dsn, usage)?;

      Ok(params)
   }
}

/// Embedded databases addressed by path only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathMapper;

impl ParamMapper for PathMapper {
   fn map(&self, schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
      let usage = schema.usage();
      if dsn.user().is_some() {
         return Err(unexpected("user", usage));
      }

      let mut params = ResolvedParams::new();
      params.insert_present("filepath", dsn.location(), usage)?;
      extend_with_query(&mut params, dsn, usage)?;

      if !params.contains("filepath") {
         return Err(Error::MissingParameter {
            name: "filepath".to_string(),
            usage: usage.to_string(),
         });
      }

      Ok(params)
   }
}

fn extend_with_query(params: &mut ResolvedParams, dsn: &DsnRequest, usage: &str) -> Result<()> {
   for (name, value) in dsn.query() {
      params.insert(name.as_str(), value.as_str(), usage)?;
   }
   Ok(())
}

fn unexpected(component: &'static str, usage: &str) -> Error {
   Error::UnexpectedComponent {
      component,
      usage: usage.to_string(),
   }
}
