//! Built-in schemes for well-known database backends
//!
//! Each [`Scheme`] carries the canonical URI schema, the thread-pool capability
//! and the parameter mapper for one backend. Applications supply only the
//! [`Driver`](crate::Driver) and register it with
//! [`RegistryBuilder::register_scheme`](crate::RegistryBuilder::register_scheme).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dbconnect_dsn::{
   AccountMapper, DriverSchema, FileMapper, NetworkMapper, ParamMapper, PathMapper, ProjectMapper,
   TokenMapper,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A backend the resolver knows the URI layout of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
   Postgresql,
   Mysql,
   Oracle,
   Redshift,
   Snowflake,
   Presto,
   Trino,
   Bigquery,
   Databricks,
   Clickhouse,
   Vertica,
   Duckdb,
   Sqlite,
}

impl Scheme {
   pub const ALL: [Scheme; 13] = [
      Scheme::Postgresql,
      Scheme::Mysql,
      Scheme::Oracle,
      Scheme::Redshift,
      Scheme::Snowflake,
      Scheme::Presto,
      Scheme::Trino,
      Scheme::Bigquery,
      Scheme::Databricks,
      Scheme::Clickhouse,
      Scheme::Vertica,
      Scheme::Duckdb,
      Scheme::Sqlite,
   ];

   /// The URI scheme and registry name.
   pub fn name(self) -> &'static str {
      match self {
         Scheme::Postgresql => "postgresql",
         Scheme::Mysql => "mysql",
         Scheme::Oracle => "oracle",
         Scheme::Redshift => "redshift",
         Scheme::Snowflake => "snowflake",
         Scheme::Presto => "presto",
         Scheme::Trino => "trino",
         Scheme::Bigquery => "bigquery",
         Scheme::Databricks => "databricks",
         Scheme::Clickhouse => "clickhouse",
         Scheme::Vertica => "vertica",
         Scheme::Duckdb => "duckdb",
         Scheme::Sqlite => "sqlite",
      }
   }

   /// URI template shown in matching errors.
   pub fn usage(self) -> &'static str {
      match self {
         Scheme::Postgresql => "postgresql://<user>:<password>@<host>/<database>",
         Scheme::Mysql => "mysql://<user>:<password>@<host>/<database>",
         Scheme::Oracle => "oracle://<user>:<password>@<host>/<database>",
         Scheme::Redshift => "redshift://<user>:<password>@<host>/<database>",
         Scheme::Snowflake => {
            "snowflake://<user>:<password>@<account>/<database>/<SCHEMA>?warehouse=<WAREHOUSE>"
         }
         Scheme::Presto => "presto://<user>@<host>/<catalog>/<schema>",
         Scheme::Trino => "trino://<user>@<host>/<catalog>/<schema>",
         Scheme::Bigquery => "bigquery://<project>/<dataset>",
         Scheme::Databricks => "databricks://:<access_token>@<server_hostname>/<http_path>",
         Scheme::Clickhouse => "clickhouse://<user>:<password>@<host>/<database>",
         Scheme::Vertica => "vertica://<user>:<password>@<host>/<database>",
         Scheme::Duckdb => "duckdb://<dbname>@<filepath>",
         Scheme::Sqlite => "sqlite://<filepath>",
      }
   }

   fn positional(self) -> &'static [&'static str] {
      match self {
         Scheme::Postgresql
         | Scheme::Mysql
         | Scheme::Oracle
         | Scheme::Redshift
         | Scheme::Clickhouse
         | Scheme::Vertica => &["database?"],
         Scheme::Snowflake => &["database", "schema"],
         Scheme::Presto | Scheme::Trino | Scheme::Databricks => &["catalog", "schema"],
         Scheme::Bigquery => &["dataset"],
         Scheme::Duckdb => &["database", "dbpath"],
         Scheme::Sqlite => &[],
      }
   }

   fn keyword(self) -> &'static [&'static str] {
      match self {
         Scheme::Snowflake => &["warehouse"],
         _ => &[],
      }
   }

   /// The canonical parameter schema for this backend.
   pub fn schema(self) -> Result<DriverSchema> {
      Ok(DriverSchema::new(self.usage(), self.positional(), self.keyword())?)
   }

   /// Whether drivers for this backend accept a thread-pool size.
   pub fn supports_thread_pool(self) -> bool {
      !matches!(
         self,
         Scheme::Snowflake | Scheme::Presto | Scheme::Trino | Scheme::Bigquery | Scheme::Duckdb
      )
   }

   /// How URI components map to driver parameters for this backend.
   pub fn mapper(self) -> Arc<dyn ParamMapper> {
      match self {
         Scheme::Snowflake => Arc::new(AccountMapper),
         Scheme::Bigquery => Arc::new(ProjectMapper),
         Scheme::Databricks => Arc::new(TokenMapper),
         Scheme::Duckdb => Arc::new(FileMapper),
         Scheme::Sqlite => Arc::new(PathMapper),
         _ => Arc::new(NetworkMapper),
      }
   }
}

impl fmt::Display for Scheme {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str(self.name())
   }
}

impl FromStr for Scheme {
   type Err = Error;

   fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
      Scheme::ALL
         .into_iter()
         .find(|scheme| scheme.name() == s)
         .ok_or_else(|| Error::UnsupportedDriver(s.to_string()))
   }
}
