//! Generic positional/keyword parameter matching

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::Result;
use crate::error::Error;
use crate::params::ResolvedParams;
use crate::request::DsnRequest;
use crate::schema::DriverSchema;

/// Match a tokenized URI against a driver schema.
///
/// 1. Path segments are paired with positional names in order. Leftover
///    segments fail with [`Error::TooManyPathSegments`].
/// 2. A positional name without a segment is taken from the query map. If the
///    query doesn't have it either, an optional name resolves to `null` and a
///    required one fails with [`Error::MissingParameter`].
/// 3. Every keyword name is taken from the query map or fails the same way.
/// 4. Remaining query entries are added as extra parameters. A name that was
///    already resolved fails with [`Error::ParameterCollision`].
///
/// Host, port and credentials are not touched here; mappers add them.
///
/// # Example
///
/// ```
/// use dbconnect_dsn::{DriverSchema, DsnRequest, match_path};
///
/// let schema = DriverSchema::new("presto://<user>@<host>/<catalog>/<schema>", &["catalog", "schema"], &[])
///    .unwrap();
/// let dsn = DsnRequest::parse("presto://me@localhost/hive?schema=default").unwrap();
///
/// let params = match_path(&schema, &dsn).unwrap();
/// assert_eq!(params.get("catalog").unwrap(), "hive");
/// assert_eq!(params.get("schema").unwrap(), "default");
/// ```
pub fn match_path(schema: &DriverSchema, dsn: &DsnRequest) -> Result<ResolvedParams> {
   let usage = schema.usage();
   let segments = dsn.paths();

   if segments.len() > schema.positional().len() {
      return Err(Error::TooManyPathSegments {
         usage: usage.to_string(),
      });
   }

   let mut query = dsn.query().clone();
   let mut matches = ResolvedParams::new();

   for (index, param) in schema.positional().iter().enumerate() {
      let value = match segments.get(index) {
         Some(segment) => JsonValue::from(segment.as_str()),
         None => match query.shift_remove(&param.name) {
            Some(value) => JsonValue::from(value),
            None if param.optional => JsonValue::Null,
            None => {
               return Err(Error::MissingParameter {
                  name: param.name.clone(),
                  usage: usage.to_string(),
               });
            }
         },
      };

      matches.insert(param.name.as_str(), value, usage)?;
   }

   for name in schema.keyword() {
      let value = query.shift_remove(name).ok_or_else(|| Error::MissingParameter {
         name: name.clone(),
         usage: usage.to_string(),
      })?;

      matches.insert(name.as_str(), value, usage)?;
   }

   for (name, value) in query {
      matches.insert(name, value, usage)?;
   }

   trace!(
      positional = schema.positional().len(),
      resolved = matches.len(),
      "Matched URI path against schema"
   );

   Ok(matches)
}
