//! Driver parameter schemas

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::Result;
use crate::error::Error;

/// A positional parameter declared by a driver schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParamSpec {
   pub name: String,
   pub optional: bool,
}

impl ParamSpec {
   /// Parse a declared name; a trailing `?` marks the parameter optional.
   fn parse(declared: &str) -> Self {
      match declared.strip_suffix('?') {
         Some(name) => Self {
            name: name.to_string(),
            optional: true,
         },
         None => Self {
            name: declared.to_string(),
            optional: false,
         },
      }
   }
}

impl fmt::Display for ParamSpec {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      if self.optional {
         write!(f, "{}?", self.name)
      } else {
         f.write_str(&self.name)
      }
   }
}

/// The declared shape of the parameters a driver accepts from a URI.
///
/// - `positional` names are paired with URI path segments in order
/// - `keyword` names must be supplied as query parameters
/// - `usage` is a human-readable URI template shown in every matching error
///
/// # Example
///
/// ```
/// use dbconnect_dsn::DriverSchema;
///
/// let schema = DriverSchema::new(
///    "snowflake://<user>:<password>@<account>/<database>/<SCHEMA>?warehouse=<WAREHOUSE>",
///    &["database", "schema"],
///    &["warehouse"],
/// )
/// .unwrap();
///
/// assert_eq!(schema.positional().len(), 2);
/// assert_eq!(schema.keyword(), ["warehouse"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverSchema {
   positional: Vec<ParamSpec>,
   keyword: Vec<String>,
   usage: String,
}

impl DriverSchema {
   /// Declare a schema.
   ///
   /// Names must be non-empty and distinct across both lists, otherwise
   /// [`Error::InvalidSchema`] is returned.
   pub fn new(usage: impl Into<String>, positional: &[&str], keyword: &[&str]) -> Result<Self> {
      let positional: Vec<ParamSpec> = positional.iter().map(|p| ParamSpec::parse(p)).collect();
      let keyword: Vec<String> = keyword.iter().map(|k| k.to_string()).collect();

      let mut seen = HashSet::new();
      let names = positional
         .iter()
         .map(|p| p.name.as_str())
         .chain(keyword.iter().map(String::as_str));

      for name in names {
         if name.is_empty() || name.ends_with('?') {
            return Err(Error::InvalidSchema(format!(
               "parameter name '{name}' is not a valid name"
            )));
         }
         if !seen.insert(name) {
            return Err(Error::InvalidSchema(format!(
               "parameter '{name}' is declared more than once"
            )));
         }
      }

      Ok(Self {
         positional,
         keyword,
         usage: usage.into(),
      })
   }

   pub fn positional(&self) -> &[ParamSpec] {
      &self.positional
   }

   pub fn keyword(&self) -> &[String] {
      &self.keyword
   }

   pub fn usage(&self) -> &str {
      &self.usage
   }

   /// Names that must be present in every successful match.
   pub fn required(&self) -> impl Iterator<Item = &str> {
      self
         .positional
         .iter()
         .filter(|p| !p.optional)
         .map(|p| p.name.as_str())
         .chain(self.keyword.iter().map(String::as_str))
   }
}
