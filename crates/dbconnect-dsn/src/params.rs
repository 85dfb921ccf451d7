//! Resolved connection parameters

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::Result;
use crate::error::Error;

/// The final name → value mapping handed to a driver constructor.
///
/// Names are unique: [`insert`](Self::insert) refuses a name that is already
/// present instead of overwriting it, so a value can only ever come from one
/// source. An optional positional parameter that was not supplied is stored as
/// an explicit `null` and removed later by [`into_present`](Self::into_present).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedParams {
   values: IndexMap<String, JsonValue>,
}

impl ResolvedParams {
   pub fn new() -> Self {
      Self::default()
   }

   /// Insert a parameter, failing with [`Error::ParameterCollision`] if the
   /// name is already present. `usage` is reported in the error.
   pub fn insert(&mut self, name: impl Into<String>, value: impl Into<JsonValue>, usage: &str) -> Result<()> {
      match self.values.entry(name.into()) {
         Entry::Occupied(entry) => Err(Error::ParameterCollision {
            name: entry.key().clone(),
            usage: usage.to_string(),
         }),
         Entry::Vacant(entry) => {
            entry.insert(value.into());
            Ok(())
         }
      }
   }

   /// Insert a value only when it is present.
   ///
   /// Derived URI components (host, port, ...) use this so that a component
   /// missing from the URI never shadows the same name given as a query entry.
   pub fn insert_present<V: Into<JsonValue>>(
      &mut self,
      name: &str,
      value: Option<V>,
      usage: &str,
   ) -> Result<()> {
      match value {
         Some(value) => self.insert(name, value, usage),
         None => Ok(()),
      }
   }

   pub fn get(&self, name: &str) -> Option<&JsonValue> {
      self.values.get(name)
   }

   pub fn contains(&self, name: &str) -> bool {
      self.values.contains_key(name)
   }

   pub fn len(&self) -> usize {
      self.values.len()
   }

   pub fn is_empty(&self) -> bool {
      self.values.is_empty()
   }

   pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
      self.values.iter()
   }

   /// Drop every `null` entry and return the remaining values.
   pub fn into_present(self) -> IndexMap<String, JsonValue> {
      self
         .values
         .into_iter()
         .filter(|(_, value)| !value.is_null())
         .collect()
   }
}

impl IntoIterator for ResolvedParams {
   type Item = (String, JsonValue);
   type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

   fn into_iter(self) -> Self::IntoIter {
      self.values.into_iter()
   }
}
