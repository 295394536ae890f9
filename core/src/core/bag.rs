// accrue/src/core/bag.rs

//! The accumulated state threaded through a pipeline run.

use crate::core::contribution::Contribution;
use crate::error::{AccrueError, AccrueResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// A set of property names, kept sorted so shapes and errors are deterministic.
pub type KeySet = BTreeSet<String>;

/// An open record of named JSON values.
///
/// During a run the key set only grows: `merge` overwrites keys the
/// contribution carries and leaves every other key untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, Value>);

impl PropertyBag {
  pub fn new() -> Self {
    Self(BTreeMap::new())
  }

  /// Builder-style insert.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.insert(key, value);
    self
  }

  /// Inserts a value, returning the one it replaced.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.0.insert(key.into(), value.into())
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  /// Reads a property and deserializes it into `T`.
  ///
  /// Fails with `MissingProperty` if the key is absent and `PropertyType` if
  /// the stored value does not fit `T`.
  pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> AccrueResult<T> {
    let value = self.0.get(key).ok_or_else(|| AccrueError::MissingProperty { key: key.to_string() })?;
    T::deserialize(value).map_err(|source| AccrueError::PropertyType {
      key: key.to_string(),
      source,
    })
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  pub fn key_set(&self) -> KeySet {
    self.0.keys().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
    self.0.iter()
  }

  /// Shallow merge, right-hand side wins on collision. Never removes a key.
  pub fn merge(&mut self, contribution: Contribution) {
    self.0.extend(contribution.into_bag());
  }

  pub fn into_inner(self) -> BTreeMap<String, Value> {
    self.0
  }
}

impl From<BTreeMap<String, Value>> for PropertyBag {
  fn from(map: BTreeMap<String, Value>) -> Self {
    Self(map)
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertyBag {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl TryFrom<Value> for PropertyBag {
  type Error = AccrueError;

  fn try_from(value: Value) -> Result<Self, Self::Error> {
    match value {
      Value::Object(map) => Ok(map.into_iter().collect()),
      other => Err(AccrueError::NotAnObject {
        found: json_kind(&other).to_string(),
      }),
    }
  }
}

impl IntoIterator for PropertyBag {
  type Item = (String, Value);
  type IntoIter = btree_map::IntoIter<String, Value>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl<'a> IntoIterator for &'a PropertyBag {
  type Item = (&'a String, &'a Value);
  type IntoIter = btree_map::Iter<'a, String, Value>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.iter()
  }
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
