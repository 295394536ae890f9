// accrue/src/core/contribution.rs

//! What a single step hands back to be merged into the accumulator.

use crate::core::bag::PropertyBag;
use serde_json::Value;

/// A partial, possibly empty, set of property values produced by one step.
///
/// `Contribution::none()` stands for a step that returned nothing; merging it
/// is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contribution(PropertyBag);

impl Contribution {
  pub fn none() -> Self {
    Self(PropertyBag::new())
  }

  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.0.insert(key, value);
    self
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.0.contains_key(key)
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.0.keys()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn into_bag(self) -> PropertyBag {
    self.0
  }
}

impl From<PropertyBag> for Contribution {
  fn from(bag: PropertyBag) -> Self {
    Self(bag)
  }
}

impl From<Option<PropertyBag>> for Contribution {
  fn from(bag: Option<PropertyBag>) -> Self {
    bag.map(Self).unwrap_or_default()
  }
}

impl From<()> for Contribution {
  fn from(_: ()) -> Self {
    Self::none()
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Contribution {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}
