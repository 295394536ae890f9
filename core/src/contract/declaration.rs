// accrue/src/contract/declaration.rs

//! Declared input requirements and output promises of a single step.

use crate::core::bag::KeySet;

/// Declared metadata of a step: the keys it reads, the keys it always
/// returns, and the keys it returns only under some internal condition.
///
/// A contract is independent of whether the step runs synchronously or
/// asynchronously.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepContract {
  requires: KeySet,
  produces: KeySet,
  may_produce: KeySet,
}

impl StepContract {
  /// An empty contract: requires nothing, promises nothing.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn requires<I, S>(mut self, keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.requires.extend(keys.into_iter().map(Into::into));
    self
  }

  pub fn produces<I, S>(mut self, keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.produces.extend(keys.into_iter().map(Into::into));
    self
  }

  pub fn may_produce<I, S>(mut self, keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.may_produce.extend(keys.into_iter().map(Into::into));
    self
  }

  pub fn required_keys(&self) -> &KeySet {
    &self.requires
  }

  /// Keys this step always returns a value for.
  pub fn unconditional_keys(&self) -> &KeySet {
    &self.produces
  }

  /// Keys this step may return. A key also declared unconditional is not
  /// repeated here.
  pub fn conditional_keys(&self) -> KeySet {
    self.may_produce.difference(&self.produces).cloned().collect()
  }

  /// Every key this step might write.
  pub fn declared_keys(&self) -> KeySet {
    self.produces.union(&self.may_produce).cloned().collect()
  }

  /// True when the step reads and writes nothing it declares.
  pub fn is_empty(&self) -> bool {
    self.requires.is_empty() && self.produces.is_empty() && self.may_produce.is_empty()
  }
}
