// accrue/src/pipeline/sequence.rs

use crate::contract::VerifiedShape;
use crate::core::step::StepDef;
use std::sync::Arc;

/// A verified, immutable list of steps, ready to run.
///
/// Only `Pipeline::build` creates one. Clones share the same steps, so a
/// sequence can be handed to many concurrent runs.
pub struct StepSequence<Err> {
  inner: Arc<SequenceInner<Err>>,
}

struct SequenceInner<Err> {
  steps: Vec<StepDef<Err>>,
  shape: VerifiedShape,
}

impl<Err> StepSequence<Err> {
  pub(crate) fn new(steps: Vec<StepDef<Err>>, shape: VerifiedShape) -> Self {
    Self {
      inner: Arc::new(SequenceInner { steps, shape }),
    }
  }

  /// The key set this sequence is statically known to produce.
  pub fn shape(&self) -> &VerifiedShape {
    &self.inner.shape
  }

  pub fn steps(&self) -> &[StepDef<Err>] {
    &self.inner.steps
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.inner.steps.iter().map(|s| s.name.as_str())
  }

  pub fn len(&self) -> usize {
    self.inner.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.steps.is_empty()
  }
}

impl<Err> Clone for StepSequence<Err> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<Err> std::fmt::Debug for StepSequence<Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepSequence")
      .field("steps", &self.inner.steps)
      .field("shape", &self.inner.shape)
      .finish()
  }
}
