// accrue/src/pipeline/definition.rs

//! Contains the `Pipeline<Err>` builder: declaring the initial shape, adding
//! and rearranging steps, and verifying the result into a `StepSequence`.

use crate::contract::{ShapeTracker, StepContract, VerifiedShape};
use crate::core::bag::{KeySet, PropertyBag};
use crate::core::contribution::Contribution;
use crate::core::step::{SkipCondition, Step, StepDef};
use crate::error::{AccrueError, AccrueResult};
use crate::pipeline::sequence::StepSequence;
use std::collections::HashSet;
use std::future::Future;
use tracing::{event, instrument, Level};

/// A mutable, not yet verified list of steps.
///
/// `Err` is the error type the finished sequence's `run` returns. Step
/// closures may fail with any error type that converts into it, and it must
/// absorb `AccrueError` for the run-time initial-state check.
pub struct Pipeline<Err = AccrueError>
where
  Err: std::error::Error + From<AccrueError> + Send + Sync + 'static,
{
  /// Keys the caller promises the initial state will carry.
  pub(crate) initial_keys: KeySet,
  /// Ordered list of step definitions.
  pub(crate) steps: Vec<StepDef<Err>>,
}

impl<Err> Pipeline<Err>
where
  Err: std::error::Error + From<AccrueError> + Send + Sync + 'static,
{
  /// An empty pipeline with an empty initial shape.
  pub fn new() -> Self {
    Self {
      initial_keys: KeySet::new(),
      steps: Vec::new(),
    }
  }

  pub fn with_initial_keys<I, S>(keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut pipeline = Self::new();
    pipeline.expect_initial(keys);
    pipeline
  }

  /// Declares more keys the initial state is guaranteed to hold.
  pub fn expect_initial<I, S>(&mut self, keys: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.initial_keys.extend(keys.into_iter().map(Into::into));
    self
  }

  pub fn initial_keys(&self) -> &KeySet {
    &self.initial_keys
  }

  pub fn push(&mut self, step: StepDef<Err>) -> &mut Self {
    event!(Level::DEBUG, step_name = %step.name, mode = ?step.mode, "Step added.");
    self.steps.push(step);
    self
  }

  /// Appends an asynchronous step.
  pub fn add_step<F, Fut, C, E>(&mut self, name: &str, contract: StepContract, handler_fn: F) -> &mut Self
  where
    F: Fn(PropertyBag) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, E>> + Send + 'static,
    C: Into<Contribution> + Send + 'static,
    E: Into<Err> + Send + 'static,
  {
    self.push(StepDef::from_async(name, contract, handler_fn))
  }

  /// Appends a synchronous step.
  pub fn add_sync_step<F, C, E>(&mut self, name: &str, contract: StepContract, step_fn: F) -> &mut Self
  where
    F: Fn(&PropertyBag) -> Result<C, E> + Send + Sync + 'static,
    C: Into<Contribution>,
    E: Into<Err>,
  {
    self.push(StepDef::from_sync(name, contract, step_fn))
  }

  /// Appends a step type that carries its own name and contract.
  pub fn add<S>(&mut self, step: S) -> &mut Self
  where
    S: Step<Err> + 'static,
  {
    self.push(StepDef::from_step(step))
  }

  fn position_of(&self, step_name: &str) -> AccrueResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| AccrueError::StepNotFound {
        step_name: step_name.to_string(),
      })
  }

  // --- Structural editing ---

  pub fn insert_before_step(&mut self, existing_step_name: &str, step: StepDef<Err>) -> AccrueResult<&mut Self> {
    let idx = self.position_of(existing_step_name)?;
    event!(Level::DEBUG, step_name = %step.name, before = %existing_step_name, "Step inserted.");
    self.steps.insert(idx, step);
    Ok(self)
  }

  pub fn insert_after_step(&mut self, existing_step_name: &str, step: StepDef<Err>) -> AccrueResult<&mut Self> {
    let idx = self.position_of(existing_step_name)?;
    event!(Level::DEBUG, step_name = %step.name, after = %existing_step_name, "Step inserted.");
    self.steps.insert(idx + 1, step);
    Ok(self)
  }

  /// Removes and returns the named step. Removing an unknown step is a no-op.
  pub fn remove_step(&mut self, step_name: &str) -> Option<StepDef<Err>> {
    let idx = self.steps.iter().position(|s| s.name == step_name)?;
    Some(self.steps.remove(idx))
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition>) -> AccrueResult<&mut Self> {
    let idx = self.position_of(step_name)?;
    self.steps[idx].skip_if = skip_if;
    Ok(self)
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  // --- Verification ---

  /// Computes the statically guaranteed shape without running anything.
  ///
  /// Fails with `DuplicateStep` if a name is reused, or `ContractViolation`
  /// for the first step whose requirements earlier steps do not guarantee.
  #[instrument(name = "Pipeline::verify", skip_all, fields(num_steps = self.steps.len()), err(level = "debug", Display))]
  pub fn verify(&self) -> AccrueResult<VerifiedShape> {
    let mut seen = HashSet::new();
    for step in &self.steps {
      if !seen.insert(step.name.as_str()) {
        return Err(AccrueError::DuplicateStep {
          step_name: step.name.clone(),
        });
      }
    }

    let mut tracker = ShapeTracker::new(self.initial_keys.iter().cloned());
    for step in &self.steps {
      tracker.step(&step.name, &step.contract, step.is_skippable())?;
    }
    let shape = tracker.finish();
    event!(Level::DEBUG, guaranteed = ?shape.guaranteed(), "Pipeline contracts verified.");
    Ok(shape)
  }

  /// Verifies the contracts and freezes the steps into a runnable sequence.
  pub fn build(self) -> AccrueResult<StepSequence<Err>> {
    let shape = self.verify()?;
    Ok(StepSequence::new(self.steps, shape))
  }
}

impl<Err> Default for Pipeline<Err>
where
  Err: std::error::Error + From<AccrueError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
