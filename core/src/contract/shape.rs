// accrue/src/contract/shape.rs

//! Folds step contracts over a sequence to find the statically guaranteed
//! final key set, rejecting steps whose requirements are not yet met.

use crate::contract::declaration::StepContract;
use crate::core::bag::KeySet;
use crate::error::{AccrueError, AccrueResult};
use tracing::{event, Level};

/// Keys available to and left behind by one step of a verified sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepShape {
  pub name: String,
  /// Keys guaranteed present when the step is invoked.
  pub available_before: KeySet,
  /// Keys guaranteed present once the step has merged.
  pub guaranteed_after: KeySet,
  /// The step may be skipped at runtime, so its promises only count as possible.
  pub skippable: bool,
}

/// The statically known result shape of a step sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifiedShape {
  initial: KeySet,
  guaranteed: KeySet,
  possible: KeySet,
  steps: Vec<StepShape>,
}

impl VerifiedShape {
  pub fn initial(&self) -> &KeySet {
    &self.initial
  }

  /// Keys present after every run that completes.
  pub fn guaranteed(&self) -> &KeySet {
    &self.guaranteed
  }

  /// Keys that some run could end up with. Always a superset of `guaranteed`.
  pub fn possible(&self) -> &KeySet {
    &self.possible
  }

  pub fn is_guaranteed(&self, key: &str) -> bool {
    self.guaranteed.contains(key)
  }

  pub fn may_contain(&self, key: &str) -> bool {
    self.possible.contains(key)
  }

  pub fn steps(&self) -> &[StepShape] {
    &self.steps
  }

  /// Keys guaranteed once the named step has merged, or `None` for an unknown step.
  pub fn guaranteed_after(&self, step_name: &str) -> Option<&KeySet> {
    self
      .steps
      .iter()
      .find(|s| s.name == step_name)
      .map(|s| &s.guaranteed_after)
  }
}

/// Left-to-right fold over step contracts.
///
/// ```
/// use accrue::{ShapeTracker, StepContract};
///
/// let mut tracker = ShapeTracker::new(["user_id"]);
/// tracker.step("load", &StepContract::new().requires(["user_id"]).produces(["user"]), false).unwrap();
/// let shape = tracker.finish();
/// assert!(shape.is_guaranteed("user"));
/// ```
#[derive(Debug, Clone)]
pub struct ShapeTracker {
  shape: VerifiedShape,
}

impl ShapeTracker {
  pub fn new<I, S>(initial_keys: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let initial: KeySet = initial_keys.into_iter().map(Into::into).collect();
    Self {
      shape: VerifiedShape {
        guaranteed: initial.clone(),
        possible: initial.clone(),
        initial,
        steps: Vec::new(),
      },
    }
  }

  /// Checks `contract` against the keys guaranteed so far, then folds its
  /// promises in. A skippable step's unconditional keys count only as possible.
  pub fn step(&mut self, name: &str, contract: &StepContract, skippable: bool) -> AccrueResult<&mut Self> {
    let step_index = self.shape.steps.len();
    let missing: Vec<String> = contract
      .required_keys()
      .difference(&self.shape.guaranteed)
      .cloned()
      .collect();
    if !missing.is_empty() {
      event!(Level::DEBUG, step_name = %name, step_index, ?missing, "Step requirements not satisfiable.");
      return Err(AccrueError::ContractViolation {
        step_name: name.to_string(),
        step_index,
        missing,
      });
    }

    let available_before = self.shape.guaranteed.clone();
    if !skippable {
      self.shape.guaranteed.extend(contract.unconditional_keys().iter().cloned());
    }
    self.shape.possible.extend(contract.declared_keys());

    self.shape.steps.push(StepShape {
      name: name.to_string(),
      available_before,
      guaranteed_after: self.shape.guaranteed.clone(),
      skippable,
    });
    Ok(self)
  }

  pub fn finish(self) -> VerifiedShape {
    self.shape
  }
}
