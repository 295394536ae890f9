// accrue/src/core/step.rs

//! Defines a single step of a pipeline: its name, declared contract, mode,
//! optional skip condition, and the type-erased handler that runs it.

use crate::contract::StepContract;
use crate::core::bag::PropertyBag;
use crate::core::contribution::Contribution;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future every step invocation is normalised to.
pub type StepFuture<Err> = Pin<Box<dyn Future<Output = Result<Contribution, Err>> + Send>>;

/// Type alias for a step handler.
///
/// A handler takes a snapshot of the accumulator as it stands when the step
/// is reached and resolves to the step's contribution. Synchronous steps are
/// wrapped in an already-resolved future, so the executor awaits every step
/// the same way.
pub type Handler<Err> = Box<dyn Fn(PropertyBag) -> StepFuture<Err> + Send + Sync>;

// Evaluated against the current accumulator. If true, the step is skipped.
pub type SkipCondition = Arc<dyn Fn(&PropertyBag) -> bool + Send + Sync + 'static>;

/// How the step's author wrote it. Purely informational: the contract and the
/// executor treat both modes the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
  Sync,
  Async,
}

/// A reusable step type that carries its own name and contract.
#[async_trait]
pub trait Step<Err>: Send + Sync
where
  Err: Send + 'static,
{
  fn name(&self) -> &str;

  fn contract(&self) -> StepContract;

  async fn invoke(&self, bag: PropertyBag) -> Result<Contribution, Err>;
}

/// Definition of a pipeline step.
pub struct StepDef<Err> {
  pub name: String,
  pub contract: StepContract,
  pub mode: StepMode,
  pub skip_if: Option<SkipCondition>,
  pub(crate) handler: Handler<Err>,
}

impl<Err> StepDef<Err>
where
  Err: Send + 'static,
{
  /// Wraps an asynchronous function. Its error type only needs to convert
  /// into the pipeline's `Err`.
  pub fn from_async<F, Fut, C, E>(name: impl Into<String>, contract: StepContract, handler_fn: F) -> Self
  where
    F: Fn(PropertyBag) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, E>> + Send + 'static,
    C: Into<Contribution> + Send + 'static,
    E: Into<Err> + Send + 'static,
  {
    let handler: Handler<Err> = Box::new(move |bag| {
      let user_fut = handler_fn(bag);
      Box::pin(async move { user_fut.await.map(Into::into).map_err(Into::into) })
    });
    Self {
      name: name.into(),
      contract,
      mode: StepMode::Async,
      skip_if: None,
      handler,
    }
  }

  /// Wraps a synchronous function. It runs as soon as the step is invoked and
  /// its outcome is handed back as a ready future.
  pub fn from_sync<F, C, E>(name: impl Into<String>, contract: StepContract, step_fn: F) -> Self
  where
    F: Fn(&PropertyBag) -> Result<C, E> + Send + Sync + 'static,
    C: Into<Contribution>,
    E: Into<Err>,
  {
    let handler: Handler<Err> = Box::new(move |bag| {
      let outcome = step_fn(&bag).map(Into::into).map_err(Into::into);
      Box::pin(std::future::ready(outcome))
    });
    Self {
      name: name.into(),
      contract,
      mode: StepMode::Sync,
      skip_if: None,
      handler,
    }
  }

  pub fn from_step<S>(step: S) -> Self
  where
    S: Step<Err> + 'static,
  {
    let name = step.name().to_string();
    let contract = step.contract();
    let step = Arc::new(step);
    let handler: Handler<Err> = Box::new(move |bag| {
      let step = Arc::clone(&step);
      Box::pin(async move { step.invoke(bag).await })
    });
    Self {
      name,
      contract,
      mode: StepMode::Async,
      skip_if: None,
      handler,
    }
  }

  pub fn skip_if(mut self, condition: impl Fn(&PropertyBag) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(condition));
    self
  }
}

impl<Err> StepDef<Err> {
  /// A step with a skip condition may not run, so it guarantees nothing.
  pub fn is_skippable(&self) -> bool {
    self.skip_if.is_some()
  }

  pub(crate) fn invoke(&self, bag: PropertyBag) -> StepFuture<Err> {
    (self.handler)(bag)
  }
}

// Handler and SkipCondition are closures, so Debug is written out by hand.
impl<Err> std::fmt::Debug for StepDef<Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("contract", &self.contract)
      .field("mode", &self.mode)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
