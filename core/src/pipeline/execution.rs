// accrue/src/pipeline/execution.rs

//! Contains `StepSequence::run()`, which threads an accumulating property bag
//! through the steps one at a time.

use crate::core::bag::PropertyBag;
use crate::error::AccrueError;
use crate::pipeline::sequence::StepSequence;
use tracing::{event, instrument, span, Instrument, Level};

impl<Err> StepSequence<Err>
where
  Err: std::error::Error + From<AccrueError> + Send + Sync + 'static,
{
  /// Runs every step in order against a copy of `initial`.
  ///
  /// Each step sees the accumulator as left by the steps before it, and its
  /// contribution is merged (right-hand side wins) before the next step is
  /// invoked. Asynchronous steps are awaited one at a time; no two steps of a
  /// run are ever in flight together.
  ///
  /// The first failing step ends the run: its error is returned as is, and
  /// no later step runs. `initial` is never modified.
  #[instrument(
    name = "StepSequence::run",
    skip_all,
    fields(num_steps = self.len(), initial_keys = initial.len()),
    err(level = "debug", Display)
  )]
  pub async fn run(&self, initial: &PropertyBag) -> Result<PropertyBag, Err> {
    let missing: Vec<String> = self
      .shape()
      .initial()
      .iter()
      .filter(|key| !initial.contains_key(key))
      .cloned()
      .collect();
    if !missing.is_empty() {
      event!(Level::DEBUG, ?missing, "Initial state does not match declared shape.");
      return Err(Err::from(AccrueError::InitialStateMismatch { missing }));
    }

    event!(Level::DEBUG, "Sequence execution starting.");
    let mut accumulator = initial.clone();

    for (step_idx, step_def) in self.steps().iter().enumerate() {
      let step_span = span!(
        Level::INFO,
        "accrue_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        mode = ?step_def.mode
      );

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(&accumulator) {
          step_span.in_scope(|| event!(Level::INFO, "Step skipped due to 'skip_if' condition."));
          continue;
        }
      }

      let contribution = match step_def
        .invoke(accumulator.clone())
        .instrument(step_span.clone())
        .await
      {
        Ok(contribution) => contribution,
        Err(e) => {
          step_span.in_scope(|| event!(Level::DEBUG, error = %e, "Step failed, abandoning run."));
          return Err(e);
        }
      };

      step_span.in_scope(|| {
        let unfulfilled: Vec<&str> = step_def
          .contract
          .unconditional_keys()
          .iter()
          .map(String::as_str)
          .filter(|key| !contribution.contains_key(key))
          .collect();
        if !unfulfilled.is_empty() {
          event!(Level::WARN, ?unfulfilled, "Step did not return keys it declared as always produced.");
        }
        event!(Level::TRACE, contributed = contribution.len(), "Merging contribution.");
      });
      accumulator.merge(contribution);
    }

    event!(Level::DEBUG, final_keys = accumulator.len(), "Sequence execution completed.");
    Ok(accumulator)
  }
}

/// Runs `steps` against `initial`. Same as [`StepSequence::run`].
pub async fn run<Err>(initial: &PropertyBag, steps: &StepSequence<Err>) -> Result<PropertyBag, Err>
where
  Err: std::error::Error + From<AccrueError> + Send + Sync + 'static,
{
  steps.run(initial).await
}
