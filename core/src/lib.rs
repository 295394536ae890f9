// src/lib.rs

//! Accrue: contract-checked pipelines over an accumulating property bag.
//!
//! A pipeline is a strictly linear list of steps. Each step:
//!  - reads the property bag as left by the steps before it,
//!  - returns a (possibly empty) contribution that is shallow-merged into it,
//!  - declares which keys it requires, always produces, and may produce.
//!
//! Declarations are checked when the pipeline is built, so the keys a run is
//! guaranteed to end with are known before anything executes. Steps can be
//! synchronous or asynchronous; the executor awaits them one at a time either way.

pub mod contract;
pub mod core;
pub mod error;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::core::bag::{KeySet, PropertyBag};
pub use crate::core::contribution::Contribution;
pub use crate::core::step::{Handler, SkipCondition, Step, StepDef, StepMode};

pub use crate::contract::{ShapeTracker, StepContract, StepShape, VerifiedShape};

pub use crate::pipeline::{run, Pipeline, StepSequence};

pub use crate::error::{AccrueError, AccrueResult};

/*
    Core Workflow:
    1. Create a `Pipeline<MyErr>` (or `Pipeline<AccrueError>`) and declare the
       keys the initial state carries with `expect_initial`.
    2. Add steps with `add_sync_step`, `add_step` (async) or `add` (a `Step` impl),
       each with a `StepContract` naming its required, produced and maybe-produced keys.
    3. Call `.build()`. A step that requires a key nothing earlier guarantees is
       rejected here with `AccrueError::ContractViolation`.
    4. Inspect `sequence.shape().guaranteed()` for the statically known result keys.
    5. `sequence.run(&initial).await` returns the final `PropertyBag`, or the
       first step error unchanged.
*/
