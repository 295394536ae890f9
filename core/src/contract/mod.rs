// accrue/src/contract/mod.rs

//! The contract model: what each step declares it reads and writes, and the
//! key set a whole sequence is statically known to leave behind.
//!
//! Nothing in this module executes a step. Verification runs once, when a
//! `Pipeline` is built into a `StepSequence`.

pub mod declaration;
pub mod shape;

pub use declaration::StepContract;
pub use shape::{ShapeTracker, StepShape, VerifiedShape};
