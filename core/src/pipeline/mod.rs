// accrue/src/pipeline/mod.rs

//! Defines the `Pipeline<Err>` builder, the verified `StepSequence<Err>`, and
//! its execution logic.

pub mod definition;
pub mod execution;
pub mod sequence;

pub use definition::Pipeline;
pub use execution::run;
pub use sequence::StepSequence;
