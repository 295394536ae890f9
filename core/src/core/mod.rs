pub mod bag;
pub mod contribution;
pub mod step;

pub use bag::{KeySet, PropertyBag};
pub use contribution::Contribution;
pub use step::{Handler, SkipCondition, Step, StepDef, StepFuture, StepMode};
