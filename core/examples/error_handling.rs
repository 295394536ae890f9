// accrue/examples/error_handling.rs

use accrue::{AccrueError, Contribution, Pipeline, PropertyBag, StepContract};
use tracing::{error, info};

// 1. Define a custom application error type
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("A custom application error occurred: {0}")]
  CustomError(String),

  #[error("Accrue framework error: {0}")]
  Accrue(#[from] AccrueError), // Lets the pipeline report its own errors as ExampleAppError
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  info!("\nScenario 1: a step fails at run time");
  run_pipeline_with_step_error().await;

  info!("\nScenario 2: a contract violation is caught at build time");
  build_pipeline_with_contract_violation();
}

async fn run_pipeline_with_step_error() {
  let mut pipeline = Pipeline::<ExampleAppError>::new();

  pipeline.add_sync_step("step_one", StepContract::new().produces(["one"]), |_bag: &PropertyBag| {
    info!("Executing step_one");
    Ok::<_, ExampleAppError>(Contribution::none().with("one", 1))
  });

  pipeline.add_step("step_two_fails", StepContract::new().requires(["one"]), |_bag: PropertyBag| async move {
    info!("Executing step_two_fails - this will error");
    Err::<Contribution, _>(ExampleAppError::CustomError(
      "Something went wrong in step_two!".to_string(),
    ))
  });

  pipeline.add_sync_step("step_three", StepContract::new(), |_bag: &PropertyBag| {
    info!("Executing step_three - this should not run");
    Ok::<_, ExampleAppError>(())
  });

  let sequence = match pipeline.build() {
    Ok(sequence) => sequence,
    Err(e) => {
      error!("Unexpected build failure: {}", e);
      return;
    }
  };

  match sequence.run(&PropertyBag::new()).await {
    Ok(result) => info!("Pipeline completed unexpectedly: {:?}", result),
    Err(ExampleAppError::CustomError(msg)) => info!("Caught expected custom error: {}", msg),
    Err(e) => error!("Caught unexpected error type: {:?}", e),
  }
}

fn build_pipeline_with_contract_violation() {
  let mut pipeline = Pipeline::<ExampleAppError>::new();
  pipeline.add_sync_step(
    "charge_card",
    StepContract::new().requires(["card_token"]).produces(["receipt"]),
    |_bag: &PropertyBag| Ok::<_, ExampleAppError>(Contribution::none().with("receipt", "r-1")),
  );

  match pipeline.build() {
    Ok(_) => error!("Pipeline built unexpectedly"),
    Err(e @ AccrueError::ContractViolation { .. }) => info!("Caught expected contract violation: {}", e),
    Err(e) => error!("Caught unexpected error: {:?}", e),
  }
}
