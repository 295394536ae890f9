// accrue/examples/basic_pipeline.rs

use accrue::{AccrueError, Contribution, Pipeline, PropertyBag, StepContract};
use serde_json::json;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AccrueError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 1. Declare what the caller will hand in.
  let mut pipeline = Pipeline::<AccrueError>::with_initial_keys(["order_id", "items"]);

  // 2. A synchronous step: always produces `subtotal`.
  pipeline.add_sync_step(
    "price_items",
    StepContract::new().requires(["items"]).produces(["subtotal"]),
    |bag: &PropertyBag| {
      let items: Vec<f64> = bag.get_as("items")?;
      Ok::<_, AccrueError>(Contribution::none().with("subtotal", items.iter().sum::<f64>()))
    },
  );

  // 3. A conditional step: only large orders get a discount.
  pipeline.add_sync_step(
    "discount",
    StepContract::new().requires(["subtotal"]).may_produce(["discount"]),
    |bag: &PropertyBag| {
      let subtotal: f64 = bag.get_as("subtotal")?;
      let contribution = if subtotal > 100.0 {
        Contribution::none().with("discount", subtotal * 0.1)
      } else {
        Contribution::none()
      };
      Ok::<_, AccrueError>(contribution)
    },
  );

  // 4. An asynchronous step, e.g. a rate lookup.
  pipeline.add_step(
    "tax",
    StepContract::new().requires(["subtotal"]).produces(["tax"]),
    |bag: PropertyBag| async move {
      tokio::time::sleep(std::time::Duration::from_millis(5)).await;
      let subtotal: f64 = bag.get_as("subtotal")?;
      Ok::<_, AccrueError>(Contribution::none().with("tax", subtotal * 0.2))
    },
  );

  // 5. Verify and freeze. Contract violations surface here, before anything runs.
  let sequence = pipeline.build()?;
  info!(guaranteed = ?sequence.shape().guaranteed(), possible = ?sequence.shape().possible(), "Sequence verified.");

  // 6. Run it.
  let initial = PropertyBag::try_from(json!({"order_id": "A-17", "items": [40.0, 75.5]}))?;
  let result = sequence.run(&initial).await?;

  for (key, value) in &result {
    info!("{} = {}", key, value);
  }

  assert!(result.contains_key("discount"));
  assert_eq!(result.get_as::<f64>("subtotal")?, 115.5);
  Ok(())
}
