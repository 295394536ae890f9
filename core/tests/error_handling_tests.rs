// tests/error_handling_tests.rs
mod common;

use accrue::{AccrueError, Contribution, Pipeline, PropertyBag, StepContract};
use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

// Counts events by level so tests can check what a run reports.
#[derive(Clone, Default)]
struct LevelCounter {
  errors: Arc<AtomicUsize>,
  total: Arc<AtomicUsize>,
}

impl<S: tracing::Subscriber> Layer<S> for LevelCounter {
  fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
    self.total.fetch_add(1, Ordering::SeqCst);
    if *event.metadata().level() == Level::ERROR {
      self.errors.fetch_add(1, Ordering::SeqCst);
    }
  }
}

#[tokio::test]
#[serial]
async fn test_failing_step_aborts_run_with_original_error() {
  setup_tracing();
  reset_counters();

  let mut pipeline = Pipeline::<TestError>::new();
  pipeline.push(failing_step("boom", "boom"));
  pipeline.push(counting_step("never_runs"));
  pipeline.push(constant_step("set_a", "a", json!(true)));

  let result = pipeline.build().unwrap().run(&PropertyBag::new()).await;

  assert_eq!(result, Err(TestError::Step("boom".to_string())));
  assert_eq!(STEP_EXEC_COUNTER.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[serial]
async fn test_unfulfilled_promise_is_not_an_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestError>::new();
  pipeline.add_sync_step("forgetful", StepContract::new().produces(["k"]), |_bag: &PropertyBag| {
    Ok::<_, TestError>(())
  });

  let sequence = pipeline.build().unwrap();
  assert!(sequence.shape().is_guaranteed("k"));

  match sequence.run(&PropertyBag::new()).await {
    Ok(result) => {
      assert!(!result.contains_key("k"));
      assert!(result.is_empty());
    }
    Err(e) => panic!("Expected Ok without 'k', got {:?}", e),
  }
}

#[tokio::test]
#[serial]
async fn test_step_failure_is_not_logged_as_error() {
  let counter = LevelCounter::default();
  let subscriber = tracing_subscriber::registry().with(counter.clone());
  let _guard = tracing::subscriber::set_default(subscriber);

  let mut pipeline = Pipeline::<TestError>::new();
  pipeline.push(failing_step("boom", "boom"));
  let result = pipeline.build().unwrap().run(&PropertyBag::new()).await;

  assert_eq!(result, Err(TestError::Step("boom".to_string())));
  assert!(counter.total.load(Ordering::SeqCst) > 0);
  assert_eq!(counter.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[serial]
async fn test_async_step_failure_propagates_after_earlier_steps() {
  setup_tracing();
  reset_counters();

  let mut pipeline = Pipeline::<TestError>::new();
  pipeline.push(counting_step("runs_first"));
  pipeline.add_step("rejects", StepContract::new(), |_bag: PropertyBag| async move {
    tokio::task::yield_now().await;
    Err::<Contribution, _>(TestError::Step("rejected".to_string()))
  });
  pipeline.push(counting_step("never_runs"));

  let result = pipeline.build().unwrap().run(&PropertyBag::new()).await;

  match result {
    Err(TestError::Step(msg)) => assert_eq!(msg, "rejected"),
    other => panic!("Expected TestError::Step, got {:?}", other),
  }
  assert_eq!(STEP_EXEC_COUNTER.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[serial]
async fn test_initial_state_missing_declared_keys() {
  setup_tracing();
  reset_counters();

  let mut pipeline = Pipeline::<TestError>::with_initial_keys(["user_id", "tenant"]);
  pipeline.push(counting_step("anything"));
  let sequence = pipeline.build().unwrap();

  let result = sequence.run(&bag(json!({"tenant": "acme"}))).await;
  match result {
    Err(TestError::Accrue(s)) => {
      assert!(s.contains("InitialStateMismatch"));
      assert!(s.contains("user_id"));
    }
    other => panic!("Expected TestError::Accrue(InitialStateMismatch), got {:?}", other),
  }
  assert_eq!(STEP_EXEC_COUNTER.load(Ordering::SeqCst), 0);
}

// Steps of an AccrueError pipeline can fail with anyhow errors.
#[tokio::test]
#[serial]
async fn test_pipeline_with_accrue_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<AccrueError>::new();
  pipeline.add_step("flaky", StepContract::new(), |_bag: PropertyBag| async move {
    Err::<(), _>(anyhow::anyhow!("upstream unavailable"))
  });

  let result = pipeline.build().unwrap().run(&PropertyBag::new()).await;
  match result {
    Err(AccrueError::HandlerError { source }) => assert_eq!(source.to_string(), "upstream unavailable"),
    other => panic!("Expected AccrueError::HandlerError, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_typed_read_failure_inside_step() {
  setup_tracing();
  let mut pipeline = Pipeline::<AccrueError>::with_initial_keys(["count"]);
  pipeline.add_sync_step("read_count", StepContract::new().requires(["count"]), |bag: &PropertyBag| {
    let count: u32 = bag.get_as("count")?;
    Ok::<_, AccrueError>(Contribution::none().with("double", count * 2))
  });

  let result = pipeline
    .build()
    .unwrap()
    .run(&bag(json!({"count": "not a number"})))
    .await;
  match result {
    Err(AccrueError::PropertyType { key, .. }) => assert_eq!(key, "count"),
    other => panic!("Expected AccrueError::PropertyType, got {:?}", other),
  }
}

#[test]
fn test_accrue_error_survives_anyhow_round_trip() {
  let original = AccrueError::StepNotFound {
    step_name: "lost".to_string(),
  };
  let back = AccrueError::from(anyhow::Error::new(original));
  assert!(matches!(back, AccrueError::StepNotFound { ref step_name } if step_name == "lost"));
}

#[test]
fn test_insert_relative_to_unknown_step() {
  let mut pipeline = Pipeline::<TestError>::new();
  let result = pipeline.insert_after_step("ghost", counting_step("new"));
  match result {
    Err(AccrueError::StepNotFound { step_name }) => assert_eq!(step_name, "ghost"),
    Err(other) => panic!("Expected StepNotFound, got {:?}", other),
    Ok(_) => panic!("Expected StepNotFound"),
  }
  assert!(pipeline.set_skip_condition("ghost", None).is_err());
  assert!(pipeline.is_empty());
}

#[test]
fn test_contract_violation_message_lists_missing_keys() {
  let err = AccrueError::ContractViolation {
    step_name: "charge".to_string(),
    step_index: 2,
    missing: vec!["card".to_string(), "total".to_string()],
  };
  assert_eq!(
    err.to_string(),
    "Contract violation at step 'charge' (#2): required keys not guaranteed: card, total"
  );
}
