// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use accrue::{AccrueError, Contribution, PropertyBag, StepContract, StepDef};
use serde_json::json;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};
use tracing::Level;

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Accrue framework error: {0}")]
  Accrue(String), // Stored as the Debug rendering so the enum stays Eq

  #[error("Test step failed: {0}")]
  Step(String),
}

impl From<AccrueError> for TestError {
  fn from(err: AccrueError) -> Self {
    TestError::Accrue(format!("{:?}", err))
  }
}

/// Builds a bag from a `json!({...})` literal.
pub fn bag(value: serde_json::Value) -> PropertyBag {
  PropertyBag::try_from(value).expect("test bags are JSON objects")
}

// --- Common Step Creators ---

/// Sync step that always returns `key: value`.
pub fn constant_step(name: &str, key: &'static str, value: serde_json::Value) -> StepDef<TestError> {
  StepDef::from_sync(name, StepContract::new().produces([key]), move |_bag: &PropertyBag| {
    Ok::<_, TestError>(Contribution::none().with(key, value.clone()))
  })
}

/// Async step with the same behaviour as `constant_step`.
pub fn async_constant_step(name: &str, key: &'static str, value: serde_json::Value) -> StepDef<TestError> {
  StepDef::from_async(name, StepContract::new().produces([key]), move |_bag: PropertyBag| {
    let value = value.clone();
    async move {
      tokio::task::yield_now().await;
      Ok::<_, TestError>(Contribution::none().with(key, value))
    }
  })
}

/// Sync step that records its name in `log` and contributes nothing.
pub fn recording_step(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> StepDef<TestError> {
  StepDef::from_sync(name, StepContract::new(), move |_bag: &PropertyBag| {
    log.lock().unwrap().push(name.to_string());
    Ok::<_, TestError>(())
  })
}

/// Sync step that fails with `TestError::Step(message)`.
pub fn failing_step(name: &str, message: &'static str) -> StepDef<TestError> {
  StepDef::from_sync(name, StepContract::new(), move |_bag: &PropertyBag| {
    tracing::warn!(target: "test_steps", "failing with: '{}'", message);
    Err::<Contribution, _>(TestError::Step(message.to_string()))
  })
}

/// Async step that increments `counter` by reading and writing the `counter` key.
pub fn async_increment_step(name: &str) -> StepDef<TestError> {
  StepDef::from_async(
    name,
    StepContract::new().requires(["counter"]).produces(["counter"]),
    |bag: PropertyBag| async move {
      let current: i64 = bag.get_as("counter")?;
      tokio::time::sleep(std::time::Duration::from_millis(1)).await;
      Ok::<_, TestError>(Contribution::none().with("counter", json!(current + 1)))
    },
  )
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking execution counts ---
pub static STEP_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

/// Sync step that bumps `STEP_EXEC_COUNTER` and contributes nothing.
pub fn counting_step(name: &str) -> StepDef<TestError> {
  StepDef::from_sync(name, StepContract::new(), |_bag: &PropertyBag| {
    STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    Ok::<_, TestError>(())
  })
}
