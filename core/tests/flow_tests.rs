// tests/flow_tests.rs
mod common;

use common::setup_tracing;
use primebasket::flow::{ContextData, Flows, Pipeline, PipelineControl, PipelineResult};
use primebasket::{FlowError, ShopError};

#[derive(Debug, Default)]
struct Trail {
  visited: Vec<String>,
  stop_at: Option<String>,
}

fn recording_pipeline(steps: &[&str]) -> Pipeline<Trail, ShopError> {
  let mut p = Pipeline::<Trail, ShopError>::new("trail", steps);
  for step in steps {
    let name = step.to_string();
    p.on_step(step, move |ctx: ContextData<Trail>| {
      let name = name.clone();
      Box::pin(async move {
        let mut guard = ctx.write();
        guard.visited.push(name.clone());
        if guard.stop_at.as_deref() == Some(name.as_str()) {
          return Ok::<_, ShopError>(PipelineControl::Stop);
        }
        Ok(PipelineControl::Continue)
      })
    });
  }
  p
}

#[tokio::test]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let p = recording_pipeline(&["a", "b", "c"]);
  let ctx = ContextData::new(Trail::default());

  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().visited, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn stop_skips_remaining_steps() {
  setup_tracing();
  let p = recording_pipeline(&["a", "b", "c"]);
  let ctx = ContextData::new(Trail {
    stop_at: Some("b".to_string()),
    ..Trail::default()
  });

  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().visited, vec!["a", "b"]);
}

#[tokio::test]
async fn first_error_aborts_the_run() {
  setup_tracing();
  let mut p = recording_pipeline(&["a", "b"]);
  p.on_step("a", |_ctx: ContextData<Trail>| {
    Box::pin(async move { Err::<PipelineControl, _>(ShopError::validation("nope")) })
  });
  let ctx = ContextData::new(Trail::default());

  match p.run(ctx.clone()).await {
    Err(ShopError::Validation(m)) => assert_eq!(m, "nope"),
    other => panic!("unexpected: {:?}", other),
  }
  // The recording handler for "a" ran first; "b" never did.
  assert_eq!(ctx.read().visited, vec!["a"]);
}

#[tokio::test]
async fn step_without_handler_fails() {
  setup_tracing();
  let p = Pipeline::<Trail, ShopError>::new("empty", &["lonely"]);
  let result = p.run(ContextData::new(Trail::default())).await;
  assert!(matches!(
    result,
    Err(ShopError::Flow(FlowError::HandlerMissing { ref step_name })) if step_name == "lonely"
  ));
}

#[tokio::test]
async fn registry_dispatches_by_context_type() {
  setup_tracing();
  let flows: Flows<ShopError> = Flows::new();
  assert!(!flows.is_registered::<Trail>());

  flows.register_pipeline(recording_pipeline(&["only"]));
  assert!(flows.is_registered::<Trail>());

  let ctx = ContextData::new(Trail::default());
  assert_eq!(flows.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().visited, vec!["only"]);
}

#[tokio::test]
async fn unregistered_context_type_fails() {
  setup_tracing();
  let flows: Flows<ShopError> = Flows::new();
  let result = flows.run(ContextData::new(42_u32)).await;
  assert!(matches!(result, Err(ShopError::Flow(FlowError::NotRegistered { .. }))));
}

#[test]
#[should_panic(expected = "declares no step named")]
fn registering_unknown_step_panics() {
  let mut p = Pipeline::<Trail, ShopError>::new("trail", &["a"]);
  p.on_step("b", |_ctx: ContextData<Trail>| {
    Box::pin(async move { Ok::<_, ShopError>(PipelineControl::Continue) })
  });
}
