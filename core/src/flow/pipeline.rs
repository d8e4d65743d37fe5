// core/src/flow/pipeline.rs

//! `Pipeline<TData, E>`: definition, handler registration and execution.

use crate::error::FlowError;
use crate::flow::context::ContextData;
use crate::flow::control::{PipelineControl, PipelineResult};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{event, info_span, Instrument, Level};

/// A step handler: takes a clone of the shared context and resolves to a
/// control signal or the pipeline's error type.
pub type Handler<TData, E> =
  Box<dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, E>> + Send>> + Send + Sync>;

pub struct Pipeline<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  name: String,
  steps: Vec<String>,
  handlers: HashMap<String, Vec<Handler<TData, E>>>,
}

impl<TData, E> Pipeline<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: &str, steps: &[&str]) -> Self {
    Self {
      name: name.to_string(),
      steps: steps.iter().map(|s| (*s).to_string()).collect(),
      handlers: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> impl Iterator<Item = &str> {
    self.steps.iter().map(String::as_str)
  }

  /// Registers a handler for `step_name`. Handlers of one step run in
  /// registration order.
  ///
  /// Panics if the step was not declared in `Pipeline::new`; that is a wiring
  /// mistake, not a runtime condition.
  pub fn on_step<F, UserErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserErr>> + Send + 'static,
    UserErr: Into<E> + Send + Sync + 'static,
  {
    assert!(
      self.steps.iter().any(|s| s == step_name),
      "pipeline '{}' declares no step named '{}'",
      self.name,
      step_name
    );
    let handler: Handler<TData, E> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.handlers.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Runs every step in declaration order against `ctx_data`.
  ///
  /// The first handler error aborts the run and is returned as is. A step
  /// without handlers fails with `FlowError::HandlerMissing`.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, E> {
    event!(Level::DEBUG, pipeline = %self.name, "Pipeline execution starting.");

    for (step_index, step_name) in self.steps.iter().enumerate() {
      let handlers = match self.handlers.get(step_name) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ => {
          event!(Level::ERROR, pipeline = %self.name, step = %step_name, "Step has no handlers.");
          return Err(E::from(FlowError::HandlerMissing {
            step_name: step_name.clone(),
          }));
        }
      };

      let step_span = info_span!("pipeline_step", pipeline = %self.name, step = %step_name, step_index);
      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, pipeline = %self.name, step = %step_name, "Pipeline stopped by a handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) => {
            event!(Level::DEBUG, pipeline = %self.name, step = %step_name, error = %e, "Step handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, pipeline = %self.name, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
