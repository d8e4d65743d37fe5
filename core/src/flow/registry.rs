// core/src/flow/registry.rs

//! `Flows<E>`: a registry of pipelines keyed by their context data type.

use crate::error::FlowError;
use crate::flow::context::ContextData;
use crate::flow::control::PipelineResult;
use crate::flow::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedPipeline<E>: Send + Sync
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// `ctx_obj` must hold a `ContextData<TData>` for the wrapped pipeline.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, E>;
}

struct TypedPipeline<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Pipeline<TData, E>,
}

#[async_trait]
impl<TData, E> ErasedPipeline<E> for TypedPipeline<TData, E>
where
  TData: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, E> {
    let ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        return Err(E::from(FlowError::TypeMismatch {
          expected_type: std::any::type_name::<ContextData<TData>>().to_string(),
        }));
      }
    };
    self.pipeline.run(ctx_data).await
  }
}

/// Holds one pipeline per context type. Registering a second pipeline for the
/// same type replaces the first.
pub struct Flows<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  registry: RwLock<HashMap<TypeId, Arc<dyn ErasedPipeline<E>>>>,
}

impl<E> Flows<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
    }
  }

  pub fn register_pipeline<TData>(&self, pipeline: Pipeline<TData, E>)
  where
    TData: 'static + Send + Sync,
  {
    event!(Level::DEBUG, pipeline = %pipeline.name(), tdata_type = %std::any::type_name::<TData>(), "Registering pipeline.");
    self
      .registry
      .write()
      .insert(TypeId::of::<TData>(), Arc::new(TypedPipeline { pipeline }));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, E>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.registry.read().get(&TypeId::of::<TData>()).cloned();
    let runner = runner.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, "No pipeline registered for TData type {}.", type_name);
      E::from(FlowError::NotRegistered {
        type_name: type_name.to_string(),
      })
    })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}

impl<E> Default for Flows<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
