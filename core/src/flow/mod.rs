// core/src/flow/mod.rs

//! A small named-step pipeline engine.
//!
//! Every write path in the shop (cart mutations, registration, sign-in,
//! password changes) is expressed as a `Pipeline<TData, Err>`: an ordered list
//! of named steps, each with one or more async handlers operating on a shared
//! `ContextData<TData>`. Pipelines are registered once in a `Flows` registry
//! keyed by their context type and dispatched from the services.
//!
//! Handlers must drop any lock guard obtained from `ContextData` before their
//! first `.await`.

mod context;
mod control;
mod pipeline;
mod registry;

pub use context::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use pipeline::{Handler, Pipeline};
pub use registry::Flows;
