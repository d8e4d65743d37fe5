// core/src/flow/control.rs

/// Returned by a handler to tell the pipeline whether to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineControl {
  Continue,
  /// Halt the run. No further handlers or steps execute.
  Stop,
}

/// Outcome of a pipeline run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  Completed,
  Stopped,
}
