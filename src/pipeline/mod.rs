//! Pipeline orchestration and lifecycle.

pub mod orchestrator;

pub use orchestrator::{
    Orchestrator, OrchestratorConfig, PipelineHandle, PipelineState, start,
};
