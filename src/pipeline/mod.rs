//! Fused analysis and batch orchestration

pub mod fusion;
mod orchestrator;

pub use fusion::{assess_threat, build_explanation, build_feature_vector, TamperAnalyzer};
pub use orchestrator::{run, PipelineResult};
