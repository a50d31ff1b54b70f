use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::trajectory::ShapeError;
use crate::core::utils::geometry::GeometryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Input does not match the configured dimensions: {0}")]
    ShapeMismatch(#[from] ShapeError),

    #[error("Geometry kernel failed: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Why a single (timestep, step) value could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IssueKind {
    #[error("degenerate geometry ({0})")]
    DegenerateGeometry(#[from] GeometryError),

    #[error(
        "ran out of neighbours at half-width {half_width} with {accumulated_twist:.1} degrees accumulated"
    )]
    TopologyExhausted {
        half_width: usize,
        accumulated_twist: f64,
    },

    #[error("no neighbour on both sides of the step")]
    OpenEnd,

    #[error("depends on an undefined {stage} value")]
    DependsOnUndefined { stage: &'static str },
}

/// A value that a stage left undefined, and where.
///
/// Per-timestep quantities such as writhe carry no step index.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} undefined at timestep {timestep}{}: {kind}", step_suffix(.step))]
pub struct StepIssue {
    pub stage: &'static str,
    pub timestep: usize,
    pub step: Option<usize>,
    pub kind: IssueKind,
}

fn step_suffix(step: &Option<usize>) -> String {
    step.map(|s| format!(", step {}", s)).unwrap_or_default()
}
