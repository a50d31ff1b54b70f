use crate::core::models::topology::Topology;
use crate::core::models::trajectory::TrajectoryArray;
use crate::engine::config::AnalysisConfigBuilder;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::state::StageOutput;
use crate::engine::tasks;
use nalgebra::Point3;
use tracing::{info, instrument};

/// Writhe, per timestep, of an axis that was stored as plain points.
///
/// Non-finite points are the undefined entries of a stored central axis and
/// make the writhe of their timestep undefined (or, at the ends of a linear
/// axis, are trimmed).
#[instrument(skip_all, name = "writhe_workflow")]
pub fn run(
    axis: &TrajectoryArray<Point3<f64>>,
    topology: Topology,
    reporter: &ProgressReporter,
) -> Result<StageOutput<Vec<Option<f64>>>, EngineError> {
    // A linear axis of n points comes from n + 1 base pairs.
    let num_bp = match topology {
        Topology::Circular => axis.frame_len(),
        Topology::Linear => axis.frame_len() + 1,
    };
    let config = AnalysisConfigBuilder::new()
        .name("writhe")
        .num_bp(num_bp)
        .num_steps(axis.num_steps())
        .topology(topology)
        .build()?;
    info!(
        points = axis.frame_len(),
        timesteps = axis.num_steps(),
        %topology,
        "Computing writhe of stored axis."
    );

    let context = AnalysisContext::new(&config, reporter);
    Ok(tasks::writhe::run_on_points(axis, &context))
}
