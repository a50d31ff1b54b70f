use crate::core::models::topology::Topology;
use crate::core::models::trajectory::{Trajectory, TrajectoryArray};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use nalgebra::Point3;
use tracing::{info, instrument};

/// Centre of the four proxy atoms of step `j`: base pairs `j` and `j + 1` on
/// both strands.
///
/// Returns `None` for the open end of a linear duplex.
pub fn step_midpoint(
    strand_a: &[Point3<f64>],
    strand_b: &[Point3<f64>],
    j: usize,
    topology: Topology,
) -> Option<Point3<f64>> {
    let next = topology.neighbor(j, 1, strand_a.len())?;
    let sum = strand_a[j].coords + strand_a[next].coords + strand_b[j].coords + strand_b[next].coords;
    Some(Point3::from(0.25 * sum))
}

/// Midpoints of every base-pair step in every timestep.
#[instrument(skip_all, name = "midpoints_task")]
pub fn run(
    trajectory: &Trajectory,
    context: &AnalysisContext,
) -> Result<TrajectoryArray<Point3<f64>>, EngineError> {
    context.reporter.report(Progress::PhaseStart {
        name: "Base-pair step midpoints",
    });
    let topology = context.topology();
    let num_bp_steps = topology.step_count(trajectory.num_bp());

    let mut data = Vec::with_capacity(trajectory.num_steps() * num_bp_steps);
    for t in 0..trajectory.num_steps() {
        let strand_a = trajectory.strand_a().frame(t);
        let strand_b = trajectory.strand_b().frame(t);
        for j in 0..num_bp_steps {
            let midpoint = step_midpoint(strand_a, strand_b, j, topology).ok_or_else(|| {
                EngineError::Internal(format!("step {} has no closing base pair", j))
            })?;
            data.push(midpoint);
        }
    }

    let midpoints = TrajectoryArray::from_vec(trajectory.num_steps(), num_bp_steps, data)?;
    info!(
        timesteps = midpoints.num_steps(),
        steps = midpoints.frame_len(),
        "Midpoints computed."
    );
    context.reporter.report(Progress::PhaseFinish { undefined: 0 });
    Ok(midpoints)
}
