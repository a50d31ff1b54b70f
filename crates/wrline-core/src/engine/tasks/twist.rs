use crate::core::models::topology::Topology;
use crate::core::models::trajectory::{Trajectory, TrajectoryArray};
use crate::core::utils::geometry;
use crate::engine::context::AnalysisContext;
use crate::engine::error::{EngineError, IssueKind};
use crate::engine::progress::Progress;
use crate::engine::state::{StageOutput, collect_step_results};
use crate::engine::tasks::helix_axis::local_direction;
use nalgebra::Point3;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const STAGE: &str = "twist";

/// Twist of step `j` in one timestep: the angle between base-pair vectors
/// `A[j] -> B[j]` and `A[j+1] -> B[j+1]` about the local helical axis.
pub fn step_twist(
    strand_a: &[Point3<f64>],
    strand_b: &[Point3<f64>],
    helix_axis: &[Point3<f64>],
    j: usize,
    topology: Topology,
) -> Result<f64, IssueKind> {
    let next = topology
        .neighbor(j, 1, strand_a.len())
        .ok_or(IssueKind::OpenEnd)?;
    let z = local_direction(helix_axis, j, topology).ok_or(IssueKind::OpenEnd)?;

    Ok(geometry::twist(
        &strand_a[j],
        &strand_b[j],
        &strand_a[next],
        &strand_b[next],
        &z,
    )?)
}

/// Local twist, in degrees, of every base-pair step in every timestep.
#[instrument(skip_all, name = "twist_task")]
pub fn run(
    trajectory: &Trajectory,
    helix_axis: &TrajectoryArray<Point3<f64>>,
    context: &AnalysisContext,
) -> Result<StageOutput<TrajectoryArray<Option<f64>>>, EngineError> {
    info!("Calculating twist.");
    context.reporter.report(Progress::PhaseStart { name: "Twist" });
    context.reporter.report(Progress::TaskStart {
        total: trajectory.num_steps() as u64,
    });
    let topology = context.topology();

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..trajectory.num_steps();

    #[cfg(feature = "parallel")]
    let iterator = (0..trajectory.num_steps()).into_par_iter();

    let frames: Vec<Vec<Result<f64, IssueKind>>> = iterator
        .map(|t| {
            let strand_a = trajectory.strand_a().frame(t);
            let strand_b = trajectory.strand_b().frame(t);
            let axis = helix_axis.frame(t);
            let frame: Vec<_> = (0..axis.len())
                .map(|j| step_twist(strand_a, strand_b, axis, j, topology))
                .collect();
            debug!(timestep = t, "Twist frame done.");
            context.reporter.report(Progress::TaskIncrement { amount: 1 });
            frame
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);
    let output = collect_step_results(STAGE, frames)?;
    info!(
        total_twist = output.values.defined_sum(),
        undefined = output.issues.len(),
        "Twist finished."
    );
    context.reporter.report(Progress::PhaseFinish {
        undefined: output.issues.len(),
    });
    Ok(output)
}
