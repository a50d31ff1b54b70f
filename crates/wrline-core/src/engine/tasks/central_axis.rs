use crate::core::models::topology::Topology;
use crate::core::models::trajectory::TrajectoryArray;
use crate::engine::context::AnalysisContext;
use crate::engine::error::{EngineError, IssueKind};
use crate::engine::progress::Progress;
use crate::engine::state::{StageOutput, collect_step_results};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const STAGE: &str = "central axis";

/// Accumulated twist, in degrees, that one averaging window must span.
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Running-average window of one step: `half_width` flanking steps on each
/// side, the outermost pair counted with `weight`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentralAxisWindow {
    pub half_width: usize,
    /// Fraction of the outermost pair needed to reach exactly one full turn,
    /// in `(0, 1]`.
    pub weight: f64,
}

impl CentralAxisWindow {
    /// Sum of all weights in the window: the centre, `half_width - 1` full
    /// pairs, and the partial outermost pair.
    pub fn total_weight(&self) -> f64 {
        2.0 * (self.half_width as f64 + self.weight) - 1.0
    }
}

fn flanks(j: usize, k: usize, len: usize, topology: Topology) -> Option<(usize, usize)> {
    let k = k as isize;
    Some((topology.neighbor(j, -k, len)?, topology.neighbor(j, k, len)?))
}

fn defined(value: Option<f64>) -> Result<f64, IssueKind> {
    value.ok_or(IssueKind::DependsOnUndefined { stage: "twist" })
}

/// Grows the window around step `j` until the accumulated twist first reaches
/// one full turn.
///
/// # Errors
///
/// [`IssueKind::TopologyExhausted`] if neighbours run out first: at either end
/// of a linear duplex, or after a full lap of a circular one.
pub fn find_window(
    twist: &[Option<f64>],
    j: usize,
    topology: Topology,
) -> Result<CentralAxisWindow, IssueKind> {
    let len = twist.len();
    let mut total = defined(twist[j])?;
    let mut prev = total;
    let mut k = 0;

    while total < FULL_TURN_DEGREES {
        let exhausted = IssueKind::TopologyExhausted {
            half_width: k,
            accumulated_twist: total,
        };
        if k >= len {
            return Err(exhausted);
        }
        let (behind, ahead) = flanks(j, k + 1, len, topology).ok_or(exhausted)?;
        k += 1;
        prev = total;
        total += defined(twist[behind])? + defined(twist[ahead])?;
    }

    let weight = if k == 0 {
        1.0
    } else {
        (FULL_TURN_DEGREES - prev) / (total - prev)
    };
    Ok(CentralAxisWindow {
        half_width: k,
        weight,
    })
}

/// Weighted average of `midpoints` over `window` centred on step `j`.
pub fn window_average(
    midpoints: &[Point3<f64>],
    j: usize,
    window: CentralAxisWindow,
    topology: Topology,
) -> Result<Point3<f64>, IssueKind> {
    let len = midpoints.len();
    let mut sum: Vector3<f64> = midpoints[j].coords;
    let mut outer = Vector3::zeros();

    for k in 1..=window.half_width {
        let (behind, ahead) = flanks(j, k, len, topology).ok_or(IssueKind::OpenEnd)?;
        outer = midpoints[behind].coords + midpoints[ahead].coords;
        sum += outer;
    }
    sum -= (1.0 - window.weight) * outer;

    Ok(Point3::from(sum / window.total_weight()))
}

fn axis_frame(
    midpoints: &[Point3<f64>],
    twist: &[Option<f64>],
    topology: Topology,
) -> Vec<Result<Point3<f64>, IssueKind>> {
    (0..midpoints.len())
        .map(|j| {
            let window = find_window(twist, j, topology)?;
            window_average(midpoints, j, window, topology)
        })
        .collect()
}

/// Twist-normalised central axis: each step averaged over exactly one helical turn.
#[instrument(skip_all, name = "central_axis_task")]
pub fn run(
    midpoints: &TrajectoryArray<Point3<f64>>,
    twist: &TrajectoryArray<Option<f64>>,
    context: &AnalysisContext,
) -> Result<StageOutput<TrajectoryArray<Option<Point3<f64>>>>, EngineError> {
    if midpoints.shape() != twist.shape() {
        return Err(EngineError::Internal(format!(
            "midpoints {:?} and twist {:?} differ in shape",
            midpoints.shape(),
            twist.shape()
        )));
    }

    info!("Calculating central helical axis.");
    context.reporter.report(Progress::PhaseStart {
        name: "Central helical axis",
    });
    context.reporter.report(Progress::TaskStart {
        total: midpoints.num_steps() as u64,
    });
    let topology = context.topology();

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..midpoints.num_steps();

    #[cfg(feature = "parallel")]
    let iterator = (0..midpoints.num_steps()).into_par_iter();

    let frames: Vec<Vec<Result<Point3<f64>, IssueKind>>> = iterator
        .map(|t| {
            let frame = axis_frame(midpoints.frame(t), twist.frame(t), topology);
            debug!(timestep = t, "Central axis frame done.");
            context.reporter.report(Progress::TaskIncrement { amount: 1 });
            frame
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);
    let output = collect_step_results(STAGE, frames)?;
    info!(
        coordinate_sum = output.values.coordinate_sum(),
        undefined = output.issues.len(),
        "Central axis finished."
    );
    context.reporter.report(Progress::PhaseFinish {
        undefined: output.issues.len(),
    });
    Ok(output)
}
