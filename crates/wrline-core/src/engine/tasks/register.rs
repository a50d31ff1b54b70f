use crate::core::models::topology::Topology;
use crate::core::models::trajectory::TrajectoryArray;
use crate::core::utils::geometry::{self, GeometryError};
use crate::engine::context::AnalysisContext;
use crate::engine::error::{EngineError, IssueKind};
use crate::engine::progress::Progress;
use crate::engine::state::{StageOutput, collect_step_results};
use nalgebra::{Point3, Vector3};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const STAGE: &str = "register angle";

/// Axis neighbourhood of one step: the index of the previous step and the
/// three axis points around step `j`.
fn bending_points(
    central_axis: &[Option<Point3<f64>>],
    j: usize,
    topology: Topology,
) -> Result<(usize, [Point3<f64>; 3]), IssueKind> {
    let len = central_axis.len();
    let m0 = topology.neighbor(j, -1, len).ok_or(IssueKind::OpenEnd)?;
    let m2 = topology.neighbor(j, 1, len).ok_or(IssueKind::OpenEnd)?;
    let axis_at = |i: usize| {
        central_axis[i].ok_or(IssueKind::DependsOnUndefined {
            stage: super::central_axis::STAGE,
        })
    };
    Ok((m0, [axis_at(m0)?, axis_at(j)?, axis_at(m2)?]))
}

fn signed_sine(normal_len: f64, groove_len: f64, cross_len: f64, facing: f64) -> Result<f64, IssueKind> {
    for (length, what) in [(normal_len, "bending-plane normal"), (groove_len, "minor-groove")] {
        if length == 0.0 || !length.is_finite() {
            return Err(GeometryError::DegenerateVector { what }.into());
        }
    }
    let magnitude = (cross_len / (groove_len * normal_len)).min(1.0);
    Ok(if facing < 0.0 { -magnitude } else { magnitude })
}

/// Sine of the register angle of every step in one timestep.
///
/// For step `j` the axis points `j - 1`, `j`, `j + 1` span the local bending
/// plane. The magnitude is the sine of the angle between the minor-groove
/// vector of step `j - 1` and the plane normal; it is positive when the minor
/// groove faces the inside of the bend. A straight axis segment has no bending
/// plane and is reported as degenerate.
///
/// # Errors
///
/// Returns [`GeometryError::ShapeMismatch`] if `midpoints` and `central_axis`
/// differ in length. Per-step failures are returned in place.
pub fn frame_register(
    midpoints: &[Point3<f64>],
    central_axis: &[Option<Point3<f64>>],
    topology: Topology,
) -> Result<Vec<Result<f64, IssueKind>>, GeometryError> {
    if midpoints.len() != central_axis.len() {
        return Err(GeometryError::ShapeMismatch {
            left: midpoints.len(),
            right: central_axis.len(),
        });
    }

    let mut resolved = Vec::with_capacity(central_axis.len());
    let mut tangent0 = Vec::new();
    let mut tangent1 = Vec::new();
    let mut grooves = Vec::new();
    for j in 0..central_axis.len() {
        match bending_points(central_axis, j, topology) {
            Ok((m0, [c0, c1, c2])) => {
                tangent0.push(c1 - c0);
                tangent1.push(c2 - c1);
                grooves.push(midpoints[m0] - c0);
                resolved.push(Ok(()));
            }
            Err(kind) => resolved.push(Err(kind)),
        }
    }

    let normals = geometry::cross(&tangent1, &tangent0)?;
    let groove_x_normal = geometry::cross(&grooves, &normals)?;
    let bends: Vec<Vector3<f64>> = tangent1.iter().zip(&tangent0).map(|(t1, t0)| t1 - t0).collect();
    let facing = geometry::dot(&bends, &grooves)?;
    let normal_len = geometry::norm(&normals);
    let groove_len = geometry::norm(&grooves);
    let cross_len = geometry::norm(&groove_x_normal);

    let mut k = 0;
    Ok(resolved
        .into_iter()
        .map(|step| {
            step.and_then(|()| {
                let i = k;
                k += 1;
                signed_sine(normal_len[i], groove_len[i], cross_len[i], facing[i])
            })
        })
        .collect())
}

/// Register angle (as its sine) of every base-pair step in every timestep.
#[instrument(skip_all, name = "register_task")]
pub fn run(
    midpoints: &TrajectoryArray<Point3<f64>>,
    central_axis: &TrajectoryArray<Option<Point3<f64>>>,
    context: &AnalysisContext,
) -> Result<StageOutput<TrajectoryArray<Option<f64>>>, EngineError> {
    if midpoints.num_steps() != central_axis.num_steps() {
        return Err(EngineError::Internal(format!(
            "midpoints cover {} timesteps but the central axis covers {}",
            midpoints.num_steps(),
            central_axis.num_steps()
        )));
    }

    info!("Calculating register angles.");
    context.reporter.report(Progress::PhaseStart {
        name: "Register angles",
    });
    context.reporter.report(Progress::TaskStart {
        total: midpoints.num_steps() as u64,
    });
    let topology = context.topology();

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..midpoints.num_steps();

    #[cfg(feature = "parallel")]
    let iterator = (0..midpoints.num_steps()).into_par_iter();

    let frames = iterator
        .map(|t| {
            let frame = frame_register(midpoints.frame(t), central_axis.frame(t), topology);
            debug!(timestep = t, "Register frame done.");
            context.reporter.report(Progress::TaskIncrement { amount: 1 });
            frame
        })
        .collect::<Result<Vec<_>, GeometryError>>()?;

    context.reporter.report(Progress::TaskFinish);
    let output = collect_step_results(STAGE, frames)?;
    info!(undefined = output.issues.len(), "Register angles finished.");
    context.reporter.report(Progress::PhaseFinish {
        undefined: output.issues.len(),
    });
    Ok(output)
}
