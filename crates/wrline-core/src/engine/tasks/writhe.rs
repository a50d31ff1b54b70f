use crate::core::models::topology::Topology;
use crate::core::models::trajectory::TrajectoryArray;
use crate::core::utils::geometry::GeometryError;
use crate::engine::context::AnalysisContext;
use crate::engine::error::IssueKind;
use crate::engine::progress::Progress;
use crate::engine::state::{StageOutput, collect_timestep_results};
use itertools::Itertools;
use nalgebra::Point3;
use std::f64::consts::TAU;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub const STAGE: &str = "writhe";

/// Discretised Gauss double integral over every pair of segments of a polyline.
///
/// With `closed` the last point is joined back to the first.
///
/// # Errors
///
/// [`IssueKind::DegenerateGeometry`] if two segment start points coincide.
pub fn writhe(points: &[Point3<f64>], closed: bool) -> Result<f64, IssueKind> {
    let mut path = points.to_vec();
    if closed {
        if let Some(&head) = points.first() {
            path.push(head);
        }
    }

    let tangents: Vec<_> = path.windows(2).map(|w| w[1] - w[0]).collect();

    tangents
        .iter()
        .enumerate()
        .tuple_combinations()
        .try_fold(0.0, |acc, ((k, tk), (j, tj))| {
            let separation = path[j] - path[k];
            let distance = separation.norm();
            if distance == 0.0 {
                return Err(IssueKind::from(GeometryError::DegenerateVector {
                    what: "segment separation",
                }));
            }
            Ok(acc + separation.dot(&tj.cross(tk)) / (distance.powi(3) * TAU))
        })
}

/// Writhe of one timestep of the central axis.
///
/// A linear axis is trimmed to its defined run; circular axes and the
/// interior of linear ones must be fully defined.
pub fn frame_writhe(frame: &[Option<Point3<f64>>], topology: Topology) -> Result<f64, IssueKind> {
    let undefined = IssueKind::DependsOnUndefined {
        stage: super::central_axis::STAGE,
    };
    let run = match topology {
        Topology::Circular => frame,
        Topology::Linear => {
            let start = frame.iter().position(Option::is_some).ok_or(undefined.clone())?;
            let end = frame.iter().rposition(Option::is_some).ok_or(undefined.clone())?;
            &frame[start..=end]
        }
    };

    let points: Option<Vec<Point3<f64>>> = run.iter().copied().collect();
    let points = points.ok_or(undefined)?;
    writhe(&points, topology.is_circular())
}

fn run_frames(
    frames: Vec<Vec<Option<Point3<f64>>>>,
    context: &AnalysisContext,
) -> StageOutput<Vec<Option<f64>>> {
    info!("Calculating writhe.");
    context.reporter.report(Progress::PhaseStart { name: "Writhe" });
    context.reporter.report(Progress::TaskStart {
        total: frames.len() as u64,
    });
    let topology = context.topology();

    #[cfg(not(feature = "parallel"))]
    let iterator = frames.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = frames.par_iter().enumerate();

    let results: Vec<Result<f64, IssueKind>> = iterator
        .map(|(t, frame)| {
            let result = frame_writhe(frame, topology);
            debug!(timestep = t, writhe = ?result.as_ref().ok(), "Writhe frame done.");
            context.reporter.report(Progress::TaskIncrement { amount: 1 });
            result
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);
    let output = collect_timestep_results(STAGE, results);
    info!(undefined = output.issues.len(), "Writhe finished.");
    context.reporter.report(Progress::PhaseFinish {
        undefined: output.issues.len(),
    });
    output
}

/// Writhe of the central axis at every timestep.
#[instrument(skip_all, name = "writhe_task")]
pub fn run(
    central_axis: &TrajectoryArray<Option<Point3<f64>>>,
    context: &AnalysisContext,
) -> StageOutput<Vec<Option<f64>>> {
    run_frames(central_axis.frames().map(<[_]>::to_vec).collect(), context)
}

/// Writhe of an axis read back from disk, where undefined points were stored
/// as `nan`.
#[instrument(skip_all, name = "writhe_task")]
pub fn run_on_points(
    axis: &TrajectoryArray<Point3<f64>>,
    context: &AnalysisContext,
) -> StageOutput<Vec<Option<f64>>> {
    let frames = axis
        .frames()
        .map(|frame| {
            frame
                .iter()
                .map(|p| p.coords.iter().all(|c| c.is_finite()).then_some(*p))
                .collect()
        })
        .collect();
    run_frames(frames, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::AnalysisConfigBuilder;
    use crate::engine::progress::ProgressReporter;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    /// Circle of radius 10 with a three-fold out-of-plane and radial ripple.
    fn rippled_ring(n: usize, mirror: bool) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| {
                let t = TAU * i as f64 / n as f64;
                let r = 10.0 + 2.0 * (3.0 * t).cos();
                let z = 2.0 * (3.0 * t).sin();
                Point3::new(r * t.cos(), r * t.sin(), if mirror { -z } else { z })
            })
            .collect()
    }

    #[test]
    fn open_right_angled_path_has_single_contribution() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ];

        let value = writhe(&points, false).unwrap();

        assert!(f64_approx_equal(value, 1.0 / (4.0 * 2f64.sqrt() * PI)));
        assert!(f64_approx_equal(value, 0.05626976975981912));
    }

    #[test]
    fn planar_closed_curve_has_zero_writhe() {
        let points: Vec<_> = (0..50)
            .map(|i| {
                let t = TAU * i as f64 / 50.0;
                Point3::new(10.0 * t.cos(), 6.0 * t.sin(), 0.0)
            })
            .collect();

        assert!(writhe(&points, true).unwrap().abs() < TOLERANCE);
    }

    #[test]
    fn rippled_ring_matches_reference_value() {
        let value = writhe(&rippled_ring(60, false), true).unwrap();
        assert!((value - -0.38447848266702017).abs() < 1e-9);
    }

    #[test]
    fn mirror_image_flips_sign() {
        let value = writhe(&rippled_ring(60, false), true).unwrap();
        let mirrored = writhe(&rippled_ring(60, true), true).unwrap();
        assert!((value + mirrored).abs() < 1e-9);
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];

        assert_eq!(
            writhe(&points, false),
            Err(IssueKind::DegenerateGeometry(GeometryError::DegenerateVector {
                what: "segment separation"
            }))
        );
    }

    #[test]
    fn linear_frame_trims_undefined_ends() {
        let ring = rippled_ring(20, false);
        let mut frame: Vec<_> = ring.iter().copied().map(Some).collect();
        frame[0] = None;
        frame[19] = None;

        let value = frame_writhe(&frame, Topology::Linear).unwrap();

        assert!(f64_approx_equal(value, writhe(&ring[1..19], false).unwrap()));
    }

    #[test]
    fn interior_gap_or_circular_gap_is_undefined() {
        let mut frame: Vec<_> = rippled_ring(20, false).into_iter().map(Some).collect();
        frame[0] = None;
        assert_eq!(
            frame_writhe(&frame, Topology::Circular),
            Err(IssueKind::DependsOnUndefined {
                stage: "central axis"
            })
        );

        frame[0] = frame[1];
        frame[10] = None;
        assert!(frame_writhe(&frame, Topology::Linear).is_err());
    }

    #[test]
    fn run_on_points_treats_nan_as_undefined() {
        let mut points = rippled_ring(30, false);
        points.extend(rippled_ring(30, true));
        points[45] = Point3::new(f64::NAN, f64::NAN, f64::NAN);
        let axis = TrajectoryArray::from_vec(2, 30, points).unwrap();
        let config = AnalysisConfigBuilder::new()
            .name("ring")
            .num_bp(30)
            .num_steps(2)
            .build()
            .unwrap();
        let reporter = ProgressReporter::new();
        let context = AnalysisContext::new(&config, &reporter);

        let output = run_on_points(&axis, &context);

        assert!(output.values[0].is_some());
        assert_eq!(output.values[1], None);
        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.issues[0].timestep, 1);
    }
}
