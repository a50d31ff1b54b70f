use crate::core::models::topology::Topology;
use crate::core::models::trajectory::TrajectoryArray;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use nalgebra::{Point3, Vector3};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Neighbours averaged on each side of a step: 11 steps, almost one helical turn.
pub const HALF_WINDOW: usize = 5;

/// Unweighted running average of `midpoints` around step `j`.
///
/// Linear neighbours past either end are skipped and the divisor shrinks with
/// them; circular neighbours wrap.
pub fn averaged_point(midpoints: &[Point3<f64>], j: usize, topology: Topology) -> Point3<f64> {
    let len = midpoints.len();
    let mut sum = midpoints[j].coords;
    let mut count = 1usize;
    for k in 1..=HALF_WINDOW as isize {
        for offset in [-k, k] {
            if let Some(i) = topology.neighbor(j, offset, len) {
                sum += midpoints[i].coords;
                count += 1;
            }
        }
    }
    Point3::from(sum / count as f64)
}

fn axis_frame(midpoints: &[Point3<f64>], topology: Topology) -> Vec<Point3<f64>> {
    (0..midpoints.len())
        .map(|j| averaged_point(midpoints, j, topology))
        .collect()
}

/// First-order helical axis, used only as the reference direction for twist.
#[instrument(skip_all, name = "helix_axis_task")]
pub fn run(
    midpoints: &TrajectoryArray<Point3<f64>>,
    context: &AnalysisContext,
) -> Result<TrajectoryArray<Point3<f64>>, EngineError> {
    info!("Calculating first-order helical axis.");
    context.reporter.report(Progress::PhaseStart {
        name: "First-order helical axis",
    });
    context.reporter.report(Progress::TaskStart {
        total: midpoints.num_steps() as u64,
    });
    let topology = context.topology();

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..midpoints.num_steps();

    #[cfg(feature = "parallel")]
    let iterator = (0..midpoints.num_steps()).into_par_iter();

    let frames: Vec<Vec<Point3<f64>>> = iterator
        .map(|t| {
            let frame = axis_frame(midpoints.frame(t), topology);
            context.reporter.report(Progress::TaskIncrement { amount: 1 });
            frame
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);
    context.reporter.report(Progress::PhaseFinish { undefined: 0 });
    Ok(TrajectoryArray::from_frames(frames)?)
}

/// Direction of the axis through step `j`, from its two neighbours.
///
/// Linear ends use a one-sided difference.
pub fn local_direction(axis: &[Point3<f64>], j: usize, topology: Topology) -> Option<Vector3<f64>> {
    let len = axis.len();
    let ahead = topology.clamped_neighbor(j, 1, len)?;
    let behind = topology.clamped_neighbor(j, -1, len)?;
    Some(axis[ahead] - axis[behind])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point3<f64>> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn circular_average_uses_eleven_points() {
        let mut points = vec![Point3::origin(); 20];
        points[0] = Point3::new(11.0, 0.0, 0.0);

        for j in [0, 5, 15] {
            assert_eq!(averaged_point(&points, j, Topology::Circular).x, 1.0);
        }
        assert_eq!(averaged_point(&points, 6, Topology::Circular).x, 0.0);
        assert_eq!(averaged_point(&points, 14, Topology::Circular).x, 0.0);
    }

    #[test]
    fn linear_average_shrinks_divisor_at_ends() {
        let points = line(20);
        // j = 0 averages indices 0..=5.
        assert_eq!(averaged_point(&points, 0, Topology::Linear).x, 2.5);
        // j = 19 averages indices 14..=19.
        assert_eq!(averaged_point(&points, 19, Topology::Linear).x, 16.5);
        // Interior points of a straight, evenly spaced line stay in place.
        assert_eq!(averaged_point(&points, 10, Topology::Linear).x, 10.0);
    }

    #[test]
    fn circular_average_of_evenly_spaced_ring_shrinks_toward_centre() {
        let n = 36;
        let ring: Vec<_> = (0..n)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / n as f64;
                Point3::new(10.0 * angle.cos(), 10.0 * angle.sin(), 0.0)
            })
            .collect();

        let averaged = axis_frame(&ring, Topology::Circular);

        let radius = averaged[0].coords.norm();
        assert!(radius < 10.0);
        for p in &averaged {
            assert!((p.coords.norm() - radius).abs() < 1e-9);
        }
    }

    #[test]
    fn local_direction_is_central_difference_with_clamped_linear_ends() {
        let points = line(5);
        assert_eq!(
            local_direction(&points, 2, Topology::Linear),
            Some(Vector3::new(2.0, 0.0, 0.0))
        );
        assert_eq!(
            local_direction(&points, 0, Topology::Linear),
            Some(Vector3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(
            local_direction(&points, 0, Topology::Circular),
            Some(Vector3::new(-3.0, 0.0, 0.0))
        );
    }
}
