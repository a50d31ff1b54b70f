use crate::core::models::trajectory::{ShapeError, Trajectory};
use crate::engine::config::AnalysisConfig;
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::AnalysisResult;
use crate::engine::tasks;
use tracing::{info, instrument, warn};

/// Runs every stage over `trajectory`.
///
/// Stages run in dependency order, each consuming the immutable output of the
/// previous ones. Values that cannot be computed are left undefined and listed
/// in [`AnalysisResult::issues`]; they do not stop the run.
///
/// # Errors
///
/// [`EngineError::ShapeMismatch`] if the trajectory dimensions differ from the
/// configured ones. This is checked before any stage runs.
#[instrument(skip_all, name = "analysis_workflow", fields(name = %config.name))]
pub fn run(
    trajectory: &Trajectory,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    let expected = config.layout();
    let found = trajectory.layout();
    if found != expected {
        return Err(ShapeError {
            expected: format!("{} base pairs x {} timesteps", expected.num_bp, expected.num_steps),
            found: format!("{} base pairs x {} timesteps", found.num_bp, found.num_steps),
        }
        .into());
    }

    info!(
        num_bp = config.num_bp,
        num_steps = config.num_steps,
        topology = %config.topology,
        "Starting helical-axis analysis."
    );
    reporter.report(Progress::Message(format!(
        "Analysing {} base pairs over {} timesteps ({})",
        config.num_bp, config.num_steps, config.topology
    )));
    let context = AnalysisContext::new(config, reporter);

    // === Phase 1: First-order axis ===
    let midpoints = tasks::midpoints::run(trajectory, &context)?;
    let helix_axis = tasks::helix_axis::run(&midpoints, &context)?;

    // === Phase 2: Twist and the twist-normalised axis ===
    let twist = tasks::twist::run(trajectory, &helix_axis, &context)?;
    let central_axis = tasks::central_axis::run(&midpoints, &twist.values, &context)?;

    // === Phase 3: Observables of the central axis ===
    let sin_register = tasks::register::run(&midpoints, &central_axis.values, &context)?;
    let writhe = tasks::writhe::run(&central_axis.values, &context);

    let issues: Vec<_> = twist
        .issues
        .into_iter()
        .chain(central_axis.issues)
        .chain(sin_register.issues)
        .chain(writhe.issues)
        .collect();

    if issues.is_empty() {
        info!("Analysis complete; every value is defined.");
    } else {
        warn!(
            undefined = issues.len(),
            "Analysis complete with undefined values."
        );
    }

    Ok(AnalysisResult {
        midpoints,
        helix_axis,
        twist: twist.values,
        central_axis: central_axis.values,
        sin_register: sin_register.values,
        writhe: writhe.values,
        issues,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::Topology;
    use crate::core::models::trajectory::TrajectoryLayout;
    use crate::engine::config::AnalysisConfigBuilder;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::TAU;
    use std::sync::Mutex;

    const RISE: f64 = 3.4;
    const BACKBONE_RADIUS: f64 = 5.0;

    fn trajectory_from_strands(strand_a: Vec<Point3<f64>>, strand_b: Vec<Point3<f64>>) -> Trajectory {
        let layout = TrajectoryLayout::new(strand_a.len(), 1);
        let mut atoms = strand_a;
        atoms.extend(strand_b.into_iter().rev());
        Trajectory::from_atoms(layout, &atoms).unwrap()
    }

    /// Planar minicircle with `turns` right-handed helical turns.
    fn minicircle(num_bp: usize, turns: usize) -> Trajectory {
        let radius = num_bp as f64 * RISE / TAU;
        let twist = TAU * turns as f64 / num_bp as f64;
        let (mut strand_a, mut strand_b) = (Vec::new(), Vec::new());
        for i in 0..num_bp {
            let theta = TAU * i as f64 / num_bp as f64;
            let outward = Vector3::new(theta.cos(), theta.sin(), 0.0);
            let centre = Point3::from(radius * outward);
            let phi = twist * i as f64;
            let offset = BACKBONE_RADIUS * (phi.cos() * Vector3::z() + phi.sin() * outward);
            strand_a.push(centre + offset);
            strand_b.push(centre - offset);
        }
        trajectory_from_strands(strand_a, strand_b)
    }

    fn straight_duplex(num_bp: usize, twist_deg: f64) -> Trajectory {
        let (mut strand_a, mut strand_b) = (Vec::new(), Vec::new());
        for i in 0..num_bp {
            let angle = (i as f64 * twist_deg).to_radians();
            let z = RISE * i as f64;
            strand_a.push(Point3::new(BACKBONE_RADIUS * angle.cos(), BACKBONE_RADIUS * angle.sin(), z));
            strand_b.push(Point3::new(-BACKBONE_RADIUS * angle.cos(), -BACKBONE_RADIUS * angle.sin(), z));
        }
        trajectory_from_strands(strand_a, strand_b)
    }

    fn config_for(trajectory: &Trajectory, topology: Topology) -> AnalysisConfig {
        AnalysisConfigBuilder::new()
            .name("test")
            .num_bp(trajectory.num_bp())
            .num_steps(trajectory.num_steps())
            .topology(topology)
            .build()
            .unwrap()
    }

    #[test]
    fn planar_minicircle_is_fully_defined() {
        let trajectory = minicircle(40, 4);
        let config = config_for(&trajectory, Topology::Circular);

        let result = run(&trajectory, &config, &ProgressReporter::new()).unwrap();

        assert!(result.is_complete(), "issues: {:?}", result.issues);
        assert_eq!(result.midpoints.shape(), (1, 40));
        assert_eq!(result.central_axis.shape(), (1, 40));
        assert_eq!(result.sin_register.shape(), (1, 40));
        assert_eq!(result.writhe.len(), 1);
    }

    #[test]
    fn planar_minicircle_twist_adds_up_to_its_turns() {
        let trajectory = minicircle(40, 4);
        let config = config_for(&trajectory, Topology::Circular);

        let result = run(&trajectory, &config, &ProgressReporter::new()).unwrap();

        for value in result.twist.frame(0) {
            assert!((value.unwrap() - 36.0).abs() < 0.5, "got {value:?}");
        }
        assert!((result.twist.defined_sum() - 4.0 * 360.0).abs() < 1e-6);
    }

    #[test]
    fn planar_minicircle_has_zero_writhe_and_outward_grooves() {
        let trajectory = minicircle(40, 4);
        let config = config_for(&trajectory, Topology::Circular);

        let result = run(&trajectory, &config, &ProgressReporter::new()).unwrap();

        assert!(result.writhe[0].unwrap().abs() < 1e-9);
        // The central axis lies inside the ring of midpoints, so every groove
        // vector points away from the centre of curvature.
        for value in result.sin_register.frame(0) {
            assert!((value.unwrap() + 1.0).abs() < 1e-9, "got {value:?}");
        }
    }

    #[test]
    fn linear_duplex_leaves_ends_undefined() {
        let trajectory = straight_duplex(30, 34.0);
        let config = config_for(&trajectory, Topology::Linear);

        let result = run(&trajectory, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(result.central_axis.frame_len(), 29);
        let central_axis = result.central_axis.frame(0);
        for (j, point) in central_axis.iter().enumerate() {
            assert_eq!(point.is_some(), (5..=23).contains(&j), "step {j}");
        }
        let register = result.sin_register.frame(0);
        assert!(register[..=5].iter().all(Option::is_none));
        assert!(register[23..].iter().all(Option::is_none));
        assert!(result.writhe[0].unwrap().abs() < 1e-9);
        assert!(!result.is_complete());
    }

    #[test]
    fn mismatched_dimensions_fail_before_any_stage() {
        let trajectory = minicircle(40, 4);
        let config = AnalysisConfigBuilder::new()
            .name("test")
            .num_bp(41)
            .num_steps(1)
            .build()
            .unwrap();
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| events.lock().unwrap().push(p)));

        let result = run(&trajectory, &config, &reporter);

        assert!(matches!(result, Err(EngineError::ShapeMismatch(_))));
        drop(reporter);
        assert!(events.into_inner().unwrap().is_empty());
    }

    #[test]
    fn every_stage_reports_its_phase() {
        let trajectory = minicircle(40, 4);
        let config = config_for(&trajectory, Topology::Circular);
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|p| {
            if let Progress::PhaseStart { name } = p {
                events.lock().unwrap().push(name);
            }
        }));

        run(&trajectory, &config, &reporter).unwrap();
        drop(reporter);

        assert_eq!(events.into_inner().unwrap().len(), 6);
    }
}
