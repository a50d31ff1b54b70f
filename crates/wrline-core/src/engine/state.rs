use crate::core::models::trajectory::TrajectoryArray;
use crate::engine::error::{EngineError, IssueKind, StepIssue};
use nalgebra::Point3;
use tracing::warn;

/// Log target of the per-value warnings emitted when a stage leaves an entry
/// undefined.
pub const ISSUE_TARGET: &str = "wrline::issues";

/// Values produced by one stage, with an issue recorded for every entry the
/// stage left undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct StageOutput<V> {
    pub values: V,
    pub issues: Vec<StepIssue>,
}

impl<V> StageOutput<V> {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Assembles per-timestep results of a per-step stage.
///
/// Failed entries become `None` and are recorded, in (timestep, step) order, as
/// [`StepIssue`]s. Other entries are untouched.
pub(crate) fn collect_step_results<T>(
    stage: &'static str,
    frames: Vec<Vec<Result<T, IssueKind>>>,
) -> Result<StageOutput<TrajectoryArray<Option<T>>>, EngineError> {
    let mut issues = Vec::new();
    let frames: Vec<Vec<Option<T>>> = frames
        .into_iter()
        .enumerate()
        .map(|(timestep, frame)| {
            frame
                .into_iter()
                .enumerate()
                .map(|(step, result)| match result {
                    Ok(value) => Some(value),
                    Err(kind) => {
                        let issue = StepIssue {
                            stage,
                            timestep,
                            step: Some(step),
                            kind,
                        };
                        warn!(target: ISSUE_TARGET, "{}", issue);
                        issues.push(issue);
                        None
                    }
                })
                .collect()
        })
        .collect();

    Ok(StageOutput {
        values: TrajectoryArray::from_frames(frames)?,
        issues,
    })
}

/// Assembles results of a stage that yields one value per timestep.
pub(crate) fn collect_timestep_results<T>(
    stage: &'static str,
    results: Vec<Result<T, IssueKind>>,
) -> StageOutput<Vec<Option<T>>> {
    let mut issues = Vec::new();
    let values = results
        .into_iter()
        .enumerate()
        .map(|(timestep, result)| match result {
            Ok(value) => Some(value),
            Err(kind) => {
                let issue = StepIssue {
                    stage,
                    timestep,
                    step: None,
                    kind,
                };
                warn!(target: ISSUE_TARGET, "{}", issue);
                issues.push(issue);
                None
            }
        })
        .collect();
    StageOutput { values, issues }
}

/// Every array the analysis produces for one trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub midpoints: TrajectoryArray<Point3<f64>>,
    pub helix_axis: TrajectoryArray<Point3<f64>>,
    /// Local twist in degrees.
    pub twist: TrajectoryArray<Option<f64>>,
    pub central_axis: TrajectoryArray<Option<Point3<f64>>>,
    /// Sine of the register angle.
    pub sin_register: TrajectoryArray<Option<f64>>,
    pub writhe: Vec<Option<f64>>,
    pub issues: Vec<StepIssue>,
}

impl AnalysisResult {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::GeometryError;

    #[test]
    fn collect_step_results_records_failures_without_touching_neighbours() {
        let frames = vec![
            vec![Ok(1.0), Err(IssueKind::OpenEnd), Ok(3.0)],
            vec![Ok(4.0), Ok(5.0), Ok(6.0)],
        ];

        let output = collect_step_results("twist", frames).unwrap();

        assert_eq!(output.values.frame(0), &[Some(1.0), None, Some(3.0)]);
        assert_eq!(output.values.frame(1), &[Some(4.0), Some(5.0), Some(6.0)]);
        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.issues[0].timestep, 0);
        assert_eq!(output.issues[0].step, Some(1));
        assert!(!output.is_complete());
    }

    #[test]
    fn collect_timestep_results_has_no_step_index() {
        let results = vec![
            Ok(0.5),
            Err(IssueKind::DegenerateGeometry(GeometryError::DegenerateVector {
                what: "segment separation",
            })),
        ];

        let output = collect_timestep_results("writhe", results);

        assert_eq!(output.values, vec![Some(0.5), None]);
        assert_eq!(output.issues[0].step, None);
        assert_eq!(output.issues[0].timestep, 1);
    }
}
