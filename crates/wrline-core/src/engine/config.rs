use crate::core::models::topology::Topology;
use crate::core::models::trajectory::TrajectoryLayout;
use thiserror::Error;

/// Fewest base pairs for which the twist reference axis `H[j+1] - H[j-1]` is
/// not identically zero.
pub const MIN_BASE_PAIRS: usize = 3;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Everything the analysis needs to know about a run besides the coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Identifier of the run; used only to group output files.
    pub name: String,
    pub num_bp: usize,
    pub num_steps: usize,
    pub topology: Topology,
}

impl AnalysisConfig {
    pub fn layout(&self) -> TrajectoryLayout {
        TrajectoryLayout::new(self.num_bp, self.num_steps)
    }

    /// Number of base-pair steps per timestep for this topology.
    pub fn num_bp_steps(&self) -> usize {
        self.topology.step_count(self.num_bp)
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    name: Option<String>,
    num_bp: Option<usize>,
    num_steps: Option<usize>,
    topology: Option<Topology>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn num_bp(mut self, num_bp: usize) -> Self {
        self.num_bp = Some(num_bp);
        self
    }
    pub fn num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = Some(num_steps);
        self
    }
    pub fn topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    /// Validates and assembles the configuration. Topology defaults to circular.
    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let name = self.name.ok_or(ConfigError::MissingParameter("name"))?;
        let num_bp = self.num_bp.ok_or(ConfigError::MissingParameter("num_bp"))?;
        let num_steps = self
            .num_steps
            .ok_or(ConfigError::MissingParameter("num_steps"))?;
        let topology = self.topology.unwrap_or_default();

        if name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if num_bp < MIN_BASE_PAIRS {
            return Err(ConfigError::InvalidValue {
                parameter: "num_bp",
                reason: format!("at least {} base pairs are required, got {}", MIN_BASE_PAIRS, num_bp),
            });
        }
        if num_steps == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "num_steps",
                reason: "at least one timestep is required".to_string(),
            });
        }

        Ok(AnalysisConfig {
            name,
            num_bp,
            num_steps,
            topology,
        })
    }
}
