use super::config::AnalysisConfig;
use super::progress::ProgressReporter;
use crate::core::models::topology::Topology;

/// Read-only inputs shared by every analysis stage.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub config: &'a AnalysisConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(config: &'a AnalysisConfig, reporter: &'a ProgressReporter<'a>) -> Self {
        Self { config, reporter }
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.config.topology
    }
}
