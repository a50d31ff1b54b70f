//! # Engine Module
//!
//! The staged computation that turns a two-strand trajectory into helical-axis
//! observables.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Run name, dimensions and topology, built
//!   and validated through [`config::AnalysisConfigBuilder`]
//! - **Context** ([`context`]) - Read-only inputs shared by every stage
//! - **Stages** ([`tasks`]) - Midpoints, first-order helix axis, twist, central
//!   axis, register angle and writhe
//! - **State** ([`state`]) - Stage outputs and the assembled [`state::AnalysisResult`]
//! - **Progress Monitoring** ([`progress`]) - Optional observer callback
//! - **Error Handling** ([`error`]) - Fatal errors and per-step issues
//!
//! ## Undefined values
//!
//! A value that cannot be computed for one (timestep, step), for instance
//! because the geometry is degenerate, is stored as `None` and recorded as a
//! [`error::StepIssue`]. It never aborts the run and never affects entries
//! that do not depend on it.

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod state;
pub mod tasks;
