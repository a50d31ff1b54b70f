//! Provides input/output functionality for trajectory and axis files.
//!
//! Reading covers the stripped Amber `.mdcrd` trajectory that feeds the analysis
//! and `.3col` axis files written by earlier runs. Writing covers the
//! visualisation frames (`.xyz`, `.3col`) and the per-timestep `.ser` series,
//! all in the fixed-width layouts used by WrLINE.

pub mod mdcrd;
pub mod series;
pub mod three_col;
pub mod traits;
pub mod xyz;
