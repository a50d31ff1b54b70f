//! # WrLINE Core Library
//!
//! Helical-axis analysis of DNA molecular-dynamics trajectories: base-pair step
//! midpoints, a first-order helical axis, local twist, a twist-normalised
//! central axis, the register angle of the minor groove, and the writhe of the
//! central axis. Closed (minicircle) and linear duplexes are both supported.
//!
//! ## Architecture
//!
//! - **[`core`]** - Data models, the vector/rotation kernel and file formats.
//! - **[`engine`]** - Configuration, the individual analysis stages and their
//!   outputs.
//! - **[`workflows`]** - Complete analyses, ready to be driven by a front end.

pub mod core;
pub mod engine;
pub mod workflows;
