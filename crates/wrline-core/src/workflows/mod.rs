//! # Workflows Module
//!
//! Top-level entry points that run complete analyses.
//!
//! - **Axis Analysis** ([`analyze`]) - The full pipeline from a raw trajectory
//!   to every output array
//! - **Writhe** ([`writhe`]) - Writhe of an axis previously written to disk

pub mod analyze;
pub mod writhe;
