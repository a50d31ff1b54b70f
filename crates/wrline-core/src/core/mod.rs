//! # Core Module
//!
//! Stateless building blocks of the helical-axis analysis.
//!
//! ## Architecture
//!
//! - **Data Model** ([`models`]) - Per-timestep arrays, the two-strand trajectory,
//!   and circular/linear topology
//! - **Geometry** ([`utils::geometry`]) - Vector algebra over arrays of 3-vectors,
//!   the frame-alignment rotations, and the local twist angle
//! - **File I/O** ([`io`]) - Trajectory input and fixed-width text outputs
//!
//! Nothing in this module holds state between calls; the [`crate::engine`]
//! layer composes these pieces into analysis stages.

pub mod io;
pub mod models;
pub mod utils;
