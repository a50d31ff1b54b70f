//! # Core Models Module
//!
//! Data structures describing a DNA duplex over a molecular-dynamics trajectory.
//!
//! ## Key Components
//!
//! - [`topology`] - Circular or linear connectivity, and the single place where
//!   neighbouring base-pair indices are resolved
//! - [`trajectory`] - Dense per-timestep arrays and the two-strand [`trajectory::Trajectory`]
//!
//! ## Usage
//!
//! ```ignore
//! use wrline::core::models::trajectory::{Trajectory, TrajectoryLayout};
//!
//! let layout = TrajectoryLayout::new(336, 8);
//! let trajectory = Trajectory::from_atoms(layout, &atoms)?;
//! assert_eq!(trajectory.strand_a().shape(), (8, 336));
//! ```

pub mod topology;
pub mod trajectory;
