//! Analysis stages.
//!
//! Each submodule computes one quantity for every timestep of a trajectory and
//! hands its output to the next stage: midpoints feed the first-order helix
//! axis, which orients the twist; twist sizes the central-axis window; the
//! central axis then gives the register angle and the writhe.

pub mod central_axis;
pub mod helix_axis;
pub mod midpoints;
pub mod register;
pub mod twist;
pub mod writhe;
