pub mod analyze;
pub mod writhe;
