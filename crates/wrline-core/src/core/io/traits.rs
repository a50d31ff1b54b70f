use crate::core::models::trajectory::{Trajectory, TrajectoryArray, TrajectoryLayout};
use nalgebra::Point3;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading raw two-strand trajectories.
pub trait TrajectoryFile {
    /// The error type for I/O and parsing operations.
    type Error: Error + From<io::Error>;

    /// Reads a trajectory with the given dimensions from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the number of coordinates does not
    /// match `layout`.
    fn read_from(reader: &mut impl BufRead, layout: TrajectoryLayout) -> Result<Trajectory, Self::Error>;

    /// Reads a trajectory from a file path.
    fn read_from_path<P: AsRef<Path>>(path: P, layout: TrajectoryLayout) -> Result<Trajectory, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, layout)
    }
}

/// A point on an axis that may be undefined for a given (timestep, step).
pub trait AxisPoint {
    fn coords(&self) -> Option<Point3<f64>>;
}

impl AxisPoint for Point3<f64> {
    fn coords(&self) -> Option<Point3<f64>> {
        Some(*self)
    }
}

impl AxisPoint for Option<Point3<f64>> {
    fn coords(&self) -> Option<Point3<f64>> {
        *self
    }
}

/// Defines the interface for writing per-timestep point sets (axes, midpoints).
pub trait FrameFile {
    /// Writes every timestep of `frames` to `writer`.
    fn write_to<P: AxisPoint>(frames: &TrajectoryArray<P>, writer: &mut impl Write) -> io::Result<()>;

    /// Writes every timestep of `frames` to a file path.
    fn write_to_path<P: AxisPoint, Q: AsRef<Path>>(frames: &TrajectoryArray<P>, path: Q) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(frames, &mut writer)?;
        writer.flush()
    }
}

/// Formats `value` as a fixed-point field of the given width and precision.
///
/// Undefined and non-finite values are written as `nan`/`inf` right-aligned in
/// the same width, so that column positions never shift.
pub(crate) fn fixed_field(value: Option<f64>, width: usize, precision: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:width$.precision$}", v),
        Some(v) if v.is_infinite() => {
            format!("{:>width$}", if v > 0.0 { "inf" } else { "-inf" })
        }
        _ => format!("{:>width$}", "nan"),
    }
}
