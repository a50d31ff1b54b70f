use crate::core::io::traits::{AxisPoint, FrameFile, fixed_field};
use crate::core::models::trajectory::{ShapeError, TrajectoryArray};
use nalgebra::Point3;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThreeColError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Plain three-column coordinate file: one `x y z` point per line, timesteps
/// concatenated without separators.
pub struct ThreeColFile;

impl ThreeColFile {
    /// Reads `num_steps` frames of `num_points` points each.
    ///
    /// # Errors
    ///
    /// Returns [`ThreeColError::Shape`] if the file does not hold exactly
    /// `num_steps * num_points` points.
    pub fn read_from(
        reader: &mut impl BufRead,
        num_points: usize,
        num_steps: usize,
    ) -> Result<TrajectoryArray<Point3<f64>>, ThreeColError> {
        let mut points = Vec::with_capacity(num_points * num_steps);

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(ThreeColError::Parse {
                    line: line_num,
                    reason: format!("expected 3 columns, found {}", fields.len()),
                });
            }
            let mut xyz = [0.0; 3];
            for (slot, field) in xyz.iter_mut().zip(&fields) {
                *slot = parse_coordinate(field, line_num)?;
            }
            points.push(Point3::new(xyz[0], xyz[1], xyz[2]));
        }

        Ok(TrajectoryArray::from_vec(num_steps, num_points, points)?)
    }

    pub fn read_from_path<P: AsRef<Path>>(
        path: P,
        num_points: usize,
        num_steps: usize,
    ) -> Result<TrajectoryArray<Point3<f64>>, ThreeColError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, num_points, num_steps)
    }
}

fn parse_coordinate(field: &str, line: usize) -> Result<f64, ThreeColError> {
    // Undefined points are written as `nan`; read them back as such.
    field.parse::<f64>().map_err(|_| ThreeColError::Parse {
        line,
        reason: format!("invalid coordinate '{}'", field),
    })
}

impl FrameFile for ThreeColFile {
    fn write_to<P: AxisPoint>(frames: &TrajectoryArray<P>, writer: &mut impl Write) -> io::Result<()> {
        for point in frames.iter() {
            let coords = point.coords();
            writeln!(
                writer,
                "{} {} {} ",
                fixed_field(coords.map(|p| p.x), 8, 3),
                fixed_field(coords.map(|p| p.y), 8, 3),
                fixed_field(coords.map(|p| p.z), 8, 3),
            )?;
        }
        Ok(())
    }
}
