use crate::core::io::traits::TrajectoryFile;
use crate::core::models::trajectory::{ShapeError, Trajectory, TrajectoryLayout};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

/// Width of one coordinate field in an Amber ASCII trajectory.
const FIELD_WIDTH: usize = 8;

#[derive(Debug, Error)]
pub enum MdcrdError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: invalid coordinate '{value}' in field {field}")]
    InvalidFloat {
        line: usize,
        field: usize,
        value: String,
    },
    #[error("Trajectory is empty (missing title line)")]
    MissingTitle,
    #[error("Coordinate count {found} is not a multiple of 3")]
    IncompleteAtom { found: usize },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Amber `.mdcrd` ASCII trajectory, stripped to one proxy atom (C1') per base.
///
/// The first line is a title. Every following line holds consecutive
/// eight-character coordinate fields; frames are not delimited, so the layout
/// must be supplied by the caller.
pub struct MdcrdFile;

impl MdcrdFile {
    /// Reads every coordinate in the stream as a flat list of values.
    pub fn read_coordinates(reader: &mut impl BufRead) -> Result<Vec<f64>, MdcrdError> {
        let mut lines = reader.lines();
        match lines.next() {
            Some(title) => {
                title?;
            }
            None => return Err(MdcrdError::MissingTitle),
        }

        let mut values = Vec::new();
        for (line_num, line_res) in lines.enumerate() {
            let line = line_res?;
            let line_num = line_num + 2;
            let num_fields = line.len() / FIELD_WIDTH;

            for field in 0..num_fields {
                let raw = line
                    .get(field * FIELD_WIDTH..(field + 1) * FIELD_WIDTH)
                    .unwrap_or("")
                    .trim();
                let value: f64 = raw.parse().map_err(|_| MdcrdError::InvalidFloat {
                    line: line_num,
                    field: field + 1,
                    value: raw.to_string(),
                })?;
                values.push(value);
            }
        }
        Ok(values)
    }
}

impl TrajectoryFile for MdcrdFile {
    type Error = MdcrdError;

    fn read_from(reader: &mut impl BufRead, layout: TrajectoryLayout) -> Result<Trajectory, Self::Error> {
        let values = Self::read_coordinates(reader)?;
        if values.len() % 3 != 0 {
            return Err(MdcrdError::IncompleteAtom { found: values.len() });
        }

        let atoms: Vec<Point3<f64>> = values
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        Ok(Trajectory::from_atoms(layout, &atoms)?)
    }
}
