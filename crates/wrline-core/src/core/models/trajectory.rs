use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Array shape mismatch: expected {expected}, found {found}")]
pub struct ShapeError {
    pub expected: String,
    pub found: String,
}

/// A dense per-timestep, per-index array.
///
/// Values are stored frame-major: all entries of timestep 0, then timestep 1,
/// and so on. Every frame has the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryArray<T> {
    num_steps: usize,
    frame_len: usize,
    data: Vec<T>,
}

impl<T> TrajectoryArray<T> {
    pub fn from_vec(num_steps: usize, frame_len: usize, data: Vec<T>) -> Result<Self, ShapeError> {
        if data.len() != num_steps * frame_len {
            return Err(ShapeError {
                expected: format!("{} x {} = {} entries", num_steps, frame_len, num_steps * frame_len),
                found: format!("{} entries", data.len()),
            });
        }
        Ok(Self {
            num_steps,
            frame_len,
            data,
        })
    }

    /// Builds an array from one vector per timestep.
    ///
    /// # Errors
    ///
    /// Returns a [`ShapeError`] if the frames do not all have the same length.
    pub fn from_frames(frames: Vec<Vec<T>>) -> Result<Self, ShapeError> {
        let num_steps = frames.len();
        let frame_len = frames.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(num_steps * frame_len);
        for (t, frame) in frames.into_iter().enumerate() {
            if frame.len() != frame_len {
                return Err(ShapeError {
                    expected: format!("{} entries in timestep {}", frame_len, t),
                    found: format!("{} entries", frame.len()),
                });
            }
            data.extend(frame);
        }
        Ok(Self {
            num_steps,
            frame_len,
            data,
        })
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_steps, self.frame_len)
    }

    #[inline]
    pub fn get(&self, timestep: usize, index: usize) -> Option<&T> {
        if timestep < self.num_steps && index < self.frame_len {
            self.data.get(timestep * self.frame_len + index)
        } else {
            None
        }
    }

    /// All entries of one timestep.
    ///
    /// # Panics
    ///
    /// Panics if `timestep` is out of range.
    pub fn frame(&self, timestep: usize) -> &[T] {
        let start = timestep * self.frame_len;
        &self.data[start..start + self.frame_len]
    }

    pub fn frames(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.num_steps).map(move |t| self.frame(t))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter()
    }

}

impl TrajectoryArray<Point3<f64>> {
    /// Sum of every x, y and z coordinate in the array.
    pub fn coordinate_sum(&self) -> f64 {
        self.data.iter().map(|p| p.x + p.y + p.z).sum()
    }
}

impl TrajectoryArray<Option<Point3<f64>>> {
    /// Sum of every coordinate of the defined points; undefined entries are skipped.
    pub fn coordinate_sum(&self) -> f64 {
        self.data.iter().flatten().map(|p| p.x + p.y + p.z).sum()
    }

    pub fn is_fully_defined(&self) -> bool {
        self.data.iter().all(Option::is_some)
    }
}

impl TrajectoryArray<Option<f64>> {
    pub fn defined_sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    pub fn is_fully_defined(&self) -> bool {
        self.data.iter().all(Option::is_some)
    }
}

/// The dimensions a raw coordinate stream is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrajectoryLayout {
    pub num_bp: usize,
    pub num_steps: usize,
}

impl TrajectoryLayout {
    pub fn new(num_bp: usize, num_steps: usize) -> Self {
        Self { num_bp, num_steps }
    }

    /// Atoms per timestep: one proxy atom per base on each of the two strands.
    pub fn atoms_per_step(&self) -> usize {
        2 * self.num_bp
    }

    pub fn total_atoms(&self) -> usize {
        self.num_steps * self.atoms_per_step()
    }
}

/// Per-base coordinates of both strands of a duplex over a trajectory.
///
/// Strand B is stored in reverse order relative to the input file, so that
/// index `i` on strand A is paired with index `i` on strand B.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    strand_a: TrajectoryArray<Point3<f64>>,
    strand_b: TrajectoryArray<Point3<f64>>,
}

impl Trajectory {
    pub fn new(
        strand_a: TrajectoryArray<Point3<f64>>,
        strand_b: TrajectoryArray<Point3<f64>>,
    ) -> Result<Self, ShapeError> {
        if strand_a.shape() != strand_b.shape() {
            return Err(ShapeError {
                expected: format!("strand B of shape {:?}", strand_a.shape()),
                found: format!("{:?}", strand_b.shape()),
            });
        }
        Ok(Self { strand_a, strand_b })
    }

    /// Splits a flat, frame-major atom stream into the two strands.
    ///
    /// Each frame holds strand A's bases in order followed by strand B's bases
    /// in file order; the latter are reversed so that they pair with strand A.
    pub fn from_atoms(layout: TrajectoryLayout, atoms: &[Point3<f64>]) -> Result<Self, ShapeError> {
        if layout.num_bp == 0 {
            return Err(ShapeError {
                expected: "at least one base pair per timestep".to_string(),
                found: "0 base pairs".to_string(),
            });
        }
        if atoms.len() != layout.total_atoms() {
            return Err(ShapeError {
                expected: format!(
                    "{} atoms ({} timesteps x {} bases)",
                    layout.total_atoms(),
                    layout.num_steps,
                    layout.atoms_per_step()
                ),
                found: format!("{} atoms", atoms.len()),
            });
        }

        let n = layout.num_bp;
        let mut strand_a = Vec::with_capacity(layout.num_steps * n);
        let mut strand_b = Vec::with_capacity(layout.num_steps * n);
        for frame in atoms.chunks_exact(layout.atoms_per_step()) {
            strand_a.extend_from_slice(&frame[..n]);
            strand_b.extend(frame[n..].iter().rev());
        }

        Self::new(
            TrajectoryArray::from_vec(layout.num_steps, n, strand_a)?,
            TrajectoryArray::from_vec(layout.num_steps, n, strand_b)?,
        )
    }

    pub fn strand_a(&self) -> &TrajectoryArray<Point3<f64>> {
        &self.strand_a
    }

    pub fn strand_b(&self) -> &TrajectoryArray<Point3<f64>> {
        &self.strand_b
    }

    pub fn num_bp(&self) -> usize {
        self.strand_a.frame_len()
    }

    pub fn num_steps(&self) -> usize {
        self.strand_a.num_steps()
    }

    pub fn layout(&self) -> TrajectoryLayout {
        TrajectoryLayout::new(self.num_bp(), self.num_steps())
    }
}
