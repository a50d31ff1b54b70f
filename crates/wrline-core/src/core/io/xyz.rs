use crate::core::io::traits::{AxisPoint, FrameFile, fixed_field};
use crate::core::models::trajectory::TrajectoryArray;
use std::io::{self, Write};

/// XYZ frames with every point written as a pseudo-atom `H`, for visualisation
/// of an axis in VMD or similar viewers.
pub struct XyzFile;

impl FrameFile for XyzFile {
    fn write_to<P: AxisPoint>(frames: &TrajectoryArray<P>, writer: &mut impl Write) -> io::Result<()> {
        for frame in frames.frames() {
            write!(writer, "{}\n\n", frame.len())?;
            for point in frame {
                let coords = point.coords();
                writeln!(
                    writer,
                    "H {} {} {} ",
                    fixed_field(coords.map(|p| p.x), 8, 3),
                    fixed_field(coords.map(|p| p.y), 8, 3),
                    fixed_field(coords.map(|p| p.z), 8, 3),
                )?;
            }
        }
        Ok(())
    }
}
