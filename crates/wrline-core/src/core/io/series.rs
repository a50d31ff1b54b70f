//! Time-series outputs: one row per timestep, fixed-width columns.
//!
//! The layouts match the `.ser` files produced by WrLINE, so downstream
//! plotting scripts can read either.

use crate::core::io::traits::fixed_field;
use crate::core::models::trajectory::TrajectoryArray;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Time, in nanoseconds, assigned to the first snapshot and added per snapshot.
pub const SNAPSHOT_INTERVAL_NS: f64 = 0.01;

/// Writes twist angles (`tw.ser`): one `%8.3f` column per base-pair step.
pub fn write_twist_series(twist: &TrajectoryArray<Option<f64>>, writer: &mut impl Write) -> io::Result<()> {
    for frame in twist.frames() {
        let row: Vec<String> = frame.iter().map(|v| fixed_field(*v, 8, 3)).collect();
        writeln!(writer, "{}", row.join(" "))?;
    }
    Ok(())
}

/// Writes register angles (`sinreg.ser`): a time column followed by one
/// `%8.3f` column per base-pair step.
pub fn write_register_series(
    sinreg: &TrajectoryArray<Option<f64>>,
    writer: &mut impl Write,
) -> io::Result<()> {
    for (t, frame) in sinreg.frames().enumerate() {
        let time = SNAPSHOT_INTERVAL_NS * (t + 1) as f64;
        let row: Vec<String> = std::iter::once(fixed_field(Some(time), 8, 3))
            .chain(frame.iter().map(|v| fixed_field(*v, 8, 3)))
            .collect();
        writeln!(writer, "{}", row.join(" "))?;
    }
    Ok(())
}

/// Writes writhe (`writhe.ser`): `%5d %9.4f` with a 1-based timestep index.
pub fn write_writhe_series(writhe: &[Option<f64>], writer: &mut impl Write) -> io::Result<()> {
    for (t, value) in writhe.iter().enumerate() {
        writeln!(writer, "{:5} {}", t + 1, fixed_field(*value, 9, 4))?;
    }
    Ok(())
}

/// Opens `path` for buffered writing and hands the writer to `write`.
pub fn write_to_path<P, F>(path: P, write: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()
}
