use crate::cli::AnalyzeArgs;
use crate::config::{OutputConfig, PartialAnalysisConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::path::Path;
use tracing::{info, warn};
use wrline::{
    core::io::{
        mdcrd::MdcrdFile,
        series,
        three_col::ThreeColFile,
        traits::{FrameFile, TrajectoryFile},
        xyz::XyzFile,
    },
    engine::{progress::ProgressReporter, state::AnalysisResult},
    workflows,
};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = PartialAnalysisConfig::load(&args)?.merge_with_cli(&args)?;

    info!("Loading trajectory from {:?}", &args.input);
    let trajectory = MdcrdFile::read_from_path(&args.input, config.analysis.layout()).map_err(|e| {
        CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        }
    })?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Analysing {} ({} bp, {} timesteps, {})...",
        config.analysis.name, config.analysis.num_bp, config.analysis.num_steps, config.analysis.topology
    );
    let result = workflows::analyze::run(&trajectory, &config.analysis, &reporter)?;

    if !result.is_complete() {
        warn!(
            "{} value(s) could not be computed and are written as nan.",
            result.issues.len()
        );
        println!(
            "Warning: {} value(s) could not be computed; see the log for details.",
            result.issues.len()
        );
    }
    if let Some(writhe) = result.writhe.first().copied().flatten() {
        println!("Writhe at first timestep: {:.4}", writhe);
    }

    write_outputs(&result, &config.output)?;
    println!("✓ Results written to: {}", config.output.directory.display());
    Ok(())
}

fn write_outputs(result: &AnalysisResult, output: &OutputConfig) -> Result<()> {
    let dir = &output.directory;
    std::fs::create_dir_all(dir)?;

    if output.write_xyz {
        write_file(&dir.join("C.xyz"), |p| XyzFile::write_to_path(&result.midpoints, p))?;
        write_file(&dir.join("C1.xyz"), |p| XyzFile::write_to_path(&result.central_axis, p))?;
    }
    if output.write_3col {
        write_file(&dir.join("C.3col"), |p| ThreeColFile::write_to_path(&result.midpoints, p))?;
        write_file(&dir.join("C1.3col"), |p| {
            ThreeColFile::write_to_path(&result.central_axis, p)
        })?;
    }
    if output.write_series {
        write_file(&dir.join("tw.ser"), |p| {
            series::write_to_path(p, |w| series::write_twist_series(&result.twist, w))
        })?;
        write_file(&dir.join("sinreg.ser"), |p| {
            series::write_to_path(p, |w| series::write_register_series(&result.sin_register, w))
        })?;
        write_file(&dir.join("writhe.ser"), |p| {
            series::write_to_path(p, |w| series::write_writhe_series(&result.writhe, w))
        })?;
    }
    Ok(())
}

fn write_file(path: &Path, write: impl FnOnce(&Path) -> std::io::Result<()>) -> Result<()> {
    info!("Writing {:?}", path);
    write(path).map_err(CliError::Io)
}
