use crate::cli::WritheArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use std::path::PathBuf;
use tracing::{info, warn};
use wrline::{
    core::{io::series, io::three_col::ThreeColFile, models::topology::Topology},
    engine::progress::ProgressReporter,
    workflows,
};

pub fn run(args: WritheArgs) -> Result<()> {
    if args.num_points == 0 || args.num_steps == 0 {
        return Err(CliError::Argument(
            "--num-points and --num-steps must both be positive".to_string(),
        ));
    }
    let topology = if args.linear {
        Topology::Linear
    } else {
        Topology::Circular
    };

    info!("Loading axis from {:?}", &args.input);
    let axis = ThreeColFile::read_from_path(&args.input, args.num_points, args.num_steps).map_err(
        |e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        },
    )?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let output = workflows::writhe::run(&axis, topology, &reporter)?;
    if !output.is_complete() {
        warn!(
            "Writhe is undefined at {} timestep(s).",
            output.issues.len()
        );
    }

    let output_path = args.output.clone().unwrap_or_else(|| default_output_path(&args.input));
    info!("Writing {:?}", &output_path);
    series::write_to_path(&output_path, |w| series::write_writhe_series(&output.values, w))?;
    println!("✓ Writhe written to: {}", output_path.display());
    Ok(())
}

fn default_output_path(input: &std::path::Path) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join("writhe.ser"))
        .unwrap_or_else(|| PathBuf::from("writhe.ser"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;

    fn parse(args: &[&str]) -> WritheArgs {
        match Cli::parse_from(args).command {
            Commands::Writhe(writhe) => writhe,
            _ => panic!("Expected 'writhe' subcommand"),
        }
    }

    #[test]
    fn writhe_series_is_written_beside_input_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("C1.3col");
        // Two timesteps of a planar square.
        let square = "0 0 0\n1 0 0\n1 1 0\n0 1 0\n";
        fs::write(&input, square.repeat(2)).unwrap();

        let args = parse(&[
            "wrline",
            "writhe",
            "-i",
            input.to_str().unwrap(),
            "--num-points",
            "4",
            "--num-steps",
            "2",
        ]);
        run(args).unwrap();

        let text = fs::read_to_string(dir.path().join("writhe.ser")).unwrap();
        assert_eq!(text, "    1    0.0000\n    2    0.0000\n");
    }

    #[test]
    fn point_count_mismatch_is_a_parsing_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("C1.3col");
        fs::write(&input, "0 0 0\n1 0 0\n1 1 0\n").unwrap();

        let args = parse(&[
            "wrline",
            "writhe",
            "-i",
            input.to_str().unwrap(),
            "--num-points",
            "4",
            "--num-steps",
            "1",
        ]);

        assert!(matches!(run(args), Err(CliError::FileParsing { .. })));
    }
}
