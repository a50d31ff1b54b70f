use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "George D. Watson",
    version,
    about = "WrLINE CLI - helical-axis, twist, register-angle and writhe analysis of DNA molecular-dynamics trajectories.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the central axis, twist, register angle and writhe of a trajectory.
    Analyze(AnalyzeArgs),
    /// Compute the writhe of a previously written axis (e.g. C1.3col).
    Writhe(WritheArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    // --- Core Arguments ---
    /// Path to the input trajectory (Amber ASCII .mdcrd, one C1' atom per base).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the output files. Defaults to the run name.
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    // --- System Overrides ---
    /// Run name. Defaults to the input file stem.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Number of base pairs in the duplex.
    #[arg(short = 'b', long, value_name = "INT")]
    pub num_bp: Option<usize>,

    /// Number of timesteps (snapshots) in the trajectory.
    #[arg(short = 't', long, value_name = "INT")]
    pub num_steps: Option<usize>,

    /// Treat the duplex as linear instead of closed.
    #[arg(long)]
    pub linear: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S system.num-bp=336
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `writhe` subcommand.
#[derive(Args, Debug)]
pub struct WritheArgs {
    /// Path to a three-column axis file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Number of axis points per timestep.
    #[arg(short = 'p', long, required = true, value_name = "INT")]
    pub num_points: usize,

    /// Number of timesteps in the file.
    #[arg(short = 't', long, required = true, value_name = "INT")]
    pub num_steps: usize,

    /// Treat the axis as an open curve instead of closing it.
    #[arg(long)]
    pub linear: bool,

    /// Path for the writhe series. Defaults to writhe.ser beside the input.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
