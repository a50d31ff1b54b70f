use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use wrline::core::models::topology::Topology;
use wrline::engine::config as core_config;

/// Which output files `analyze` writes, and where.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// `C.xyz` and `C1.xyz`.
    pub write_xyz: bool,
    /// `C.3col` and `C1.3col`.
    pub write_3col: bool,
    /// `tw.ser`, `sinreg.ser` and `writhe.ser`.
    pub write_series: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub analysis: core_config::AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSystemConfig {
    name: Option<String>,
    num_bp: Option<usize>,
    num_steps: Option<usize>,
    topology: Option<Topology>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOutputConfig {
    directory: Option<PathBuf>,
    write_xyz: Option<bool>,
    #[serde(rename = "write-3col")]
    write_3col: Option<bool>,
    write_series: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAnalysisConfig {
    system: Option<PartialSystemConfig>,
    output: Option<PartialOutputConfig>,
}

impl PartialAnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `args.config` if given, otherwise starts from an empty configuration.
    pub fn load(args: &AnalyzeArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &AnalyzeArgs) -> Result<RunConfig> {
        self.apply_set_values(&args.set_values)?;

        let system = self.system.take().unwrap_or_default();
        let output = self.output.take().unwrap_or_default();

        let name = args
            .name
            .clone()
            .or(system.name)
            .or_else(|| {
                args.input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .ok_or_else(|| {
                CliError::Config("A run name is required when the input has no file stem.".to_string())
            })?;
        let num_bp = args.num_bp.or(system.num_bp).ok_or_else(|| {
            CliError::Config(
                "`system.num-bp` is required either in the config file or via --num-bp.".to_string(),
            )
        })?;
        let num_steps = args.num_steps.or(system.num_steps).ok_or_else(|| {
            CliError::Config(
                "`system.num-steps` is required either in the config file or via --num-steps."
                    .to_string(),
            )
        })?;
        let topology = if args.linear {
            Topology::Linear
        } else {
            system.topology.unwrap_or_default()
        };

        let analysis = core_config::AnalysisConfigBuilder::new()
            .name(name)
            .num_bp(num_bp)
            .num_steps(num_steps)
            .topology(topology)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let directory = args
            .output
            .clone()
            .or(output.directory)
            .unwrap_or_else(|| PathBuf::from(&analysis.name));

        Ok(RunConfig {
            output: OutputConfig {
                directory,
                write_xyz: output.write_xyz.unwrap_or(true),
                write_3col: output.write_3col.unwrap_or(true),
                write_series: output.write_series.unwrap_or(true),
            },
            analysis,
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            let invalid = |kind: &str| {
                CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
            };

            match key {
                "system.name" => {
                    self.system.get_or_insert_with(Default::default).name =
                        Some(value_str.to_string());
                }
                "system.num-bp" => {
                    self.system.get_or_insert_with(Default::default).num_bp =
                        Some(value_str.parse().map_err(|_| invalid("integer"))?);
                }
                "system.num-steps" => {
                    self.system.get_or_insert_with(Default::default).num_steps =
                        Some(value_str.parse().map_err(|_| invalid("integer"))?);
                }
                "system.topology" => {
                    self.system.get_or_insert_with(Default::default).topology =
                        Some(value_str.parse().map_err(|_| invalid("topology"))?);
                }
                "output.directory" => {
                    self.output.get_or_insert_with(Default::default).directory =
                        Some(PathBuf::from(value_str));
                }
                "output.write-xyz" => {
                    self.output.get_or_insert_with(Default::default).write_xyz =
                        Some(value_str.parse().map_err(|_| invalid("boolean"))?);
                }
                "output.write-3col" => {
                    self.output.get_or_insert_with(Default::default).write_3col =
                        Some(value_str.parse().map_err(|_| invalid("boolean"))?);
                }
                "output.write-series" => {
                    self.output.get_or_insert_with(Default::default).write_series =
                        Some(value_str.parse().map_err(|_| invalid("boolean"))?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("wrline.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn analyze_args(extra: &[&str]) -> AnalyzeArgs {
        let mut args = vec!["wrline", "analyze", "-i", "runs/C.mdcrd"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Analyze(analyze) => analyze,
            _ => panic!("Expected 'analyze' subcommand"),
        }
    }

    #[test]
    fn file_values_are_used_with_defaults() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            r#"
        [system]
        name = "minicircle"
        num-bp = 336
        num-steps = 8
        "#,
        );
        let args = analyze_args(&["-c", config_path.to_str().unwrap()]);

        let config = PartialAnalysisConfig::load(&args).unwrap().merge_with_cli(&args).unwrap();

        assert_eq!(config.analysis.name, "minicircle");
        assert_eq!(config.analysis.num_bp, 336);
        assert_eq!(config.analysis.num_steps, 8);
        assert_eq!(config.analysis.topology, Topology::Circular);
        assert_eq!(config.output.directory, PathBuf::from("minicircle"));
        assert!(config.output.write_xyz && config.output.write_3col && config.output.write_series);
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            r#"
        [system]
        num-bp = 100 # Will be overridden
        num-steps = 8
        topology = "circular"

        [output]
        directory = "from-file"
        write-xyz = false
        "#,
        );
        let args = analyze_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "--num-bp",
            "336",
            "--linear",
            "-o",
            "elsewhere",
        ]);

        let config = PartialAnalysisConfig::load(&args).unwrap().merge_with_cli(&args).unwrap();

        assert_eq!(config.analysis.num_bp, 336);
        assert_eq!(config.analysis.topology, Topology::Linear);
        assert_eq!(config.analysis.name, "C");
        assert_eq!(config.output.directory, PathBuf::from("elsewhere"));
        assert!(!config.output.write_xyz);
        assert!(config.output.write_series);
    }

    #[test]
    fn set_values_override_file() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(
            &dir,
            r#"
        [system]
        num-bp = 336
        num-steps = 8
        "#,
        );
        let args = analyze_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "-S",
            "system.num-steps=20",
            "-S",
            "system.topology=linear",
            "-S",
            "output.write-3col=false",
        ]);

        let config = PartialAnalysisConfig::load(&args).unwrap().merge_with_cli(&args).unwrap();

        assert_eq!(config.analysis.num_steps, 20);
        assert_eq!(config.analysis.topology, Topology::Linear);
        assert!(!config.output.write_3col);
    }

    #[test]
    fn cli_only_configuration_needs_no_file() {
        let args = analyze_args(&["--num-bp", "336", "--num-steps", "8"]);

        let config = PartialAnalysisConfig::load(&args).unwrap().merge_with_cli(&args).unwrap();

        assert_eq!(config.analysis.layout().total_atoms(), 336 * 2 * 8);
    }

    #[test]
    fn missing_dimensions_return_error() {
        let args = analyze_args(&["--num-bp", "336"]);

        let result = PartialAnalysisConfig::default().merge_with_cli(&args);

        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("num-steps")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let config_path = write_config_file(&dir, "[system]\nnum-base-pairs = 336\n");

        let result = PartialAnalysisConfig::from_file(&config_path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let args = analyze_args(&["--num-bp", "336", "--num-steps", "8", "-S", "system.num-bp"]);
        let result = PartialAnalysisConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
