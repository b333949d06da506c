//! latticepow: generate and validate block-lattice proof-of-work.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use latticepow_types::{Difficulty, Root, Work};
use latticepow_utils::{format_duration, init_logging, LogFormat};
use latticepow_work::{
    compute_difficulty, is_valid, multiplier_of, work_value, Pool, V1_BASE_DIFFICULTY,
};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "latticepow", about = "Block-lattice proof-of-work generator")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "LATTICEPOW_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "LATTICEPOW_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "LATTICEPOW_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Threshold {
    /// Difficulty multiplier (0 = base, 8 = send/change, -8 = receive).
    #[arg(long, allow_negative_numbers = true, conflicts_with = "difficulty")]
    multiplier: Option<i64>,

    /// Absolute difficulty threshold in hex (e.g. 0xfffffff800000000).
    #[arg(long)]
    difficulty: Option<Difficulty>,
}

impl Threshold {
    fn resolve(&self) -> u64 {
        match (self.difficulty, self.multiplier) {
            (Some(d), _) => d.value(),
            (None, Some(m)) => compute_difficulty(m),
            (None, None) => V1_BASE_DIFFICULTY,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Search for work on a root.
    Generate {
        /// Root as 64 hex characters.
        #[arg(long)]
        root: Root,

        #[command(flatten)]
        threshold: Threshold,

        /// CPU search threads (defaults to the config file or all cores).
        #[arg(long, env = "LATTICEPOW_THREADS")]
        threads: Option<usize>,

        /// Disable accelerator discovery.
        #[arg(long, env = "LATTICEPOW_NO_ACCELERATOR")]
        no_accelerator: bool,

        /// Give up after this many seconds.
        #[arg(long, env = "LATTICEPOW_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,
    },

    /// Check work against a root.
    Validate {
        /// Root as 64 hex characters.
        #[arg(long)]
        root: Root,

        /// Work as 16 hex characters.
        #[arg(long)]
        work: Work,

        #[command(flatten)]
        threshold: Threshold,
    },

    /// Print the threshold for a multiplier.
    Difficulty {
        #[arg(allow_negative_numbers = true)]
        multiplier: i64,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<CliConfig> {
    match path {
        Some(path) => CliConfig::from_toml_file(path),
        None => Ok(CliConfig::default()),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_ref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format, &config.log_level);

    match cli.command {
        Command::Generate {
            root,
            threshold,
            threads,
            no_accelerator,
            timeout_secs,
        } => {
            let work_config = &mut config.work;
            if threads.is_some() {
                work_config.cpu_threads = threads;
            }
            if no_accelerator {
                work_config.enable_accelerator = false;
            }
            if timeout_secs.is_some() {
                work_config.timeout_secs = timeout_secs;
            }

            let difficulty = threshold.resolve();
            let pool = Pool::from_config(work_config)?;
            tracing::info!(
                "Generating work for {} at {} ({:.3}x base) with {}",
                root,
                Difficulty::new(difficulty),
                multiplier_of(difficulty, V1_BASE_DIFFICULTY),
                pool.backend_names().join(", "),
            );

            let started = Instant::now();
            let work = match work_config.timeout_secs {
                Some(secs) => {
                    pool.generate_work_timeout(&root, difficulty, Duration::from_secs(secs))?
                }
                None => pool.generate_work(&root, difficulty)?,
            };
            tracing::info!("Found work in {}", format_duration(started.elapsed()));

            println!("{work}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Validate {
            root,
            work,
            threshold,
        } => {
            let difficulty = threshold.resolve();
            let value = work_value(&root, work);
            let valid = is_valid(&root, difficulty, work);

            println!(
                "{} (value {}, difficulty {}, {:.3}x base)",
                if valid { "valid" } else { "invalid" },
                Difficulty::new(value),
                Difficulty::new(difficulty),
                multiplier_of(value, V1_BASE_DIFFICULTY),
            );
            Ok(if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Difficulty { multiplier } => {
            println!("{}", Difficulty::new(compute_difficulty(multiplier)));
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_multiplier_parses() {
        let cli = Cli::try_parse_from(["latticepow", "difficulty", "-8"]).unwrap();
        assert!(matches!(cli.command, Command::Difficulty { multiplier: -8 }));
    }

    #[test]
    fn threshold_prefers_explicit_difficulty() {
        let cli = Cli::try_parse_from([
            "latticepow",
            "validate",
            "--root",
            &"00".repeat(32),
            "--work",
            "0000000100090ae8",
            "--difficulty",
            "0xffff",
        ])
        .unwrap();
        match cli.command {
            Command::Validate { threshold, .. } => assert_eq!(threshold.resolve(), 0xffff),
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn threshold_defaults_to_base() {
        let t = Threshold {
            multiplier: None,
            difficulty: None,
        };
        assert_eq!(t.resolve(), V1_BASE_DIFFICULTY);
    }

    #[test]
    fn multiplier_and_difficulty_conflict() {
        let result = Cli::try_parse_from([
            "latticepow",
            "validate",
            "--root",
            &"00".repeat(32),
            "--work",
            "0000000000000000",
            "--multiplier",
            "8",
            "--difficulty",
            "0x1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn generate_accepts_negative_multiplier_flag() {
        let cli = Cli::try_parse_from([
            "latticepow",
            "generate",
            "--root",
            &"ab".repeat(32),
            "--multiplier",
            "-8",
            "--threads",
            "2",
        ])
        .unwrap();
        match cli.command {
            Command::Generate {
                threshold, threads, ..
            } => {
                assert_eq!(threshold.resolve(), compute_difficulty(-8));
                assert_eq!(threads, Some(2));
            }
            _ => panic!("expected generate"),
        }
    }
}
