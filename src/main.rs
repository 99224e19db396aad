// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, warn};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kobisplit::app_config::{Config, LogLevel};
use kobisplit::app_controller::{Controller, read_text_arg};
use kobisplit::segmentation::SplitMode;

/// CLI Wrapper for SplitMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSplitMode {
    Regex,
    Ai,
    Hybrid,
    AiVerify,
    Parallel,
}

impl From<CliSplitMode> for SplitMode {
    fn from(cli_mode: CliSplitMode) -> Self {
        match cli_mode {
            CliSplitMode::Regex => SplitMode::Regex,
            CliSplitMode::Ai => SplitMode::Ai,
            CliSplitMode::Hybrid => SplitMode::Hybrid,
            CliSplitMode::AiVerify => SplitMode::AiVerify,
            CliSplitMode::Parallel => SplitMode::Parallel,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split one passage into sentences
    Split {
        /// English passage, or @FILE to read it from a file
        #[arg(short, long)]
        english: String,

        /// Korean translation, or @FILE to read it from a file
        #[arg(short, long)]
        korean: Option<String>,

        /// Segmentation strategy (defaults to the configured mode)
        #[arg(long, value_enum)]
        mode: Option<CliSplitMode>,

        /// Model identifier (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Split every passage of a JSON file of {id, english, korean?} items
    Batch {
        /// Batch file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Segmentation strategy (defaults to the configured mode)
        #[arg(long, value_enum)]
        mode: Option<CliSplitMode>,

        /// Model identifier (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Compare a passage with its Korean translation without calling a model
    Analyze {
        /// English passage, or @FILE
        #[arg(short, long)]
        english: String,

        /// Korean translation, or @FILE
        #[arg(short, long)]
        korean: String,
    },

    /// Generate shell completions for kobisplit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// kobisplit - bilingual sentence segmentation for English study materials
///
/// Splits English passages into sentences that provably reproduce the source,
/// aligned with an optional Korean translation whose defects are reported.
#[derive(Parser, Debug)]
#[command(name = "kobisplit")]
#[command(version)]
#[command(about = "English/Korean sentence segmentation with fidelity checks")]
#[command(long_about = "kobisplit splits English passages into sentences and aligns them with a Korean translation.

EXAMPLES:
    kobisplit split -e \"Dr. Smith arrived. He left.\" --mode regex
    kobisplit split -e @passage.txt -k @translation.txt
    kobisplit split -e @passage.txt --mode ai-verify -m claude-3-5-haiku-latest
    kobisplit batch passages.json --mode parallel
    kobisplit analyze -e @passage.txt -k @translation.txt
    kobisplit completions bash > kobisplit.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Empty API keys fall back to OPENAI_API_KEY,
    ANTHROPIC_API_KEY and GEMINI_API_KEY.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        Config::from_file(config_path)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        Config::load_or_create(config_path)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: CommandLineOptions) -> Result<bool> {
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "kobisplit", &mut std::io::stdout());
        return Ok(true);
    }

    let mut config = load_config(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Split {
            english,
            korean,
            mode,
            model,
        } => {
            let english = read_text_arg(&english)?;
            let korean = korean.as_deref().map(read_text_arg).transpose()?;
            let request = controller.request(english, korean, model, mode.map(Into::into));
            match controller.split(&request).await {
                Ok(result) => {
                    print_json(&result)?;
                    Ok(true)
                }
                Err(e) => {
                    error!("Split failed: {}", e);
                    print_json(&e.to_payload())?;
                    Ok(false)
                }
            }
        }
        Commands::Batch { file, mode, model } => {
            let report = controller
                .run_batch_file(&file, mode.map(Into::into), model)
                .await?;
            print_json(&report)?;
            Ok(report.failed == 0)
        }
        Commands::Analyze { english, korean } => {
            let english = read_text_arg(&english)?;
            let korean = read_text_arg(&korean)?;
            print_json(&controller.analyze(&english, &korean))?;
            Ok(true)
        }
        Commands::Completions { .. } => Err(anyhow!("completions handled above")),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}
