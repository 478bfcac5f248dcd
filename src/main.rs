// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::Config;
use crate::segment_engine::RedistributionPolicy;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod document_package;
mod document_tree;
mod errors;
mod exchange;
mod file_utils;
mod segment_engine;

/// CLI Wrapper for RedistributionPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliRedistributionPolicy {
    Splice,
    Proportional,
}

impl From<CliRedistributionPolicy> for RedistributionPolicy {
    fn from(cli_policy: CliRedistributionPolicy) -> Self {
        match cli_policy {
            CliRedistributionPolicy::Splice => RedistributionPolicy::Splice,
            CliRedistributionPolicy::Proportional => RedistributionPolicy::Proportional,
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

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract translatable text from a document into an exchange file
    Extract(ExtractArgs),

    /// Apply a translated exchange file back onto a document
    Replace(ReplaceArgs),

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input document (.docx), bare WordprocessingML file (.xml) or directory
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output exchange file path (defaults to <stem>.translation.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Extract from every translatable part, not just the main document
    #[arg(long)]
    all_parts: bool,

    /// Keep document order instead of sorting entries longest-first
    #[arg(long)]
    unsorted: bool,

    /// Keep exact duplicate lines instead of collapsing them
    #[arg(long)]
    keep_duplicates: bool,

    /// Skip lines composed entirely of plain ASCII text
    #[arg(long)]
    only_translatable: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct ReplaceArgs {
    /// Input document (.docx) or directory to translate
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Translation exchange file to apply
    #[arg(short, long)]
    translations: PathBuf,

    /// Output document path (defaults to <stem>.translated.docx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Redistribution policy for writing text back across runs
    #[arg(short, long, value_enum)]
    policy: Option<CliRedistributionPolicy>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctrans - DOCX translation round-trip tool
///
/// Extracts the human-readable text of Word documents into a flat JSON
/// exchange file and re-injects translated text back into the original run
/// structure without disturbing formatting.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "1.0.0")]
#[command(about = "DOCX translation round-trip tool")]
#[command(long_about = "doctrans extracts translatable text from Word documents and applies translated text back.

EXAMPLES:
    doctrans extract report.docx                      # Write report.translation.json
    doctrans extract --all-parts report.docx          # Include headers, footers, notes
    doctrans extract -o lines.json raw_document.xml   # Extract from a bare XML part
    doctrans replace report.docx -t report.translation.json
    doctrans replace -p proportional report.docx -t done.json
    doctrans replace /documents/ -t done.json         # Translate a whole directory
    doctrans completions bash > doctrans.bash         # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

REDISTRIBUTION POLICIES:
    splice       - keep untouched text in its original runs (default)
    proportional - spread rewritten text across runs by their original lengths")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");

            let mut stderr = std::io::stderr();
            let emoji = Self::get_emoji_for_level(record.level());
            let color = Self::get_color_for_level(record.level());
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Commands::Extract(args) => run_extract(args),
        Commands::Replace(args) => run_replace(args),
    }
}

fn run_extract(options: ExtractArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;

    // Override config with CLI options if provided
    if options.all_parts {
        config.extraction.all_parts = true;
    }
    if options.unsorted {
        config.extraction.sorted = false;
    }
    if options.keep_duplicates {
        config.extraction.dedup = false;
    }
    if options.only_translatable {
        config.extraction.only_translatable = true;
    }

    let controller = Controller::with_config(config)?;
    controller.run_extract(&options.input_path, options.output, options.force_overwrite)
}

fn run_replace(options: ReplaceArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;

    // Override config with CLI options if provided
    if let Some(policy) = options.policy {
        config.redistribution = policy.into();
    }

    let controller = Controller::with_config(config)?;
    controller.run_replace(
        &options.input_path,
        &options.translations,
        options.output,
        options.force_overwrite,
    )
}

/// Load or create the configuration, applying the command-line log level
fn load_config(config_path: &str, cli_log_level: Option<&CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = cli_log_level {
        log::set_max_level(level_filter_for(&cmd_log_level.clone().into()));
    }

    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Update log level in config if specified via command line
        if let Some(log_level) = cli_log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();

        // Apply command line log level to default config if specified
        if let Some(log_level) = cli_log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if cli_log_level.is_none() {
        // Just update the max level without reinitializing the logger
        log::set_max_level(level_filter_for(&config.log_level));
    }

    Ok(config)
}

fn level_filter_for(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}
