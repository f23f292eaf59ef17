// shotlist-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Shotlist: shot boundary detection",
    long_about = "Splits a video into a normalized list of shots using one of several detection engines."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write logs to a timestamped file in this directory
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detects shots in a video and prints the shot list
    Detect(DetectArgs),
    /// Lists the available detection profiles
    Profiles(ProfilesArgs),
    /// Prints the probed duration and frame rate of a video
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Video file to analyze
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,

    /// Detection engine (pyscenedetect, ffmpeg, transnetv2)
    #[arg(short, long, value_name = "NAME", conflicts_with = "profile")]
    pub engine: Option<String>,

    /// Named profile to use (defaults to "default")
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Engine parameter override, may be repeated (e.g. --param threshold=30)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// JSON file with additional or replacement profiles
    #[arg(long, value_name = "FILE", env = "SHOTLIST_PROFILES_FILE")]
    pub profiles_file: Option<PathBuf>,

    /// Drop shots shorter than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub min_shot_length: Option<f64>,

    /// Kill ffmpeg after this many seconds (0 disables the limit)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the shot list to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ProfilesArgs {
    /// JSON file with additional or replacement profiles
    #[arg(long, value_name = "FILE", env = "SHOTLIST_PROFILES_FILE")]
    pub profiles_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Video file to probe
    #[arg(required = true, value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}
