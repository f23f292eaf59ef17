// shotlist-cli/src/lib.rs
//
// Library portion of the Shotlist CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, DetectArgs, OutputFormat, ProbeArgs, ProfilesArgs};
pub use commands::{run_detect, run_probe, run_profiles};
pub use error::{CliErrorContext, CliResult};
