//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Runs shot detection on a video and writes the shot list.
pub mod detect;

/// Lists built-in and file-defined profiles.
pub mod profiles;

/// Reports what ffprobe knows about a video.
pub mod probe;

pub use detect::run_detect;
pub use probe::run_probe;
pub use profiles::run_profiles;

use crate::error::CliResult;
use shotlist_core::ProfileRegistry;
use std::path::Path;

/// Built-in profiles, overlaid with `profiles_file` when given.
pub(crate) fn load_profiles(profiles_file: Option<&Path>) -> CliResult<ProfileRegistry> {
    match profiles_file {
        Some(path) => {
            log::debug!("Loading profiles from {}", path.display());
            ProfileRegistry::with_file(path)
        }
        None => Ok(ProfileRegistry::builtin()),
    }
}
