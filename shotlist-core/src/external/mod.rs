// ============================================================================
// shotlist-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates every interaction with the external media tools.
// Detection code depends on the traits defined here, so tests can provide
// scripted implementations instead of real binaries.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: streaming access to ffmpeg events
// - MediaProbe: duration and frame-rate probing via ffprobe
// - decode_frames: scaled rgb24 frame stream
// - check_dependency: presence check for the external binaries

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains the MediaProbe trait and the ffprobe-backed implementation
pub mod ffprobe_executor;

/// Raw frame decoding on top of the ffmpeg executor
pub mod frames;

/// Scripted spawners and probes for tests
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{CrateFfprobeExecutor, MediaProbe, ProbedDuration, probe_duration};
pub use frames::{DecodeSummary, VideoFrame, decode_frames};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` and only inspects whether it could be started.
///
/// # Returns
///
/// * `Ok(())` - The command was found
/// * `Err(CoreError::DependencyNotFound)` - The command is not on the PATH
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
