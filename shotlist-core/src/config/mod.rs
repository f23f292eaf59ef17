//! Configuration structures and constants for shot detection.
//!
//! `DetectionSettings` holds the knobs shared by every engine (normalizer
//! thresholds, process limits, analysis frame size). Engine selection and
//! per-engine parameters live in [`engine`], named presets in [`profiles`].

pub mod engine;
pub mod profiles;
pub mod utils;

use crate::error::{CoreResult, config_error};
use std::time::Duration;
use utils::*;

pub use engine::{ContentScoreParams, EngineConfig, EngineKind, FilterLogParams, ProbabilityParams};
pub use profiles::ProfileRegistry;

// Default constants

/// Shots shorter than this (seconds) are dropped by the normalizer.
pub const DEFAULT_MIN_SHOT_LENGTH: f64 = 0.2;

/// Cuts closer than this (seconds) to the previously kept cut are absorbed.
pub const DEFAULT_CUT_MERGE_GAP: f64 = 0.1;

/// Upper bound on a single ffmpeg run, in seconds.
pub const DEFAULT_PROCESS_TIMEOUT_SECS: u64 = 3600;

/// Frames held in memory by the probability engine before truncating.
pub const DEFAULT_MAX_BUFFERED_FRAMES: usize = 100_000;

/// Frame size used by the content-score engine.
pub const DEFAULT_ANALYSIS_WIDTH: u32 = 160;
pub const DEFAULT_ANALYSIS_HEIGHT: u32 = 90;

/// Frame rate assumed when the container does not report one.
pub const FALLBACK_FPS: f64 = 25.0;

/// Settings shared by all detection engines.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    /// Minimum shot length kept by the normalizer, in seconds
    pub min_shot_length: f64,

    /// Minimum spacing between consecutive cuts, in seconds
    pub cut_merge_gap: f64,

    /// Deadline for each ffmpeg process; `None` waits forever
    pub process_timeout: Option<Duration>,

    /// Frame buffer bound for the probability engine
    pub max_buffered_frames: usize,

    /// Decode width for the content-score engine
    pub analysis_width: u32,

    /// Decode height for the content-score engine
    pub analysis_height: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            min_shot_length: DEFAULT_MIN_SHOT_LENGTH,
            cut_merge_gap: DEFAULT_CUT_MERGE_GAP,
            process_timeout: Some(Duration::from_secs(DEFAULT_PROCESS_TIMEOUT_SECS)),
            max_buffered_frames: DEFAULT_MAX_BUFFERED_FRAMES,
            analysis_width: DEFAULT_ANALYSIS_WIDTH,
            analysis_height: DEFAULT_ANALYSIS_HEIGHT,
        }
    }
}

impl DetectionSettings {
    /// Builds settings from defaults overridden by `SHOTLIST_*` variables.
    ///
    /// `SHOTLIST_PROCESS_TIMEOUT_SECS=0` disables the process deadline.
    pub fn from_env() -> Self {
        let timeout_secs =
            get_env_u64("SHOTLIST_PROCESS_TIMEOUT_SECS", DEFAULT_PROCESS_TIMEOUT_SECS);
        Self {
            min_shot_length: get_env_f64("SHOTLIST_MIN_SHOT_LENGTH", DEFAULT_MIN_SHOT_LENGTH),
            cut_merge_gap: get_env_f64("SHOTLIST_CUT_MERGE_GAP", DEFAULT_CUT_MERGE_GAP),
            process_timeout: timeout_from_secs(timeout_secs),
            max_buffered_frames: get_env_usize(
                "SHOTLIST_MAX_BUFFERED_FRAMES",
                DEFAULT_MAX_BUFFERED_FRAMES,
            ),
            analysis_width: get_env_u32("SHOTLIST_ANALYSIS_WIDTH", DEFAULT_ANALYSIS_WIDTH),
            analysis_height: get_env_u32("SHOTLIST_ANALYSIS_HEIGHT", DEFAULT_ANALYSIS_HEIGHT),
        }
    }

    pub fn with_process_timeout_secs(mut self, secs: u64) -> Self {
        self.process_timeout = timeout_from_secs(secs);
        self
    }

    pub fn with_min_shot_length(mut self, seconds: f64) -> Self {
        self.min_shot_length = seconds;
        self
    }

    /// Rejects values that would make normalization or decoding meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.min_shot_length.is_finite() || self.min_shot_length < 0.0 {
            return Err(config_error(format!(
                "min_shot_length must be a non-negative number, got {}",
                self.min_shot_length
            )));
        }
        if !self.cut_merge_gap.is_finite() || self.cut_merge_gap < 0.0 {
            return Err(config_error(format!(
                "cut_merge_gap must be a non-negative number, got {}",
                self.cut_merge_gap
            )));
        }
        if self.max_buffered_frames == 0 {
            return Err(config_error("max_buffered_frames must be at least 1"));
        }
        if self.analysis_width == 0 || self.analysis_height == 0 {
            return Err(config_error(format!(
                "analysis size must be non-zero, got {}x{}",
                self.analysis_width, self.analysis_height
            )));
        }
        Ok(())
    }
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = DetectionSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.min_shot_length, 0.2);
        assert_eq!(settings.cut_merge_gap, 0.1);
        assert_eq!(settings.process_timeout, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn zero_timeout_disables_deadline() {
        let settings = DetectionSettings::default().with_process_timeout_secs(0);
        assert!(settings.process_timeout.is_none());
    }

    #[test]
    fn negative_min_length_rejected() {
        let settings = DetectionSettings::default().with_min_shot_length(-1.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn zero_analysis_size_rejected() {
        let settings = DetectionSettings {
            analysis_width: 0,
            ..DetectionSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
