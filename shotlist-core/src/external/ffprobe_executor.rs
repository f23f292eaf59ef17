//! FFprobe integration for duration and frame-rate probing
//!
//! `MediaProbe` is the seam detection code depends on; the production
//! implementation shells out to ffprobe through the `ffprobe` crate.
//! [`probe_duration`] wraps a probe so that failures degrade to an unknown
//! (zero) duration instead of an error.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Source of stream-level metadata for a video file.
pub trait MediaProbe {
    /// Container duration in seconds.
    fn duration(&self, input_path: &Path) -> CoreResult<f64>;

    /// Frame rate of the first video stream.
    fn frame_rate(&self, input_path: &Path) -> CoreResult<f64>;
}

/// `MediaProbe` backed by the ffprobe binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProbe for CrateFfprobeExecutor {
    fn duration(&self, input_path: &Path) -> CoreResult<f64> {
        log::debug!(
            "Running ffprobe (via crate) for duration on: {}",
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| map_ffprobe_error(err, "duration"))?;
        let raw = metadata.format.duration.as_deref().ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "No duration reported for {}",
                input_path.display()
            ))
        })?;
        parse_duration(raw).ok_or_else(|| {
            CoreError::FfprobeParse(format!(
                "Invalid duration '{}' for {}",
                raw,
                input_path.display()
            ))
        })
    }

    fn frame_rate(&self, input_path: &Path) -> CoreResult<f64> {
        log::debug!(
            "Running ffprobe (via crate) for frame rate on: {}",
            input_path.display()
        );
        let metadata = ffprobe(input_path).map_err(|err| map_ffprobe_error(err, "frame rate"))?;
        let stream = metadata
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "No video stream found in {}",
                    input_path.display()
                ))
            })?;
        parse_frame_rate(&stream.avg_frame_rate)
            .or_else(|| parse_frame_rate(&stream.r_frame_rate))
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "No usable frame rate for {} (avg={}, r={})",
                    input_path.display(),
                    stream.avg_frame_rate,
                    stream.r_frame_rate
                ))
            })
    }
}

/// A duration that is always usable: `seconds` is 0.0 when probing failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedDuration {
    pub seconds: f64,
    /// Why the duration is unknown, if it is.
    pub warning: Option<String>,
}

impl ProbedDuration {
    pub fn is_known(&self) -> bool {
        self.seconds > 0.0
    }
}

/// Probes the duration, turning every failure into `0.0` plus a warning.
pub fn probe_duration<P: MediaProbe + ?Sized>(probe: &P, input_path: &Path) -> ProbedDuration {
    match probe.duration(input_path) {
        Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => ProbedDuration {
            seconds,
            warning: None,
        },
        Ok(seconds) => {
            let warning = format!(
                "Unusable duration {} for {}, treating as unknown",
                seconds,
                input_path.display()
            );
            log::warn!("{}", warning);
            ProbedDuration {
                seconds: 0.0,
                warning: Some(warning),
            }
        }
        Err(e) => {
            let warning = format!(
                "Could not probe duration of {}: {}",
                input_path.display(),
                e
            );
            log::warn!("{}", warning);
            ProbedDuration {
                seconds: 0.0,
                warning: Some(warning),
            }
        }
    }
}

fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parses ffprobe rates such as `30000/1001`, `25/1` or `29.97`.
pub(crate) fn parse_frame_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let fps = match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => raw.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::JsonParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(CoreResult<f64>);

    impl MediaProbe for FixedProbe {
        fn duration(&self, _input_path: &Path) -> CoreResult<f64> {
            match &self.0 {
                Ok(d) => Ok(*d),
                Err(e) => Err(CoreError::FfprobeParse(e.to_string())),
            }
        }

        fn frame_rate(&self, _input_path: &Path) -> CoreResult<f64> {
            Ok(25.0)
        }
    }

    #[test]
    fn frame_rate_forms() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("24"), Some(24.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn duration_forms() {
        assert_eq!(parse_duration(" 12.5 "), Some(12.5));
        assert_eq!(parse_duration("-3"), None);
        assert_eq!(parse_duration("N/A"), None);
    }

    #[test]
    fn probe_failure_degrades_to_zero() {
        let probe = FixedProbe(Err(CoreError::FfprobeParse("boom".into())));
        let probed = probe_duration(&probe, Path::new("missing.mp4"));
        assert_eq!(probed.seconds, 0.0);
        assert!(!probed.is_known());
        assert!(probed.warning.unwrap().contains("missing.mp4"));
    }

    #[test]
    fn negative_duration_degrades_to_zero() {
        let probed = probe_duration(&FixedProbe(Ok(-1.0)), Path::new("a.mp4"));
        assert_eq!(probed.seconds, 0.0);
        assert!(probed.warning.is_some());
    }

    #[test]
    fn good_duration_passes_through() {
        let probed = probe_duration(&FixedProbe(Ok(42.0)), Path::new("a.mp4"));
        assert_eq!(probed, ProbedDuration { seconds: 42.0, warning: None });
    }
}
