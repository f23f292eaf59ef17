//! Filter-log engine
//!
//! Runs ffmpeg's scene-score `select` filter followed by `showinfo` and
//! collects the `pts_time` of every frame that passed the filter. The log is
//! consumed line by line as ffmpeg produces it.

use super::boundaries::{close_at_duration, intervals_from_cuts};
use crate::config::{DetectionSettings, FilterLogParams};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegProcess, FfmpegSpawner};
use crate::shot::RawInterval;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::ControlFlow;
use std::path::Path;

static PTS_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"pts_time:(\d+(?:\.\d*)?)").expect("valid pts_time regex"));

/// Accumulates cut times from ffmpeg log lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CutTimeCollector {
    cuts: Vec<f64>,
}

impl CutTimeCollector {
    pub fn new() -> Self {
        Self { cuts: vec![0.0] }
    }

    /// Records the line's `pts_time` if it has a positive one.
    pub fn observe_line(&mut self, line: &str) -> Option<f64> {
        let time = PTS_TIME_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|t| *t > 0.0)?;
        self.cuts.push(time);
        Some(time)
    }

    /// Cut times so far, always starting with 0.0.
    pub fn cut_times(&self) -> &[f64] {
        &self.cuts
    }

    /// Closes the list at `duration`.
    pub fn finish(mut self, duration: f64) -> Vec<f64> {
        close_at_duration(&mut self.cuts, duration);
        self.cuts
    }
}

/// `select='gt(scene,T)',showinfo`
pub(crate) fn scene_filter(scene_threshold: f64) -> String {
    format!("select='gt(scene,{})',showinfo", scene_threshold)
}

fn scene_filter_command(video: &Path, scene_threshold: f64) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.input(video.to_string_lossy().as_ref());
    cmd.arg("-filter:v");
    cmd.arg(scene_filter(scene_threshold));
    cmd.arg("-an");
    cmd.format("null");
    cmd.output("-");
    cmd
}

/// Runs the filter-log engine. Returns no intervals when the duration is
/// unknown or ffmpeg cannot be started.
pub(crate) fn detect<S: FfmpegSpawner>(
    spawner: &S,
    video: &Path,
    duration: f64,
    params: &FilterLogParams,
    settings: &DetectionSettings,
) -> CoreResult<Vec<RawInterval>> {
    if duration <= 0.0 {
        log::warn!("Unknown duration for {}, skipping ffmpeg scene filter", video.display());
        return Ok(Vec::new());
    }

    let cmd = scene_filter_command(video, params.scene_threshold);
    let mut process = match spawner.spawn(cmd) {
        Ok(process) => process,
        Err(e) => {
            log::warn!("Could not start ffmpeg scene filter on {}: {}", video.display(), e);
            return Ok(Vec::new());
        }
    };

    let mut collector = CutTimeCollector::new();
    let streamed = process.handle_events(|event| {
        match event {
            FfmpegEvent::Log(_, line) => {
                if let Some(t) = collector.observe_line(&line) {
                    log::trace!("Scene cut candidate at {:.3}s", t);
                }
            }
            FfmpegEvent::Error(line) => log::debug!("ffmpeg: {}", line),
            _ => {}
        }
        Ok(ControlFlow::Continue(()))
    });
    match streamed {
        Ok(()) => {}
        Err(e @ CoreError::Timeout(..)) => return Err(e),
        Err(e) => {
            log::warn!("Reading ffmpeg scene filter output failed for {}: {}", video.display(), e);
            return Ok(Vec::new());
        }
    }

    match process.wait() {
        Ok(status) if !status.success() => log::warn!(
            "ffmpeg scene filter exited with {} for {}; using {} cuts parsed so far",
            status,
            video.display(),
            collector.cut_times().len() - 1
        ),
        Ok(_) => {}
        Err(e) => log::warn!("Failed waiting for ffmpeg scene filter: {}", e),
    }

    let cuts = collector.finish(duration);
    log::info!("ffmpeg scene filter found {} cut(s)", cuts.len().saturating_sub(2));
    Ok(intervals_from_cuts(&cuts, settings.cut_merge_gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, log_line_event, showinfo_event};

    #[test]
    fn collector_parses_pts_time() {
        let mut collector = CutTimeCollector::new();
        assert_eq!(
            collector.observe_line("[Parsed_showinfo_1 @ 0x1] n:   3 pts: 29440 pts_time:2.3 pos:1"),
            Some(2.3)
        );
        assert_eq!(collector.observe_line("pts_time:5"), Some(5.0));
        assert_eq!(collector.observe_line("frame=  100 fps=0.0 q=-0.0"), None);
        assert_eq!(collector.observe_line("pts_time:0.000"), None);
        assert_eq!(collector.cut_times(), &[0.0, 2.3, 5.0]);
        assert_eq!(collector.finish(10.0), vec![0.0, 2.3, 5.0, 10.0]);
    }

    #[test]
    fn filter_expression() {
        assert_eq!(scene_filter(0.4), "select='gt(scene,0.4)',showinfo");
    }

    #[test]
    fn two_cuts_make_three_intervals() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation(
            "gt(scene,0.4)",
            vec![
                log_line_event("Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'in.mp4':"),
                showinfo_event(0, 2.3),
                log_line_event("not a showinfo line"),
                showinfo_event(1, 5.0),
            ],
        );
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            10.0,
            &FilterLogParams::default(),
            &DetectionSettings::default(),
        )
        .unwrap();
        assert_eq!(
            intervals,
            vec![
                RawInterval::new(0.0, 2.3),
                RawInterval::new(2.3, 5.0),
                RawInterval::new(5.0, 10.0),
            ]
        );
        let args = &spawner.get_received_calls()[0];
        assert!(args.iter().any(|a| a == "null"));
    }

    #[test]
    fn zero_duration_does_not_spawn() {
        let spawner = MockFfmpegSpawner::new();
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            0.0,
            &FilterLogParams::default(),
            &DetectionSettings::default(),
        )
        .unwrap();
        assert!(intervals.is_empty());
        assert!(spawner.get_received_calls().is_empty());
    }

    #[test]
    fn spawn_failure_is_empty() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_spawn_error_expectation("gt(scene,", CoreError::DependencyNotFound("ffmpeg".into()));
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            10.0,
            &FilterLogParams::default(),
            &DetectionSettings::default(),
        )
        .unwrap();
        assert!(intervals.is_empty());
    }

    #[test]
    fn failed_exit_keeps_parsed_cuts() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("gt(scene,", vec![showinfo_event(0, 4.0)], 1);
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            8.0,
            &FilterLogParams::default(),
            &DetectionSettings::default(),
        )
        .unwrap();
        assert_eq!(
            intervals,
            vec![RawInterval::new(0.0, 4.0), RawInterval::new(4.0, 8.0)]
        );
    }
}
