//! Probability-sequence engine
//!
//! Decodes the whole video at the model's input size, asks the model for a
//! cut probability per frame and keeps the peaks that respect the minimum
//! frame gap.

use super::boundaries::{close_at_duration, intervals_from_cuts};
use crate::config::{DetectionSettings, ProbabilityParams};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, VideoFrame, decode_frames};
use crate::model::ModelContext;
use crate::shot::RawInterval;
use std::ops::ControlFlow;
use std::path::Path;

/// Forward scan keeping frames at or above `threshold` that are at least
/// `min_gap` frames after the previously kept one.
pub(crate) fn pick_cut_frames(probabilities: &[f32], threshold: f64, min_gap: u32) -> Vec<usize> {
    let min_gap = i64::from(min_gap);
    let mut last_cut = -min_gap;
    let mut cuts = Vec::new();
    for (i, &p) in probabilities.iter().enumerate() {
        let frame = i as i64;
        if f64::from(p) >= threshold && frame - last_cut >= min_gap {
            cuts.push(i);
            last_cut = frame;
        }
    }
    cuts
}

/// Buffers up to `limit` decoded frames.
///
/// The flag is set only when the stream had a frame past the limit.
fn buffer_frames<S: FfmpegSpawner>(
    spawner: &S,
    video: &Path,
    width: u32,
    height: u32,
    limit: usize,
) -> CoreResult<(Vec<VideoFrame>, bool)> {
    let mut frames: Vec<VideoFrame> = Vec::new();
    let summary = decode_frames(spawner, video, width, height, |frame| {
        if frames.len() >= limit {
            return Ok(ControlFlow::Break(()));
        }
        frames.push(frame);
        Ok(ControlFlow::Continue(()))
    })?;
    Ok((frames, summary.stopped_early))
}

/// Runs the probability engine.
///
/// Unlike the other engines, a source that cannot be opened is an error.
pub(crate) fn detect<S: FfmpegSpawner>(
    spawner: &S,
    video: &Path,
    duration: f64,
    fps: f64,
    params: &ProbabilityParams,
    settings: &DetectionSettings,
    models: &ModelContext,
) -> CoreResult<Vec<RawInterval>> {
    let model = models.get_or_load()?;
    let (width, height) = model.input_size();

    let limit = settings.max_buffered_frames;
    let (frames, truncated) = buffer_frames(spawner, video, width, height, limit)?;
    if truncated {
        log::warn!(
            "Frame buffer limit of {} reached for {}; frames past {:.1}s are not analyzed",
            limit,
            video.display(),
            limit as f64 / fps
        );
    }

    if frames.is_empty() {
        log::warn!("No frames decoded from {}", video.display());
        return Ok(Vec::new());
    }

    log::debug!("Scoring {} frames with model '{}'", frames.len(), model.name());
    let probabilities = model.predict(&frames)?;
    if probabilities.len() != frames.len() {
        return Err(CoreError::Model(format!(
            "model '{}' returned {} probabilities for {} frames",
            model.name(),
            probabilities.len(),
            frames.len()
        )));
    }
    drop(frames);

    let cut_frames = pick_cut_frames(
        &probabilities,
        params.probability_threshold,
        params.min_gap_frames,
    );
    let mut cut_times = vec![0.0];
    cut_times.extend(
        cut_frames
            .iter()
            .map(|&i| i as f64 / fps)
            .filter(|&t| t < duration),
    );
    log::info!("Cut-probability model found {} cut(s)", cut_times.len() - 1);

    close_at_duration(&mut cut_times, duration);
    Ok(intervals_from_cuts(&cut_times, settings.cut_merge_gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, solid_frame_event};
    use crate::model::CutProbabilityModel;
    use std::sync::Arc;

    /// Returns fixed probabilities, padded with zeros.
    struct ScriptedModel {
        peaks: Vec<(usize, f32)>,
    }

    impl CutProbabilityModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        fn input_size(&self) -> (u32, u32) {
            (2, 2)
        }

        fn predict(&self, frames: &[VideoFrame]) -> CoreResult<Vec<f32>> {
            let mut probs = vec![0.0; frames.len()];
            for &(i, p) in &self.peaks {
                if i < probs.len() {
                    probs[i] = p;
                }
            }
            Ok(probs)
        }
    }

    fn frames(count: u32) -> Vec<ffmpeg_sidecar::event::FfmpegEvent> {
        (0..count).map(|n| solid_frame_event(n, 2, 2, [50, 50, 50])).collect()
    }

    #[test]
    fn gap_suppresses_close_peaks() {
        let mut probs = vec![0.0f32; 20];
        probs[10] = 0.7;
        probs[12] = 0.9;
        assert_eq!(pick_cut_frames(&probs, 0.6, 5), vec![10]);
    }

    #[test]
    fn first_frame_can_be_a_cut() {
        assert_eq!(pick_cut_frames(&[0.9, 0.0, 0.0], 0.5, 5), vec![0]);
    }

    #[test]
    fn single_cut_at_point_four_seconds() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", frames(50));
        let models = ModelContext::preloaded(Arc::new(ScriptedModel {
            peaks: vec![(10, 0.7), (12, 0.9)],
        }));
        let params = ProbabilityParams {
            probability_threshold: 0.6,
            min_gap_frames: 5,
        };
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            2.0,
            25.0,
            &params,
            &DetectionSettings::default(),
            &models,
        )
        .unwrap();
        assert_eq!(
            intervals,
            vec![RawInterval::new(0.0, 0.4), RawInterval::new(0.4, 2.0)]
        );
    }

    #[test]
    fn cuts_past_duration_dropped() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", frames(50));
        let models = ModelContext::preloaded(Arc::new(ScriptedModel {
            peaks: vec![(45, 0.9)],
        }));
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            1.5,
            25.0,
            &ProbabilityParams::default(),
            &DetectionSettings::default(),
            &models,
        )
        .unwrap();
        assert_eq!(intervals, vec![RawInterval::new(0.0, 1.5)]);
    }

    #[test]
    fn buffer_limit_truncates() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", frames(50));
        let models = ModelContext::preloaded(Arc::new(ScriptedModel {
            peaks: vec![(5, 0.9), (30, 0.9)],
        }));
        let settings = DetectionSettings {
            max_buffered_frames: 20,
            ..DetectionSettings::default()
        };
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            2.0,
            25.0,
            &ProbabilityParams::default(),
            &settings,
            &models,
        )
        .unwrap();
        assert_eq!(spawner.last_delivered(), Some(21));
        assert_eq!(
            intervals,
            vec![RawInterval::new(0.0, 0.2), RawInterval::new(0.2, 2.0)]
        );
    }

    #[test]
    fn stream_ending_at_limit_not_truncated() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", frames(20));
        let (buffered, truncated) =
            buffer_frames(&spawner, Path::new("in.mp4"), 2, 2, 20).unwrap();
        assert_eq!(buffered.len(), 20);
        assert!(!truncated);

        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", frames(21));
        let (buffered, truncated) =
            buffer_frames(&spawner, Path::new("in.mp4"), 2, 2, 20).unwrap();
        assert_eq!(buffered.len(), 20);
        assert!(truncated);
    }

    #[test]
    fn unopenable_source_is_error() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("scale=2:2", Vec::new(), 1);
        let models = ModelContext::preloaded(Arc::new(ScriptedModel { peaks: Vec::new() }));
        let err = detect(
            &spawner,
            Path::new("missing.mp4"),
            2.0,
            25.0,
            &ProbabilityParams::default(),
            &DetectionSettings::default(),
            &models,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::SourceOpen(..)));
    }

    #[test]
    fn no_frames_is_empty() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", Vec::new());
        let models = ModelContext::preloaded(Arc::new(ScriptedModel { peaks: Vec::new() }));
        let intervals = detect(
            &spawner,
            Path::new("in.mp4"),
            2.0,
            25.0,
            &ProbabilityParams::default(),
            &DetectionSettings::default(),
            &models,
        )
        .unwrap();
        assert!(intervals.is_empty());
    }
}
