//! Content-score engine
//!
//! Compares each decoded frame with the previous one in HSV space and starts
//! a new scene when the change score reaches the threshold, provided the
//! current scene is already `min_scene_len` frames long. Only the previous
//! frame is held in memory.

use crate::config::{ContentScoreParams, DetectionSettings};
use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegSpawner, VideoFrame, decode_frames};
use crate::shot::RawInterval;
use std::ops::ControlFlow;
use std::path::Path;

/// HSV pixel, each channel on a 0-255 scale (hue wraps at 256).
type Hsv = [f32; 3];

fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g.max(b));
    let min = r.min(g.min(b));
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    [h / 360.0 * 256.0, s * 255.0, max * 255.0]
}

fn frame_to_hsv(frame: &VideoFrame) -> Vec<Hsv> {
    frame
        .data
        .chunks_exact(3)
        .map(|px| rgb_to_hsv(px[0], px[1], px[2]))
        .collect()
}

/// Mean of the per-channel mean absolute HSV differences.
pub(crate) fn content_score(prev: &[Hsv], cur: &[Hsv]) -> f64 {
    let n = prev.len().min(cur.len());
    if n == 0 {
        return 0.0;
    }
    let mut sums = [0f64; 3];
    for (a, b) in prev.iter().zip(cur) {
        let dh = (a[0] - b[0]).abs();
        sums[0] += dh.min(256.0 - dh) as f64;
        sums[1] += (a[1] - b[1]).abs() as f64;
        sums[2] += (a[2] - b[2]).abs() as f64;
    }
    sums.iter().sum::<f64>() / (3.0 * n as f64)
}

/// Streaming scene-cut state.
#[derive(Debug)]
pub(crate) struct ContentScoreDetector {
    params: ContentScoreParams,
    previous: Option<Vec<Hsv>>,
    frames_seen: u64,
    last_cut: u64,
    cuts: Vec<u64>,
}

impl ContentScoreDetector {
    pub fn new(params: ContentScoreParams) -> Self {
        Self {
            params,
            previous: None,
            frames_seen: 0,
            last_cut: 0,
            cuts: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, frame: &VideoFrame) {
        let hsv = frame_to_hsv(frame);
        let index = self.frames_seen;
        if let Some(previous) = &self.previous {
            let score = content_score(previous, &hsv);
            if score >= self.params.threshold
                && index - self.last_cut >= u64::from(self.params.min_scene_len)
            {
                log::trace!("Content cut at frame {} (score {:.2})", index, score);
                self.cuts.push(index);
                self.last_cut = index;
            }
        }
        self.previous = Some(hsv);
        self.frames_seen += 1;
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    pub fn cut_frames(&self) -> &[u64] {
        &self.cuts
    }

    /// Scenes between consecutive cuts, converted to seconds.
    pub fn finish(self, fps: f64) -> Vec<RawInterval> {
        if self.frames_seen == 0 {
            return Vec::new();
        }
        let mut bounds = Vec::with_capacity(self.cuts.len() + 2);
        bounds.push(0u64);
        bounds.extend(&self.cuts);
        bounds.push(self.frames_seen);
        bounds
            .windows(2)
            .map(|pair| RawInterval::new(pair[0] as f64 / fps, pair[1] as f64 / fps))
            .collect()
    }
}

/// Runs the content-score engine. An unreadable source yields no intervals.
pub(crate) fn detect<S: FfmpegSpawner>(
    spawner: &S,
    video: &Path,
    fps: f64,
    params: &ContentScoreParams,
    settings: &DetectionSettings,
) -> CoreResult<Vec<RawInterval>> {
    let mut detector = ContentScoreDetector::new(*params);
    let decoded = decode_frames(
        spawner,
        video,
        settings.analysis_width,
        settings.analysis_height,
        |frame| {
            detector.push_frame(&frame);
            Ok(ControlFlow::Continue(()))
        },
    );
    match decoded {
        Ok(_) => {}
        Err(e @ CoreError::Timeout(..)) => return Err(e),
        Err(e) => {
            log::warn!("Content analysis could not read {}: {}", video.display(), e);
            return Ok(Vec::new());
        }
    }

    if detector.frames_seen() == 0 {
        log::warn!("No frames decoded from {}", video.display());
        return Ok(Vec::new());
    }
    log::info!(
        "Content analysis found {} cut(s) in {} frames",
        detector.cut_frames().len(),
        detector.frames_seen()
    );
    Ok(detector.finish(fps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, solid_frame_event};

    fn solid(rgb: [u8; 3]) -> VideoFrame {
        VideoFrame {
            index: 0,
            width: 2,
            height: 2,
            data: rgb.iter().copied().cycle().take(12).collect(),
        }
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(rgb_to_hsv(0, 0, 0), [0.0, 0.0, 0.0]);
        assert_eq!(rgb_to_hsv(255, 255, 255), [0.0, 0.0, 255.0]);
        let blue = rgb_to_hsv(0, 0, 255);
        assert!((blue[0] - 170.67).abs() < 0.01);
        assert_eq!(blue[1], 255.0);
    }

    #[test]
    fn black_to_white_scores_85() {
        let black = frame_to_hsv(&solid([0, 0, 0]));
        let white = frame_to_hsv(&solid([255, 255, 255]));
        assert!((content_score(&black, &white) - 85.0).abs() < 1e-6);
        assert_eq!(content_score(&black, &black), 0.0);
    }

    #[test]
    fn hue_difference_wraps() {
        let red = frame_to_hsv(&solid([255, 0, 0]));
        let magenta_red = frame_to_hsv(&solid([255, 0, 10]));
        assert!(content_score(&red, &magenta_red) < 5.0);
    }

    #[test]
    fn min_scene_len_suppresses_early_cuts() {
        let params = ContentScoreParams {
            threshold: 27.0,
            min_scene_len: 3,
        };
        let mut detector = ContentScoreDetector::new(params);
        // Flashes at frames 1, 2, 4 and 7; only 4 and 7 are far enough apart.
        let colors = [0u8, 255, 0, 0, 255, 255, 255, 0, 0];
        for c in colors {
            detector.push_frame(&solid([c, c, c]));
        }
        assert_eq!(detector.cut_frames(), &[4, 7]);
        let intervals = detector.finish(1.0);
        assert_eq!(
            intervals,
            vec![
                RawInterval::new(0.0, 4.0),
                RawInterval::new(4.0, 7.0),
                RawInterval::new(7.0, 9.0),
            ]
        );
    }

    #[test]
    fn no_cuts_single_scene() {
        let mut detector = ContentScoreDetector::new(ContentScoreParams::default());
        for _ in 0..50 {
            detector.push_frame(&solid([10, 20, 30]));
        }
        assert_eq!(detector.finish(25.0), vec![RawInterval::new(0.0, 2.0)]);
    }

    #[test]
    fn detect_streams_frames_from_ffmpeg() {
        let settings = DetectionSettings {
            analysis_width: 2,
            analysis_height: 2,
            ..DetectionSettings::default()
        };
        let params = ContentScoreParams {
            threshold: 27.0,
            min_scene_len: 2,
        };
        let mut events = Vec::new();
        for n in 0..4 {
            events.push(solid_frame_event(n, 2, 2, [0, 0, 0]));
        }
        for n in 4..8 {
            events.push(solid_frame_event(n, 2, 2, [255, 255, 255]));
        }
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation("scale=2:2", events);

        let intervals = detect(&spawner, Path::new("in.mp4"), 4.0, &params, &settings).unwrap();
        assert_eq!(
            intervals,
            vec![RawInterval::new(0.0, 1.0), RawInterval::new(1.0, 2.0)]
        );
    }

    #[test]
    fn unreadable_source_is_empty() {
        let spawner = MockFfmpegSpawner::new();
        spawner.add_exit_error_expectation("scale=", Vec::new(), 1);
        let intervals = detect(
            &spawner,
            Path::new("missing.mp4"),
            25.0,
            &ContentScoreParams::default(),
            &DetectionSettings::default(),
        )
        .unwrap();
        assert!(intervals.is_empty());
    }
}
