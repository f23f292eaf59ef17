//! Histogram-distance cut model
//!
//! Scores each frame by how far its luma histogram moved from the previous
//! frame's, squashed through a logistic curve. Needs no model weights, so it
//! is always available.

use super::CutProbabilityModel;
use crate::error::{CoreError, CoreResult};
use crate::external::VideoFrame;
use rayon::prelude::*;

const HISTOGRAM_BINS: usize = 64;

/// Luma-histogram distance mapped to a cut probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramCutModel {
    /// Histogram distance (0..1) that maps to probability 0.5
    pub midpoint: f32,
    /// Logistic slope
    pub steepness: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for HistogramCutModel {
    fn default() -> Self {
        Self {
            midpoint: 0.35,
            steepness: 12.0,
            width: 64,
            height: 36,
        }
    }
}

impl HistogramCutModel {
    fn probability(&self, distance: f32) -> f32 {
        1.0 / (1.0 + (-self.steepness * (distance - self.midpoint)).exp())
    }
}

/// Normalized luma histogram of an rgb24 frame.
fn luma_histogram(frame: &VideoFrame) -> [f32; HISTOGRAM_BINS] {
    let mut counts = [0u32; HISTOGRAM_BINS];
    for px in frame.data.chunks_exact(3) {
        // BT.601 luma in integer arithmetic
        let y = (299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32) / 1000;
        counts[(y as usize * HISTOGRAM_BINS) / 256] += 1;
    }
    let total = frame.pixel_count().max(1) as f32;
    let mut hist = [0f32; HISTOGRAM_BINS];
    for (bin, count) in hist.iter_mut().zip(counts) {
        *bin = count as f32 / total;
    }
    hist
}

/// Half the L1 distance, in `[0, 1]`.
fn histogram_distance(a: &[f32; HISTOGRAM_BINS], b: &[f32; HISTOGRAM_BINS]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f32>() / 2.0
}

impl CutProbabilityModel for HistogramCutModel {
    fn name(&self) -> &str {
        "histogram"
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn predict(&self, frames: &[VideoFrame]) -> CoreResult<Vec<f32>> {
        let expected = self.width as usize * self.height as usize * 3;
        if let Some(bad) = frames.iter().find(|f| f.data.len() != expected) {
            return Err(CoreError::Model(format!(
                "frame {} has {} bytes, expected {} for {}x{} rgb24",
                bad.index,
                bad.data.len(),
                expected,
                self.width,
                self.height
            )));
        }

        let histograms: Vec<[f32; HISTOGRAM_BINS]> = frames.par_iter().map(luma_histogram).collect();

        let mut probabilities = Vec::with_capacity(frames.len());
        if !histograms.is_empty() {
            probabilities.push(0.0);
        }
        probabilities.extend(
            histograms
                .windows(2)
                .map(|pair| self.probability(histogram_distance(&pair[0], &pair[1]))),
        );
        Ok(probabilities)
    }
}
