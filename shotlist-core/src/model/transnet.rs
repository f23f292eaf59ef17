//! TransNetV2 cut model on ONNX Runtime
//!
//! Expects an export taking `[1, 100, 27, 48, 3]` float frames (0-255 RGB) and
//! returning single-frame transition logits as its first output. Frames are
//! scored in overlapping 100-frame windows; only the middle 50 predictions
//! of each window are kept, and the sequence is padded with copies of its
//! first and last frame so every frame lands in a window middle.

use super::CutProbabilityModel;
use crate::error::{CoreError, CoreResult};
use crate::external::VideoFrame;
use ndarray::Array5;
use ort::{session::Session, value::Value};
use std::path::Path;
use std::sync::Mutex;

const INPUT_WIDTH: u32 = 48;
const INPUT_HEIGHT: u32 = 27;
const WINDOW: usize = 100;
const STEP: usize = 50;
const CONTEXT: usize = 25;

pub struct TransNetOnnx {
    session: Mutex<Session>,
}

impl TransNetOnnx {
    pub fn from_file(model_path: &Path) -> CoreResult<Self> {
        log::info!("Loading TransNetV2 ONNX model from {}", model_path.display());
        let session = Session::builder()
            .map_err(|e| load_error(model_path, e))?
            .with_intra_threads(4)
            .map_err(|e| load_error(model_path, e))?
            .commit_from_file(model_path)
            .map_err(|e| load_error(model_path, e))?;
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    fn run_window(&self, window: &[&VideoFrame]) -> CoreResult<Vec<f32>> {
        let h = INPUT_HEIGHT as usize;
        let w = INPUT_WIDTH as usize;
        let mut data = Vec::with_capacity(WINDOW * h * w * 3);
        for frame in window {
            data.extend(frame.data.iter().map(|&b| b as f32));
        }
        let input = Array5::from_shape_vec((1, WINDOW, h, w, 3), data)
            .map_err(|e| CoreError::Model(format!("Failed to shape TransNetV2 input: {}", e)))?;
        let value = Value::from_array(input)
            .map_err(|e| CoreError::Model(format!("Failed to create input tensor: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CoreError::Model("TransNetV2 session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs![value])
            .map_err(|e| CoreError::Model(format!("TransNetV2 inference failed: {}", e)))?;
        let (_shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| CoreError::Model(format!("Failed to extract TransNetV2 output: {}", e)))?;
        if logits.len() < WINDOW {
            return Err(CoreError::Model(format!(
                "TransNetV2 returned {} values for a {}-frame window",
                logits.len(),
                WINDOW
            )));
        }
        Ok(logits[CONTEXT..CONTEXT + STEP]
            .iter()
            .map(|&x| 1.0 / (1.0 + (-x).exp()))
            .collect())
    }
}

fn load_error(model_path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::Model(format!(
        "Failed to load ONNX model from {}: {}",
        model_path.display(),
        err
    ))
}

/// Frame order with context padding: 25 leading copies of the first frame,
/// trailing copies of the last frame up to a whole number of steps.
fn padded_indices(n: usize) -> Vec<usize> {
    let remainder = n % STEP;
    let tail = CONTEXT + if remainder == 0 { STEP } else { STEP - remainder };
    let mut indices = Vec::with_capacity(CONTEXT + n + tail);
    indices.extend(std::iter::repeat_n(0, CONTEXT));
    indices.extend(0..n);
    indices.extend(std::iter::repeat_n(n - 1, tail));
    indices
}

impl CutProbabilityModel for TransNetOnnx {
    fn name(&self) -> &str {
        "transnetv2-onnx"
    }

    fn input_size(&self) -> (u32, u32) {
        (INPUT_WIDTH, INPUT_HEIGHT)
    }

    fn predict(&self, frames: &[VideoFrame]) -> CoreResult<Vec<f32>> {
        if frames.is_empty() {
            return Ok(Vec::new());
        }
        let order = padded_indices(frames.len());
        let mut probabilities = Vec::with_capacity(order.len());
        let mut start = 0;
        while start + WINDOW <= order.len() {
            let window: Vec<&VideoFrame> = order[start..start + WINDOW]
                .iter()
                .map(|&i| &frames[i])
                .collect();
            probabilities.extend(self.run_window(&window)?);
            start += STEP;
        }
        probabilities.truncate(frames.len());
        Ok(probabilities)
    }
}
