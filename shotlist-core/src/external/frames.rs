//! Raw frame decoding through ffmpeg
//!
//! Frames are scaled to the requested size and delivered as packed `rgb24`
//! buffers, one at a time, so callers decide how much history to keep.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::ops::ControlFlow;
use std::path::Path;

/// Diagnostics kept for error messages when decoding produces nothing.
const MAX_ERROR_LINES: usize = 5;

/// One decoded frame in packed RGB (3 bytes per pixel, row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// Position in decode order, starting at 0
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// What happened during a decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Frames handed to the callback
    pub frames: usize,
    /// The callback asked to stop before the stream ended
    pub stopped_early: bool,
}

/// Builds the ffmpeg command that emits scaled rgb24 frames on stdout.
pub fn frame_decode_command(input_path: &Path, width: u32, height: u32) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.hide_banner();
    cmd.input(input_path.to_string_lossy().as_ref());
    cmd.args(["-an", "-sn", "-dn"]);
    cmd.arg("-vf");
    cmd.arg(format!("scale={}:{}", width, height));
    cmd.rawvideo();
    cmd
}

/// Decodes every frame of `input_path` at `width`x`height`.
///
/// Returns `CoreError::SourceOpen` when ffmpeg cannot be started or exits
/// unsuccessfully without producing a single frame.
pub fn decode_frames<S, F>(
    spawner: &S,
    input_path: &Path,
    width: u32,
    height: u32,
    mut on_frame: F,
) -> CoreResult<DecodeSummary>
where
    S: FfmpegSpawner,
    F: FnMut(VideoFrame) -> CoreResult<ControlFlow<()>>,
{
    let source = input_path.display().to_string();
    let cmd = frame_decode_command(input_path, width, height);
    let mut process = spawner
        .spawn(cmd)
        .map_err(|e| CoreError::SourceOpen(source.clone(), e.to_string()))?;

    let expected_len = width as usize * height as usize * 3;
    let mut summary = DecodeSummary {
        frames: 0,
        stopped_early: false,
    };
    let mut error_lines: Vec<String> = Vec::new();

    process.handle_events(|event| {
        match event {
            FfmpegEvent::OutputFrame(frame) => {
                if frame.width != width || frame.height != height || frame.data.len() != expected_len {
                    log::warn!(
                        "Skipping frame {} with unexpected geometry {}x{} ({} bytes)",
                        frame.frame_num,
                        frame.width,
                        frame.height,
                        frame.data.len()
                    );
                    return Ok(ControlFlow::Continue(()));
                }
                let video_frame = VideoFrame {
                    index: summary.frames,
                    width,
                    height,
                    data: frame.data,
                };
                summary.frames += 1;
                let flow = on_frame(video_frame)?;
                if flow.is_break() {
                    summary.stopped_early = true;
                }
                return Ok(flow);
            }
            FfmpegEvent::Error(line) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) => {
                log::debug!("ffmpeg: {}", line);
                if error_lines.len() == MAX_ERROR_LINES {
                    error_lines.remove(0);
                }
                error_lines.push(line);
            }
            _ => {}
        }
        Ok(ControlFlow::Continue(()))
    })?;

    let status = process.wait()?;
    if !status.success() && !summary.stopped_early {
        if summary.frames == 0 {
            let detail = if error_lines.is_empty() {
                format!("ffmpeg exited with {}", status)
            } else {
                error_lines.join("; ")
            };
            return Err(CoreError::SourceOpen(source, detail));
        }
        log::warn!(
            "ffmpeg exited with {} after {} frames of {}; using frames decoded so far",
            status,
            summary.frames,
            source
        );
    }

    log::debug!("Decoded {} frames from {}", summary.frames, source);
    Ok(summary)
}
