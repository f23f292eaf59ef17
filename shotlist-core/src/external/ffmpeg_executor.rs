// ============================================================================
// shotlist-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. Detection engines only see the traits, so tests can substitute
// scripted event streams for a real ffmpeg binary.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
//
// Events are consumed one at a time. A handler may stop the stream early by
// returning `ControlFlow::Break`, which kills the child. When a deadline is
// configured the event stream is forwarded through a bounded channel and the
// child is killed once the deadline passes.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::ops::ControlFlow;
use std::process::ExitStatus;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Events buffered between the forwarding thread and the consumer.
const EVENT_CHANNEL_CAPACITY: usize = 64;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Feeds events to `handler` until the stream ends or the handler breaks.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess {
    child: SidecarChild,
    timeout: Option<Duration>,
}

impl SidecarProcess {
    /// Kills and reaps the child. A later `wait` returns the cached status.
    fn kill(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("Failed to kill ffmpeg process (may have already exited): {}", e);
        }
        if let Err(e) = self.child.wait() {
            log::debug!("Failed to reap ffmpeg process: {}", e);
        }
    }

    fn drive_with_deadline<F>(&mut self, timeout: Duration, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>,
    {
        let iterator = self.child.iter().map_err(|e| iterator_error(&e))?;
        let (tx, rx) = mpsc::sync_channel(EVENT_CHANNEL_CAPACITY);
        thread::spawn(move || {
            for event in iterator {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(event) => match handler(event) {
                    Ok(ControlFlow::Continue(())) => {}
                    Ok(ControlFlow::Break(())) => {
                        self.kill();
                        return Ok(());
                    }
                    Err(e) => {
                        self.kill();
                        return Err(e);
                    }
                },
                Err(RecvTimeoutError::Timeout) => {
                    log::error!("ffmpeg exceeded {}s deadline, killing it", timeout.as_secs());
                    self.kill();
                    return Err(CoreError::Timeout("ffmpeg".to_string(), timeout.as_secs()));
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }
}

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>,
    {
        if let Some(timeout) = self.timeout {
            return self.drive_with_deadline(timeout, handler);
        }

        let iterator = self.child.iter().map_err(|e| iterator_error(&e))?;
        for event in iterator {
            match handler(event) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => {
                    self.kill();
                    break;
                }
                Err(e) => {
                    self.kill();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

fn iterator_error(e: &dyn std::fmt::Display) -> CoreError {
    log::error!("Failed to get ffmpeg event iterator: {}", e);
    command_failed_error(
        "ffmpeg (sidecar - get iter)",
        ExitStatus::default(),
        e.to_string(),
    )
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner {
    timeout: Option<Duration>,
}

impl SidecarSpawner {
    /// Spawner whose processes are killed after `timeout` (`None` waits forever).
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        log::debug!("Spawning ffmpeg {}", args.join(" "));
        cmd.spawn()
            .map(|child| SidecarProcess {
                child,
                timeout: self.timeout,
            })
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}
