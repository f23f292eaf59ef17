// shotlist-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner};
use super::ffprobe_executor::MediaProbe;
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel, OutputVideoFrame};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::os::unix::process::ExitStatusExt; // For ExitStatus::from_raw
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// Mock implementation of FfmpegProcess replaying scripted events.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Rc<RefCell<Vec<FfmpegEvent>>>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
    /// Number of events the handler actually received.
    pub delivered: Rc<Cell<usize>>,
    /// Error returned by handle_events once all events are delivered.
    pub failure: Rc<RefCell<Option<CoreError>>>,
}

impl MockFfmpegProcess {
    fn new(events: Vec<FfmpegEvent>, exit_code: i32) -> Self {
        Self {
            events_to_emit: Rc::new(RefCell::new(events)),
            // Raw wait status: exit code lives in the high byte.
            exit_status: ExitStatus::from_raw(exit_code << 8),
            delivered: Rc::new(Cell::new(0)),
            failure: Rc::new(RefCell::new(None)),
        }
    }
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<ControlFlow<()>>,
    {
        let events = self.events_to_emit.borrow().clone();
        for event in events {
            self.delivered.set(self.delivered.get() + 1);
            if handler(event)?.is_break() {
                return Ok(());
            }
        }
        match self.failure.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each expectation is matched once, by any argument containing its pattern.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    last_process: Rc<RefCell<Option<MockFfmpegProcess>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(&self, arg_pattern: &str, result: CoreResult<MockFfmpegProcess>) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
        });
    }

    pub fn add_success_expectation(&self, arg_pattern: &str, events: Vec<FfmpegEvent>) {
        self.add_expectation(arg_pattern, Ok(MockFfmpegProcess::new(events, 0)));
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error));
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        self.add_expectation(arg_pattern, Ok(MockFfmpegProcess::new(events, exit_code)));
    }

    /// The process emits `events`, then fails the event loop with `error`,
    /// as a deadline kill would.
    pub fn add_event_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        error: CoreError,
    ) {
        let process = MockFfmpegProcess::new(events, 0);
        *process.failure.borrow_mut() = Some(error);
        self.add_expectation(arg_pattern, Ok(process));
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    /// Events delivered by the most recently spawned process.
    pub fn last_delivered(&self) -> Option<usize> {
        self.last_process.borrow().as_ref().map(|p| p.delivered.get())
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        match found_index {
            Some(index) => {
                let expectation = expectations.remove(index);
                log::info!(
                    "MockFfmpegSpawner: Matched expectation with pattern '{}'",
                    expectation.arg_pattern
                );
                if let Ok(process) = &expectation.result {
                    *self.last_process.borrow_mut() = Some(process.clone());
                }
                expectation.result
            }
            None => {
                log::error!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
                panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
            }
        }
    }
}

/// Mock implementation of MediaProbe keyed by input path.
///
/// Paths without an expectation fail like a missing file would.
#[derive(Clone, Default)]
pub struct MockMediaProbe {
    durations: Rc<RefCell<HashMap<PathBuf, f64>>>,
    frame_rates: Rc<RefCell<HashMap<PathBuf, f64>>>,
    duration_calls: Rc<Cell<usize>>,
}

impl MockMediaProbe {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn expect_duration(&self, input_path: &Path, seconds: f64) {
        self.durations
            .borrow_mut()
            .insert(input_path.to_path_buf(), seconds);
    }

    pub fn expect_frame_rate(&self, input_path: &Path, fps: f64) {
        self.frame_rates
            .borrow_mut()
            .insert(input_path.to_path_buf(), fps);
    }

    /// How many times `duration` was called.
    pub fn duration_calls(&self) -> usize {
        self.duration_calls.get()
    }
}

impl MediaProbe for MockMediaProbe {
    fn duration(&self, input_path: &Path) -> CoreResult<f64> {
        self.duration_calls.set(self.duration_calls.get() + 1);
        self.durations
            .borrow()
            .get(input_path)
            .copied()
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "MockMediaProbe: No duration set for path {}",
                    input_path.display()
                ))
            })
    }

    fn frame_rate(&self, input_path: &Path) -> CoreResult<f64> {
        self.frame_rates
            .borrow()
            .get(input_path)
            .copied()
            .ok_or_else(|| {
                CoreError::FfprobeParse(format!(
                    "MockMediaProbe: No frame rate set for path {}",
                    input_path.display()
                ))
            })
    }
}

// --- Event builders ---

/// An rgb24 output frame filled with a single color.
pub fn solid_frame_event(frame_num: u32, width: u32, height: u32, rgb: [u8; 3]) -> FfmpegEvent {
    let data = rgb
        .iter()
        .copied()
        .cycle()
        .take(width as usize * height as usize * 3)
        .collect();
    FfmpegEvent::OutputFrame(OutputVideoFrame {
        width,
        height,
        pix_fmt: "rgb24".to_string(),
        output_index: 0,
        data,
        frame_num,
        timestamp: 0.0,
    })
}

/// An info-level log line as ffmpeg would print it on stderr.
pub fn log_line_event(line: &str) -> FfmpegEvent {
    FfmpegEvent::Log(LogLevel::Info, line.to_string())
}

/// A `showinfo` line reporting a selected frame at `pts_time`.
pub fn showinfo_event(n: u32, pts_time: f64) -> FfmpegEvent {
    log_line_event(&format!(
        "[Parsed_showinfo_1 @ 0x55d0c8a1c2c0] n:{:4} pts:{:7} pts_time:{} duration:1 fmt:yuv420p",
        n,
        (pts_time * 12800.0).round() as i64,
        pts_time
    ))
}
