// shotlist-cli/src/commands/probe.rs
//
// Reports the duration detection would work with, and the frame rate the
// frame-based engines would assume.

use crate::cli::ProbeArgs;
use crate::error::CliResult;
use crate::output;
use shotlist_core::external::{CrateFfprobeExecutor, MediaProbe};
use shotlist_core::probe_duration;

pub fn run_probe(args: ProbeArgs) -> CliResult<()> {
    let probe = CrateFfprobeExecutor::new();
    let duration = probe_duration(&probe, &args.input);
    let fps = match probe.frame_rate(&args.input) {
        Ok(fps) => Some(fps),
        Err(e) => {
            log::debug!("No frame rate for {}: {}", args.input.display(), e);
            None
        }
    };
    print!("{}", output::probe_lines(&duration, fps));
    Ok(())
}
