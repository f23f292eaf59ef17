//! Rendering of shot lists, profiles and probe results.

use crate::cli::OutputFormat;
use crate::cli_error;
use crate::error::CliResult;
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use shotlist_core::{EngineConfig, ProbedDuration, Shot};
use std::fmt::Write as _;
use std::time::Duration;

/// Renders shots in the requested format. The result always ends with a newline.
pub fn render_shots(shots: &[Shot], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(shots)
                .map_err(|e| cli_error!("Failed to serialize shot list: {}", e))?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Table => Ok(shot_table(shots)),
    }
}

/// Plain-text table with one row per shot.
pub fn shot_table(shots: &[Shot]) -> String {
    if shots.is_empty() {
        return "No shots detected.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:>10}  {:>10}  {:>10}", "SHOT", "START", "END", "DURATION");
    for shot in shots {
        let _ = writeln!(
            out,
            "{:>5}  {:>10.3}  {:>10.3}  {:>10.3}",
            shot.index(),
            shot.t_start(),
            shot.t_end(),
            shot.duration()
        );
    }
    let total: f64 = shots.iter().map(Shot::duration).sum();
    let _ = writeln!(out, "{} shot(s), {:.3}s total", shots.len(), total);
    out
}

/// One line per profile: name, engine and parameters.
pub fn profile_lines<'a, I>(profiles: I, default_name: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a EngineConfig)>,
{
    let mut out = String::new();
    for (name, engine) in profiles {
        let marker = if name == default_name { " (default)" } else { "" };
        let _ = writeln!(
            out,
            "{}{}: {} {}",
            style(name).bold(),
            marker,
            style(engine.kind().name()).cyan(),
            engine.params_json()
        );
    }
    out
}

pub fn probe_lines(duration: &ProbedDuration, fps: Option<f64>) -> String {
    let mut out = String::new();
    if duration.is_known() {
        let _ = writeln!(out, "{}: {:.3}s", style("Duration").bold(), duration.seconds);
    } else {
        let _ = writeln!(out, "{}: unknown (0)", style("Duration").bold());
    }
    match fps {
        Some(fps) => {
            let _ = writeln!(out, "{}: {:.3}", style("Frame rate").bold(), fps);
        }
        None => {
            let _ = writeln!(out, "{}: unknown", style("Frame rate").bold());
        }
    }
    if let Some(warning) = &duration.warning {
        let _ = writeln!(out, "{}: {}", style("Warning").yellow().bold(), warning);
    }
    out
}

/// Spinner on stderr while detection runs; `None` when stderr is not a terminal.
pub fn detection_spinner(message: &str) -> Option<ProgressBar> {
    if !Term::stderr().is_term() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}
