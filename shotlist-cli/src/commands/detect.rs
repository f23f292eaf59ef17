// ============================================================================
// shotlist-cli/src/commands/detect.rs
// ============================================================================
//
// DETECT COMMAND: Shot detection on a single video
//
// Resolves the engine from --engine or --profile plus --param overrides,
// applies CLI overrides on top of environment settings, runs the detector
// and writes the shot list as a table or JSON.

use crate::cli::DetectArgs;
use crate::commands::load_profiles;
use crate::error::{CliErrorContext, CliResult};
use crate::output;
use shotlist_core::config::profiles::DEFAULT_PROFILE;
use shotlist_core::{DetectionSettings, EngineConfig, ProfileRegistry, ShotDetector, check_dependency};
use std::fs;
use std::io::{self, Write};

/// Picks the engine configuration for a run.
///
/// An explicit engine name wins; otherwise the named profile (or the default
/// profile) is used. `params` override the chosen configuration either way.
pub fn resolve_engine(
    registry: &ProfileRegistry,
    engine: Option<&str>,
    profile: Option<&str>,
    params: &[String],
) -> CliResult<EngineConfig> {
    match engine {
        Some(name) => EngineConfig::from_name_and_params(name, params),
        None => {
            let name = profile.unwrap_or(DEFAULT_PROFILE);
            let base = registry.get(name)?;
            log::debug!("Using profile '{}': {}", name, base);
            base.with_overrides(params)
        }
    }
}

/// Environment settings with the command-line overrides applied.
pub fn effective_settings(args: &DetectArgs) -> DetectionSettings {
    let mut settings = DetectionSettings::from_env();
    if let Some(seconds) = args.min_shot_length {
        settings = settings.with_min_shot_length(seconds);
    }
    if let Some(secs) = args.timeout {
        settings = settings.with_process_timeout_secs(secs);
    }
    settings
}

pub fn run_detect(args: DetectArgs) -> CliResult<()> {
    let registry = load_profiles(args.profiles_file.as_deref())?;
    let engine = resolve_engine(
        &registry,
        args.engine.as_deref(),
        args.profile.as_deref(),
        &args.params,
    )?;
    let settings = effective_settings(&args);

    for tool in ["ffprobe", "ffmpeg"] {
        if let Err(e) = check_dependency(tool) {
            log::warn!("{}; detection may return no shots", e);
        }
    }

    let detector = ShotDetector::new(settings);
    let spinner = output::detection_spinner(&format!(
        "Detecting shots in {} ({})",
        args.input.display(),
        engine.kind()
    ));
    let result = detector.detect_detailed(&args.input, &engine);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = result?;

    if let Some(warning) = &outcome.duration.warning {
        log::debug!("{}", warning);
    }
    log::info!(
        "{} shot(s) detected in {}",
        outcome.shots.len(),
        args.input.display()
    );

    let rendered = output::render_shots(&outcome.shots, args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .cli_with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Shot list written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .cli_context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotlist_core::config::{FilterLogParams, ProbabilityParams};
    use shotlist_core::{CoreError, EngineKind};

    fn params(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_profile_when_nothing_named() {
        let registry = ProfileRegistry::builtin();
        let engine = resolve_engine(&registry, None, None, &[]).unwrap();
        assert_eq!(engine.kind(), EngineKind::ContentScore);
    }

    #[test]
    fn profile_params_overridden() {
        let registry = ProfileRegistry::builtin();
        let engine = resolve_engine(
            &registry,
            None,
            Some("high_precision"),
            &params(&["probability_threshold=0.8"]),
        )
        .unwrap();
        assert_eq!(
            engine,
            EngineConfig::Probability(ProbabilityParams {
                probability_threshold: 0.8,
                min_gap_frames: 5,
            })
        );
    }

    #[test]
    fn engine_name_with_params() {
        let registry = ProfileRegistry::builtin();
        let engine = resolve_engine(
            &registry,
            Some("ffmpeg"),
            None,
            &params(&["scene_threshold=0.25"]),
        )
        .unwrap();
        assert_eq!(
            engine,
            EngineConfig::FilterLog(FilterLogParams {
                scene_threshold: 0.25
            })
        );
    }

    #[test]
    fn unknown_profile_is_error() {
        let registry = ProfileRegistry::builtin();
        let err = resolve_engine(&registry, None, Some("nope"), &[]).unwrap_err();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("nope")));
    }

    #[test]
    fn unknown_engine_is_error() {
        let registry = ProfileRegistry::builtin();
        let err = resolve_engine(&registry, Some("bogus"), None, &[]).unwrap_err();
        assert!(err.to_string().contains("Unknown shot detection engine: bogus"));
    }
}
