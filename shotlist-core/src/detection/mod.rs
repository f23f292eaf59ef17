// ============================================================================
// shotlist-core/src/detection/mod.rs
// ============================================================================
//
// SHOT DETECTION: Engine dispatch and result normalization
//
// KEY COMPONENTS:
// - ShotDetector: validates the engine config, probes the duration once,
//   runs the selected engine and normalizes its output
// - detect_shots: convenience entry point using production collaborators
// - finalize_order: stable sort by start time plus dense reindex
//
// Engines produce raw intervals that may overlap the video bounds or be too
// short; nothing leaves this module without passing through the normalizer.

mod boundaries;
pub(crate) mod content;
pub(crate) mod filter_log;
mod normalize;
pub(crate) mod probability;

pub use normalize::finalize_order;

use crate::config::{DetectionSettings, EngineConfig, FALLBACK_FPS};
use crate::error::CoreResult;
use crate::external::{
    CrateFfprobeExecutor, FfmpegSpawner, MediaProbe, ProbedDuration, SidecarSpawner,
    probe_duration,
};
use crate::model::ModelContext;
use crate::shot::{RawInterval, Shot};
use std::path::Path;

/// Result of a detection run together with the duration it was based on.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub duration: ProbedDuration,
    pub shots: Vec<Shot>,
}

/// Runs shot detection with injectable collaborators.
pub struct ShotDetector<'m, P = CrateFfprobeExecutor, S = SidecarSpawner> {
    probe: P,
    spawner: S,
    models: &'m ModelContext,
    settings: DetectionSettings,
}

impl ShotDetector<'static> {
    /// Detector backed by ffprobe, ffmpeg and the process-wide model context.
    pub fn new(settings: DetectionSettings) -> Self {
        let spawner = SidecarSpawner::with_timeout(settings.process_timeout);
        Self {
            probe: CrateFfprobeExecutor::new(),
            spawner,
            models: ModelContext::global(),
            settings,
        }
    }
}

impl<'m, P: MediaProbe, S: FfmpegSpawner> ShotDetector<'m, P, S> {
    pub fn with_components(
        probe: P,
        spawner: S,
        models: &'m ModelContext,
        settings: DetectionSettings,
    ) -> Self {
        Self {
            probe,
            spawner,
            models,
            settings,
        }
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Splits `video` into shots with the given engine.
    pub fn detect(&self, video: &Path, engine: &EngineConfig) -> CoreResult<Vec<Shot>> {
        self.detect_detailed(video, engine).map(|outcome| outcome.shots)
    }

    /// Resolves an engine by registry name plus `key=value` overrides, then detects.
    pub fn detect_named<I, T>(&self, video: &Path, engine_name: &str, params: I) -> CoreResult<Vec<Shot>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let engine = EngineConfig::from_name_and_params(engine_name, params)?;
        self.detect(video, &engine)
    }

    /// Like [`detect`](Self::detect), also reporting the probed duration.
    pub fn detect_detailed(&self, video: &Path, engine: &EngineConfig) -> CoreResult<DetectionOutcome> {
        engine.validate()?;
        self.settings.validate()?;

        log::info!("Detecting shots in {} with {}", video.display(), engine);
        let duration = probe_duration(&self.probe, video);
        if !duration.is_known() {
            log::info!("Duration of {} unknown, returning no shots", video.display());
            return Ok(DetectionOutcome {
                duration,
                shots: Vec::new(),
            });
        }

        let raw = self.run_engine(video, engine, duration.seconds)?;
        log::debug!("{} engine produced {} raw interval(s)", engine.kind(), raw.len());

        let mut shots = normalize::normalize(&raw, duration.seconds, self.settings.min_shot_length);
        finalize_order(&mut shots);
        log::info!("Detected {} shot(s) over {:.2}s", shots.len(), duration.seconds);
        Ok(DetectionOutcome { duration, shots })
    }

    fn run_engine(&self, video: &Path, engine: &EngineConfig, duration: f64) -> CoreResult<Vec<RawInterval>> {
        match engine {
            EngineConfig::ContentScore(params) => {
                let fps = self.frame_rate(video);
                content::detect(&self.spawner, video, fps, params, &self.settings)
            }
            EngineConfig::FilterLog(params) => {
                filter_log::detect(&self.spawner, video, duration, params, &self.settings)
            }
            EngineConfig::Probability(params) => {
                let fps = self.frame_rate(video);
                probability::detect(
                    &self.spawner,
                    video,
                    duration,
                    fps,
                    params,
                    &self.settings,
                    self.models,
                )
            }
        }
    }

    fn frame_rate(&self, video: &Path) -> f64 {
        match self.probe.frame_rate(video) {
            Ok(fps) => fps,
            Err(e) => {
                log::warn!(
                    "Could not read frame rate of {} ({}), assuming {} fps",
                    video.display(),
                    e,
                    FALLBACK_FPS
                );
                FALLBACK_FPS
            }
        }
    }
}

/// Splits `video` into shots using ffprobe, ffmpeg and settings from the environment.
pub fn detect_shots(video: &Path, engine: &EngineConfig) -> CoreResult<Vec<Shot>> {
    ShotDetector::new(DetectionSettings::from_env()).detect(video, engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineKind, FilterLogParams};
    use crate::error::CoreError;
    use crate::external::mocks::{MockFfmpegSpawner, MockMediaProbe, showinfo_event};
    use crate::model::HistogramCutModel;
    use std::sync::Arc;

    fn models() -> ModelContext {
        ModelContext::preloaded(Arc::new(HistogramCutModel::default()))
    }

    #[test]
    fn unknown_duration_short_circuits_every_engine() {
        let models = models();
        for kind in EngineKind::ALL {
            let spawner = MockFfmpegSpawner::new();
            let detector = ShotDetector::with_components(
                MockMediaProbe::new(),
                spawner.clone(),
                &models,
                DetectionSettings::default(),
            );
            let shots = detector
                .detect(Path::new("missing.mp4"), &EngineConfig::default_for(kind))
                .unwrap();
            assert!(shots.is_empty());
            assert!(spawner.get_received_calls().is_empty());
        }
    }

    #[test]
    fn invalid_params_fail_before_probing() {
        let models = models();
        let probe = MockMediaProbe::new();
        let detector = ShotDetector::with_components(
            probe.clone(),
            MockFfmpegSpawner::new(),
            &models,
            DetectionSettings::default(),
        );
        let engine = EngineConfig::FilterLog(FilterLogParams {
            scene_threshold: 0.0,
        });
        let err = detector.detect(Path::new("a.mp4"), &engine).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert_eq!(probe.duration_calls(), 0);
    }

    #[test]
    fn unknown_engine_name_rejected() {
        let models = models();
        let detector = ShotDetector::with_components(
            MockMediaProbe::new(),
            MockFfmpegSpawner::new(),
            &models,
            DetectionSettings::default(),
        );
        let err = detector
            .detect_named(Path::new("a.mp4"), "bogus", std::iter::empty::<&str>())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Unknown shot detection engine: bogus"
        );
    }

    #[test]
    fn filter_log_results_are_normalized() {
        let video = Path::new("clip.mp4");
        let probe = MockMediaProbe::new();
        probe.expect_duration(video, 10.0);
        let spawner = MockFfmpegSpawner::new();
        spawner.add_success_expectation(
            "gt(scene,0.4)",
            vec![
                showinfo_event(0, 0.05),
                showinfo_event(1, 3.0),
                showinfo_event(2, 9.9),
            ],
        );
        let models = models();
        let detector = ShotDetector::with_components(
            probe.clone(),
            spawner,
            &models,
            DetectionSettings::default(),
        );
        let shots = detector
            .detect(video, &EngineConfig::default_for(EngineKind::FilterLog))
            .unwrap();
        let spans: Vec<_> = shots.iter().map(|s| (s.index(), s.t_start(), s.t_end())).collect();
        // 0.05 is absorbed into 0.0 and 10.0 into 9.9; the last shot is
        // then stretched to the end of the video.
        assert_eq!(spans, vec![(0, 0.0, 3.0), (1, 3.0, 10.0)]);
        assert_eq!(probe.duration_calls(), 1);
    }
}
