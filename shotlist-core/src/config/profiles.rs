//! Named engine profiles
//!
//! Three profiles ship built in (`default`, `fast_ffmpeg`, `high_precision`).
//! A JSON file of the form `{"name": {"engine": "...", "params": {...}}}` can
//! add profiles or replace built-in ones.

use super::engine::{
    ContentScoreParams, EngineConfig, FilterLogParams, ProbabilityParams,
};
use crate::error::{CoreError, CoreResult, config_error};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Profile used when the caller names neither an engine nor a profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Name → engine configuration lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, EngineConfig>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    /// The profiles that ship with the library.
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            DEFAULT_PROFILE.to_string(),
            EngineConfig::ContentScore(ContentScoreParams {
                threshold: 27.0,
                min_scene_len: 15,
            }),
        );
        profiles.insert(
            "fast_ffmpeg".to_string(),
            EngineConfig::FilterLog(FilterLogParams {
                scene_threshold: 0.4,
            }),
        );
        profiles.insert(
            "high_precision".to_string(),
            EngineConfig::Probability(ProbabilityParams {
                probability_threshold: 0.6,
                min_gap_frames: 5,
            }),
        );
        Self { profiles }
    }

    /// Built-in profiles overlaid with the profiles defined in `path`.
    pub fn with_file(path: &Path) -> CoreResult<Self> {
        let mut registry = Self::builtin();
        registry.merge_file(path)?;
        Ok(registry)
    }

    /// Adds or replaces profiles from a JSON file.
    pub fn merge_file(&mut self, path: &Path) -> CoreResult<()> {
        log::debug!("Loading shot detection profiles from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            config_error(format!("Cannot read profiles file {}: {}", path.display(), e))
        })?;
        let loaded = Self::parse_profiles(&contents).map_err(|e| match e {
            CoreError::JsonParse(msg) => {
                config_error(format!("Invalid profiles file {}: {}", path.display(), msg))
            }
            other => other,
        })?;
        for (name, config) in loaded {
            if self.profiles.insert(name.clone(), config).is_some() {
                log::info!("Profile '{}' overridden by {}", name, path.display());
            }
        }
        Ok(())
    }

    fn parse_profiles(contents: &str) -> CoreResult<BTreeMap<String, EngineConfig>> {
        let profiles: BTreeMap<String, EngineConfig> = serde_json::from_str(contents)?;
        for (name, config) in &profiles {
            config
                .validate()
                .map_err(|e| config_error(format!("Profile '{}': {}", name, e)))?;
        }
        Ok(profiles)
    }

    pub fn get(&self, name: &str) -> CoreResult<&EngineConfig> {
        self.profiles
            .get(name)
            .ok_or_else(|| config_error(format!("Unknown shot detection profile: {}", name)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EngineConfig)> {
        self.profiles.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
