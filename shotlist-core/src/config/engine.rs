//! Engine selection and per-engine parameters
//!
//! An [`EngineConfig`] names one of the three detection strategies together
//! with its typed parameters. It is written and read as
//! `{"engine": "<name>", "params": {...}}`; omitted parameters take the engine
//! defaults and unknown parameters are rejected.

use crate::error::{CoreError, CoreResult, config_error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Registry of the available detection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    /// Per-frame content change score with a minimum scene length
    ContentScore,
    /// ffmpeg `select='gt(scene,T)',showinfo` log scraping
    FilterLog,
    /// Per-frame cut probabilities from a learned model
    Probability,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [
        EngineKind::ContentScore,
        EngineKind::FilterLog,
        EngineKind::Probability,
    ];

    /// Registry name accepted by profiles and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::ContentScore => "pyscenedetect",
            EngineKind::FilterLog => "ffmpeg",
            EngineKind::Probability => "transnetv2",
        }
    }

    /// Descriptive alias accepted alongside the registry name.
    pub fn alias(self) -> &'static str {
        match self {
            EngineKind::ContentScore => "content",
            EngineKind::FilterLog => "filter-log",
            EngineKind::Probability => "probability",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let wanted = s.trim();
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || kind.alias() == wanted)
            .ok_or_else(|| config_error(format!("Unknown shot detection engine: {}", s)))
    }
}

/// Parameters for the content-score engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentScoreParams {
    /// Score at or above which a frame starts a new scene
    pub threshold: f64,
    /// Minimum frames between accepted cuts
    pub min_scene_len: u32,
}

impl Default for ContentScoreParams {
    fn default() -> Self {
        Self {
            threshold: 27.0,
            min_scene_len: 15,
        }
    }
}

/// Parameters for the filter-log engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterLogParams {
    /// ffmpeg scene score threshold in (0, 1]
    pub scene_threshold: f64,
}

impl Default for FilterLogParams {
    fn default() -> Self {
        Self {
            scene_threshold: 0.4,
        }
    }
}

/// Parameters for the probability-sequence engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbabilityParams {
    /// Probability at or above which a frame is a cut candidate
    pub probability_threshold: f64,
    /// Minimum frames between accepted cuts
    pub min_gap_frames: u32,
}

impl Default for ProbabilityParams {
    fn default() -> Self {
        Self {
            probability_threshold: 0.5,
            min_gap_frames: 5,
        }
    }
}

/// A detection strategy together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EngineEntry", into = "EngineEntry")]
pub enum EngineConfig {
    ContentScore(ContentScoreParams),
    FilterLog(FilterLogParams),
    Probability(ProbabilityParams),
}

impl EngineConfig {
    /// Engine with all parameters at their defaults.
    pub fn default_for(kind: EngineKind) -> Self {
        match kind {
            EngineKind::ContentScore => EngineConfig::ContentScore(ContentScoreParams::default()),
            EngineKind::FilterLog => EngineConfig::FilterLog(FilterLogParams::default()),
            EngineKind::Probability => EngineConfig::Probability(ProbabilityParams::default()),
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            EngineConfig::ContentScore(_) => EngineKind::ContentScore,
            EngineConfig::FilterLog(_) => EngineKind::FilterLog,
            EngineConfig::Probability(_) => EngineKind::Probability,
        }
    }

    /// Resolves an engine name and `key=value` overrides.
    ///
    /// The engine is resolved before any parameter is looked at, so an unknown
    /// engine always reports as such.
    pub fn from_name_and_params<I, S>(name: &str, params: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kind: EngineKind = name.parse()?;
        let mut map = Map::new();
        for pair in params {
            let (key, value) = parse_param(pair.as_ref())?;
            map.insert(key, value);
        }
        Self::from_kind_and_map(kind, map)
    }

    /// Same engine with some parameters replaced by `key=value` overrides.
    pub fn with_overrides<I, S>(&self, params: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = match self.params_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for pair in params {
            let (key, value) = parse_param(pair.as_ref())?;
            map.insert(key, value);
        }
        Self::from_kind_and_map(self.kind(), map)
    }

    fn from_kind_and_map(kind: EngineKind, params: Map<String, Value>) -> CoreResult<Self> {
        let value = Value::Object(params);
        Ok(match kind {
            EngineKind::ContentScore => EngineConfig::ContentScore(parse_params(kind, value)?),
            EngineKind::FilterLog => EngineConfig::FilterLog(parse_params(kind, value)?),
            EngineKind::Probability => EngineConfig::Probability(parse_params(kind, value)?),
        })
    }

    /// Checks parameter ranges. Run by the dispatcher before any work starts.
    pub fn validate(&self) -> CoreResult<()> {
        match self {
            EngineConfig::ContentScore(p) => {
                if !p.threshold.is_finite() || p.threshold <= 0.0 {
                    return Err(config_error(format!(
                        "pyscenedetect threshold must be positive, got {}",
                        p.threshold
                    )));
                }
            }
            EngineConfig::FilterLog(p) => {
                if !(p.scene_threshold > 0.0 && p.scene_threshold <= 1.0) {
                    return Err(config_error(format!(
                        "ffmpeg scene_threshold must be in (0, 1], got {}",
                        p.scene_threshold
                    )));
                }
            }
            EngineConfig::Probability(p) => {
                if !(0.0..=1.0).contains(&p.probability_threshold) {
                    return Err(config_error(format!(
                        "transnetv2 probability_threshold must be in [0, 1], got {}",
                        p.probability_threshold
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parameters as a JSON object, for display and serialization.
    pub fn params_json(&self) -> Value {
        let value = match self {
            EngineConfig::ContentScore(p) => serde_json::to_value(p),
            EngineConfig::FilterLog(p) => serde_json::to_value(p),
            EngineConfig::Probability(p) => serde_json::to_value(p),
        };
        value.unwrap_or(Value::Null)
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.params_json())
    }
}

/// Wire form of an `EngineConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineEntry {
    engine: String,
    #[serde(default)]
    params: Map<String, Value>,
}

impl TryFrom<EngineEntry> for EngineConfig {
    type Error = CoreError;

    fn try_from(entry: EngineEntry) -> CoreResult<Self> {
        let kind: EngineKind = entry.engine.parse()?;
        Self::from_kind_and_map(kind, entry.params)
    }
}

impl From<EngineConfig> for EngineEntry {
    fn from(config: EngineConfig) -> Self {
        let params = match config.params_json() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        EngineEntry {
            engine: config.kind().name().to_string(),
            params,
        }
    }
}

fn parse_params<T: DeserializeOwned>(kind: EngineKind, value: Value) -> CoreResult<T> {
    serde_json::from_value(value)
        .map_err(|e| config_error(format!("Invalid parameters for {} engine: {}", kind, e)))
}

/// Splits `key=value`. Values that parse as JSON (numbers, booleans) keep
/// their type; anything else is passed as a string.
fn parse_param(pair: &str) -> CoreResult<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| config_error(format!("Expected KEY=VALUE parameter, got '{}'", pair)))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(config_error(format!("Empty parameter name in '{}'", pair)));
    }
    let raw = raw.trim();
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
