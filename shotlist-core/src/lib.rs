//! Core library for splitting a video into a normalized list of shots.
//!
//! Three interchangeable engines find shot boundaries: a per-frame content
//! score, ffmpeg's scene-score filter log, and a per-frame cut-probability
//! model. Whatever the engine reports is clamped to the video duration,
//! stripped of too-short shots, sorted and densely indexed before it is
//! returned.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use shotlist_core::{EngineConfig, ProfileRegistry, detect_shots};
//! use std::path::Path;
//!
//! let profiles = ProfileRegistry::builtin();
//! let engine = profiles.get("fast_ffmpeg").unwrap();
//! let shots = detect_shots(Path::new("/path/to/video.mp4"), engine).unwrap();
//! for shot in &shots {
//!     println!("{}: {:.2}-{:.2}", shot.index(), shot.t_start(), shot.t_end());
//! }
//!
//! let custom = EngineConfig::from_name_and_params("transnetv2", ["probability_threshold=0.7"]).unwrap();
//! let _ = detect_shots(Path::new("/path/to/video.mp4"), &custom);
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod external;
pub mod model;
pub mod shot;

// Re-exports for public API
pub use config::{DetectionSettings, EngineConfig, EngineKind, ProfileRegistry};
pub use detection::{DetectionOutcome, ShotDetector, detect_shots, finalize_order};
pub use error::{CoreError, CoreResult};
pub use external::{ProbedDuration, check_dependency, probe_duration};
pub use model::{CutProbabilityModel, ModelContext};
pub use shot::{OverlayTextBlock, Shot, ShotType, TextPosition};
