// ============================================================================
// shotlist-core/src/model/mod.rs
// ============================================================================
//
// CUT-PROBABILITY MODELS: Per-frame shot transition probabilities
//
// KEY COMPONENTS:
// - CutProbabilityModel: trait implemented by every model backend
// - ModelContext: loads a model at most once and shares it read-only
// - HistogramCutModel: built-in backend based on luma histogram distance
// - TransNetOnnx: TransNetV2 ONNX backend (cargo feature `onnx`)
//
// Detection code receives a `&ModelContext` instead of reaching for a global,
// so tests can inject a stub with `ModelContext::preloaded`.

use crate::error::CoreResult;
use crate::external::VideoFrame;
use once_cell::sync::{Lazy, OnceCell};
use std::fmt;
use std::sync::Arc;

pub mod histogram;
#[cfg(feature = "onnx")]
pub mod transnet;

pub use histogram::HistogramCutModel;
#[cfg(feature = "onnx")]
pub use transnet::TransNetOnnx;

/// Environment variable naming a TransNetV2 ONNX export to load.
pub const TRANSNET_MODEL_ENV: &str = "SHOTLIST_TRANSNET_MODEL";

/// A model that scores each frame with the probability that a shot starts there.
pub trait CutProbabilityModel: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Frame size (width, height) the model expects.
    fn input_size(&self) -> (u32, u32);

    /// One probability in `[0, 1]` per input frame.
    fn predict(&self, frames: &[VideoFrame]) -> CoreResult<Vec<f32>>;
}

type ModelLoader = Box<dyn Fn() -> CoreResult<Arc<dyn CutProbabilityModel>> + Send + Sync>;

static GLOBAL_CONTEXT: Lazy<ModelContext> = Lazy::new(|| ModelContext::new(load_default_model));

/// Lazily loaded, shared cut-probability model.
///
/// Concurrent first use runs the loader once; later calls reuse the result.
/// A failed load is not cached, so the next call retries.
pub struct ModelContext {
    loader: ModelLoader,
    model: OnceCell<Arc<dyn CutProbabilityModel>>,
}

impl ModelContext {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> CoreResult<Arc<dyn CutProbabilityModel>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            model: OnceCell::new(),
        }
    }

    /// Context that already holds `model`; the loader is never called.
    pub fn preloaded(model: Arc<dyn CutProbabilityModel>) -> Self {
        let context = Self::new(|| {
            Err(crate::error::CoreError::Model(
                "preloaded model context has no loader".to_string(),
            ))
        });
        // A fresh cell is always empty, so this cannot fail.
        let _ = context.model.set(model);
        context
    }

    /// The process-wide context used by `detect_shots`.
    pub fn global() -> &'static ModelContext {
        &GLOBAL_CONTEXT
    }

    pub fn get_or_load(&self) -> CoreResult<Arc<dyn CutProbabilityModel>> {
        self.model
            .get_or_try_init(|| {
                let model = (self.loader)()?;
                log::info!("Loaded cut-probability model '{}'", model.name());
                Ok(model)
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }
}

impl fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelContext")
            .field("loaded", &self.model.get().map(|m| m.name().to_string()))
            .finish()
    }
}

#[cfg(feature = "onnx")]
fn load_default_model() -> CoreResult<Arc<dyn CutProbabilityModel>> {
    match crate::config::utils::get_env_opt_string(TRANSNET_MODEL_ENV) {
        Some(path) => Ok(Arc::new(TransNetOnnx::from_file(std::path::Path::new(&path))?)),
        None => {
            log::info!(
                "{} not set, using histogram cut model",
                TRANSNET_MODEL_ENV
            );
            Ok(Arc::new(HistogramCutModel::default()))
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_default_model() -> CoreResult<Arc<dyn CutProbabilityModel>> {
    if crate::config::utils::get_env_opt_string(TRANSNET_MODEL_ENV).is_some() {
        log::warn!(
            "{} is set but ONNX support is not compiled in; using histogram cut model",
            TRANSNET_MODEL_ENV
        );
    }
    Ok(Arc::new(HistogramCutModel::default()))
}
