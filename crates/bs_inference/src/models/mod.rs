use std::sync::Arc;
use bs_core::{ContentModel, Error, Result};
use crate::Config;

pub mod gemini;
pub mod scripted;

pub use gemini::{GeminiConfig, GeminiModel};
pub use scripted::{ScriptedFailure, ScriptedModel};

/// Builds the model named in `config.model_name` (`gemini` by default).
pub fn create_model(config: &Config) -> Result<Arc<dyn ContentModel>> {
    let name = config.model_name.as_deref().unwrap_or("gemini").to_lowercase();
    match name.as_str() {
        "gemini" => {
            let model = GeminiModel::new(GeminiConfig::from_config(config))?;
            tracing::debug!("Using Gemini model {:?}", model);
            Ok(Arc::new(model))
        }
        "scripted" => Ok(Arc::new(ScriptedModel::demo())),
        other => Err(Error::Config(format!(
            "Unknown model '{}'. Available models: gemini (default), scripted",
            other
        ))),
    }
}
