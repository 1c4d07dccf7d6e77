pub mod models;
pub mod prompt;
pub mod requester;
pub mod directives;
pub mod generator;

/// Model selection and credentials. Every field falls back to a built-in
/// default when unset.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    /// Base URL of the Gemini REST API.
    pub model_url: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
    pub author_bio: Option<String>,
}

impl Config {
    pub fn prompt_builder(&self) -> prompt::PromptBuilder {
        match self.author_bio.as_deref().map(str::trim) {
            Some(bio) if !bio.is_empty() => prompt::PromptBuilder::new().with_author_bio(bio),
            _ => prompt::PromptBuilder::default(),
        }
    }

    /// Model plus prompt builder, ready to generate.
    pub fn build_generator(&self) -> bs_core::Result<generator::ArticleGenerator> {
        let model = create_model(self)?;
        Ok(generator::ArticleGenerator::new(model).with_prompt_builder(self.prompt_builder()))
    }
}

pub mod prelude {
    pub use super::Config;
    pub use super::models::create_model;
    pub use super::generator::{ArticleGenerator, BatchPolicy, BatchReport, BatchRunner};
    pub use super::directives::{FinalizedArticle, VideoResolution};
    pub use bs_core::{ArticleConfig, Error, ProgressSink, Result};
}

pub use models::create_model;
pub use directives::{Draft, FinalizedArticle, Stage, VideoResolution};
pub use generator::{ArticleGenerator, BatchPolicy, BatchReport, BatchRunner};
pub use prompt::{build_prompt, PromptBuilder};
pub use requester::{ContentRequester, MediaPlatform};
