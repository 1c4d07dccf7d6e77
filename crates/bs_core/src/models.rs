use async_trait::async_trait;
use std::fmt;

use crate::Result;

/// Per-request knobs for a text generation call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextOptions {
    /// Let the model ground its answer with a web search tool.
    pub search: bool,
    pub temperature: Option<f32>,
}

impl TextOptions {
    pub fn grounded() -> Self {
        Self {
            search: true,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    /// Base64 payload as returned by the API.
    pub data: String,
}

impl GeneratedImage {
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The network seam to a generative AI provider.
#[async_trait]
pub trait ContentModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Generate plain text for a prompt.
    async fn generate_text(&self, prompt: &str, options: TextOptions) -> Result<String>;

    /// Generate a single image for a prompt.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}
