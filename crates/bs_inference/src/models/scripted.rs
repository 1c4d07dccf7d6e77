use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use bs_core::{ContentModel, Error, GeneratedImage, Result, TextOptions};

/// A canned failure the scripted model can return in place of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    InvalidCredentials,
    Refused,
    Network,
}

impl ScriptedFailure {
    fn to_error(self) -> Error {
        match self {
            ScriptedFailure::InvalidCredentials => Error::InvalidCredentials,
            ScriptedFailure::Refused => Error::EmptyResponse,
            ScriptedFailure::Network => Error::Api {
                status: 503,
                message: "The service is currently unavailable.".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(ScriptedFailure),
}

/// Offline model that answers from a script. Text replies are consumed in
/// order; once the script runs out the fallback text is returned. Every
/// prompt is recorded so callers can inspect what was asked.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    image: Option<GeneratedImage>,
    text_prompts: Mutex<Vec<(String, TextOptions)>>,
    image_prompts: Mutex<Vec<String>>,
}

impl fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedModel")
            .field("fallback", &self.fallback)
            .field("has_image", &self.image.is_some())
            .finish()
    }
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small self-contained script used by `--model scripted`.
    pub fn demo() -> Self {
        Self::new()
            .reply(
                "[FEATURED_IMAGE_PROMPT: A simple, text-free, illustrative image of a quiet desk at dawn]\n\
                 # A Calm Start to the Day\n\n\
                 - Why mornings matter\n- Final thoughts\n\n\
                 I used to rush every morning. Here is what changed.\n\n\
                 ## Why mornings matter\n\n\
                 [YOUTUBE_SEARCH_QUERY: calm morning routine]\n\n\
                 ## Final thoughts\n\n\
                 Small rituals add up.\n\n\
                 Written by Aslan Madaev, writer exploring the human side of growth and learning.",
            )
            .with_fallback("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .with_image(GeneratedImage {
                mime_type: "image/png".to_string(),
                data: "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==".to_string(),
            })
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Reply::Text(text.into()));
        }
        self
    }

    pub fn fail(self, failure: ScriptedFailure) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Reply::Fail(failure));
        }
        self
    }

    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    pub fn with_image(mut self, image: GeneratedImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn text_prompts(&self) -> Vec<(String, TextOptions)> {
        self.text_prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn image_prompts(&self) -> Vec<String> {
        self.image_prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ContentModel for ScriptedModel {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn generate_text(&self, prompt: &str, options: TextOptions) -> Result<String> {
        if let Ok(mut prompts) = self.text_prompts.lock() {
            prompts.push((prompt.to_string(), options));
        }

        let next = self.replies.lock().ok().and_then(|mut r| r.pop_front());
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(failure)) => Err(failure.to_error()),
            None => self.fallback.clone().ok_or(Error::EmptyResponse),
        }
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        if let Ok(mut prompts) = self.image_prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.image.clone().ok_or(Error::NoImageReturned)
    }
}
