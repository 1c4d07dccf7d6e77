use std::fmt;
use std::sync::Arc;
use bs_core::{ContentModel, Error, Result, TextOptions};
use url::Url;

/// Video platforms a search lookup can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPlatform {
    YouTube,
}

impl MediaPlatform {
    pub fn name(&self) -> &'static str {
        match self {
            MediaPlatform::YouTube => "YouTube",
        }
    }

    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            MediaPlatform::YouTube => &["youtube.com", "youtu.be"],
        }
    }

    fn owns_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains()
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }
}

impl fmt::Display for MediaPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a lookup reply only when it is a single bare http(s) URL on one of
/// the platform's domains.
pub fn validate_media_url(platform: MediaPlatform, reply: &str) -> Option<String> {
    let candidate = reply.trim();
    if !(candidate.starts_with("http://") || candidate.starts_with("https://")) {
        return None;
    }
    if candidate.chars().any(char::is_whitespace) {
        return None;
    }
    let url = Url::parse(candidate).ok()?;
    let host = url.host_str()?;
    platform.owns_host(host).then(|| candidate.to_string())
}

fn lookup_prompt(platform: MediaPlatform, query: &str) -> String {
    format!(
        "Using your search tool, find the single most relevant {} URL for the following topic: '{}'. Respond with ONLY the raw URL and absolutely no other text, explanation, or formatting.",
        platform, query
    )
}

/// Folds any failure of the article request into the two user-facing
/// classes: bad credentials or a generic generation failure.
fn classify_generation_error(error: Error) -> Error {
    match error {
        Error::MissingApiKey => Error::MissingApiKey,
        Error::InvalidCredentials => Error::InvalidCredentials,
        Error::Api { ref message, .. }
            if message.contains("API key not valid") || message.contains("API_KEY_INVALID") =>
        {
            Error::InvalidCredentials
        }
        Error::GenerationFailed(reason) => Error::GenerationFailed(reason),
        other => Error::GenerationFailed(other.to_string()),
    }
}

/// The three single-shot operations the pipeline needs from the AI service.
/// None of them retry.
#[derive(Clone)]
pub struct ContentRequester {
    model: Arc<dyn ContentModel>,
}

impl fmt::Debug for ContentRequester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentRequester")
            .field("model", &self.model.name())
            .finish()
    }
}

impl ContentRequester {
    pub fn new(model: Arc<dyn ContentModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn ContentModel> {
        &self.model
    }

    /// Search-grounded article request. Failures here are fatal to the
    /// article and come back classified.
    pub async fn request_article_text(&self, prompt: &str) -> Result<String> {
        match self.model.generate_text(prompt, TextOptions::grounded()).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::error!("Article generation with {} failed: {:?}", self.model.name(), e);
                Err(classify_generation_error(e))
            }
        }
    }

    /// Returns the image as a `data:` URI.
    pub async fn request_image(&self, prompt: &str) -> Result<String> {
        let image = self.model.generate_image(prompt).await?;
        if image.data.is_empty() {
            return Err(Error::NoImageReturned);
        }
        Ok(image.to_data_uri())
    }

    /// Asks the model for a single URL on `platform`. Anything but a clean,
    /// on-platform URL, including transport failures, is "not found".
    pub async fn request_url_for_query(&self, platform: MediaPlatform, query: &str) -> Option<String> {
        let prompt = lookup_prompt(platform, query);
        let options = TextOptions::grounded().with_temperature(0.0);

        match self.model.generate_text(&prompt, options).await {
            Ok(reply) => {
                let url = validate_media_url(platform, &reply);
                if url.is_none() {
                    tracing::warn!(
                        "Model returned a non-URL for {} search with query \"{}\": {}",
                        platform,
                        query,
                        reply.trim()
                    );
                }
                url
            }
            Err(e) => {
                tracing::warn!("Error finding {} URL for query \"{}\": {}", platform, query, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScriptedFailure, ScriptedModel};
    use bs_core::GeneratedImage;

    #[test]
    fn test_validate_media_url() {
        let yt = MediaPlatform::YouTube;
        assert_eq!(
            validate_media_url(yt, "https://youtu.be/abc12345678").as_deref(),
            Some("https://youtu.be/abc12345678")
        );
        assert_eq!(
            validate_media_url(yt, "  https://www.youtube.com/watch?v=abc12345678\n").as_deref(),
            Some("https://www.youtube.com/watch?v=abc12345678")
        );
        assert!(validate_media_url(yt, "https://m.youtube.com/watch?v=abc12345678").is_some());

        assert!(validate_media_url(yt, "Check this out: https://youtube.com/x").is_none());
        assert!(validate_media_url(yt, "https://youtu.be/abc12345678 is a great one").is_none());
        assert!(validate_media_url(yt, "https://vimeo.com/123").is_none());
        assert!(validate_media_url(yt, "https://vimeo.com/?ref=youtube.com").is_none());
        assert!(validate_media_url(yt, "https://notyoutube.com/watch?v=abc12345678").is_none());
        assert!(validate_media_url(yt, "youtube.com/watch?v=abc12345678").is_none());
        assert!(validate_media_url(yt, "").is_none());
    }

    #[test]
    fn test_lookup_prompt() {
        let prompt = lookup_prompt(MediaPlatform::YouTube, "Test Topic");
        assert!(prompt.contains("most relevant YouTube URL for the following topic: 'Test Topic'"));
        assert!(prompt.contains("Respond with ONLY the raw URL"));
    }

    #[test]
    fn test_classify_generation_error() {
        assert!(matches!(
            classify_generation_error(Error::Api {
                status: 400,
                message: "API key not valid. Please pass a valid API key.".to_string()
            }),
            Error::InvalidCredentials
        ));
        assert!(matches!(
            classify_generation_error(Error::EmptyResponse),
            Error::GenerationFailed(_)
        ));
        assert!(matches!(
            classify_generation_error(Error::MissingApiKey),
            Error::MissingApiKey
        ));
    }

    #[tokio::test]
    async fn test_request_article_text_is_grounded() {
        let model = Arc::new(ScriptedModel::new().reply("# Article"));
        let requester = ContentRequester::new(model.clone());

        assert_eq!(requester.request_article_text("prompt").await.unwrap(), "# Article");
        let prompts = model.text_prompts();
        assert!(prompts[0].1.search);
        assert!(prompts[0].1.temperature.is_none());
    }

    #[tokio::test]
    async fn test_request_article_text_failures() {
        let model = Arc::new(
            ScriptedModel::new()
                .fail(ScriptedFailure::InvalidCredentials)
                .fail(ScriptedFailure::Refused)
                .fail(ScriptedFailure::Network),
        );
        let requester = ContentRequester::new(model);

        assert!(matches!(
            requester.request_article_text("p").await,
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            requester.request_article_text("p").await,
            Err(Error::GenerationFailed(_))
        ));
        assert!(matches!(
            requester.request_article_text("p").await,
            Err(Error::GenerationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_request_image() {
        let requester = ContentRequester::new(Arc::new(ScriptedModel::new()));
        assert!(matches!(
            requester.request_image("p").await,
            Err(Error::NoImageReturned)
        ));

        let requester = ContentRequester::new(Arc::new(ScriptedModel::new().with_image(
            GeneratedImage {
                mime_type: "image/jpeg".to_string(),
                data: "/9j/4AAQ".to_string(),
            },
        )));
        assert_eq!(
            requester.request_image("p").await.unwrap(),
            "data:image/jpeg;base64,/9j/4AAQ"
        );
    }

    #[tokio::test]
    async fn test_request_url_for_query() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply("https://youtu.be/abc12345678")
                .reply("Sure! Here it is: https://youtu.be/abc12345678")
                .fail(ScriptedFailure::Network),
        );
        let requester = ContentRequester::new(model.clone());
        let yt = MediaPlatform::YouTube;

        assert_eq!(
            requester.request_url_for_query(yt, "Topic").await.as_deref(),
            Some("https://youtu.be/abc12345678")
        );
        assert!(requester.request_url_for_query(yt, "Topic").await.is_none());
        assert!(requester.request_url_for_query(yt, "Topic").await.is_none());

        let prompts = model.text_prompts();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0].1.temperature, Some(0.0));
        assert!(prompts[0].1.search);
    }
}
