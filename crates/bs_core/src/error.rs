use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API Key is not configured. Please add it in the settings.")]
    MissingApiKey,

    #[error("Your Gemini API Key is not valid. Please check it in the settings.")]
    InvalidCredentials,

    /// The text request failed for any reason other than credentials. The
    /// reason is kept for logs; the message shown to users stays fixed.
    #[error("Failed to generate blog post. The model may have refused the prompt or an API error occurred.")]
    GenerationFailed(String),

    #[error("No image data returned from API.")]
    NoImageReturned,

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    SettingsSave(String),

    #[error("{0}")]
    Publish(String),

    #[error("{reason}")]
    SitemapParse { name: String, reason: String },

    #[error("Sitemap \"{0}\" already exists.")]
    DuplicateSitemap(String),

    #[error("Sitemap \"{0}\" not found.")]
    SitemapNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Errors that abort the current article and become the blocking error
    /// state. Everything else degrades into a missing image, an inline
    /// comment or a separate status message.
    pub fn is_fatal_to_article(&self) -> bool {
        matches!(
            self,
            Error::MissingApiKey | Error::InvalidCredentials | Error::GenerationFailed(_)
        )
    }

    /// Per-file sitemap rejections, reported without failing the batch.
    pub fn is_sitemap_rejection(&self) -> bool {
        matches!(self, Error::SitemapParse { .. } | Error::DuplicateSitemap(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            Error::InvalidCredentials.to_string(),
            "Your Gemini API Key is not valid. Please check it in the settings."
        );
        assert_eq!(
            Error::GenerationFailed("quota exceeded".to_string()).to_string(),
            "Failed to generate blog post. The model may have refused the prompt or an API error occurred."
        );
        assert_eq!(
            Error::DuplicateSitemap("posts.xml".to_string()).to_string(),
            "Sitemap \"posts.xml\" already exists."
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::InvalidCredentials.is_fatal_to_article());
        assert!(Error::GenerationFailed(String::new()).is_fatal_to_article());
        assert!(!Error::NoImageReturned.is_fatal_to_article());
        assert!(!Error::Publish("nope".to_string()).is_fatal_to_article());
        assert!(Error::DuplicateSitemap("a.xml".to_string()).is_sitemap_rejection());
    }
}
