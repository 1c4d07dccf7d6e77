use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Everything a single article generation needs. Built once per topic and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleConfig {
    pub topic: String,
    pub generate_images: bool,
    /// Newline-delimited URLs the model may link to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_links: Option<String>,
}

impl ArticleConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            generate_images: true,
            internal_links: None,
        }
    }

    pub fn with_images(mut self, generate_images: bool) -> Self {
        self.generate_images = generate_images;
        self
    }

    pub fn with_internal_links(mut self, links: impl Into<String>) -> Self {
        self.internal_links = Some(links.into());
        self
    }

    /// Splits a multi-line topic field into one config per non-empty line.
    pub fn batch_from_topics(
        topics: &str,
        generate_images: bool,
        internal_links: Option<&str>,
    ) -> Vec<ArticleConfig> {
        topics
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|topic| ArticleConfig {
                topic: topic.to_string(),
                generate_images,
                internal_links: internal_links.map(str::to_string),
            })
            .collect()
    }

    /// The internal-links list, if one was supplied and isn't blank.
    pub fn internal_links_list(&self) -> Option<&str> {
        self.internal_links
            .as_deref()
            .map(str::trim)
            .filter(|links| !links.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapFile {
    pub name: String,
    pub added_date: String,
    pub urls: Vec<String>,
}

impl SitemapFile {
    pub fn new(name: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            added_date: Local::now().format("%-m/%-d/%Y").to_string(),
            urls,
        }
    }

    /// Every stored URL, in storage order, one per line.
    pub fn internal_links(files: &[SitemapFile]) -> String {
        files
            .iter()
            .flat_map(|f| f.urls.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStatus::Idle => "idle",
            GenerationStatus::Loading => "loading",
            GenerationStatus::Success => "success",
            GenerationStatus::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationState {
    pub status: GenerationStatus,
    pub article: Option<String>,
    pub error: Option<String>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self {
            status: GenerationStatus::Idle,
            article: None,
            error: None,
        }
    }
}

impl GenerationState {
    /// Starts a new request. Allowed from any state.
    pub fn begin(&mut self) {
        *self = Self {
            status: GenerationStatus::Loading,
            article: None,
            error: None,
        };
    }

    /// Records a finished article. A batch may report several in a row.
    pub fn succeed(&mut self, article: String) -> Result<()> {
        self.check(GenerationStatus::Success)?;
        self.status = GenerationStatus::Success;
        self.article = Some(article);
        self.error = None;
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        self.check(GenerationStatus::Error)?;
        self.status = GenerationStatus::Error;
        self.article = None;
        self.error = Some(error.into());
        Ok(())
    }

    /// Ends the request with an error whatever state it is in.
    pub fn abort(&mut self, error: impl Into<String>) {
        *self = Self {
            status: GenerationStatus::Error,
            article: None,
            error: Some(error.into()),
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn check(&self, to: GenerationStatus) -> Result<()> {
        match self.status {
            GenerationStatus::Loading | GenerationStatus::Success => Ok(()),
            from => Err(Error::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Idle,
    Publishing,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishState {
    pub status: PublishStatus,
    pub message: Option<String>,
}

impl Default for PublishState {
    fn default() -> Self {
        Self {
            status: PublishStatus::Idle,
            message: None,
        }
    }
}

impl PublishState {
    pub fn publishing() -> Self {
        Self {
            status: PublishStatus::Publishing,
            message: Some("Publishing post...".to_string()),
        }
    }

    pub fn published(response: &PublishResponse) -> Self {
        Self {
            status: PublishStatus::Success,
            message: Some(format!(
                "Post published successfully! Edit draft: {} Preview: {}",
                response.edit_link, response.view_link
            )),
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            status: PublishStatus::Error,
            message: Some(format!("Failed to publish: {}", error)),
        }
    }
}

/// Body sent to the WordPress publish endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPayload {
    pub title: String,
    pub content: String,
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub post_id: u64,
    pub edit_link: String,
    pub view_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
