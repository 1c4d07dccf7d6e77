//! Resolution of the inline directives the model leaves in an article.
//!
//! A [`Draft`] walks through `Unprocessed → ImageResolved →
//! VideoDirectivesResolved → Finalized`. Each step consumes the draft and
//! hands back the next state, so the order is enforced by the type system.
//! Only the request for the article text can fail the pipeline; every step
//! here degrades instead of erroring.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;
use bs_core::{ArticleConfig, ProgressSink};
use crate::requester::{ContentRequester, MediaPlatform};

pub mod image;
pub mod video;

pub use image::{leading_image_directive, ImageDirective};
pub use video::{embed_markup, extract_video_id, VideoResolution};

use video::VIDEO_DIRECTIVE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Unprocessed,
    ImageResolved,
    VideoDirectivesResolved,
    Finalized,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Unprocessed => "unprocessed",
            Stage::ImageResolved => "image resolved",
            Stage::VideoDirectivesResolved => "video directives resolved",
            Stage::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
}

pub trait DraftState: sealed::Sealed {
    const STAGE: Stage;
}

#[derive(Debug)]
pub enum Unprocessed {}
#[derive(Debug)]
pub enum ImageResolved {}
#[derive(Debug)]
pub enum VideoDirectivesResolved {}

impl sealed::Sealed for Unprocessed {}
impl sealed::Sealed for ImageResolved {}
impl sealed::Sealed for VideoDirectivesResolved {}

impl DraftState for Unprocessed {
    const STAGE: Stage = Stage::Unprocessed;
}
impl DraftState for ImageResolved {
    const STAGE: Stage = Stage::ImageResolved;
}
impl DraftState for VideoDirectivesResolved {
    const STAGE: Stage = Stage::VideoDirectivesResolved;
}

/// The finished Markdown plus a record of what the resolver did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedArticle {
    pub topic: String,
    pub markdown: String,
    pub featured_image: bool,
    pub videos: Vec<VideoResolution>,
}

impl FinalizedArticle {
    pub fn stage(&self) -> Stage {
        Stage::Finalized
    }
}

#[derive(Debug)]
pub struct Draft<S: DraftState> {
    markdown: String,
    topic: String,
    generate_images: bool,
    featured_image: bool,
    videos: Vec<VideoResolution>,
    _state: PhantomData<S>,
}

impl<S: DraftState> Draft<S> {
    pub fn stage(&self) -> Stage {
        S::STAGE
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    fn into_state<T: DraftState>(self) -> Draft<T> {
        Draft {
            markdown: self.markdown,
            topic: self.topic,
            generate_images: self.generate_images,
            featured_image: self.featured_image,
            videos: self.videos,
            _state: PhantomData,
        }
    }
}

impl Draft<Unprocessed> {
    /// Starts from the raw model output, trimmed.
    pub fn new(raw: &str, config: &ArticleConfig) -> Self {
        Self {
            markdown: raw.trim().to_string(),
            topic: config.topic.clone(),
            generate_images: config.generate_images,
            featured_image: false,
            videos: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Removes a leading featured-image directive and, when images are
    /// enabled, prepends the generated image. Image failures are logged and
    /// the article carries on without one.
    pub async fn resolve_image(
        mut self,
        requester: &ContentRequester,
        progress: &dyn ProgressSink,
    ) -> Draft<ImageResolved> {
        let Some(directive) = leading_image_directive(&self.markdown) else {
            return self.into_state();
        };
        self.markdown.replace_range(..directive.len, "");

        if self.generate_images {
            progress.emit("Generating featured image...");
            match requester.request_image(&directive.prompt).await {
                Ok(data_uri) => {
                    self.markdown = format!("![{}]({})\n\n{}", self.topic, data_uri, self.markdown);
                    self.featured_image = true;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to generate featured image for prompt \"{}\": {}",
                        directive.prompt,
                        e
                    );
                }
            }
        } else {
            tracing::debug!("Image generation disabled, dropping featured image directive");
        }

        self.into_state()
    }
}

/// Span and trimmed query of the first video directive at or after `from`.
fn next_video_directive(markdown: &str, from: usize) -> Option<(Range<usize>, String)> {
    let caps = VIDEO_DIRECTIVE.captures_at(markdown, from)?;
    let whole = caps.get(0)?;
    let query = caps.get(1).map(|m| m.as_str().trim().to_string()).unwrap_or_default();
    Some((whole.range(), query))
}

impl Draft<ImageResolved> {
    /// Replaces every video directive, in order, with an embed or a failure
    /// comment. Lookups always search for the article topic.
    pub async fn resolve_videos(
        mut self,
        requester: &ContentRequester,
        progress: &dyn ProgressSink,
    ) -> Draft<VideoDirectivesResolved> {
        let mut cursor = 0;
        while let Some((range, placeholder_query)) = next_video_directive(&self.markdown, cursor) {
            progress.emit(&format!(
                "Resolving video placeholder {} (\"{}\")...",
                self.videos.len() + 1,
                placeholder_query
            ));
            progress.emit(&format!("Searching for a relevant {} link...", MediaPlatform::YouTube));

            let url = requester
                .request_url_for_query(MediaPlatform::YouTube, &self.topic)
                .await;
            let resolution = VideoResolution::from_lookup(url);
            let markup = resolution.to_markup(&self.topic);
            tracing::debug!("Video placeholder \"{}\" resolved as {:?}", placeholder_query, resolution);

            self.markdown.replace_range(range.clone(), &markup);
            cursor = range.start + markup.len();
            self.videos.push(resolution);
        }

        self.into_state()
    }
}

impl Draft<VideoDirectivesResolved> {
    pub fn finalize(self) -> FinalizedArticle {
        FinalizedArticle {
            topic: self.topic,
            markdown: self.markdown,
            featured_image: self.featured_image,
            videos: self.videos,
        }
    }
}
