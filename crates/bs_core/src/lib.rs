pub mod error;
pub mod logging;
pub mod models;
pub mod progress;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use models::{ContentModel, GeneratedImage, TextOptions};
pub use progress::{NoProgress, Prefixed, ProgressFn, ProgressRecorder, ProgressSink};
pub use storage::SitemapStorage;
pub use types::{
    ArticleConfig, GenerationState, GenerationStatus, PublishPayload, PublishResponse,
    PublishState, PublishStatus, SettingsResponse, SitemapFile,
};

pub mod prelude {
    pub use super::{ArticleConfig, ContentModel, Error, ProgressSink, Result, SitemapFile};
}
