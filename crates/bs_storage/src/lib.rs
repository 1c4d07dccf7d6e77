use std::path::PathBuf;
use std::sync::Arc;
use bs_core::{Error, Result, SitemapStorage};

pub mod backends;
pub mod sitemap;

pub use backends::*;
pub use sitemap::{import_sitemaps, parse_loc_urls, parse_sitemap, ImportReport, SitemapUpload};

/// Which sitemap store to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    File(PathBuf),
}

impl StorageKind {
    /// `memory`, or `file` at `path` (defaults to `sitemaps.json`).
    pub fn parse(name: &str, path: Option<PathBuf>) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "memory" => Ok(StorageKind::Memory),
            "file" => Ok(StorageKind::File(
                path.unwrap_or_else(|| PathBuf::from(backends::file::DEFAULT_PATH)),
            )),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}'. Available backends: memory, file",
                other
            ))),
        }
    }
}

pub async fn create_storage(kind: &StorageKind) -> Result<Arc<dyn SitemapStorage>> {
    match kind {
        StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageKind::File(path) => Ok(Arc::new(FileStore::open(path.clone()).await?)),
    }
}

pub mod prelude {
    pub use super::{create_storage, StorageKind};
    pub use super::backends::*;
    pub use super::sitemap::{import_sitemaps, ImportReport, SitemapUpload};
}
