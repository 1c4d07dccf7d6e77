use async_trait::async_trait;
use bs_core::{Error, Result, SitemapFile, SitemapStorage};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub const DEFAULT_PATH: &str = "sitemaps.json";

/// Sitemaps persisted as a JSON array. The file is read once on open and
/// rewritten in full after every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    sitemaps: RwLock<Vec<SitemapFile>>,
}

impl FileStore {
    /// A missing file is an empty store. A file that can't be parsed is
    /// logged and treated as empty; it gets overwritten on the next change.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let sitemaps = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str::<Vec<SitemapFile>>(&contents) {
                Ok(sitemaps) => sitemaps,
                Err(e) => {
                    tracing::error!("Failed to parse sitemaps from {}: {}", path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Loaded {} sitemaps from {}", sitemaps.len(), path.display());
        Ok(Self {
            path,
            sitemaps: RwLock::new(sitemaps),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, sitemaps: &[SitemapFile]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(sitemaps)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

#[async_trait]
impl SitemapStorage for FileStore {
    async fn list(&self) -> Result<Vec<SitemapFile>> {
        Ok(self.sitemaps.read().await.clone())
    }

    async fn add(&self, sitemap: SitemapFile) -> Result<()> {
        let mut sitemaps = self.sitemaps.write().await;
        if sitemaps.iter().any(|s| s.name == sitemap.name) {
            return Err(Error::DuplicateSitemap(sitemap.name));
        }
        let mut updated = sitemaps.clone();
        updated.push(sitemap);
        self.persist(&updated).await?;
        *sitemaps = updated;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut sitemaps = self.sitemaps.write().await;
        if !sitemaps.iter().any(|s| s.name == name) {
            return Err(Error::SitemapNotFound(name.to_string()));
        }
        let updated: Vec<SitemapFile> = sitemaps.iter().filter(|s| s.name != name).cloned().collect();
        self.persist(&updated).await?;
        *sitemaps = updated;
        Ok(())
    }
}
