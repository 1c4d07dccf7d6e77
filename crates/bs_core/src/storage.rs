use async_trait::async_trait;
use crate::types::SitemapFile;
use crate::Result;

#[async_trait]
pub trait SitemapStorage: Send + Sync {
    /// All stored sitemaps in insertion order
    async fn list(&self) -> Result<Vec<SitemapFile>>;

    /// Store a sitemap. Fails with `DuplicateSitemap` if the name is taken,
    /// leaving existing entries untouched.
    async fn add(&self, sitemap: SitemapFile) -> Result<()>;

    /// Remove a sitemap by name
    async fn delete(&self, name: &str) -> Result<()>;

    async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|s| s.name == name))
    }
}
