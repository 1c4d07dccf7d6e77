use async_trait::async_trait;
use bs_core::{Error, Result, SitemapFile, SitemapStorage};
use tokio::sync::RwLock;

/// Sitemaps kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sitemaps: RwLock<Vec<SitemapFile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sitemaps(sitemaps: Vec<SitemapFile>) -> Self {
        Self {
            sitemaps: RwLock::new(sitemaps),
        }
    }
}

#[async_trait]
impl SitemapStorage for MemoryStore {
    async fn list(&self) -> Result<Vec<SitemapFile>> {
        Ok(self.sitemaps.read().await.clone())
    }

    async fn add(&self, sitemap: SitemapFile) -> Result<()> {
        let mut sitemaps = self.sitemaps.write().await;
        if sitemaps.iter().any(|s| s.name == sitemap.name) {
            return Err(Error::DuplicateSitemap(sitemap.name));
        }
        sitemaps.push(sitemap);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let mut sitemaps = self.sitemaps.write().await;
        let before = sitemaps.len();
        sitemaps.retain(|s| s.name != name);
        if sitemaps.len() == before {
            return Err(Error::SitemapNotFound(name.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.add(SitemapFile::new("a.xml", vec!["https://a.com".into()])).await.unwrap();
        store.add(SitemapFile::new("b.xml", vec!["https://b.com".into()])).await.unwrap();

        let err = store
            .add(SitemapFile::new("a.xml", vec!["https://other.com".into()]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSitemap(ref n) if n == "a.xml"));

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a.xml", "b.xml"]);
        assert_eq!(store.list().await.unwrap()[0].urls, vec!["https://a.com".to_string()]);

        store.delete("a.xml").await.unwrap();
        assert!(!store.contains("a.xml").await.unwrap());
        assert!(matches!(store.delete("a.xml").await, Err(Error::SitemapNotFound(_))));
    }
}
