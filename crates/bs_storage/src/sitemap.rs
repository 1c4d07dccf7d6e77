//! XML sitemap import.
//!
//! Every `<loc>` element's text counts as a URL, wherever it sits in the
//! document. Files are judged independently: a bad file is reported and the
//! rest of the upload still goes through.

use bs_core::{Error, Result, SitemapFile, SitemapStorage};
use quick_xml::events::Event;
use quick_xml::Reader;

fn invalid_xml(name: &str) -> Error {
    Error::SitemapParse {
        name: name.to_string(),
        reason: format!("'{}' is not a valid XML file.", name),
    }
}

/// Extracts the text of every `<loc>` element, in document order. Fails if
/// the document is not well-formed XML with a single root element.
pub fn parse_loc_urls(name: &str, xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut urls = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut current_loc: Option<String> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            tracing::debug!("XML error in '{}': {}", name, e);
            invalid_xml(name)
        })?;
        match event {
            Event::Start(e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(invalid_xml(name));
                    }
                    seen_root = true;
                }
                depth += 1;
                if e.local_name().as_ref() == b"loc" {
                    current_loc = Some(String::new());
                }
            }
            Event::Empty(_) => {
                if depth == 0 {
                    if seen_root {
                        return Err(invalid_xml(name));
                    }
                    seen_root = true;
                }
            }
            Event::End(e) => {
                depth = depth.checked_sub(1).ok_or_else(|| invalid_xml(name))?;
                if e.local_name().as_ref() == b"loc" {
                    if let Some(url) = current_loc.take() {
                        let url = url.trim();
                        if !url.is_empty() {
                            urls.push(url.to_string());
                        }
                    }
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|_| invalid_xml(name))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(invalid_xml(name));
                    }
                } else if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&text);
                }
            }
            Event::CData(e) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root || depth != 0 {
        return Err(invalid_xml(name));
    }
    Ok(urls)
}

/// Parses one uploaded file into a [`SitemapFile`] stamped with today's date.
pub fn parse_sitemap(name: &str, xml: &str) -> Result<SitemapFile> {
    let urls = parse_loc_urls(name, xml)?;
    if urls.is_empty() {
        return Err(Error::SitemapParse {
            name: name.to_string(),
            reason: format!("No URLs found in '{}'.", name),
        });
    }
    Ok(SitemapFile::new(name, urls))
}

/// One uploaded file: its name and its contents, or the read failure.
#[derive(Debug)]
pub struct SitemapUpload {
    pub name: String,
    pub contents: std::result::Result<String, std::io::Error>,
}

impl SitemapUpload {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: Ok(contents.into()),
        }
    }

    /// Reads `path`, naming the upload after the file name.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            contents: tokio::fs::read_to_string(path).await,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub added: Vec<SitemapFile>,
    pub errors: Vec<Error>,
}

impl ImportReport {
    /// Per-file failures joined for display, or `None` when every file was
    /// accepted.
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(". "),
        )
    }
}

/// Validates every upload and stores the ones that pass. Names already in
/// the store, or repeated within the same upload, are rejected.
pub async fn import_sitemaps(
    store: &dyn SitemapStorage,
    uploads: Vec<SitemapUpload>,
) -> Result<ImportReport> {
    let existing: Vec<String> = store.list().await?.into_iter().map(|s| s.name).collect();
    let mut report = ImportReport::default();
    let mut accepted: Vec<SitemapFile> = Vec::new();

    for upload in uploads {
        let name = upload.name;
        if existing.contains(&name) || accepted.iter().any(|s| s.name == name) {
            report.errors.push(Error::DuplicateSitemap(name));
            continue;
        }
        let contents = match upload.contents {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to read sitemap '{}': {}", name, e);
                report.errors.push(Error::SitemapParse {
                    reason: format!("Failed to read '{}'.", name),
                    name,
                });
                continue;
            }
        };
        match parse_sitemap(&name, &contents) {
            Ok(sitemap) => {
                tracing::info!("📄 Parsed {} URLs from '{}'", sitemap.urls.len(), name);
                accepted.push(sitemap);
            }
            Err(e) => report.errors.push(e),
        }
    }

    for sitemap in accepted {
        match store.add(sitemap.clone()).await {
            Ok(()) => report.added.push(sitemap),
            Err(e) if e.is_sitemap_rejection() => report.errors.push(e),
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::MemoryStore;

    const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://blog.example/a</loc><lastmod>2024-01-01</lastmod></url>
  <url><loc> https://blog.example/b?x=1&amp;y=2 </loc></url>
  <url><loc></loc></url>
</urlset>"#;

    #[test]
    fn test_parse_loc_urls() {
        let urls = parse_loc_urls("s.xml", SITEMAP).unwrap();
        assert_eq!(urls, vec!["https://blog.example/a", "https://blog.example/b?x=1&y=2"]);
    }

    #[test]
    fn test_loc_anywhere_and_cdata() {
        let xml = "<sitemapindex><sitemap><loc><![CDATA[https://blog.example/s1.xml]]></loc></sitemap><x:loc xmlns:x=\"urn:x\">https://blog.example/c</x:loc></sitemapindex>";
        let urls = parse_loc_urls("i.xml", xml).unwrap();
        assert_eq!(urls, vec!["https://blog.example/s1.xml", "https://blog.example/c"]);
    }

    #[test]
    fn test_invalid_xml() {
        for xml in ["", "just some text", "<urlset><url></urlset>", "<a></a><b></b>", "<urlset><loc>x</loc>"] {
            let err = parse_loc_urls("bad.xml", xml).unwrap_err();
            assert_eq!(err.to_string(), "'bad.xml' is not a valid XML file.", "{:?}", xml);
        }
    }

    #[test]
    fn test_no_urls() {
        let err = parse_sitemap("empty.xml", "<urlset></urlset>").unwrap_err();
        assert_eq!(err.to_string(), "No URLs found in 'empty.xml'.");
    }

    #[tokio::test]
    async fn test_import_rejects_without_mutating_store() {
        let store = MemoryStore::new();
        store
            .add(SitemapFile::new("main.xml", vec!["https://blog.example/old".into()]))
            .await
            .unwrap();

        let report = import_sitemaps(
            &store,
            vec![
                SitemapUpload::new("main.xml", SITEMAP),
                SitemapUpload::new("empty.xml", "<urlset/>"),
                SitemapUpload::new("posts.xml", SITEMAP),
                SitemapUpload::new("posts.xml", SITEMAP),
                SitemapUpload {
                    name: "gone.xml".into(),
                    contents: Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
                },
            ],
        )
        .await
        .unwrap();

        assert_eq!(report.added.len(), 1);
        assert_eq!(report.added[0].name, "posts.xml");
        assert_eq!(
            report.error_message().unwrap(),
            "Sitemap \"main.xml\" already exists.. No URLs found in 'empty.xml'.. Sitemap \"posts.xml\" already exists.. Failed to read 'gone.xml'."
        );

        let stored = store.list().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].urls, vec!["https://blog.example/old".to_string()]);
        assert_eq!(stored[1].name, "posts.xml");
    }

    #[tokio::test]
    async fn test_import_all_good() {
        let store = MemoryStore::new();
        let report = import_sitemaps(&store, vec![SitemapUpload::new("a.xml", SITEMAP)])
            .await
            .unwrap();
        assert!(report.error_message().is_none());
        assert_eq!(report.added[0].urls.len(), 2);
    }
}
