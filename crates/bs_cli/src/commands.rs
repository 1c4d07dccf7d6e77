use std::path::{Path, PathBuf};
use bs_core::logging::ProgressLogger;
use bs_core::{ArticleConfig, Error, PublishState, Result, SitemapFile, SitemapStorage};
use bs_inference::{ArticleGenerator, BatchPolicy, BatchRunner, FinalizedArticle};
use bs_render::{build_publish_payload, render_or_preformatted, CmarkRenderer};
use bs_storage::{import_sitemaps, SitemapUpload};
use bs_wordpress::WordPressClient;
use tracing::{info, warn};

#[derive(Debug)]
pub struct GenerateOptions {
    /// Newline-delimited topics.
    pub topics: String,
    pub generate_images: bool,
    pub output_dir: Option<PathBuf>,
    pub html: bool,
    pub policy: BatchPolicy,
}

/// Positional topics plus the lines of `topics_file`, newline-joined.
pub async fn collect_topics(topics: &[String], topics_file: Option<&Path>) -> Result<String> {
    let mut lines = topics.to_vec();
    if let Some(path) = topics_file {
        lines.push(tokio::fs::read_to_string(path).await?);
    }
    Ok(lines.join("\n"))
}

/// File-name-safe version of a topic.
pub fn slugify(topic: &str) -> String {
    let mut slug = String::new();
    for c in topic.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_end_matches('-').chars().take(60).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "article".to_string()
    } else {
        slug.to_string()
    }
}

async fn write_article(
    article: &FinalizedArticle,
    dir: &Path,
    html: Option<&str>,
    logger: &ProgressLogger,
) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let slug = slugify(&article.topic);
    let md_path = dir.join(format!("{}.md", slug));
    tokio::fs::write(&md_path, &article.markdown).await?;
    logger.info(&format!("💾 Wrote {}", md_path.display()));
    if let Some(html) = html {
        let html_path = dir.join(format!("{}.html", slug));
        tokio::fs::write(&html_path, html).await?;
        logger.info(&format!("💾 Wrote {}", html_path.display()));
    }
    Ok(())
}

async fn publish_article(
    client: &WordPressClient,
    html: &str,
    article: &FinalizedArticle,
    logger: &ProgressLogger,
) {
    let payload = build_publish_payload(html, &article.markdown);
    logger.debug(&format!("Publishing \"{}\"", payload.title));
    let state = match client.publish_post(&payload).await {
        Ok(response) => PublishState::published(&response),
        Err(e) => PublishState::failed(&e),
    };
    match state.message {
        Some(message) if state.status == bs_core::PublishStatus::Success => logger.info(&format!("📝 {}", message)),
        Some(message) => logger.warn(&format!("❌ {}", message)),
        None => {}
    }
}

pub async fn generate(
    generator: &ArticleGenerator,
    storage: &dyn SitemapStorage,
    wordpress: Option<&WordPressClient>,
    options: GenerateOptions,
    logger: &ProgressLogger,
) -> Result<()> {
    let links = SitemapFile::internal_links(&storage.list().await?);
    let links = (!links.is_empty()).then_some(links.as_str());
    let configs = ArticleConfig::batch_from_topics(&options.topics, options.generate_images, links);
    if configs.is_empty() {
        return Err(Error::Config("Please enter at least one topic.".to_string()));
    }
    if links.is_some() {
        info!("🔗 Supplying internal links from stored sitemaps");
    }

    let renderer = CmarkRenderer::new();
    let mut runner = BatchRunner::new(generator, configs).with_policy(options.policy);
    let total = runner.len();
    let mut first_error = None;
    let mut completed = 0;

    while let Some((config, result)) = runner.next(logger).await {
        let article_logger = logger.clone().with_prefix(format!("[{}]", slugify(&config.topic)));
        let article = match result {
            Ok(article) => article,
            Err(e) => {
                article_logger.warn(&format!("❌ {}", e));
                first_error.get_or_insert(e);
                continue;
            }
        };
        completed += 1;

        let needs_html = options.html || wordpress.is_some();
        let html = needs_html.then(|| render_or_preformatted(Some(&renderer), &article.markdown));
        match &options.output_dir {
            Some(dir) => {
                let html = if options.html { html.as_deref() } else { None };
                write_article(&article, dir, html, &article_logger).await?;
            }
            None => println!("{}\n", article.markdown),
        }
        if let (Some(client), Some(html)) = (wordpress, html.as_deref()) {
            publish_article(client, html, &article, &article_logger).await;
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            if total > 1 {
                logger.info(&format!("✅ Completed generation of {} articles.", completed));
            }
            Ok(())
        }
    }
}

pub async fn add_sitemaps(storage: &dyn SitemapStorage, paths: &[PathBuf]) -> Result<()> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(SitemapUpload::from_path(path).await);
    }
    let report = import_sitemaps(storage, uploads).await?;
    for sitemap in &report.added {
        info!("📄 Added {} ({} URLs)", sitemap.name, sitemap.urls.len());
    }
    if let Some(message) = report.error_message() {
        warn!("⚠️ {}", message);
    }
    Ok(())
}

pub async fn list_sitemaps(storage: &dyn SitemapStorage) -> Result<()> {
    let sitemaps = storage.list().await?;
    if sitemaps.is_empty() {
        println!("No sitemaps stored.");
    }
    for sitemap in sitemaps {
        println!("{}\tAdded: {}\t{} URLs", sitemap.name, sitemap.added_date, sitemap.urls.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use bs_inference::models::{ScriptedFailure, ScriptedModel};
    use bs_storage::MemoryStore;
    use tempfile::tempdir;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Art of Mindful Communication"), "the-art-of-mindful-communication");
        assert_eq!(slugify("  Why?! Sleep & You  "), "why-sleep-you");
        assert_eq!(slugify("???"), "article");
        assert!(slugify(&"long topic ".repeat(20)).len() <= 60);
        assert!(!slugify(&"long topic ".repeat(20)).ends_with('-'));
    }

    #[tokio::test]
    async fn test_collect_topics() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("topics.txt");
        std::fs::write(&path, "Third\n\nFourth\n").unwrap();

        let topics = collect_topics(&["First".to_string(), "Second".to_string()], Some(path.as_path())).await.unwrap();
        let configs = ArticleConfig::batch_from_topics(&topics, true, None);
        let names: Vec<_> = configs.iter().map(|c| c.topic.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third", "Fourth"]);
    }

    #[tokio::test]
    async fn test_generate_writes_files_and_uses_sitemap_links() {
        let dir = tempdir().unwrap();
        let storage = MemoryStore::new();
        storage
            .add(SitemapFile::new("a.xml", vec!["https://blog.example/a".into()]))
            .await
            .unwrap();
        let model = Arc::new(ScriptedModel::new().reply("# Focus\n\nBody"));
        let generator = ArticleGenerator::new(model.clone());

        generate(
            &generator,
            &storage,
            None,
            GenerateOptions {
                topics: "Deep Focus".to_string(),
                generate_images: false,
                output_dir: Some(dir.path().to_path_buf()),
                html: true,
                policy: BatchPolicy::default(),
            },
            &ProgressLogger::new(),
        )
        .await
        .unwrap();

        let md = std::fs::read_to_string(dir.path().join("deep-focus.md")).unwrap();
        assert_eq!(md, "# Focus\n\nBody");
        let html = std::fs::read_to_string(dir.path().join("deep-focus.html")).unwrap();
        assert!(html.contains("<h1>Focus</h1>"));
        assert!(model.text_prompts()[0].0.contains("https://blog.example/a"));
    }

    #[tokio::test]
    async fn test_generate_reports_first_failure() {
        let dir = tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new().fail(ScriptedFailure::InvalidCredentials));
        let generator = ArticleGenerator::new(model);

        let result = generate(
            &generator,
            &MemoryStore::new(),
            None,
            GenerateOptions {
                topics: "One\nTwo".to_string(),
                generate_images: false,
                output_dir: Some(dir.path().to_path_buf()),
                html: false,
                policy: BatchPolicy::AbortOnError,
            },
            &ProgressLogger::new(),
        )
        .await;

        assert!(matches!(result, Err(Error::InvalidCredentials)));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
