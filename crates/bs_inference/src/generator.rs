use std::sync::Arc;
use bs_core::{ArticleConfig, ContentModel, Error, Prefixed, ProgressSink, Result};
use crate::directives::{Draft, FinalizedArticle};
use crate::prompt::PromptBuilder;
use crate::requester::ContentRequester;

/// Turns one [`ArticleConfig`] into a finished article: prompt, grounded text
/// request, then the directive resolver.
#[derive(Debug, Clone)]
pub struct ArticleGenerator {
    requester: ContentRequester,
    prompt: PromptBuilder,
}

impl ArticleGenerator {
    pub fn new(model: Arc<dyn ContentModel>) -> Self {
        Self {
            requester: ContentRequester::new(model),
            prompt: PromptBuilder::default(),
        }
    }

    pub fn with_prompt_builder(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn requester(&self) -> &ContentRequester {
        &self.requester
    }

    pub async fn generate(
        &self,
        config: &ArticleConfig,
        progress: &dyn ProgressSink,
    ) -> Result<FinalizedArticle> {
        if config.topic.trim().is_empty() {
            return Err(Error::Config("Please enter a topic.".to_string()));
        }

        tracing::info!("Generating article for \"{}\"", config.topic);
        progress.emit("Researching and writing article...");
        let prompt = self.prompt.build(config);
        let raw = self.requester.request_article_text(&prompt).await?;

        let draft = Draft::new(&raw, config)
            .resolve_image(&self.requester, progress)
            .await
            .resolve_videos(&self.requester, progress)
            .await;

        progress.emit("Finalizing article...");
        let article = draft.finalize();
        tracing::debug!(
            "Finished \"{}\": featured image {}, {} video directive(s)",
            article.topic,
            article.featured_image,
            article.videos.len()
        );
        Ok(article)
    }
}

/// What a batch does after an article fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    #[default]
    AbortOnError,
    ContinueOnError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub articles: Vec<FinalizedArticle>,
    pub failures: Vec<(ArticleConfig, Error)>,
    /// Set when the batch stopped before reaching the last topic.
    pub aborted: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs configs one at a time in submission order.
pub struct BatchRunner<'a> {
    generator: &'a ArticleGenerator,
    configs: Vec<ArticleConfig>,
    policy: BatchPolicy,
    position: usize,
    halted: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(generator: &'a ArticleGenerator, configs: Vec<ArticleConfig>) -> Self {
        Self {
            generator,
            configs,
            policy: BatchPolicy::default(),
            position: 0,
            halted: false,
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    fn is_halted(&self) -> bool {
        self.halted || self.position >= self.configs.len()
    }

    /// Generates the next article. Returns `None` once every config has run
    /// or the policy stopped the batch.
    pub async fn next(
        &mut self,
        progress: &dyn ProgressSink,
    ) -> Option<(ArticleConfig, Result<FinalizedArticle>)> {
        if self.is_halted() {
            return None;
        }

        let total = self.configs.len();
        let config = self.configs[self.position].clone();
        self.position += 1;

        let prefix = if total > 1 {
            format!("({}/{}) ", self.position, total)
        } else {
            String::new()
        };
        let progress = Prefixed::new(prefix, progress);
        progress.emit(&format!("Generating article for \"{}\"...", config.topic));

        let result = self.generator.generate(&config, &progress).await;
        if let Err(e) = &result {
            tracing::error!("Article \"{}\" failed: {}", config.topic, e);
            if self.policy == BatchPolicy::AbortOnError {
                self.halted = true;
            }
        }
        Some((config, result))
    }

    pub async fn run(mut self, progress: &dyn ProgressSink) -> BatchReport {
        let mut report = BatchReport::default();
        while let Some((config, result)) = self.next(progress).await {
            match result {
                Ok(article) => report.articles.push(article),
                Err(e) => report.failures.push((config, e)),
            }
        }
        report.aborted = self.halted && self.position < self.configs.len();

        if report.failures.is_empty() && !report.articles.is_empty() {
            progress.emit(&format!(
                "Completed generation of {} articles.",
                report.articles.len()
            ));
        }
        report
    }
}
