use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use bs_core::{ArticleConfig, GenerationState, PublishState, SitemapStorage};
use bs_inference::{BatchPolicy, BatchRunner, Config};
use bs_render::{CmarkRenderer, MarkdownRenderer};
use bs_wordpress::WordPressClient;

/// Everything the handlers share. Display state is last-write-wins.
pub struct AppState {
    pub inference: Config,
    pub api_key: RwLock<Option<String>>,
    pub generation: RwLock<GenerationState>,
    pub progress: RwLock<Option<String>>,
    pub publish: RwLock<PublishState>,
    pub sitemaps: Arc<dyn SitemapStorage>,
    pub wordpress: Option<WordPressClient>,
    pub renderer: Arc<dyn MarkdownRenderer>,
    pub policy: BatchPolicy,
}

impl AppState {
    pub fn new(inference: Config, sitemaps: Arc<dyn SitemapStorage>) -> Self {
        let api_key = inference.api_key.clone().filter(|k| !k.trim().is_empty());
        Self {
            inference,
            api_key: RwLock::new(api_key),
            generation: RwLock::new(GenerationState::default()),
            progress: RwLock::new(None),
            publish: RwLock::new(PublishState::default()),
            sitemaps,
            wordpress: None,
            renderer: Arc::new(CmarkRenderer::new()),
            policy: BatchPolicy::default(),
        }
    }

    pub fn with_wordpress(mut self, client: WordPressClient) -> Self {
        self.wordpress = Some(client);
        self
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Inference config carrying the most recently saved API key.
    pub async fn current_inference(&self) -> Config {
        Config {
            api_key: self.api_key.read().await.clone(),
            ..self.inference.clone()
        }
    }

    /// Runs a batch, mirroring each result into the display state as it
    /// lands. The generation state must already be `loading`.
    pub async fn run_generation(self: Arc<Self>, configs: Vec<ArticleConfig>) {
        let generator = match self.current_inference().await.build_generator() {
            Ok(generator) => generator,
            Err(e) => {
                self.record_failure(e.to_string()).await;
                return;
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let forward = {
            let state = self.clone();
            tokio::spawn(async move {
                while let Some(message) = rx.recv().await {
                    *state.progress.write().await = Some(message);
                }
            })
        };

        let mut runner = BatchRunner::new(&generator, configs).with_policy(self.policy);
        let total = runner.len();
        let mut failed = false;
        while let Some((config, result)) = runner.next(&tx).await {
            match result {
                Ok(article) => {
                    if let Err(e) = self.generation.write().await.succeed(article.markdown) {
                        tracing::debug!("Keeping earlier error over \"{}\": {}", config.topic, e);
                    }
                }
                Err(e) => {
                    failed = true;
                    self.record_failure(e.to_string()).await;
                }
            }
        }

        drop(tx);
        if let Err(e) = forward.await {
            tracing::warn!("Progress forwarder stopped: {}", e);
        }

        let mut progress = self.progress.write().await;
        if failed {
            return;
        }
        *progress = if total > 1 {
            Some(format!("Completed generation of {} articles.", total))
        } else {
            None
        };
    }

    async fn record_failure(&self, message: String) {
        self.generation.write().await.abort(message);
    }
}
