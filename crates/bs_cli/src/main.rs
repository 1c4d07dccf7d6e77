use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use bs_core::logging::init_logging;
use bs_core::{Error, Result};
use bs_inference::BatchPolicy;
use bs_storage::StorageKind;
use bs_web::AppState;
use bs_wordpress::{WordPressClient, WordPressConfig};
use tracing::info;

mod commands;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate research-backed blog posts with Gemini and publish them to WordPress", long_about = None)]
pub struct Cli {
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, default_value = "gemini", help = "Model to use for generation. Available models: gemini (default), scripted")]
    model: String,
    /// Base URL of the Gemini REST API
    #[arg(long)]
    model_url: Option<String>,
    #[arg(long)]
    text_model: Option<String>,
    #[arg(long)]
    image_model: Option<String>,
    /// Closing line the model must end every post with
    #[arg(long)]
    author_bio: Option<String>,
    #[arg(long, default_value = "file", help = "Sitemap storage backend: file (default), memory")]
    storage: String,
    #[arg(long)]
    storage_path: Option<PathBuf>,
    /// WordPress REST root, e.g. https://blog.example/wp-json/
    #[arg(long, env = "WP_REST_URL")]
    wp_url: Option<String>,
    #[arg(long, env = "WP_NONCE", hide_env_values = true)]
    wp_nonce: Option<String>,
    #[arg(long, env = "WP_USER")]
    wp_user: Option<String>,
    #[arg(long, env = "WP_APP_PASSWORD", hide_env_values = true)]
    wp_app_password: Option<String>,
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate one article per topic, strictly in order
    Generate {
        /// Topics to write about; each one becomes its own article
        topics: Vec<String>,
        /// Read additional topics from a file, one per line
        #[arg(long)]
        topics_file: Option<PathBuf>,
        #[arg(long)]
        no_images: bool,
        /// Write `<slug>.md` files here instead of printing to stdout
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Also write the rendered `<slug>.html`
        #[arg(long)]
        html: bool,
        /// Publish every finished article as a WordPress draft
        #[arg(long)]
        publish: bool,
        /// Keep going after a failed article instead of stopping the batch
        #[arg(long)]
        continue_on_error: bool,
    },
    /// Manage the sitemaps that supply internal links
    Sitemap {
        #[command(subcommand)]
        command: SitemapCommands,
    },
    /// Plugin settings on the WordPress site
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
        #[arg(long)]
        continue_on_error: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
enum SitemapCommands {
    /// Import XML sitemaps; each file is accepted or rejected on its own
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    List,
    Remove {
        name: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum SettingsCommands {
    SaveKey {
        key: String,
    },
}

impl Cli {
    fn inference_config(&self) -> bs_inference::Config {
        bs_inference::Config {
            api_key: self.api_key.clone().filter(|k| !k.trim().is_empty()),
            model_name: Some(self.model.clone()),
            model_url: self.model_url.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            author_bio: self.author_bio.clone(),
        }
    }

    fn wordpress(&self) -> Result<Option<WordPressClient>> {
        let Some(url) = self.wp_url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        let mut config = WordPressConfig::new(url);
        if let Some(nonce) = &self.wp_nonce {
            config = config.with_nonce(nonce);
        }
        if let (Some(user), Some(password)) = (&self.wp_user, &self.wp_app_password) {
            config = config.with_basic_auth(user, password);
        }
        Ok(Some(WordPressClient::new(config)?))
    }

    fn require_wordpress(&self) -> Result<WordPressClient> {
        self.wordpress()?.ok_or_else(|| {
            Error::Config("WordPress is not configured. Pass --wp-url or set WP_REST_URL.".to_string())
        })
    }
}

fn policy(continue_on_error: bool) -> BatchPolicy {
    if continue_on_error {
        BatchPolicy::ContinueOnError
    } else {
        BatchPolicy::AbortOnError
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = tracing::Level::from_str(&cli.log_level)
        .map_err(|_| Error::Config(format!("Invalid log level '{}'", cli.log_level)))?;
    let logger = init_logging(level);

    let kind = StorageKind::parse(&cli.storage, cli.storage_path.clone())?;
    let storage = bs_storage::create_storage(&kind).await?;
    info!("💾 Sitemap storage ready ({:?})", kind);

    match &cli.command {
        Commands::Generate {
            topics,
            topics_file,
            no_images,
            output_dir,
            html,
            publish,
            continue_on_error,
        } => {
            let wordpress = if *publish { Some(cli.require_wordpress()?) } else { None };
            let options = commands::GenerateOptions {
                topics: commands::collect_topics(topics, topics_file.as_deref()).await?,
                generate_images: !no_images,
                output_dir: output_dir.clone(),
                html: *html,
                policy: policy(*continue_on_error),
            };
            let generator = cli.inference_config().build_generator()?;
            info!("🧠 Using {} model", generator.requester().model().name());
            commands::generate(&generator, storage.as_ref(), wordpress.as_ref(), options, &logger).await?;
        }
        Commands::Sitemap { command } => match command {
            SitemapCommands::Add { paths } => commands::add_sitemaps(storage.as_ref(), paths).await?,
            SitemapCommands::List => commands::list_sitemaps(storage.as_ref()).await?,
            SitemapCommands::Remove { name } => {
                storage.delete(name).await?;
                info!("🗑️ Removed sitemap {}", name);
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommands::SaveKey { key } => {
                let client = cli.require_wordpress()?;
                client.save_api_key(key).await?;
                info!("🔑 API key saved to WordPress");
            }
        },
        Commands::Serve { addr, continue_on_error } => {
            let mut state = AppState::new(cli.inference_config(), storage.clone())
                .with_policy(policy(*continue_on_error));
            if let Some(client) = cli.wordpress()? {
                state = state.with_wordpress(client);
            }
            bs_web::serve(Arc::new(state), addr).await?;
        }
    }

    Ok(())
}
