//! Client for the plugin's WordPress REST routes.

use std::fmt;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;
use bs_core::{Error, PublishPayload, PublishResponse, Result, SettingsResponse};

pub const NAMESPACE: &str = "ai-blog-generator/v1/";

const SETTINGS_FALLBACK: &str = "Failed to save API key.";
const PUBLISH_FALLBACK: &str = "Failed to publish post.";
const PUBLISH_UNKNOWN: &str = "An unknown error occurred while publishing.";

#[derive(Clone, Default)]
pub struct WordPressConfig {
    /// Site REST root, e.g. `https://blog.example/wp-json/`.
    pub rest_url: String,
    pub nonce: Option<String>,
    pub username: Option<String>,
    /// WordPress application password, used with `username` for basic auth.
    pub application_password: Option<String>,
}

impl fmt::Debug for WordPressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressConfig")
            .field("rest_url", &self.rest_url)
            .field("nonce", &self.nonce.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("application_password", &self.application_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl WordPressConfig {
    pub fn new(rest_url: impl Into<String>) -> Self {
        Self {
            rest_url: rest_url.into(),
            ..Default::default()
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.application_password = Some(password.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRequest<'a> {
    api_key: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Which call failed; picks the error variant and fallback wording.
#[derive(Clone, Copy)]
enum Route {
    Settings,
    Publish,
}

impl Route {
    fn path(self) -> &'static str {
        match self {
            Route::Settings => "settings",
            Route::Publish => "publish",
        }
    }

    fn error(self, message: String) -> Error {
        match self {
            Route::Settings => Error::SettingsSave(message),
            Route::Publish => Error::Publish(message),
        }
    }

    /// Server message when present, otherwise the fallback for the body
    /// shape: JSON without a message, or something that isn't JSON at all.
    fn classify(self, body: &str) -> Error {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| match self {
                    Route::Settings => SETTINGS_FALLBACK.to_string(),
                    Route::Publish => PUBLISH_FALLBACK.to_string(),
                }),
            Err(_) => match self {
                Route::Settings => SETTINGS_FALLBACK.to_string(),
                Route::Publish => PUBLISH_UNKNOWN.to_string(),
            },
        };
        self.error(message)
    }
}

#[derive(Debug, Clone)]
pub struct WordPressClient {
    client: Client,
    base: Url,
    config: WordPressConfig,
}

impl WordPressClient {
    pub fn new(config: WordPressConfig) -> Result<Self> {
        let raw = config.rest_url.trim();
        if raw.is_empty() {
            return Err(Error::Config("WordPress REST URL is not configured".to_string()));
        }
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{}/", raw)
        };
        let base = Url::parse(&normalized)
            .and_then(|root| root.join(NAMESPACE))
            .map_err(|e| Error::Config(format!("Invalid WordPress REST URL '{}': {}", raw, e)))?;

        Ok(Self {
            client: Client::new(),
            base,
            config,
        })
    }

    pub fn endpoint(&self, route: &str) -> Result<Url> {
        self.base
            .join(route)
            .map_err(|e| Error::Config(format!("Invalid WordPress route '{}': {}", route, e)))
    }

    fn post(&self, url: Url) -> RequestBuilder {
        let mut request = self.client.post(url);
        if let Some(nonce) = &self.config.nonce {
            request = request.header("X-WP-Nonce", nonce);
        }
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.application_password.as_ref());
        }
        request
    }

    async fn send<T: Serialize + ?Sized>(&self, route: Route, body: &T) -> Result<Response> {
        let url = self.endpoint(route.path())?;
        tracing::debug!("POST {}", url);

        let response = self.post(url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = route.classify(&body);
        tracing::warn!("WordPress {} request failed ({}): {}", route.path(), status, error);
        Err(error)
    }

    /// Stores the Gemini API key in the plugin settings.
    pub async fn save_api_key(&self, api_key: &str) -> Result<SettingsResponse> {
        let response = self.send(Route::Settings, &SettingsRequest { api_key }).await?;
        Ok(response.json::<SettingsResponse>().await?)
    }

    /// Creates a draft post. The featured image, if any, rides along as a data
    /// URI for the plugin to attach.
    pub async fn publish_post(&self, payload: &PublishPayload) -> Result<PublishResponse> {
        let response = self.send(Route::Publish, payload).await?;
        let published = response.json::<PublishResponse>().await?;
        tracing::info!("📝 Published draft post {}", published.post_id);
        Ok(published)
    }
}
