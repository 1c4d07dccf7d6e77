use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use bs_core::{
    ArticleConfig, GenerationState, GenerationStatus, PublishState, SettingsResponse, SitemapFile,
};
use bs_render::{build_publish_payload, render_or_preformatted};
use bs_storage::{import_sitemaps, SitemapUpload};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub generation: GenerationState,
    pub progress: Option<String>,
    pub publish: PublishState,
    pub has_api_key: bool,
}

pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(StateResponse {
        generation: state.generation.read().await.clone(),
        progress: state.progress.read().await.clone(),
        publish: state.publish.read().await.clone(),
        has_api_key: state.api_key.read().await.is_some(),
    })
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// One topic per line.
    pub topics: String,
    #[serde(default = "default_true")]
    pub generate_images: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateAccepted {
    pub accepted: usize,
}

/// Starts a batch in the background; poll `/api/state` for progress.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<(StatusCode, Json<GenerateAccepted>)> {
    let links = SitemapFile::internal_links(&state.sitemaps.list().await?);
    let links = (!links.is_empty()).then_some(links.as_str());
    let configs = ArticleConfig::batch_from_topics(&request.topics, request.generate_images, links);
    if configs.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Please enter at least one topic."));
    }

    {
        let mut generation = state.generation.write().await;
        if generation.status == GenerationStatus::Loading {
            return Err(ApiError::new(StatusCode::CONFLICT, "A generation is already running."));
        }
        if let Err(e) = state.current_inference().await.build_generator() {
            generation.abort(e.to_string());
            return Err(e.into());
        }
        generation.begin();
    }
    *state.publish.write().await = PublishState::default();

    let accepted = configs.len();
    tracing::info!("🚀 Starting generation of {} article(s)", accepted);
    tokio::spawn(state.clone().run_generation(configs));
    Ok((StatusCode::ACCEPTED, Json(GenerateAccepted { accepted })))
}

async fn current_article(state: &AppState) -> ApiResult<String> {
    let generation = state.generation.read().await;
    match (&generation.status, &generation.article) {
        (GenerationStatus::Success, Some(article)) => Ok(article.clone()),
        _ => Err(ApiError::new(StatusCode::NOT_FOUND, "No generated article yet.")),
    }
}

pub async fn article_html(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let markdown = current_article(&state).await?;
    let html = render_or_preformatted(Some(state.renderer.as_ref()), &markdown);
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html))
}

/// Publishes the current article as a WordPress draft.
pub async fn publish(State(state): State<Arc<AppState>>) -> ApiResult<Json<PublishState>> {
    let client = state.wordpress.as_ref().ok_or_else(|| {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "WordPress is not configured.")
    })?;
    let markdown = current_article(&state).await?;
    let html = render_or_preformatted(Some(state.renderer.as_ref()), &markdown);
    let payload = build_publish_payload(&html, &markdown);

    *state.publish.write().await = PublishState::publishing();
    let outcome = match client.publish_post(&payload).await {
        Ok(response) => PublishState::published(&response),
        Err(e) => PublishState::failed(&e),
    };
    *state.publish.write().await = outcome.clone();
    Ok(Json(outcome))
}

pub async fn list_sitemaps(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SitemapFile>>> {
    Ok(Json(state.sitemaps.list().await?))
}

#[derive(Debug, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub contents: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub added: Vec<SitemapFile>,
    pub error: Option<String>,
}

pub async fn upload_sitemaps(
    State(state): State<Arc<AppState>>,
    Json(files): Json<Vec<UploadedFile>>,
) -> ApiResult<Json<UploadResponse>> {
    let uploads = files
        .into_iter()
        .map(|f| SitemapUpload::new(f.name, f.contents))
        .collect();
    let report = import_sitemaps(state.sitemaps.as_ref(), uploads).await?;
    Ok(Json(UploadResponse {
        error: report.error_message(),
        added: report.added,
    }))
}

pub async fn delete_sitemap(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.sitemaps.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub api_key: String,
}

/// Saves the key to WordPress when a site is configured, then uses it for
/// every later generation.
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SettingsRequest>,
) -> ApiResult<Json<SettingsResponse>> {
    let key = request.api_key.trim().to_string();
    let response = match &state.wordpress {
        Some(client) => client.save_api_key(&key).await?,
        None => SettingsResponse {
            success: true,
            message: None,
        },
    };
    *state.api_key.write().await = (!key.is_empty()).then_some(key);
    Ok(Json(response))
}
