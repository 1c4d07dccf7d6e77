use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/state", get(handlers::get_state))
        .route("/api/generate", post(handlers::generate))
        .route("/api/publish", post(handlers::publish))
        .route("/api/article/html", get(handlers::article_html))
        .route("/api/sitemaps", get(handlers::list_sitemaps).post(handlers::upload_sitemaps))
        .route("/api/sitemaps/:name", delete(handlers::delete_sitemap))
        .route("/api/settings", post(handlers::save_settings))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: &str) -> bs_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use bs_core::{Error, Result};
    pub use crate::{create_app, serve, AppState};
}
