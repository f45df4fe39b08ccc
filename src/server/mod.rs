//! HTTP gateway: price, chat relay, mock auth and market analysis.

mod error;
mod routes;

pub use error::ApiError;

use crate::analysis::MarketAnalyst;
use crate::auth::{AuthService, InMemoryUserRepository};
use crate::chat::ChatCompletions;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::feed::{BitqueryHttp, PriceSource};
use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// `None` when no Bitquery token is configured.
    pub price_source: Option<Arc<dyn PriceSource>>,
    pub chat: ChatCompletions,
    pub analyst: Arc<MarketAnalyst>,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let price_source = match config.bitquery_token.as_deref() {
            Some(token) => Some(Arc::new(BitqueryHttp::new(&config.bitquery_http_url, token)?)
                as Arc<dyn PriceSource>),
            None => {
                warn!("[INIT] BITQUERY_TOKEN is not set; /api/price will fail");
                None
            }
        };
        let chat = ChatCompletions::new(
            &config.chat_api_url,
            config.chat_model.clone(),
            config.perplexity_api_key.clone(),
        )?;
        let analyst = Arc::new(MarketAnalyst::new(chat.clone(), config.analysis_ttl));

        Ok(Self {
            config: Arc::new(config),
            price_source,
            chat,
            analyst,
            auth: AuthService::new(Arc::new(InMemoryUserRepository::with_demo_users())),
        })
    }

    pub fn with_price_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.price_source = Some(source);
        self
    }
}

/// Any origin when the list is empty or contains `*`.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/price", get(routes::price))
        .route("/api/chat", post(routes::chat))
        .route("/api/auth/sign-in", post(routes::sign_in))
        .route("/api/auth/sign-up", post(routes::sign_up))
        .route("/api/users/{id}/access-levels", get(routes::access_levels))
        .route("/api/analysis", post(routes::analysis))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = config.bind_addr;
    let app = router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("[INIT] gateway listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("[INIT] shutting down");
        })
        .await?;
    Ok(())
}
