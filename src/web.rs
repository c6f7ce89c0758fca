use crate::{
    config::Config,
    engine::{canonical_interests, CategoryMapping, EngineError, MappingService},
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

const LISTEN_ADDR: &str = "0.0.0.0:8087";

#[derive(Clone)]
pub(crate) struct SharedState {
    pub(crate) service: Arc<MappingService>,
    pub(crate) config: Config,
}

async fn start_app(config: Config, service: MappingService) {
    let shared_state = Arc::new(SharedState {
        service: Arc::new(service),
        config,
    });

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        tokio::select! {
            _ = ctrl_c => {
                log::warn!("shutting down");
            },
            _ = terminate => {},
        }
    }

    let app = router(shared_state);

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR).await.unwrap();
    log::info!("listening on {LISTEN_ADDR}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

pub(crate) fn router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/api/mappings/generate", post(generate_mappings))
        .route("/api/interests", get(interests))
        .route("/api/config", get(get_config))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(state)
}

pub fn start_daemon(config: Config, service: MappingService) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async { start_app(config, service).await });
}

// Make our own error that wraps `EngineError`.
#[derive(Debug)]
struct HttpError(EngineError);

// Tell axum how to convert `EngineError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            EngineError::Validation(_) => (
                axum::http::StatusCode::BAD_REQUEST,
                json!({"error": self.0.to_string()}).to_string(),
            ),
            EngineError::Embedding(_) | EngineError::Similarity(_) => {
                log::error!("{self:?}");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": self.0.to_string()}).to_string(),
                )
            }
        }
        .into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<EngineError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateMappingsRequest {
    #[serde(default)]
    pub categories: Vec<String>,

    /// Minimum adjusted similarity score for an embedding-only match.
    ///
    /// *Falls back to the configured default*
    pub threshold: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMappingsResponse {
    pub mappings: Vec<CategoryMapping>,
    pub processed_count: usize,
    pub total_count: usize,
}

async fn generate_mappings(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<GenerateMappingsRequest>,
) -> Result<axum::Json<GenerateMappingsResponse>, HttpError> {
    log::debug!("payload: {payload:?}");

    if payload.categories.is_empty() {
        return Err(HttpError(EngineError::Validation(
            "categories must be a non-empty array".to_string(),
        )));
    }

    let total_count = payload.categories.len();
    let max_batch_size = state.config.mapping.max_batch_size;
    if total_count > max_batch_size {
        log::warn!("batch of {total_count} capped to {max_batch_size}");
    }

    let capped: Vec<String> = payload
        .categories
        .into_iter()
        .take(max_batch_size)
        .collect();

    let service = state.service.clone();

    tokio::task::block_in_place(move || {
        let mappings = service.map_categories(&capped, payload.threshold)?;

        Ok(GenerateMappingsResponse {
            processed_count: mappings.len(),
            total_count,
            mappings,
        }
        .into())
    })
}

async fn interests() -> axum::Json<Vec<&'static str>> {
    canonical_interests().to_vec().into()
}

async fn get_config(State(state): State<Arc<SharedState>>) -> axum::Json<Config> {
    state.config.clone().into()
}
