use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use platform_db::DbPool;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    deals::{self, AppendVersionRequest, CreateDealRequest, DealError, DealWithVersions},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "deal tracker listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/deals", get(list_deals_handler).post(create_deal_handler))
        .route("/api/deals/{id}/versions", post(append_version_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

async fn list_deals_handler(
    State(state): State<AppState>,
) -> HttpResult<Json<Vec<DealWithVersions>>> {
    let deals = deals::list_deals(state.pool.as_ref()).await?;
    Ok(Json(deals))
}

async fn create_deal_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateDealRequest>,
) -> HttpResult<(StatusCode, Json<Ack>)> {
    deals::create_deal(state.pool.as_ref(), body).await?;
    Ok((StatusCode::CREATED, Json(Ack { success: true })))
}

async fn append_version_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<AppendVersionRequest>,
) -> HttpResult<Json<Ack>> {
    deals::append_version(state.pool.as_ref(), id, body).await?;
    Ok(Json(Ack { success: true }))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = state.pool.ping().await.is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

#[derive(Serialize)]
struct Ack {
    success: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl From<DealError> for HttpError {
    fn from(err: DealError) -> Self {
        let (status, message) = match err {
            DealError::NotFound => (StatusCode::NOT_FOUND, "deal not found".to_string()),
            DealError::DuplicateDealId(id) => (
                StatusCode::CONFLICT,
                format!("deal {id} already exists"),
            ),
            DealError::InvalidStage(stage) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown stage: {stage}"),
            ),
            DealError::Db(db) => (StatusCode::INTERNAL_SERVER_ERROR, db.to_string()),
        };
        Self { status, message }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
