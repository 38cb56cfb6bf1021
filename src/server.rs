//! HTTP surface: the dashboard page, the update endpoint, and static assets.

use crate::interaction::{InteractionHandler, UpdateOutcome, UpdateRequest};
use crate::layout::{render_page, render_summary, Dashboard};
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::info;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),
}

/// Server settings taken from the command line
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub assets_dir: PathBuf,
    pub debug: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            assets_dir: PathBuf::from("assets"),
            debug: false,
        }
    }
}

impl ServeConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ServeError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Shared request state. The handler mutex serializes update events.
#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
    handler: Arc<Mutex<InteractionHandler>>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, debug: bool) -> Self {
        let handler = InteractionHandler::new(
            Arc::clone(dashboard.dataset()),
            dashboard.theme().clone(),
            debug,
        );
        Self {
            dashboard: Arc::new(dashboard),
            handler: Arc::new(Mutex::new(handler)),
        }
    }
}

/// Body returned by `POST /_update`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(flatten)]
    pub outcome: UpdateOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_html: Option<String>,
}

impl From<UpdateOutcome> for UpdateResponse {
    fn from(outcome: UpdateOutcome) -> Self {
        let summary_html = outcome.display.summary.as_ref().map(render_summary);
        Self {
            outcome,
            summary_html,
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, assets_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/_update", post(update))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let session = {
        let mut handler = state.handler.lock().unwrap_or_else(|e| e.into_inner());
        handler.open_session()
    };
    Html(render_page(&state.dashboard, session))
}

async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Json<UpdateResponse> {
    let outcome = {
        let mut handler = state.handler.lock().unwrap_or_else(|e| e.into_inner());
        handler.handle(&request)
    };
    Json(UpdateResponse::from(outcome))
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServeConfig, dashboard: Dashboard) -> Result<(), ServeError> {
    let addr = config.socket_addr()?;
    let state = AppState::new(dashboard, config.debug);
    let app = build_router(state, config.assets_dir.clone());

    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        assets = %config.assets_dir.display(),
        debug = config.debug,
        "dashboard listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
