// Dashboard HTTP server
//
// Routes: UI shell, JS bundle, component manifest and the client socket

use super::event_stream::EventBroadcaster;
use super::socket::socket_handler;
use super::static_assets::{bundle_response, index_page};
use super::{ensure_port_available, DashboardConfig};
use crate::dispatcher::Dispatcher;
use crate::scheduler::Scheduler;
use crate::Result;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Dashboard server state
#[derive(Clone)]
pub(super) struct DashboardState {
    pub(super) dispatcher: Dispatcher,
    pub(super) broadcaster: EventBroadcaster,
    static_dir: Arc<PathBuf>,
    title: Arc<str>,
}

/// Dashboard HTTP server
pub struct DashboardServer {
    config: DashboardConfig,
    dispatcher: Dispatcher,
    broadcaster: EventBroadcaster,
    schedules: Vec<Scheduler>,
}

impl DashboardServer {
    pub fn new(config: DashboardConfig, dispatcher: Dispatcher, broadcaster: EventBroadcaster) -> Self {
        Self {
            config,
            dispatcher,
            broadcaster,
            schedules: Vec::new(),
        }
    }

    pub fn with_schedules(mut self, schedules: Vec<Scheduler>) -> Self {
        self.schedules = schedules;
        self
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.broadcaster
    }

    pub fn router(&self) -> Router {
        let state = DashboardState {
            dispatcher: self.dispatcher.clone(),
            broadcaster: self.broadcaster.clone(),
            static_dir: Arc::new(self.config.static_dir.clone()),
            title: Arc::from(self.config.title.as_str()),
        };

        Router::new()
            .route("/", get(index_handler))
            .route("/static/bundle.js", get(bundle_handler))
            .route("/api/components", get(components_handler))
            .route("/socket", get(socket_handler))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Check the port, then serve until Ctrl-C
    pub async fn serve(mut self) -> Result<()> {
        ensure_port_available(&self.config.host, self.config.port).await?;

        let addr = self.config.addr();
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!(
            target: "dashboard",
            url = %format!("http://{}", addr),
            components = self.dispatcher.registry().len(),
            "Dashboard server ready"
        );

        for schedule in &mut self.schedules {
            schedule.start();
        }

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        for schedule in &mut self.schedules {
            schedule.stop();
        }
        info!(target: "dashboard", "Dashboard server stopped");

        result.map_err(Into::into)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(target: "dashboard", error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

async fn index_handler(State(state): State<DashboardState>) -> Html<String> {
    index_page(&state.title)
}

async fn bundle_handler(State(state): State<DashboardState>) -> Response {
    bundle_response(&state.static_dir).await
}

/// Component manifest used by the UI shell to build its widgets
async fn components_handler(State(state): State<DashboardState>) -> impl IntoResponse {
    let registry = state.dispatcher.registry();
    let components: Vec<Value> = registry
        .ids()
        .into_iter()
        .filter_map(|id| registry.get(id))
        .map(|c| json!({ "id": c.id(), "kind": c.kind(), "props": c.props() }))
        .collect();
    Json(json!({ "components": components }))
}
