//! Gateway Server - Axum HTTP server

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, Query, State},
    handler::HandlerWithoutStateExt,
    response::IntoResponse,
    routing::{get, MethodRouter},
    Router,
};
use bytes::Bytes;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{BackendMode, Config};
use crate::error::GatewayError;
use crate::fixtures::{DataProvider, StaticFixtures};
use crate::proxy::backend::{Backend, FixtureBackend};
use crate::proxy::config::ProxySettings;
use crate::proxy::handlers::{console, health};
use crate::proxy::routes::ROUTES;
use crate::proxy::upstream::UpstreamClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ProxySettings>,
    pub backend: Arc<Backend>,
}

impl AppState {
    /// State for the backend selected in `settings`
    pub fn new(settings: ProxySettings) -> Result<Self, GatewayError> {
        let settings = Arc::new(settings);
        let backend = match settings.mode() {
            BackendMode::Proxy => Backend::Proxy(UpstreamClient::new(settings.clone())?),
            BackendMode::Fixture => {
                Backend::Fixture(FixtureBackend::new(Arc::new(StaticFixtures::new())))
            }
        };
        Ok(Self {
            settings,
            backend: Arc::new(backend),
        })
    }

    /// Fixture-mode state backed by a custom provider
    pub fn with_provider(settings: ProxySettings, provider: Arc<dyn DataProvider>) -> Self {
        Self {
            settings: Arc::new(settings),
            backend: Arc::new(Backend::Fixture(FixtureBackend::new(provider))),
        }
    }
}

/// Gateway server instance
pub struct ProxyServer {
    host: String,
    port: u16,
    static_dir: Option<PathBuf>,
    state: AppState,
}

impl ProxyServer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let settings = ProxySettings::from_config(config)?;
        let state = AppState::new(settings)?;
        Ok(Self {
            host: config.server.bind_host().to_string(),
            port: config.server.port,
            static_dir: config.ui.static_dir.clone(),
            state,
        })
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), self.static_dir.clone())
    }

    /// Run the gateway (blocking)
    pub async fn run(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!(
            "Gateway listening on {} ({} mode, upstream {})",
            addr,
            self.state.backend.mode().as_str(),
            self.state.settings.base_url()
        );

        // Handle graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

type PathParams = Option<Path<HashMap<String, String>>>;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the full router: route table, health, fallback and layers.
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    // Several table entries can share a path (GET and POST /api/commands)
    let mut by_path: BTreeMap<&'static str, MethodRouter<AppState>> = BTreeMap::new();
    for spec in ROUTES {
        let handler = move |State(state): State<AppState>,
                            params: PathParams,
                            Query(query): Query<Vec<(String, String)>>,
                            body: Result<Bytes, BytesRejection>| async move {
            let body = match body {
                Ok(body) => body,
                Err(rejection) => return GatewayError::from(rejection).into_response(),
            };
            let params = params.map(|Path(p)| p).unwrap_or_default();
            console::dispatch(spec, state, params, query, body).await
        };
        let method_router = by_path.remove(spec.path).unwrap_or_else(MethodRouter::new);
        by_path.insert(spec.path, method_router.on(spec.method.filter(), handler));
    }

    let mut router = Router::new()
        .route("/health", get(health::health_check_handler))
        .route("/healthz", get(health::health_check_handler));
    for (path, method_router) in by_path {
        router = router.route(path, method_router);
    }

    let router = match static_dir {
        Some(dir) => {
            tracing::info!("Serving UI from {:?}", dir);
            router.fallback_service(
                ServeDir::new(dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(health::not_found_handler.into_service()),
            )
        }
        None => router.fallback(health::not_found_handler),
    };

    with_layers(router).with_state(state)
}

/// Panic catcher, body limit, CORS and request tracing
fn with_layers(router: Router<AppState>) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(CatchPanicLayer::custom(health::panic_response))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
