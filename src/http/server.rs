//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount every route-table pattern on an Axum Router
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Merge the admin API when enabled
//! - Serve until shutdown, then drain; body reads still waiting on a client
//!   after the drain deadline are cancelled

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, MethodFilter, MethodRouter},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::codec::CodecRegistry;
use crate::config::GatewayConfig;
use crate::http::handler::grain_handler;
use crate::routing::{GrainRouter, RouteVerb};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: GrainRouter,
    pub codecs: Arc<CodecRegistry>,
    /// Parent of every request's token. Fired once the shutdown drain
    /// deadline passes; aborts body reads still waiting on the client.
    pub cancel: CancellationToken,
}

/// HTTP server for the grain gateway.
pub struct GatewayServer {
    router: Router,
    cancel: CancellationToken,
    drain: Duration,
}

impl GatewayServer {
    pub fn new(config: &GatewayConfig, router: GrainRouter, codecs: Arc<CodecRegistry>) -> Self {
        let cancel = CancellationToken::new();
        let state = AppState {
            router,
            codecs,
            cancel: cancel.clone(),
        };
        let router = Self::build_router(config, state);
        Self {
            router,
            cancel,
            drain: Duration::from_secs(config.timeouts.drain_secs),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut grain_routes = Router::new();
        for (pattern, verbs) in state.router.table().patterns() {
            grain_routes = grain_routes.route(pattern, method_router(pattern, &verbs));
        }

        let mut app = grain_routes.with_state(state.clone());
        if config.admin.enabled {
            app = app.merge(setup_admin_router(state, config.admin.api_key.clone()));
        }

        app.layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Token cancelled once the shutdown drain deadline passes.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let cancel = self.cancel.clone();
        let drain = self.drain;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!(
                    drain_secs = drain.as_secs(),
                    "Shutdown signal received, draining connections"
                );
                tokio::spawn(async move {
                    tokio::time::sleep(drain).await;
                    if !cancel.is_cancelled() {
                        tracing::warn!("Drain deadline passed, cancelling pending body reads");
                    }
                    cancel.cancel();
                });
            })
            .await?;

        self.cancel.cancel();

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// `*` takes every verb; otherwise each verb is mounted on its own so
/// axum answers 405 for the rest.
fn method_router(pattern: &str, verbs: &[RouteVerb]) -> MethodRouter<AppState> {
    if verbs.iter().any(RouteVerb::is_wildcard) {
        return any(grain_handler);
    }

    let mut router = MethodRouter::new();
    for verb in verbs {
        let RouteVerb::Method(method) = verb else {
            continue;
        };
        match MethodFilter::try_from(method.clone()) {
            Ok(filter) => router = router.on(filter, grain_handler),
            Err(_) => tracing::warn!(
                route = %pattern,
                verb = %method,
                "Verb cannot be served over HTTP routing, route skipped"
            ),
        }
    }
    router
}

