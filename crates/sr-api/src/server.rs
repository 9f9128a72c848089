//! Router assembly and listener lifecycle.

use crate::error::ApiResult;
use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use sr_core::Discovery;
use sr_subscribe::{RoutingOptions, SubscriptionMetadata};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// How many ranked servers each response carries.
pub const RESULT_LIMIT: usize = 3;

/// Server state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub discovery: Arc<Discovery>,
    /// Header values for `/api/hiddify`
    pub metadata: Arc<SubscriptionMetadata>,
    /// Inbound and urltest settings for `/api/sing-box`
    pub routing: Arc<RoutingOptions>,
}

impl ApiState {
    pub fn new(discovery: Arc<Discovery>) -> Self {
        Self {
            discovery,
            metadata: Arc::new(SubscriptionMetadata::default()),
            routing: Arc::new(RoutingOptions::default()),
        }
    }

    pub fn with_metadata(mut self, metadata: SubscriptionMetadata) -> Self {
        self.metadata = Arc::new(metadata);
        self
    }

    pub fn with_routing(mut self, routing: RoutingOptions) -> Self {
        self.routing = Arc::new(routing);
        self
    }
}

/// Build the application router
pub fn create_app(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/countries", get(handlers::countries))
        .route("/api/find-vpn", post(handlers::find_vpn))
        .route("/api/subscription", get(handlers::subscription))
        .route("/api/sing-box", get(handlers::sing_box))
        .route("/api/hiddify", get(handlers::hiddify))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> ApiResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "ssrank api listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("ssrank api stopped");
    Ok(())
}

/// Bind `addr` and [`serve`].
pub async fn bind_and_serve<F>(addr: SocketAddr, state: ApiState, shutdown: F) -> ApiResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown).await
}
