use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::StatusCode,
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::notifier::Dispatcher;

/// HTTP endpoint the node's `-walletnotify` hook posts txids to
///
/// Every path and method is accepted. The reply is always `200 OK`, so the
/// sender cannot tell processed, duplicate and failed notifications apart.
pub struct Server {
    /// Address to bind the server to (e.g., "0.0.0.0:8330")
    address: String,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    pub fn new(address: String, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            address,
            dispatcher,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .fallback(notify)
            .layer(TraceLayer::new_for_http())
            .with_state(self.dispatcher.clone())
    }

    /// Binds the listener and serves until the process exits
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.address).await?;

        info!("Notification server started at {}", self.address);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn notify(
    State(dispatcher): State<Arc<Dispatcher>>,
    body: Result<Bytes, BytesRejection>,
) -> StatusCode {
    match body {
        Ok(body) => {
            // outcome is logged by the dispatcher; the sender only gets an ack
            let _ = dispatcher.handle(&body).await;
        }
        Err(e) => warn!("Failed to read notification body: {}", e),
    }
    StatusCode::OK
}
