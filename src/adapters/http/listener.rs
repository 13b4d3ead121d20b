use std::{future::Future, sync::Arc};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use error_stack::ResultExt;
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    adapters::config::server_config::{AckMode, ServerConfig, SyncFailurePolicy},
    domain::sheets::sheet_row::SheetRow,
    ports::row_handler::{RowHandler, RowOutcome},
};

pub const HEALTH_PATH: &str = "/healthz/";
const HEALTH_SUBTREE: &str = "/healthz/*rest";
const HEALTH_BARE: &str = "/healthz";
const TEXT_UTF8: &str = "text/plain; charset=utf-8";

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Failed to bind listener")]
    BindFailed,
    #[error("Listener stopped unexpectedly")]
    ServeFailed,
}

#[derive(Deserialize, Debug)]
struct UpdateRequest {
    data: Vec<String>,
}

/// State that's passed to all handlers.
#[derive(Clone)]
pub struct ListenerState {
    handler: Arc<dyn RowHandler>,
    ack_mode: AckMode,
    on_sync_error: SyncFailurePolicy,
}

impl ListenerState {
    pub fn new(
        handler: Arc<dyn RowHandler>,
        ack_mode: AckMode,
        on_sync_error: SyncFailurePolicy,
    ) -> Self {
        ListenerState {
            handler,
            ack_mode,
            on_sync_error,
        }
    }
}

pub fn router(state: ListenerState) -> Router {
    Router::new()
        .route(HEALTH_PATH, any(handle_health))
        .route(HEALTH_SUBTREE, any(handle_health))
        .route(HEALTH_BARE, any(redirect_health))
        // Every other path and method is an update, like a catch-all "/" pattern.
        .fallback(handle_update)
        // Payloads are read whole, whatever their size.
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds to the configured address and serves until `shutdown` resolves.
pub async fn serve<F>(
    config: &ServerConfig,
    state: ListenerState,
    shutdown: F,
) -> error_stack::Result<(), ListenerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr();
    info!("Starting update listener service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .change_context(ListenerError::BindFailed)
        .attach_printable_lazy(|| format!("address {}", addr))?;
    info!("Update listener bound to {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .change_context(ListenerError::ServeFailed)
}

pub async fn handle_health() -> impl IntoResponse {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], ".")
}

pub async fn redirect_health() -> impl IntoResponse {
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, HEALTH_PATH)],
    )
}

#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn handle_update(State(state): State<ListenerState>, body: Bytes) -> Response {
    debug!("Received data: {}", String::from_utf8_lossy(&body));

    let request: UpdateRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            warn!("Failed to parse received data: {}", err);
            return text(
                StatusCode::BAD_REQUEST,
                format!("failed to parse received data: {}", err),
            );
        }
    };

    if request.data.is_empty() {
        warn!("Received data has no fields");
        return text(StatusCode::BAD_REQUEST, "data must contain at least one field");
    }

    let row = SheetRow::from(request.data);
    debug!(?row, "Parsed data");
    let ack = body.len().to_string();

    match state.ack_mode {
        AckMode::Immediate => {
            tokio::spawn(dispatch(state, row));
            text(StatusCode::OK, ack)
        }
        AckMode::AfterSync => match dispatch(state, row).await {
            Some(_) => text(StatusCode::OK, ack),
            None => text(StatusCode::INTERNAL_SERVER_ERROR, "failed to update sheet"),
        },
    }
}

async fn dispatch(state: ListenerState, row: SheetRow) -> Option<RowOutcome> {
    match state.handler.handle_row(row).await {
        Ok(outcome) => {
            info!(?outcome, "Row handled");
            Some(outcome)
        }
        Err(report) => {
            error!("Failed to handle row: {:?}", report);
            if state.on_sync_error == SyncFailurePolicy::Exit {
                error!("Terminating process after sync failure");
                std::process::exit(1);
            }
            None
        }
    }
}

fn text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_UTF8)], body.into()).into_response()
}
