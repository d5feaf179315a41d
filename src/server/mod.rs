// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP transport.
//!
//! One route: `POST /` carries a JSON command, the response is the command
//! envelope. `OPTIONS` answers CORS preflight for browser-hosted agents.
//! Every response carries `Access-Control-Allow-Origin: *` and
//! `Connection: close`; clients are expected to reconnect per command.
//!
//! The stop command resolves its own response first and then signals
//! graceful shutdown, so the acknowledgement always reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::command::{process, Outcome, ResponseClass};
use crate::uithread::DocThread;

/// Commands stuck behind a wedged document mutation time out instead of
/// holding the socket forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

struct AppState {
    doc: DocThread,
    shutdown: watch::Sender<bool>,
}

/// Serve commands on the listener until the process is killed or a stop
/// command arrives.
pub async fn serve(listener: TcpListener, doc: DocThread) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    let (shutdown, mut stopped) = watch::channel(false);
    let state = Arc::new(AppState { doc, shutdown });

    let router = Router::new()
        .route("/", post(handle_command).options(handle_preflight))
        .with_state(state);

    info!(%addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = stopped.wait_for(|stop| *stop).await;
            info!("stop received, shutting down");
        })
        .await
}

async fn handle_command(State(state): State<Arc<AppState>>, body: String) -> Response {
    let executed = tokio::time::timeout(
        REQUEST_TIMEOUT,
        state.doc.run(move |doc| process(doc, &body)),
    )
    .await;
    let outcome = match executed {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(_)) => Outcome::error(
            ResponseClass::Internal,
            "Document thread is not available.",
        ),
        Err(_) => {
            warn!("command timed out after {REQUEST_TIMEOUT:?}");
            Outcome::error(ResponseClass::Timeout, "Command processing timed out.")
        }
    };
    if outcome.stop {
        let _ = state.shutdown.send(true);
    }
    respond(status_for(outcome.class), outcome)
}

async fn handle_preflight() -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS, GET"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("86400"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

fn status_for(class: ResponseClass) -> StatusCode {
    match class {
        ResponseClass::Success => StatusCode::OK,
        ResponseClass::BadRequest => StatusCode::BAD_REQUEST,
        ResponseClass::Timeout => StatusCode::REQUEST_TIMEOUT,
        ResponseClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(status: StatusCode, outcome: Outcome) -> Response {
    let mut response = (status, Json(outcome.envelope)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}
