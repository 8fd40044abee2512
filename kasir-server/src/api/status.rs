//! Payment status reads: polling and the WebSocket stream.

use axum::{
    Json,
    extract::{
        Path, State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use kanau::processor::Processor;
use kasir_core::entities::invoice_status::GetInvoiceStatus;
use kasir_sdk::invoice::InvoiceId;
use kasir_sdk::objects::StatusResponse;
use kasir_sdk::objects::ws::{WsCloseCode, WsServerMessage};
use tokio_stream::StreamExt;

use super::{ApiError, resolve_invoice_id};
use crate::state::AppState;

/// `GET /api/payment/{invoice_id}/status`: latest status record.
pub(super) async fn get_payment_status(
    state: State<AppState>,
    Path(invoice_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice_id = resolve_invoice_id(&invoice_id)?;
    let record = state
        .store()
        .process(GetInvoiceStatus { invoice_id })
        .await?
        .ok_or(ApiError::NotFound("no payment status yet"))?;
    Ok(Json(StatusResponse::from(&record)))
}

/// `GET /api/payment/{invoice_id}/ws`: WebSocket status stream.
///
/// Upgrades the HTTP connection to a WebSocket and pushes
/// [`WsServerMessage`] JSON frames. See [`kasir_sdk::objects::ws`] for the
/// protocol.
pub(super) async fn payment_status_ws(
    state: State<AppState>,
    Path(invoice_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let app_state = state.0.clone();
    let invoice_id = InvoiceId::from_decorated(&invoice_id).ok();
    ws.on_upgrade(move |socket| async move {
        match invoice_id {
            Some(invoice_id) => handle_status_ws(socket, app_state, invoice_id).await,
            None => {
                close_with_error(socket, WsCloseCode::INVALID_INVOICE, "invalid invoice id").await
            }
        }
    })
}

/// Background task that drives a single WebSocket connection.
///
/// 1. Subscribes to the status hub.
/// 2. Sends the stored status, if any.
/// 3. Forwards every later record for `invoice_id` until the client
///    disconnects or the server shuts down.
async fn handle_status_ws(mut socket: WebSocket, state: AppState, invoice_id: InvoiceId) {
    // Subscribe *before* reading the store so a write that races with the
    // read is still delivered.
    let mut updates = state.status_hub.subscribe(invoice_id.clone());

    match state
        .store()
        .process(GetInvoiceStatus {
            invoice_id: invoice_id.clone(),
        })
        .await
    {
        Ok(Some(record)) => {
            let msg = WsServerMessage::StatusUpdate {
                status: StatusResponse::from(&record),
            };
            if send_json(&mut socket, &msg).await.is_err() {
                return;
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(error = %e, %invoice_id, "WS: failed to query status");
            close_with_error(socket, WsCloseCode::INTERNAL_ERROR, "internal error").await;
            return;
        }
    }

    let shutdown = state.shutdown.clone();
    loop {
        tokio::select! {
            _ = shutdown.triggered() => break,

            update = updates.next() => {
                let Some(record) = update else { break };
                let msg = WsServerMessage::StatusUpdate {
                    status: StatusResponse::from(&record),
                };
                if send_json(&mut socket, &msg).await.is_err() {
                    return;
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: WsCloseCode::GOING_AWAY,
            reason: "server shutting down".into(),
        })))
        .await;
}

async fn close_with_error(mut socket: WebSocket, code: u16, reason: &'static str) {
    let _ = send_json(
        &mut socket,
        &WsServerMessage::Error {
            code,
            reason: reason.into(),
        },
    )
    .await;
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await;
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
