//! Event channel for the calendar UI.
//!
//! Frames are JSON text: `{"event": "monthly-returns", "data": {...}}`.
//! A reply goes out on the same event. With a `requestId` in the request
//! data the reply is `{"requestId", "result"}` or `{"requestId", "error"}`;
//! without one the bare result is sent and errors are only logged.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use returns_calendar_core::errors::Result as CoreResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::health::now_rfc3339;
use super::returns::{change_query, refresh_flag};
use crate::main_lib::AppState;

pub const MONTHLY_RETURNS_EVENT: &str = "monthly-returns";
pub const DAILY_RETURNS_EVENT: &str = "daily-returns";
pub const DAILY_CHANGES_EVENT: &str = "daily-changes";
pub const TEST_EVENT: &str = "test";

#[derive(Debug, Deserialize)]
struct SocketFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocketParams {
    ticker: Option<String>,
    /// `true` or `"true"`
    #[serde(default)]
    refresh: Value,
    start: Option<String>,
    end: Option<String>,
    order: Option<String>,
    high: Option<f64>,
    low: Option<f64>,
}

impl SocketParams {
    fn refresh(&self) -> bool {
        match &self.refresh {
            Value::Bool(flag) => *flag,
            Value::String(s) => refresh_flag(Some(s)),
            _ => false,
        }
    }
}

pub async fn socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    tracing::debug!("Socket connected");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(txt) => {
                let Some(reply) = dispatch(&state, txt.as_str()).await else {
                    continue;
                };
                if let Err(e) = socket.send(Message::Text(reply.to_string().into())).await {
                    tracing::warn!("Socket send failed: {}", e);
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    tracing::debug!("Socket disconnected");
}

/// Handle one inbound frame and build the reply frame, if any.
pub async fn dispatch(state: &AppState, text: &str) -> Option<Value> {
    let frame: SocketFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Ignoring malformed socket frame: {}", e);
            return None;
        }
    };

    // Echoed back as received, string or number
    let request_id = frame
        .data
        .get("requestId")
        .filter(|id| !id.is_null())
        .cloned();

    let result = match serde_json::from_value::<Option<SocketParams>>(frame.data) {
        Ok(params) => handle_event(state, &frame.event, params.unwrap_or_default()).await?,
        Err(e) => Err(format!("Invalid request data: {}", e)),
    };

    let data = match (request_id, result) {
        (Some(request_id), Ok(result)) => json!({ "requestId": request_id, "result": result }),
        (Some(request_id), Err(error)) => json!({ "requestId": request_id, "error": error }),
        (None, Ok(result)) => result,
        (None, Err(error)) => {
            tracing::warn!("Socket event {} failed: {}", frame.event, error);
            return None;
        }
    };

    Some(json!({ "event": frame.event, "data": data }))
}

/// `None` for events this channel does not serve.
async fn handle_event(
    state: &AppState,
    event: &str,
    params: SocketParams,
) -> Option<Result<Value, String>> {
    let service = &state.returns_service;
    let ticker = params.ticker.as_deref();
    let refresh = params.refresh();

    let result = match event {
        MONTHLY_RETURNS_EVENT => to_reply(service.get_monthly_returns(ticker, refresh).await),
        DAILY_RETURNS_EVENT => to_reply(service.get_daily_returns(ticker, refresh).await),
        DAILY_CHANGES_EVENT => {
            let query = change_query(
                params.start.as_deref(),
                params.end.as_deref(),
                params.order.as_deref(),
                params.high,
                params.low,
            );
            match query {
                Ok(query) => to_reply(service.get_daily_changes(ticker, refresh, query).await),
                Err(e) => Err(e.to_string()),
            }
        }
        TEST_EVENT => Ok(Value::String(now_rfc3339())),
        other => {
            tracing::debug!("Ignoring unknown socket event {}", other);
            return None;
        }
    };
    Some(result)
}

fn to_reply<T: Serialize>(result: CoreResult<T>) -> Result<Value, String> {
    let value = result.map_err(|e| e.to_string())?;
    serde_json::to_value(value).map_err(|e| e.to_string())
}
