//! WebSocket Handler
//!
//! 连接建立后先推送当前书库文档，之后每次变更推送一次

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::infrastructure::http::state::AppState;

/// 书库订阅 WebSocket
pub async fn library_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_library_socket(socket, state))
}

async fn handle_library_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut subscription = match state.store.subscribe().await {
        Ok(sub) => sub,
        Err(e) => {
            tracing::error!(error = %e, "Failed to subscribe to library");
            let _ = sender.close().await;
            return;
        }
    };

    tracing::info!("Library WebSocket connected");

    // 文档转发任务
    let mut forward_task = tokio::spawn(async move {
        while let Some(library) = subscription.next().await {
            let msg = match serde_json::to_string(&*library) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize library");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Library WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Library WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 任一方结束即停止另一方
    tokio::select! {
        _ = &mut forward_task => receive_task.abort(),
        _ = &mut receive_task => forward_task.abort(),
    }

    tracing::info!("Library WebSocket disconnected");
}
