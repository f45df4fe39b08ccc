//! Local stand-ins for upstream services, used by tests across the crate.

use crate::feed::protocol::SUBPROTOCOL;
use axum::Router;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async, tungstenite::Message};

pub type ServerWs = WebSocketStream<TcpStream>;

/// Serve `app` on an ephemeral localhost port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A `ws://` URL on which nothing listens.
pub async fn refused_ws_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}/graphql")
}

/// Accept `graphql-ws` connections and hand each one to `handler`.
pub async fn ws_server<F, Fut>(handler: F) -> String
where
    F: Fn(ServerWs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = handler.clone();
            tokio::spawn(async move {
                let callback = |_req: &Request, mut resp: Response| {
                    resp.headers_mut().insert(
                        "Sec-WebSocket-Protocol",
                        HeaderValue::from_static(SUBPROTOCOL),
                    );
                    Ok::<_, ErrorResponse>(resp)
                };
                if let Ok(ws) = accept_hdr_async(stream, callback).await {
                    handler(ws).await;
                }
            });
        }
    });
    format!("ws://{addr}/graphql")
}

/// Next text frame as JSON, or `None` once the client goes away.
pub async fn next_json(ws: &mut ServerWs) -> Option<Value> {
    while let Some(Ok(msg)) = ws.next().await {
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).ok();
        }
    }
    None
}

/// Venue side of the handshake: expect `connection_init`, ack it, expect `start`.
pub async fn accept_subscription(ws: &mut ServerWs) -> bool {
    let Some(init) = next_json(ws).await else {
        return false;
    };
    if init["type"] != "connection_init" {
        return false;
    }
    if ws
        .send(Message::Text(r#"{"type":"connection_ack"}"#.into()))
        .await
        .is_err()
    {
        return false;
    }
    matches!(next_json(ws).await, Some(start) if start["type"] == "start")
}

pub fn data_frame(price: &str, time: &str) -> String {
    serde_json::json!({
        "type": "data",
        "id": "1",
        "payload": {"data": {"EVM": {"DEXTrades": [
            {"Block": {"Time": time}, "Trade": {"Buy": {"AmountInUSD": price}}}
        ]}}}
    })
    .to_string()
}
