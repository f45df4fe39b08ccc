//! `graphql-ws` frames exchanged with the Bitquery streaming endpoint, and
//! extraction of the latest trade from a Bitquery `EVM.DEXTrades` result.

use crate::errors::Result;
use crate::models::PriceUpdate;
use crate::utils::rfc3339_to_millis;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUBPROTOCOL: &str = "graphql-ws";
pub const SUBSCRIPTION_ID: &str = "1";

/// Pair priced by the trade queries below.
pub const TRACKED_PAIR: &str = "ETH/USD";

// Trades buying WETH (mainnet contract below) price the tracked pair.
pub const TRADE_SUBSCRIPTION: &str = r#"subscription {
  EVM(network: eth) {
    DEXTrades(
      where: {Trade: {Buy: {Currency: {SmartContract: {is: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"}}}}}
    ) {
      Block { Time }
      Trade { Buy { AmountInUSD } }
    }
  }
}"#;

pub const LATEST_TRADE_QUERY: &str = r#"{
  EVM(network: eth) {
    DEXTrades(
      limit: {count: 1}
      orderBy: {descending: Block_Time}
      where: {Trade: {Buy: {Currency: {SmartContract: {is: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"}}}}}
    ) {
      Block { Time }
      Trade { Buy { AmountInUSD } }
    }
  }
}"#;

#[derive(Debug, Serialize)]
pub struct InitPayload<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct StartPayload<'a> {
    pub query: &'a str,
}

/// Frames sent by the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame<'a> {
    ConnectionInit { payload: InitPayload<'a> },
    Start { id: &'a str, payload: StartPayload<'a> },
    Stop { id: &'a str },
    ConnectionTerminate,
}

impl ClientFrame<'_> {
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames sent by the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    ConnectionAck,
    Data {
        payload: Value,
    },
    Ka,
    Error {
        #[serde(default)]
        payload: Value,
    },
    ConnectionError {
        #[serde(default)]
        payload: Value,
    },
    Complete {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// What the client should do with one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAction {
    /// Handshake acknowledged; send the subscription.
    Subscribe,
    Price(PriceUpdate),
    /// Upstream reported an error; treat like an unexpected close.
    Fail(String),
    Ignore,
}

pub fn decode(text: &str) -> Result<ServerFrame> {
    Ok(serde_json::from_str(text)?)
}

/// Classify a frame. Never fails: undecodable frames become `Ignore`.
pub fn interpret(text: &str) -> FrameAction {
    let frame = match decode(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "[FEED] frame decode failed");
            return FrameAction::Ignore;
        }
    };

    match frame {
        ServerFrame::ConnectionAck => FrameAction::Subscribe,
        ServerFrame::Data { payload } => {
            match payload.get("data").and_then(extract_latest_trade) {
                Some(update) => FrameAction::Price(update),
                None => {
                    if let Some(errors) = payload.get("errors") {
                        tracing::warn!(%errors, "[FEED] data frame carried errors");
                    } else {
                        tracing::debug!("[FEED] data frame without a usable trade");
                    }
                    FrameAction::Ignore
                }
            }
        }
        ServerFrame::Ka => FrameAction::Ignore,
        ServerFrame::Error { payload } | ServerFrame::ConnectionError { payload } => {
            FrameAction::Fail(payload.to_string())
        }
        ServerFrame::Complete { id } => {
            tracing::debug!(?id, "[FEED] subscription completed by server");
            FrameAction::Ignore
        }
        ServerFrame::Unknown => FrameAction::Ignore,
    }
}

/// Pull `(AmountInUSD, Block.Time)` from the first trade of a GraphQL `data` object.
pub fn extract_latest_trade(data: &Value) -> Option<PriceUpdate> {
    let trade = data.get("EVM")?.get("DEXTrades")?.get(0)?;
    let price = as_number(trade.pointer("/Trade/Buy/AmountInUSD")?)?;
    let timestamp = rfc3339_to_millis(trade.pointer("/Block/Time")?.as_str()?)?;
    PriceUpdate::new(price, timestamp)
}

/// Bitquery returns numeric fields either as JSON numbers or as decimal strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
