//! Shared data structures used throughout the application.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Latest traded price for the tracked pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Quote currency units, always positive and finite.
    pub price: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl PriceUpdate {
    /// Returns `None` unless `price` is a positive finite number.
    pub fn new(price: f64, timestamp: i64) -> Option<Self> {
        (price.is_finite() && price > 0.0).then_some(Self { price, timestamp })
    }
}

/// Lifecycle of a price client connection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    /// Subscription handshake acknowledged.
    Open,
    /// Waiting `delay` before retry number `attempt` (1-based).
    Reconnecting { attempt: u32, delay: Duration },
    /// Retries exhausted; the client will not reconnect on its own.
    Failed { reason: String },
}

impl ConnectionState {
    pub fn is_connecting(&self) -> bool {
        matches!(
            self,
            ConnectionState::Connecting | ConnectionState::Reconnecting { .. }
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Reconnecting { attempt, delay } => {
                write!(f, "reconnecting (attempt {attempt}, in {delay:?})")
            }
            ConnectionState::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// One turn of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

/// Market figures handed to the analyst. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub volume: Option<f64>,
    pub market_cap: Option<f64>,
}
