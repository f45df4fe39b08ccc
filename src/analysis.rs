//! Market commentary from the chat upstream, cached for a short while and
//! scored into a coarse trading signal.

use crate::chat::ChatCompletions;
use crate::feed::protocol::TRACKED_PAIR;
use crate::models::{ChatMessage, MarketSnapshot};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const FALLBACK_ANALYSIS: &str = "Unable to generate market analysis at this time.";

const CERTAINTY_WORDS: [&str; 5] = ["definitely", "certainly", "clearly", "strong", "confident"];
const UNCERTAINTY_WORDS: [&str; 5] = ["perhaps", "maybe", "might", "could", "uncertain"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAnalysis {
    pub analysis: String,
    pub signal: Signal,
    /// 0..=100
    pub confidence: u8,
}

impl MarketAnalysis {
    pub fn from_text(analysis: String) -> Self {
        Self {
            signal: extract_signal(&analysis),
            confidence: confidence(&analysis),
            analysis,
        }
    }
}

/// Keyword read of the commentary. Buy-side words win over sell-side ones.
pub fn extract_signal(text: &str) -> Signal {
    let lower = text.to_lowercase();
    if lower.contains("bullish") || lower.contains("buy") {
        Signal::Bullish
    } else if lower.contains("bearish") || lower.contains("sell") {
        Signal::Bearish
    } else {
        Signal::Neutral
    }
}

/// 50 plus ten per certainty word present, minus ten per hedge, in 0..=100.
/// Each word counts once however often it appears.
pub fn confidence(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let hits = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count() as i32;
    let score = 50 + 10 * hits(&CERTAINTY_WORDS) - 10 * hits(&UNCERTAINTY_WORDS);
    score.clamp(0, 100) as u8
}

fn prompt(snapshot: &MarketSnapshot) -> String {
    let show = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| v.to_string());
    let mut out = format!("Analyze the following market data for {TRACKED_PAIR}:\n");
    let _ = writeln!(out, "Price: {}", show(snapshot.price));
    let _ = writeln!(out, "24h Change: {}%", show(snapshot.change));
    let _ = writeln!(out, "Volume: {}", show(snapshot.volume));
    let _ = writeln!(out, "Market Cap: {}", show(snapshot.market_cap));
    out.push_str(
        "\nProvide a brief market analysis focusing on:\n\
         1. Current market sentiment\n\
         2. Key price levels\n\
         3. Trading recommendation\n\n\
         Format the response in a clear, concise way.",
    );
    out
}

/// Single-entry cache in front of the chat upstream. The entry is shared by
/// every snapshot until it expires.
pub struct MarketAnalyst {
    chat: ChatCompletions,
    ttl: Duration,
    cache: Mutex<Option<(Instant, String)>>,
}

impl MarketAnalyst {
    pub fn new(chat: ChatCompletions, ttl: Duration) -> Self {
        Self {
            chat,
            ttl,
            cache: Mutex::new(None),
        }
    }

    fn cached(&self) -> Option<String> {
        self.cache
            .lock()
            .as_ref()
            .filter(|(at, _)| at.elapsed() < self.ttl)
            .map(|(_, text)| text.clone())
    }

    /// Commentary for `snapshot`. Never fails: upstream errors yield
    /// [`FALLBACK_ANALYSIS`], which is not cached.
    pub async fn analyze(&self, snapshot: &MarketSnapshot) -> MarketAnalysis {
        if let Some(text) = self.cached() {
            debug!("[CHAT] analysis served from cache");
            return MarketAnalysis::from_text(text);
        }

        let messages = [ChatMessage {
            role: "user".into(),
            content: prompt(snapshot),
        }];
        match self.chat.complete(&messages).await {
            Ok(text) => {
                *self.cache.lock() = Some((Instant::now(), text.clone()));
                MarketAnalysis::from_text(text)
            }
            Err(e) => {
                warn!("[CHAT] market analysis failed: {e}");
                MarketAnalysis::from_text(FALLBACK_ANALYSIS.to_string())
            }
        }
    }
}
