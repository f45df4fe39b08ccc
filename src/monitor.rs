//! Logging loop over a running price feed.

use crate::feed::FeedSnapshot;
use crate::models::PriceUpdate;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Coarse health of the feed, as reported on each heartbeat.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedHealth {
    Waiting,
    Live(PriceUpdate),
    Down(String),
}

impl FeedHealth {
    pub fn of(snap: &FeedSnapshot) -> Self {
        match (&snap.error, snap.price) {
            (Some(err), _) => FeedHealth::Down(err.clone()),
            (None, Some(price)) if !snap.connecting => FeedHealth::Live(price),
            _ => FeedHealth::Waiting,
        }
    }
}

fn log_heartbeat(snap: &FeedSnapshot) {
    match FeedHealth::of(snap) {
        FeedHealth::Waiting => info!(state = %snap.state, "[HEARTBEAT] waiting for feed"),
        FeedHealth::Live(p) => info!(
            price = p.price,
            timestamp = p.timestamp,
            state = %snap.state,
            "[HEARTBEAT] feed live"
        ),
        FeedHealth::Down(err) => warn!(error = %err, "[HEARTBEAT] feed down"),
    }
}

/// Log every new price and a heartbeat every `every`. Ends when the feed is dropped.
pub fn spawn_price_monitor(
    mut rx: watch::Receiver<FeedSnapshot>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last: Option<PriceUpdate> = None;

        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        info!("[FEED] feed closed, monitor stopping");
                        break;
                    }
                    let price = rx.borrow_and_update().price;
                    if price != last {
                        if let Some(p) = price {
                            info!(price = p.price, timestamp = p.timestamp, "[FEED] price update");
                        }
                        last = price;
                    }
                }
                _ = ticker.tick() => log_heartbeat(&rx.borrow()),
            }
        }
    })
}
