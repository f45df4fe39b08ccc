//! Price feed: owns at most one [`PriceClient`] and republishes what it
//! reports as a `watch` snapshot for whatever renders it.

use crate::config::FeedConfig;
use crate::errors::Result;
use crate::feed::client::{PriceClient, PriceObserver};
use crate::feed::source::PriceSource;
use crate::models::{ConnectionState, PriceUpdate};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// What a consumer needs to render the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub price: Option<PriceUpdate>,
    /// Set when the client gave up (or refused to start).
    pub error: Option<String>,
    pub connecting: bool,
    pub state: ConnectionState,
}

struct SnapshotObserver {
    tx: Arc<watch::Sender<FeedSnapshot>>,
}

impl PriceObserver for SnapshotObserver {
    fn on_price(&self, update: PriceUpdate) {
        self.tx.send_modify(|snap| snap.price = Some(update));
    }

    fn on_state(&self, state: &ConnectionState) {
        self.tx.send_modify(|snap| {
            snap.connecting = state.is_connecting();
            match state {
                ConnectionState::Failed { reason } => snap.error = Some(reason.clone()),
                ConnectionState::Open => snap.error = None,
                _ => {}
            }
            snap.state = state.clone();
        });
    }
}

struct Active {
    token: String,
    client: PriceClient,
}

pub struct PriceFeed {
    config: FeedConfig,
    source: Arc<dyn PriceSource>,
    snapshot: Arc<watch::Sender<FeedSnapshot>>,
    active: Option<Active>,
}

impl PriceFeed {
    pub fn new(config: FeedConfig, source: Arc<dyn PriceSource>) -> Self {
        let (tx, _) = watch::channel(FeedSnapshot::default());
        Self {
            config,
            source,
            snapshot: Arc::new(tx),
            active: None,
        }
    }

    /// Follow the feed with `token`. The previous client, if any, is fully
    /// shut down before the next one connects. The same token is a no-op
    /// unless its client has failed, in which case it starts over.
    pub async fn subscribe(&mut self, token: &str) -> Result<()> {
        let running = |a: &Active| {
            a.token == token && !matches!(a.client.state(), ConnectionState::Failed { .. })
        };
        if self.active.as_ref().is_some_and(running) {
            return Ok(());
        }
        self.unsubscribe().await;

        self.snapshot.send_replace(FeedSnapshot::default());
        let observer = Arc::new(SnapshotObserver {
            tx: self.snapshot.clone(),
        });
        let client = PriceClient::new(
            self.config.with_token(token),
            self.source.clone(),
            observer,
        );
        if let Err(e) = client.connect() {
            self.snapshot.send_modify(|snap| snap.error = Some(e.to_string()));
            return Err(e);
        }
        info!("[FEED] subscribed");
        self.active = Some(Active {
            token: token.to_string(),
            client,
        });
        Ok(())
    }

    /// Disconnect the active client and wait for its connection to close.
    pub async fn unsubscribe(&mut self) {
        if let Some(active) = self.active.take() {
            active.client.disconnect();
            active.client.join().await;
            info!("[FEED] unsubscribed");
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.token.as_str())
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot.subscribe()
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.client.disconnect();
        }
    }
}
