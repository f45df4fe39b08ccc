//! Price client: initial REST price, then a `graphql-ws` subscription with
//! bounded exponential-backoff reconnection.

use crate::config::FeedConfig;
use crate::errors::{AppError, Result};
use crate::feed::policy::ReconnectPolicy;
use crate::feed::protocol::{
    ClientFrame, FrameAction, InitPayload, SUBPROTOCOL, SUBSCRIPTION_ID, StartPayload,
    TRADE_SUBSCRIPTION, interpret,
};
use crate::feed::source::PriceSource;
use crate::models::{ConnectionState, PriceUpdate};
use futures::{SinkExt, Stream, StreamExt};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};
use url::Url;

/// Receives every accepted price and every connection state change.
///
/// Callbacks run on the client task while the client's observer lock is held,
/// so they must not call back into [`PriceClient::disconnect`].
pub trait PriceObserver: Send + Sync + 'static {
    fn on_price(&self, update: PriceUpdate);

    fn on_state(&self, _state: &ConnectionState) {}
}

impl<F> PriceObserver for F
where
    F: Fn(PriceUpdate) + Send + Sync + 'static,
{
    fn on_price(&self, update: PriceUpdate) {
        self(update)
    }
}

struct GateInner {
    alive: bool,
    state: ConnectionState,
}

/// Serialises observer calls against `disconnect`; nothing is delivered once closed.
struct Gate {
    observer: Arc<dyn PriceObserver>,
    inner: Mutex<GateInner>,
}

impl Gate {
    fn new(observer: Arc<dyn PriceObserver>) -> Self {
        Self {
            observer,
            inner: Mutex::new(GateInner {
                alive: true,
                state: ConnectionState::Disconnected,
            }),
        }
    }

    fn price(&self, update: PriceUpdate) {
        let inner = self.inner.lock();
        if inner.alive {
            self.observer.on_price(update);
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let mut inner = self.inner.lock();
        if !inner.alive || inner.state == state {
            return;
        }
        inner.state = state;
        self.observer.on_state(&inner.state);
    }

    fn state(&self) -> ConnectionState {
        self.inner.lock().state.clone()
    }

    fn is_alive(&self) -> bool {
        self.inner.lock().alive
    }

    fn close(&self) {
        let mut inner = self.inner.lock();
        if !inner.alive {
            return;
        }
        if inner.state != ConnectionState::Disconnected {
            inner.state = ConnectionState::Disconnected;
            self.observer.on_state(&inner.state);
        }
        inner.alive = false;
    }
}

/// Best-effort live price for one trading pair.
///
/// One client serves one `connect()`; after `disconnect()` it is dead and a
/// new client must be built.
pub struct PriceClient {
    config: FeedConfig,
    source: Arc<dyn PriceSource>,
    gate: Arc<Gate>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PriceClient {
    pub fn new(
        config: FeedConfig,
        source: Arc<dyn PriceSource>,
        observer: Arc<dyn PriceObserver>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            source,
            gate: Arc::new(Gate::new(observer)),
            shutdown,
            task: Mutex::new(None),
        }
    }

    /// Start the client task.
    ///
    /// Only configuration problems are returned; fetch and transport failures
    /// go through the reconnect procedure and surface as [`ConnectionState`].
    pub fn connect(&self) -> Result<()> {
        if self.config.token.trim().is_empty() {
            return Err(AppError::Config("streaming token is empty".into()));
        }
        let url = Url::parse(&self.config.ws_url)?;

        if !self.gate.is_alive() {
            warn!("[FEED] connect() on a disconnected client ignored");
            return Ok(());
        }
        let mut task = self.task.lock();
        if task.is_some() {
            debug!("[FEED] connect() while already running ignored");
            return Ok(());
        }

        let session = Session {
            config: self.config.clone(),
            url,
            source: self.source.clone(),
            gate: self.gate.clone(),
        };
        let shutdown = self.shutdown.subscribe();
        *task = Some(tokio::spawn(session.run(shutdown)));
        Ok(())
    }

    /// Stop retrying, close the stream and silence the observer. Idempotent.
    pub fn disconnect(&self) {
        self.gate.close();
        self.shutdown.send_replace(true);
    }

    pub fn state(&self) -> ConnectionState {
        self.gate.state()
    }

    /// Wait for the client task to wind down after `disconnect()` or terminal failure.
    pub async fn join(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for PriceClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

struct Session {
    config: FeedConfig,
    url: Url,
    source: Arc<dyn PriceSource>,
    gate: Arc<Gate>,
}

/// Run `fut` unless shutdown is requested first.
async fn or_shutdown<F: Future>(shutdown: &mut watch::Receiver<bool>, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = async { let _ = shutdown.wait_for(|stop| *stop).await; } => None,
        out = fut => Some(out),
    }
}

impl Session {
    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut policy = ReconnectPolicy::new(self.config.max_attempts, self.config.base_delay);

        loop {
            self.gate.set_state(ConnectionState::Connecting);

            let err = match self.attempt(&mut shutdown, &mut policy).await {
                Ok(()) => break,
                Err(e) => e,
            };

            if err.is_fatal() {
                error!(error = %err, "[FEED] fatal error, not retrying");
                self.gate.set_state(ConnectionState::Failed {
                    reason: err.to_string(),
                });
                break;
            }

            match policy.next_retry() {
                Some((attempt, delay)) => {
                    warn!(
                        error = %err,
                        attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "[FEED] connection failed, reconnecting"
                    );
                    self.gate
                        .set_state(ConnectionState::Reconnecting { attempt, delay });
                    if or_shutdown(&mut shutdown, tokio::time::sleep(delay))
                        .await
                        .is_none()
                    {
                        break;
                    }
                }
                None => {
                    error!(
                        error = %err,
                        max_attempts = policy.max_attempts(),
                        "[FEED] reconnect attempts exhausted"
                    );
                    self.gate.set_state(ConnectionState::Failed {
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }
        debug!("[FEED] client task finished");
    }

    /// One full lifecycle. `Ok(())` means shutdown was requested; every
    /// other exit is an error for the reconnect procedure.
    async fn attempt(
        &self,
        shutdown: &mut watch::Receiver<bool>,
        policy: &mut ReconnectPolicy,
    ) -> Result<()> {
        let Some(initial) = or_shutdown(shutdown, self.source.latest()).await else {
            return Ok(());
        };
        let initial = initial?;
        debug!(price = initial.price, timestamp = initial.timestamp, "[FEED] initial price");
        self.gate.price(initial);

        let mut request = self.url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", HeaderValue::from_static(SUBPROTOCOL));

        let open_timeout = self.config.open_timeout;
        let Some(opened) =
            or_shutdown(shutdown, tokio::time::timeout(open_timeout, connect_async(request))).await
        else {
            return Ok(());
        };
        let (ws, _resp) = opened.map_err(|_| {
            AppError::Timeout(format!("connection not open after {open_timeout:?}"))
        })??;
        info!(url = %self.url, "[FEED] websocket connected");

        let (mut write, mut read) = ws.split();
        let init = ClientFrame::ConnectionInit {
            payload: InitPayload {
                token: &self.config.token,
            },
        };
        write.send(Message::Text(init.to_text()?)).await?;

        loop {
            let next = or_shutdown(shutdown, next_frame(&mut read, self.config.idle_timeout)).await;
            let frame = match next {
                None => {
                    let goodbye = [
                        ClientFrame::Stop {
                            id: SUBSCRIPTION_ID,
                        },
                        ClientFrame::ConnectionTerminate,
                    ];
                    for frame in &goodbye {
                        if let Ok(text) = frame.to_text() {
                            let _ = write.send(Message::Text(text)).await;
                        }
                    }
                    let _ = write.close().await;
                    info!("[FEED] websocket closed on request");
                    return Ok(());
                }
                Some(frame) => frame?,
            };

            match frame {
                Message::Text(text) => match interpret(&text) {
                    FrameAction::Subscribe => {
                        let start = ClientFrame::Start {
                            id: SUBSCRIPTION_ID,
                            payload: StartPayload {
                                query: TRADE_SUBSCRIPTION,
                            },
                        };
                        write.send(Message::Text(start.to_text()?)).await?;
                        policy.reset();
                        self.gate.set_state(ConnectionState::Open);
                        info!("[FEED] subscription started");
                    }
                    FrameAction::Price(update) => self.gate.price(update),
                    FrameAction::Fail(reason) => {
                        return Err(AppError::Protocol(format!("upstream error frame: {reason}")));
                    }
                    FrameAction::Ignore => {}
                },
                Message::Close(close) => {
                    return Err(AppError::Protocol(format!(
                        "server closed connection: {close:?}"
                    )));
                }
                _ => {}
            }
        }
    }
}

/// Next frame, failing on stream end, transport error or idle timeout.
async fn next_frame<S>(read: &mut S, idle: Option<Duration>) -> Result<Message>
where
    S: Stream<Item = std::result::Result<Message, tungstenite::Error>> + Unpin,
{
    let next = match idle {
        Some(idle) => tokio::time::timeout(idle, read.next())
            .await
            .map_err(|_| AppError::Timeout(format!("no frame received for {idle:?}")))?,
        None => read.next().await,
    };
    match next {
        Some(msg) => Ok(msg?),
        None => Err(AppError::Protocol("stream ended".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::source::PriceEndpoint;
    use crate::testing::{
        accept_subscription, data_frame, next_json, refused_ws_url, serve, ws_server,
    };
    use axum::{Json, Router, routing::get};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Price(PriceUpdate),
        State(ConnectionState),
    }

    struct Recorder(mpsc::UnboundedSender<Event>);

    impl PriceObserver for Recorder {
        fn on_price(&self, update: PriceUpdate) {
            let _ = self.0.send(Event::Price(update));
        }

        fn on_state(&self, state: &ConnectionState) {
            let _ = self.0.send(Event::State(state.clone()));
        }
    }

    /// Replays scripted results, then repeats the last one.
    struct Scripted {
        script: Mutex<VecDeque<Result<PriceUpdate>>>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(script: Vec<Result<PriceUpdate>>) -> Arc<Self> {
            Self::delayed(script, Duration::ZERO)
        }

        fn delayed(script: Vec<Result<PriceUpdate>>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    fn failure() -> Result<PriceUpdate> {
        Err(AppError::Upstream {
            status: 500,
            message: "Failed to fetch price data".into(),
        })
    }

    fn price(price: f64, timestamp: i64) -> Result<PriceUpdate> {
        Ok(PriceUpdate::new(price, timestamp).unwrap())
    }

    #[async_trait]
    impl PriceSource for Scripted {
        async fn latest(&self) -> Result<PriceUpdate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut script = self.script.lock();
            if script.len() > 1 {
                if let Some(step) = script.pop_front() {
                    return step;
                }
            }
            script.front().map(replay).unwrap_or_else(failure)
        }
    }

    /// Rebuild a scripted step so the last one can repeat.
    fn replay(step: &Result<PriceUpdate>) -> Result<PriceUpdate> {
        match step {
            Ok(update) => Ok(*update),
            Err(AppError::MalformedPayload(m)) => Err(AppError::MalformedPayload(m.clone())),
            Err(AppError::Upstream { status, message }) => Err(AppError::Upstream {
                status: *status,
                message: message.clone(),
            }),
            Err(other) => Err(AppError::Protocol(other.to_string())),
        }
    }

    fn config(ws_url: String, base_ms: u64) -> FeedConfig {
        FeedConfig {
            ws_url,
            token: "t1".into(),
            max_attempts: 3,
            base_delay: Duration::from_millis(base_ms),
            open_timeout: Duration::from_secs(10),
            idle_timeout: None,
        }
    }

    fn client(
        config: FeedConfig,
        source: Arc<dyn PriceSource>,
    ) -> (PriceClient, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PriceClient::new(config, source, Arc::new(Recorder(tx))), rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("observer alive")
    }

    async fn drain_until_terminal(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            let ev = next_event(rx).await;
            let done = matches!(ev, Event::State(ConnectionState::Failed { .. }));
            events.push(ev);
            if done {
                return events;
            }
        }
    }

    fn reconnect_delays(events: &[Event]) -> Vec<(u32, Duration)> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::State(ConnectionState::Reconnecting { attempt, delay }) => {
                    Some((*attempt, *delay))
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn end_to_end_rest_then_stream() {
        let ws_url = ws_server(|mut ws| async move {
            if !accept_subscription(&mut ws).await {
                return;
            }
            let _ = ws
                .send(Message::Text(data_frame("101.2", "2023-11-14T22:13:25Z")))
                .await;
            // Hold the connection open until the client leaves.
            while ws.next().await.is_some() {}
        })
        .await;

        let source = Scripted::new(vec![price(100.5, 1_700_000_000_000)]);
        let (client, mut rx) = client(config(ws_url, 10), source);
        client.connect().unwrap();

        let mut prices = Vec::new();
        let mut saw_open_before_stream_price = false;
        while prices.len() < 2 {
            match next_event(&mut rx).await {
                Event::Price(p) => prices.push((p.price, p.timestamp)),
                Event::State(ConnectionState::Open) => {
                    saw_open_before_stream_price = prices.len() == 1;
                }
                Event::State(_) => {}
            }
        }
        assert_eq!(
            prices,
            vec![(100.5, 1_700_000_000_000), (101.2, 1_700_000_005_000)]
        );
        assert!(saw_open_before_stream_price);
        assert_eq!(client.state(), ConnectionState::Open);

        client.disconnect();
        client.join().await;
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn initial_price_is_emitted_before_stream_upgrade() {
        let source = Scripted::new(vec![price(100.5, 1_700_000_000_000)]);
        let (client, mut rx) = client(config(refused_ws_url().await, 5), source);
        client.connect().unwrap();

        assert_eq!(next_event(&mut rx).await, Event::State(ConnectionState::Connecting));
        assert_eq!(
            next_event(&mut rx).await,
            Event::Price(PriceUpdate::new(100.5, 1_700_000_000_000).unwrap())
        );
        // The refused upgrade is what triggers the first retry.
        assert!(matches!(
            next_event(&mut rx).await,
            Event::State(ConnectionState::Reconnecting { attempt: 1, .. })
        ));
        client.disconnect();
    }

    #[tokio::test]
    async fn malformed_rest_payload_reconnects_without_emitting() {
        let source = Scripted::new(vec![Err(AppError::MalformedPayload(
            "missing timestamp".into(),
        ))]);
        let (client, mut rx) = client(config(refused_ws_url().await, 5), source.clone());
        client.connect().unwrap();

        let events = drain_until_terminal(&mut rx).await;
        assert!(!events.iter().any(|e| matches!(e, Event::Price(_))));
        assert_eq!(reconnect_delays(&events).len(), 3);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        match client.state() {
            ConnectionState::Failed { reason } => assert!(reason.contains("missing timestamp")),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn endpoint_without_timestamp_never_reaches_observer() {
        let app = Router::new().route(
            "/api/price",
            get(|| async { Json(serde_json::json!({"price": 100.5})) }),
        );
        let addr = serve(app).await;
        let source = Arc::new(PriceEndpoint::new(&format!("http://{addr}/api/price")).unwrap());
        let mut cfg = config(refused_ws_url().await, 5);
        cfg.max_attempts = 2;
        let (client, mut rx) = client(cfg, source);
        client.connect().unwrap();

        let events = drain_until_terminal(&mut rx).await;
        assert!(!events.iter().any(|e| matches!(e, Event::Price(_))));
        assert_eq!(reconnect_delays(&events).len(), 2);
        match events.last() {
            Some(Event::State(ConnectionState::Failed { reason })) => {
                assert!(reason.contains("missing timestamp"), "reason: {reason}")
            }
            other => panic!("unexpected terminal event {other:?}"),
        }
    }

    #[tokio::test]
    async fn disconnect_sends_stop_then_terminate() {
        let (frames_tx, mut frames_rx) = mpsc::unbounded_channel::<String>();
        let ws_url = ws_server(move |mut ws| {
            let frames_tx = frames_tx.clone();
            async move {
                if !accept_subscription(&mut ws).await {
                    return;
                }
                while let Some(frame) = next_json(&mut ws).await {
                    let kind = frame["type"].as_str().unwrap_or_default().to_string();
                    let _ = frames_tx.send(kind);
                }
            }
        })
        .await;

        let source = Scripted::new(vec![price(100.0, 1_700_000_000_000)]);
        let (client, mut rx) = client(config(ws_url, 5), source);
        client.connect().unwrap();
        while next_event(&mut rx).await != Event::State(ConnectionState::Open) {}

        client.disconnect();
        client.join().await;

        let mut seen = Vec::new();
        while seen.len() < 2 {
            let kind = tokio::time::timeout(Duration::from_secs(5), frames_rx.recv())
                .await
                .expect("frame in time")
                .expect("server alive");
            seen.push(kind);
        }
        assert_eq!(seen, vec!["stop", "connection_terminate"]);
    }

    #[tokio::test]
    async fn backoff_doubles_and_stops_at_max_attempts() {
        let source = Scripted::new(vec![failure()]);
        let (client, mut rx) = client(config(refused_ws_url().await, 10), source.clone());
        client.connect().unwrap();

        let events = drain_until_terminal(&mut rx).await;
        assert_eq!(
            reconnect_delays(&events),
            vec![
                (1, Duration::from_millis(10)),
                (2, Duration::from_millis(20)),
                (3, Duration::from_millis(40)),
            ]
        );
        match client.state() {
            ConnectionState::Failed { reason } => assert!(reason.contains("500")),
            other => panic!("unexpected state {other:?}"),
        }
        client.join().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn successful_open_resets_attempts() {
        // Ack the subscription, then drop the connection.
        let ws_url = ws_server(|mut ws| async move {
            if accept_subscription(&mut ws).await {
                let _ = ws.close(None).await;
            }
        })
        .await;

        let source = Scripted::new(vec![
            failure(),
            failure(),
            price(100.0, 1_700_000_000_000),
            failure(),
        ]);
        let (client, mut rx) = client(config(ws_url, 5), source);
        client.connect().unwrap();

        let events = drain_until_terminal(&mut rx).await;
        let attempts: Vec<u32> = reconnect_delays(&events).iter().map(|(a, _)| *a).collect();
        assert_eq!(attempts, vec![1, 2, 1, 2, 3]);
        assert!(events.contains(&Event::State(ConnectionState::Open)));
        let delays: Vec<Duration> = reconnect_delays(&events).iter().map(|(_, d)| *d).collect();
        assert_eq!(delays[2], Duration::from_millis(5));
    }

    #[tokio::test]
    async fn error_frame_triggers_reconnect() {
        let ws_url = ws_server(|mut ws| async move {
            if accept_subscription(&mut ws).await {
                let _ = ws
                    .send(Message::Text(
                        r#"{"type":"error","id":"1","payload":{"message":"quota"}}"#.into(),
                    ))
                    .await;
                while ws.next().await.is_some() {}
            }
        })
        .await;

        let source = Scripted::new(vec![price(100.0, 1_700_000_000_000)]);
        let (client, mut rx) = client(config(ws_url, 5), source);
        client.connect().unwrap();

        loop {
            if let Event::State(ConnectionState::Reconnecting { attempt, .. }) =
                next_event(&mut rx).await
            {
                assert_eq!(attempt, 1);
                break;
            }
        }
        client.disconnect();
    }

    #[tokio::test]
    async fn idle_connection_times_out() {
        let ws_url = ws_server(|mut ws| async move {
            if accept_subscription(&mut ws).await {
                while ws.next().await.is_some() {}
            }
        })
        .await;

        let source = Scripted::new(vec![price(100.0, 1_700_000_000_000)]);
        let mut cfg = config(ws_url, 5);
        cfg.idle_timeout = Some(Duration::from_millis(100));
        let (client, mut rx) = client(cfg, source);
        client.connect().unwrap();

        loop {
            if let Event::State(ConnectionState::Reconnecting { .. }) = next_event(&mut rx).await {
                break;
            }
        }
        client.disconnect();
    }

    #[tokio::test]
    async fn disconnect_before_response_silences_observer() {
        let source = Scripted::delayed(
            vec![price(100.5, 1_700_000_000_000)],
            Duration::from_millis(200),
        );
        let (client, mut rx) = client(config(refused_ws_url().await, 5), source.clone());
        client.connect().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        client.disconnect();
        client.disconnect();
        client.join().await;

        tokio::time::sleep(Duration::from_millis(300)).await;
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        assert!(!events.iter().any(|e| matches!(e, Event::Price(_))));
        assert_eq!(events.last(), Some(&Event::State(ConnectionState::Disconnected)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disconnect_without_connect_is_noop() {
        let source = Scripted::new(vec![price(1.0, 1)]);
        let (client, mut rx) = client(config(refused_ws_url().await, 5), source.clone());
        client.disconnect();
        client.disconnect();
        client.connect().unwrap();
        client.join().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn empty_token_is_a_config_error() {
        let source = Scripted::new(vec![price(1.0, 1)]);
        let mut cfg = config("ws://127.0.0.1:1/graphql".into(), 5);
        cfg.token = String::new();
        let (client, _rx) = client(cfg, source);
        assert!(matches!(client.connect(), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn invalid_stream_url_is_a_config_error() {
        let source = Scripted::new(vec![price(1.0, 1)]);
        let (client, _rx) = client(config("not a url".into(), 5), source);
        assert!(matches!(client.connect(), Err(AppError::UrlParse(_))));
    }
}
