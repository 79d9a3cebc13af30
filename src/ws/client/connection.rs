use futures_util::{future, FutureExt, SinkExt, StreamExt};
use tokio::{
    sync::{oneshot, watch},
    time::Instant,
};

use super::{
    dispatch::{self, Action},
    gateway,
    heartbeat::{self, HeartbeatScheduler},
    ConnectionState,
};
use crate::{
    config::Config,
    payload,
    status::PlaybackStatus,
    store::Stores,
    ws::message::{Incoming, MessageStreamSink, MessageStreamSinkError, Payload},
};

/// The single owner of the socket, sequence number and heartbeat timer.
pub(crate) struct GatewayConnection {
    config: Config,
    stores: Stores,
    token_rx: watch::Receiver<Option<String>>,
    status_rx: watch::Receiver<Option<PlaybackStatus>>,
    state_tx: watch::Sender<ConnectionState>,
    socket: Option<MessageStreamSink>,
    seq: Option<u64>,
    heartbeat: HeartbeatScheduler,
    reconnect_at: Option<Instant>,
    failures: u32,
}

async fn next_frame(
    socket: &mut Option<MessageStreamSink>,
) -> Option<Result<Incoming, MessageStreamSinkError>> {
    match socket.as_mut() {
        Some(s) => s.next().await,
        None => future::pending().await,
    }
}

impl GatewayConnection {
    pub fn new(config: Config, stores: Stores, state_tx: watch::Sender<ConnectionState>) -> Self {
        let token_rx = stores.token.subscribe();
        let status_rx = stores.status.subscribe();

        Self {
            config,
            stores,
            token_rx,
            status_rx,
            state_tx,
            socket: None,
            seq: None,
            heartbeat: HeartbeatScheduler::default(),
            reconnect_at: None,
            failures: 0,
        }
    }

    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        log::debug!("Gateway task start");

        // a token stored before start connects right away
        let token = self.token_rx.borrow_and_update().clone();
        self.set_token(token).await;

        loop {
            let reconnect = match self.reconnect_at {
                Some(tick) => tokio::time::sleep_until(tick).boxed(),
                None => future::pending().boxed(),
            };

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    log::info!("Gateway shutdown");
                    break;
                }

                changed = self.token_rx.changed() => {
                    if changed.is_err() {
                        log::debug!("Token store dropped, stop");
                        break;
                    }
                    let token = self.token_rx.borrow_and_update().clone();
                    self.set_token(token).await;
                }

                changed = self.status_rx.changed() => {
                    if changed.is_err() {
                        log::debug!("Status store dropped, stop");
                        break;
                    }
                    let status = self.status_rx.borrow_and_update().clone();
                    log::debug!("Status changed: {:?}", status);
                    self.send_presence_update(status.as_ref()).await;
                }

                _ = self.heartbeat.tick() => {
                    self.heartbeat_tick().await;
                }

                _ = reconnect => {
                    self.reconnect_at = None;
                    self.reconnect().await;
                }

                frame = next_frame(&mut self.socket) => {
                    self.on_frame(frame).await;
                }
            }
        }

        self.disconnect().await;
    }

    fn set_state(&self, state: ConnectionState) {
        log::trace!("Connection state: {:?}", state);
        self.state_tx.send_replace(state);
    }

    async fn set_token(&mut self, token: Option<String>) {
        match token.filter(|t| !t.is_empty()) {
            Some(token) => self.connect(&token).await,
            None => log::info!("No token, gateway stays idle"),
        }
    }

    /// Replace the current socket, if any, with a new identified one.
    async fn connect(&mut self, token: &str) {
        self.disconnect().await;
        self.reconnect_at = None;
        self.seq = None;

        self.set_state(ConnectionState::Connecting);

        match gateway::connect(&self.config.gateway.url()).await {
            Ok(ws) => {
                log::info!("Connection open");
                self.socket = Some(MessageStreamSink::new(ws));
                self.send_identify(token).await;
            }
            Err(err) => {
                log::warn!("{}", err);
                self.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
            }
        }
    }

    /// Close the current socket on purpose. This never schedules a reconnect.
    async fn disconnect(&mut self) {
        self.heartbeat.stop();

        if let Some(mut socket) = self.socket.take() {
            log::debug!("Closing previous connection");
            if let Err(err) = socket.close().await {
                log::debug!("Close previous connection failed: {}", err);
            }
            self.set_state(ConnectionState::Disconnected);
        }
    }

    async fn reconnect(&mut self) {
        let token = self.token_rx.borrow().clone();
        log::info!("Trying to reconnect...");
        self.set_token(token).await;
    }

    /// The socket is gone without us closing it.
    fn on_closed(&mut self) {
        self.heartbeat.stop();
        self.socket = None;
        self.set_state(ConnectionState::Disconnected);
        self.schedule_reconnect();
    }

    fn schedule_reconnect(&mut self) {
        let delay = self.config.reconnect.delay(self.failures);
        self.failures = self.failures.saturating_add(1);

        log::debug!("Reconnect in {:?}", delay);

        self.reconnect_at = Some(Instant::now() + delay);
    }

    async fn on_frame(&mut self, frame: Option<Result<Incoming, MessageStreamSinkError>>) {
        match frame {
            Some(Ok(incoming)) => {
                log::trace!("Received new {} message", incoming.message.type_name());
                self.dispatch(incoming).await;
            }
            Some(Err(err)) if !err.is_fatal() => {
                log::warn!("Message stream error happened but ignored: {}", err);
            }
            Some(Err(err)) => {
                log::warn!("Connection closed for reason: {}", err);
                self.on_closed();
            }
            None => {
                log::warn!("Connection closed without a close frame");
                self.on_closed();
            }
        }
    }

    async fn dispatch(&mut self, incoming: Incoming) {
        match dispatch::dispatch(&incoming, &mut self.seq) {
            Action::Heartbeat => self.send_heartbeat().await,
            Action::Identify => {
                let token = self.token_rx.borrow().clone();
                match token {
                    Some(token) => self.send_identify(&token).await,
                    None => log::warn!("Token is gone, can't identify again"),
                }
            }
            Action::StartHeartbeat(period) => {
                if self.heartbeat.is_running() {
                    log::debug!("Hello received again, restart heartbeat");
                }
                self.heartbeat.start(period);
                self.failures = 0;
                self.set_state(ConnectionState::Connected);
            }
            Action::Ignore => {}
        }
    }

    async fn heartbeat_tick(&mut self) {
        self.send_heartbeat().await;

        let now = heartbeat::now_millis();
        let stale_after = self.config.stale_after;

        // a status set between the check and the clear must survive
        let cleared = self.stores.status.set_if(None, |status| {
            matches!(status, Some(status) if heartbeat::is_stale(status, now, stale_after))
        });

        if cleared {
            log::info!(
                "Paused for more than {:?}, clear presence status",
                stale_after
            );

            let status = self.status_rx.borrow_and_update().clone();
            self.send_presence_update(status.as_ref()).await;
        }
    }

    async fn send_heartbeat(&mut self) {
        log::trace!("Send heartbeat with seq {:?}", self.seq);
        self.send(payload::build_heartbeat(self.seq)).await;
    }

    async fn send_identify(&mut self, token: &str) {
        let status = self.status_rx.borrow().clone();
        let identify = payload::build_identify(
            token,
            status.as_ref(),
            &self.config.properties,
            self.config.paused_activity,
        );

        if self.send(identify).await {
            self.set_state(ConnectionState::Identified);
        }
    }

    async fn send_presence_update(&mut self, status: Option<&PlaybackStatus>) {
        let update = payload::build_presence_update(status, self.config.paused_activity);
        self.send(update).await;
    }

    /// Send over the current socket. Returns false when there is none or it broke.
    async fn send(&mut self, payload: Payload) -> bool {
        let op = payload.op();

        let socket = match self.socket.as_mut() {
            Some(socket) => socket,
            None => {
                log::debug!("Not connected, drop {} payload", op);
                return false;
            }
        };

        match socket.send(payload).await {
            Ok(()) => {
                log::trace!("Sent {} payload", op);
                true
            }
            Err(err) if !err.is_fatal() => {
                log::warn!("Send {} payload failed: {}", op, err);
                false
            }
            Err(err) => {
                log::warn!("Connection broken when send {} payload: {}", op, err);
                self.on_closed();
                false
            }
        }
    }
}
