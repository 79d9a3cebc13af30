mod connection;
mod dispatch;
mod gateway;
mod heartbeat;

pub use gateway::ConnectGatewayError;

use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};
use tokio_tungstenite as websocket;

use crate::{config::Config, store::Stores};
use connection::GatewayConnection;

pub(crate) type WebsocketClient =
    websocket::WebSocketStream<websocket::MaybeTlsStream<tokio::net::TcpStream>>;

/// Lifecycle of the gateway connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// no socket, idle or waiting to reconnect
    #[default]
    Disconnected,
    /// opening a socket
    Connecting,
    /// socket open and Identify sent
    Identified,
    /// Hello received, heartbeat running
    Connected,
}

/// Discord gateway client.
///
/// It connects whenever the token store gets a non-empty token, sends a
/// Presence Update whenever the status store changes, and reconnects every
/// time the connection is lost.
#[derive(Debug)]
pub struct Client {
    config: Config,
    stores: Stores,
}

impl Client {
    /// Create a client driven by `stores`
    pub fn new(config: Config, stores: Stores) -> Self {
        Self { config, stores }
    }

    /// Spawn the client onto the current tokio runtime
    pub fn run(self) -> ClientHandle {
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let connection = GatewayConnection::new(self.config, self.stores, state_tx);
        let task = tokio::spawn(connection.run(shutdown_rx));

        ClientHandle {
            state: state_rx,
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Handle of a running client. Dropping it stops the client.
#[derive(Debug)]
pub struct ClientHandle {
    state: watch::Receiver<ConnectionState>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ClientHandle {
    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Subscribe to connection state changes
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Close the connection and wait for the client to stop
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());

        if let Err(err) = self.task.await {
            log::warn!("Gateway task ended abnormally: {}", err);
        }
    }
}
