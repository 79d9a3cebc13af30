use snafu::*;
use tokio_tungstenite as websocket;

use super::WebsocketClient;

/// Error when connect to websocket gateway
#[derive(Debug, Snafu)]
#[snafu(
    display("connect ws gateway {url} failed: {source}"),
    visibility(pub(crate)),
    module(error),
    context(suffix(false))
)]
pub struct ConnectGatewayError {
    /// connected url
    pub url: String,
    /// source error
    pub source: websocket::tungstenite::Error,
}

pub(crate) async fn connect(url: &url::Url) -> Result<WebsocketClient, ConnectGatewayError> {
    log::debug!("Connecting gateway: {}", url);

    let (ws, _) = websocket::connect_async(url)
        .await
        .with_context(|_| error::ConnectGateway { url: url.as_str() })?;

    Ok(ws)
}
