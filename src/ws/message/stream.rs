use std::task::Poll;

use bytes::Bytes;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use snafu::prelude::*;
use tokio_tungstenite::tungstenite as websocket;

use super::{Incoming, Message, OpCode, ParseMessageError, Payload};
use crate::ws::client::WebsocketClient;

/// Error when read/write message stream/sink
#[derive(Debug, Snafu)]
#[snafu(module(error), context(suffix(false)))]
pub enum MessageStreamSinkError {
    /// underlying websocket stream broken
    #[snafu(display("underlying websocket stream broken: {source}"))]
    Websocket {
        /// source error
        source: websocket::Error,
    },

    /// peer sent a close frame
    #[snafu(display("connection closed by peer, code {code}, reason: {reason:?}"))]
    Closed {
        /// close code, 1005 when the frame has none
        code: u16,
        /// close reason
        reason: String,
    },

    /// received a control or raw frame
    #[snafu(display("received a non-data frame"))]
    NotDataFrame,

    /// parse frame data failed
    #[snafu(display("parse frame to message failed: {source}"))]
    ParseMessageFailed {
        /// source error
        source: ParseMessageError,
    },

    /// serialize payload failed
    #[snafu(display("encode {op} payload failed: {source}"))]
    EncodePayloadFailed {
        /// payload op code
        op: OpCode,
        /// source error
        source: serde_json::Error,
    },
}

impl MessageStreamSinkError {
    /// Check if this error will make the stream/sink stop
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Websocket { .. } | Self::Closed { .. } => true,
            Self::NotDataFrame
            | Self::ParseMessageFailed { .. }
            | Self::EncodePayloadFailed { .. } => false,
        }
    }
}

/// Discord gateway message stream/sink
#[derive(Debug)]
pub struct MessageStreamSink {
    ws: WebsocketClient,
}

impl MessageStreamSink {
    /// Construct a new stream with underlying websocket connection.
    pub fn new(ws: WebsocketClient) -> Self {
        Self { ws }
    }

    fn decode(buffer: Bytes) -> Result<Incoming, MessageStreamSinkError> {
        Message::decode(buffer.clone()).map_err(|e| {
            log::trace!(
                "Parse failed message data: {}",
                std::str::from_utf8(&buffer).unwrap_or("<not-utf8-binary>")
            );
            MessageStreamSinkError::ParseMessageFailed { source: e }
        })
    }
}

impl Stream for MessageStreamSink {
    type Item = Result<Incoming, MessageStreamSinkError>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let frame = match self.ws.poll_next_unpin(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Ready(Some(frame)) => frame.context(error::Websocket)?,
        };

        let result = match frame {
            websocket::Message::Text(text) => Self::decode(text.into()),
            websocket::Message::Binary(data) => Self::decode(data.into()),
            websocket::Message::Close(frame) => {
                let (code, reason) = frame
                    .map(|f| (f.code.into(), f.reason.into_owned()))
                    .unwrap_or((1005, String::new()));
                Err(MessageStreamSinkError::Closed { code, reason })
            }
            _ => Err(MessageStreamSinkError::NotDataFrame),
        };

        Poll::Ready(Some(result))
    }
}

impl Sink<Payload> for MessageStreamSink {
    type Error = MessageStreamSinkError;

    fn poll_ready(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.ws
            .poll_ready_unpin(cx)
            .map_err(|e| Self::Error::Websocket { source: e })
    }

    fn start_send(mut self: std::pin::Pin<&mut Self>, item: Payload) -> Result<(), Self::Error> {
        let text = item
            .encode()
            .context(error::EncodePayloadFailed { op: item.op() })?;

        self.ws
            .start_send_unpin(websocket::Message::Text(text))
            .map_err(|e| Self::Error::Websocket { source: e })
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.ws
            .poll_flush_unpin(cx)
            .map_err(|e| Self::Error::Websocket { source: e })
    }

    fn poll_close(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Result<(), Self::Error>> {
        self.ws
            .poll_close_unpin(cx)
            .map_err(|e| Self::Error::Websocket { source: e })
    }
}
