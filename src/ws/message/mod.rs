//! Discord gateway message types.

mod stream;
mod types;

pub use stream::{MessageStreamSink, MessageStreamSinkError};
pub use types::{Hello, OpCode};

use bytes::Bytes;
use enum_as_inner::EnumAsInner;
use serde::Serialize;
use snafu::prelude::*;

use crate::payload::{Identify, Presence};

/// Error when parse frame data as message
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)), module(error), context(suffix(false)))]
pub enum ParseMessageError {
    /// data is invalid json
    #[snafu(display("parse json failed: {source:?}"))]
    ParseJSONFailed {
        /// data for decode
        data: Bytes,
        /// source error
        source: serde_json::Error,
    },

    /// data json is not an object
    #[snafu(display("parsed message is not object: {json}"))]
    MessageNotObject {
        /// json string
        json: String,
    },

    /// data json has no op field
    #[snafu(display("message has no op field: {json}"))]
    NoOpCode {
        /// json string
        json: String,
    },

    /// data json op field is not number type
    #[snafu(display("message has non-number op field: {json}"))]
    OpCodeNotNumber {
        /// json string
        json: String,
    },

    /// data json is not valid typed message
    #[snafu(display("parse to {type_name} message failed: {source}"))]
    ParseJSONToTypedMessageFailed {
        /// type name
        type_name: String,
        /// source error
        source: serde_json::Error,
    },
}

/// Server -> client message, by op code
#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Message {
    /// Heartbeat request, the client must heartbeat right away
    Heartbeat,
    /// Invalid Session, the client must identify again. Carries whether the
    /// session could be resumed, which this client never does.
    InvalidSession(bool),
    /// Hello, sent once after connect
    Hello(Hello),
    /// Any other op code, ignored by the client
    Other(i64),
}

/// One decoded inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incoming {
    /// `s` field: `None` when absent, `Some(None)` when null
    pub seq: Option<Option<u64>>,
    /// message body
    pub message: Message,
}

impl Message {
    /// Decode data to a message with its sequence number
    pub fn decode(buff: Bytes) -> Result<Incoming, ParseMessageError> {
        let mut value: serde_json::Value =
            serde_json::from_slice(&buff).context(error::ParseJSONFailed { data: buff.clone() })?;

        let obj = value
            .as_object_mut()
            .with_context(|| error::MessageNotObject {
                json: String::from_utf8_lossy(&buff),
            })?;

        let op = obj
            .get("op")
            .with_context(|| error::NoOpCode {
                json: String::from_utf8_lossy(&buff),
            })?
            .as_i64()
            .with_context(|| error::OpCodeNotNumber {
                json: String::from_utf8_lossy(&buff),
            })?;

        let seq = obj.get("s").map(serde_json::Value::as_u64);
        let data = obj.remove("d").unwrap_or_default();

        let message = match u8::try_from(op).ok().and_then(OpCode::from_u8) {
            Some(OpCode::Heartbeat) => Self::Heartbeat,
            Some(OpCode::InvalidSession) => {
                Self::InvalidSession(data.as_bool().unwrap_or_default())
            }
            Some(OpCode::Hello) => Self::Hello(serde_json::from_value(data).with_context(|_| {
                error::ParseJSONToTypedMessageFailed {
                    type_name: OpCode::Hello.name(),
                }
            })?),
            _ => Self::Other(op),
        };

        Ok(Incoming { seq, message })
    }

    /// get op code
    pub fn op(&self) -> i64 {
        match self {
            Self::Heartbeat => OpCode::Heartbeat.as_u8().into(),
            Self::InvalidSession(_) => OpCode::InvalidSession.as_u8().into(),
            Self::Hello(_) => OpCode::Hello.as_u8().into(),
            Self::Other(op) => *op,
        }
    }

    /// get type name
    pub fn type_name(&self) -> &'static str {
        u8::try_from(self.op())
            .ok()
            .and_then(OpCode::from_u8)
            .map(OpCode::name)
            .unwrap_or("Unknown")
    }
}

/// Client -> server payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Heartbeat with last seen sequence number
    Heartbeat(Option<u64>),
    /// Identify, authenticate the connection
    Identify(Box<Identify>),
    /// Presence Update
    PresenceUpdate(Presence),
}

#[derive(Serialize)]
struct Envelope<'a, D> {
    op: OpCode,
    d: &'a D,
}

impl Payload {
    /// get op code
    pub fn op(&self) -> OpCode {
        match self {
            Self::Heartbeat(_) => OpCode::Heartbeat,
            Self::Identify(_) => OpCode::Identify,
            Self::PresenceUpdate(_) => OpCode::PresenceUpdate,
        }
    }

    /// encode payload as a json text `{"op": .., "d": ..}`
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let op = self.op();
        match self {
            Self::Heartbeat(seq) => serde_json::to_string(&Envelope { op, d: seq }),
            Self::Identify(identify) => serde_json::to_string(&Envelope { op, d: &**identify }),
            Self::PresenceUpdate(presence) => {
                serde_json::to_string(&Envelope { op, d: presence })
            }
        }
    }
}
