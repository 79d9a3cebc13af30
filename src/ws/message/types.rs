use serde::{Deserialize, Serialize, Serializer};

/// Gateway operation codes used by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    /// Dispatch, server -> client event
    Dispatch = 0,
    /// Heartbeat, both directions
    Heartbeat = 1,
    /// Identify, client -> server
    Identify = 2,
    /// Presence Update, client -> server
    PresenceUpdate = 3,
    /// Reconnect, server -> client
    Reconnect = 7,
    /// Invalid Session, server -> client
    InvalidSession = 9,
    /// Hello, server -> client
    Hello = 10,
    /// Heartbeat ACK, server -> client
    HeartbeatAck = 11,
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Dispatch),
            1 => Some(Self::Heartbeat),
            2 => Some(Self::Identify),
            3 => Some(Self::PresenceUpdate),
            7 => Some(Self::Reconnect),
            9 => Some(Self::InvalidSession),
            10 => Some(Self::Hello),
            11 => Some(Self::HeartbeatAck),
            _ => None,
        }
    }

    /// Get the raw integer value
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the name of this op code
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::PresenceUpdate => "PresenceUpdate",
            Self::Reconnect => "Reconnect",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}

/// Hello message data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_opcode_from_u8() {
        assert_eq!(OpCode::from_u8(9), Some(OpCode::InvalidSession));
        assert_eq!(OpCode::from_u8(10), Some(OpCode::Hello));
        assert_eq!(OpCode::from_u8(6), None);
    }

    #[test]
    fn test_opcode_serialize_as_number() {
        assert_eq!(serde_json::to_string(&OpCode::Hello).unwrap(), "10");
        assert_eq!(format!("{}", OpCode::Identify), "Identify(2)");
    }
}
