use std::time::Duration;

use crate::ws::message::{Incoming, Message};

/// What the connection must do in response to an inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// send a heartbeat now
    Heartbeat,
    /// send identify again
    Identify,
    /// (re)start the heartbeat timer
    StartHeartbeat(Duration),
    /// nothing to do
    Ignore,
}

/// Record the frame sequence number and map the message to an action.
///
/// A present `s` always wins, null included.
pub(crate) fn dispatch(incoming: &Incoming, seq: &mut Option<u64>) -> Action {
    if let Some(s) = incoming.seq {
        log::trace!("Update sequence number to {:?}", s);
        *seq = s;
    }

    match &incoming.message {
        Message::Heartbeat => {
            log::debug!("Server requested a heartbeat");
            Action::Heartbeat
        }
        Message::InvalidSession(resumable) => {
            log::warn!("Invalid session (resumable: {}), identify again", resumable);
            Action::Identify
        }
        Message::Hello(hello) => {
            log::debug!("Hello, heartbeat interval {}ms", hello.heartbeat_interval);
            Action::StartHeartbeat(Duration::from_millis(hello.heartbeat_interval))
        }
        Message::Other(op) => {
            log::debug!("Ignore {} message (op {})", incoming.message.type_name(), op);
            Action::Ignore
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ws::message::Hello;

    fn incoming(seq: Option<Option<u64>>, message: Message) -> Incoming {
        Incoming { seq, message }
    }

    #[test]
    fn test_dispatch_table() {
        let mut seq = None;

        assert_eq!(
            dispatch(&incoming(None, Message::Heartbeat), &mut seq),
            Action::Heartbeat
        );
        assert_eq!(
            dispatch(&incoming(None, Message::InvalidSession(false)), &mut seq),
            Action::Identify
        );
        assert_eq!(
            dispatch(
                &incoming(
                    None,
                    Message::Hello(Hello {
                        heartbeat_interval: 41250
                    })
                ),
                &mut seq
            ),
            Action::StartHeartbeat(Duration::from_millis(41250))
        );
        assert_eq!(
            dispatch(&incoming(None, Message::Other(11)), &mut seq),
            Action::Ignore
        );
        assert_eq!(seq, None);
    }

    #[test]
    fn test_dispatch_updates_sequence_when_present() {
        let mut seq = None;

        dispatch(&incoming(Some(Some(3)), Message::Other(0)), &mut seq);
        assert_eq!(seq, Some(3));

        dispatch(&incoming(None, Message::Heartbeat), &mut seq);
        assert_eq!(seq, Some(3));

        dispatch(&incoming(Some(Some(2)), Message::Other(0)), &mut seq);
        assert_eq!(seq, Some(2));
    }

    #[test]
    fn test_dispatch_null_sequence_clears() {
        let mut seq = None;

        dispatch(&incoming(Some(Some(5)), Message::Other(0)), &mut seq);
        assert_eq!(seq, Some(5));

        dispatch(&incoming(Some(None), Message::Other(11)), &mut seq);
        assert_eq!(seq, None);
    }
}
