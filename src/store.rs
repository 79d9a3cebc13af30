//! Token and status holders the gateway client subscribes to.
//!
//! Each store is a typed publish/subscribe channel: `set` replaces the value
//! and wakes every subscriber, so the gateway never polls.

use std::sync::Arc;

use snafu::prelude::*;
use tokio::sync::watch;

use crate::status::PlaybackStatus;

/// Key the page scraper writes the auth token under.
pub const TOKEN_KEY: &str = "discordToken";

/// Key the page scraper writes the playback status under.
pub const STATUS_KEY: &str = "deezerData";

/// Error when apply a key-value change to stores
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module(error), context(suffix(false)))]
pub enum ApplyChangeError {
    /// token value is neither a string nor null
    #[snafu(display("value of {key} is not a string: {value}"))]
    TokenNotString {
        /// changed key
        key: String,
        /// received value
        value: serde_json::Value,
    },

    /// status value can't be decoded as a playback status
    #[snafu(display("value of {key} is not a playback status: {source}"))]
    InvalidStatus {
        /// changed key
        key: String,
        /// source error
        source: serde_json::Error,
    },
}

/// A value holder with change subscription.
#[derive(Debug)]
pub struct Store<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Store<T> {
    /// Create a store holding `value`
    pub fn new(value: T) -> Self {
        let (tx, _) = watch::channel(value);
        Self { tx: Arc::new(tx) }
    }

    /// Current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.tx.borrow().clone()
    }

    /// Replace the value and notify every subscriber, even if it is unchanged
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Replace the value only if `predicate` holds for the current one.
    ///
    /// The check and the replacement happen under the same lock, so a
    /// concurrent `set` is never overwritten. Returns whether it replaced.
    pub fn set_if<F>(&self, value: T, predicate: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        self.tx.send_if_modified(|current| {
            if predicate(current) {
                *current = value;
                true
            } else {
                false
            }
        })
    }

    /// Subscribe to later `set` calls. The current value counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

/// Holds the gateway auth token, none until the first token event.
pub type TokenStore = Store<Option<String>>;

/// Holds the latest playback snapshot, none when nothing should be shown.
pub type StatusStore = Store<Option<PlaybackStatus>>;

/// The pair of stores feeding one gateway client.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    /// auth token
    pub token: TokenStore,
    /// playback status
    pub status: StatusStore,
}

impl Stores {
    /// Create empty stores
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a change from a string keyed key-value store into the typed stores.
    ///
    /// Returns `false` when the key is not one the gateway cares about.
    pub fn apply(&self, key: &str, value: serde_json::Value) -> Result<bool, ApplyChangeError> {
        match key {
            TOKEN_KEY => {
                let token = match value {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s.replace('"', "")),
                    value => return error::TokenNotString { key, value }.fail(),
                };

                log::debug!("Token changed, present: {}", token.is_some());

                self.token.set(token);
            }
            STATUS_KEY => {
                let status = if value.is_null() {
                    None
                } else {
                    Some(
                        serde_json::from_value::<PlaybackStatus>(value)
                            .context(error::InvalidStatus { key })?,
                    )
                };

                log::debug!("Status changed: {:?}", status);

                self.status.set(status);
            }
            _ => {
                log::trace!("Ignore change of unrelated key {}", key);
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_set_notifies_subscriber() {
        let store = TokenStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.set(Some("T1".to_string()));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("T1"));
        assert_eq!(store.get().as_deref(), Some("T1"));
    }

    #[test]
    fn test_store_same_value_still_notifies() {
        let store = TokenStore::new(Some("T1".to_string()));
        let rx = store.subscribe();

        store.set(Some("T1".to_string()));

        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_store_set_if_keeps_newer_value() {
        let store = TokenStore::new(Some("old".to_string()));
        let mut rx = store.subscribe();

        // a newer value lands before the conditional clear
        store.set(Some("new".to_string()));
        assert_eq!(rx.borrow_and_update().as_deref(), Some("new"));

        let cleared = store.set_if(None, |t| t.as_deref() == Some("old"));
        assert!(!cleared);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.get().as_deref(), Some("new"));

        assert!(store.set_if(None, |t| t.as_deref() == Some("new")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_apply_token_strips_quotes() {
        let stores = Stores::new();
        assert!(stores.apply(TOKEN_KEY, json!("\"abc.def\"")).unwrap());
        assert_eq!(stores.token.get().as_deref(), Some("abc.def"));

        assert!(stores.apply(TOKEN_KEY, json!(null)).unwrap());
        assert_eq!(stores.token.get(), None);
    }

    #[test]
    fn test_apply_status() {
        let stores = Stores::new();
        let applied = stores
            .apply(
                STATUS_KEY,
                json!({"song": "A", "artist": "B", "paused": false, "updatedAt": 2000}),
            )
            .unwrap();

        assert!(applied);
        let status = stores.status.get().unwrap();
        assert_eq!(status.song, "A");
        assert_eq!(status.updated_at, 2000);

        stores.apply(STATUS_KEY, json!(null)).unwrap();
        assert_eq!(stores.status.get(), None);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let stores = Stores::new();
        assert!(matches!(
            stores.apply(TOKEN_KEY, json!(42)),
            Err(ApplyChangeError::TokenNotString { .. })
        ));
        assert!(matches!(
            stores.apply(STATUS_KEY, json!("playing")),
            Err(ApplyChangeError::InvalidStatus { .. })
        ));
        assert_eq!(stores.token.get(), None);
    }

    #[test]
    fn test_apply_ignores_other_keys() {
        let stores = Stores::new();
        assert!(!stores.apply("theme", json!("dark")).unwrap());
    }
}
