//! # DeezerCord
//!
//! Keep a Discord presence in sync with what the Deezer player is doing.
//!
//! A token event connects to the gateway, every status event becomes a
//! Presence Update, and a status left paused for too long is cleared.

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(missing_debug_implementations, missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod payload;
pub mod status;
pub mod store;
pub mod ws;

mod error;
pub use error::{Error, Result};

pub use config::{Config, PausedActivity, ReconnectPolicy};
pub use status::PlaybackStatus;
pub use store::{StatusStore, Stores, TokenStore};

use snafu::prelude::*;

/// DeezerCord instance, owns the stores and the client configuration
#[derive(Debug)]
pub struct DeezerCord {
    config: Config,
    stores: Stores,
}

impl DeezerCord {
    /// Create new instance with empty stores
    pub fn new(config: Config) -> Self {
        log::info!("Using gateway {}", config.gateway);

        Self {
            config,
            stores: Stores::new(),
        }
    }

    /// Token and status stores
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    /// Replace the auth token, a non-empty token (re)connects the gateway
    pub fn set_token(&self, token: Option<String>) {
        self.stores.token.set(token);
    }

    /// Replace the playback status, sent as a presence update when connected
    pub fn set_status(&self, status: Option<PlaybackStatus>) {
        self.stores.status.set(status);
    }

    /// Feed a change from a string keyed key-value store
    pub fn apply_change(&self, key: &str, value: serde_json::Value) -> Result<bool> {
        self.stores
            .apply(key, value)
            .context(error::ApplyChangeFailed)
    }

    /// Start the gateway client
    pub fn start(&self) -> ws::ClientHandle {
        log::debug!("Starting gateway client");

        ws::Client::new(self.config.clone(), self.stores.clone()).run()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_change_feeds_stores() {
        let app = DeezerCord::new(Config::default());

        assert!(app.apply_change(store::TOKEN_KEY, json!("T1")).unwrap());
        assert_eq!(app.stores().token.get().as_deref(), Some("T1"));

        assert!(matches!(
            app.apply_change(store::STATUS_KEY, json!("playing")),
            Err(Error::ApplyChangeFailed { .. })
        ));
    }
}
