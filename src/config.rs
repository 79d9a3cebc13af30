//! Gateway client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::{api, api::types::GatewayURLInfo, error, Result};

/// Default time a paused status may stay unchanged before it is cleared
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60);

/// What the presence shows while playback is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PausedActivity {
    /// Keep the activity, marked with a "Paused" small image
    #[default]
    Show,
    /// Report no activity at all
    Hide,
}

/// How soon to reconnect after the gateway connection is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Reconnect right away, every time, without limit
    #[default]
    Immediate,
    /// Wait `initial` after the first failure, doubling up to `max` while
    /// failures keep coming. A received Hello resets the delay.
    Backoff {
        /// first delay
        initial: Duration,
        /// delay upper bound
        max: Duration,
    },
}

impl ReconnectPolicy {
    /// Delay before the reconnect attempt following `failures` consecutive failures
    pub fn delay(&self, failures: u32) -> Duration {
        match *self {
            Self::Immediate => Duration::ZERO,
            Self::Backoff { initial, max } => initial
                .checked_mul(1 << failures.min(16))
                .unwrap_or(max)
                .min(max),
        }
    }
}

/// Client properties sent with Identify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    /// operating system name
    #[serde(rename = "$os")]
    pub os: String,
    /// browser name
    #[serde(rename = "$browser")]
    pub browser: String,
    /// device label
    #[serde(rename = "$device")]
    pub device: String,
}

impl Properties {
    /// Properties of the running platform with default browser and device labels
    pub fn probe() -> Self {
        Self {
            os: platform_name().to_string(),
            browser: "Chrome".to_string(),
            device: "DeezerCord".to_string(),
        }
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self::probe()
    }
}

fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "Mac OS X",
        "freebsd" => "FreeBSD",
        "android" => "Android",
        "ios" => "iOS",
        "" => "Unknown",
        other => other,
    }
}

/// Gateway client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// gateway endpoint
    pub gateway: GatewayURLInfo,
    /// identify properties
    pub properties: Properties,
    /// paused status presentation
    pub paused_activity: PausedActivity,
    /// a paused status older than this is cleared on the next heartbeat
    pub stale_after: Duration,
    /// reconnect behavior
    pub reconnect: ReconnectPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway: GatewayURLInfo::default(),
            properties: Properties::probe(),
            paused_activity: PausedActivity::default(),
            stale_after: DEFAULT_STALE_AFTER,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl Config {
    /// Use gateway
    pub fn with_gateway(mut self, gateway: GatewayURLInfo) -> Self {
        self.gateway = gateway;
        self
    }

    /// Use identify properties
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Use paused status presentation
    pub fn with_paused_activity(mut self, paused_activity: PausedActivity) -> Self {
        self.paused_activity = paused_activity;
        self
    }

    /// Use staleness threshold
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Use reconnect policy
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Ask the HTTP API which gateway to use, keeping the configured version
    pub async fn with_discovered_gateway(mut self) -> Result<Self> {
        log::info!("Getting gateway url...");

        let client = api::Client::new().context(error::CallAPIFailed)?;
        let url = client.gateway_url().await.context(error::CallAPIFailed)?;

        log::debug!("Got gateway url: {}", url);

        let mut gateway: GatewayURLInfo = url
            .parse()
            .with_context(|_| error::InvalidGatewayURL { url: &url })?;
        gateway.version = self.gateway.version;

        self.gateway = gateway;
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_immediate_reconnect_has_no_delay() {
        let policy = ReconnectPolicy::Immediate;
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(100), Duration::ZERO);
    }

    #[test]
    fn test_backoff_doubles_and_clamps() {
        let policy = ReconnectPolicy::Backoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(60),
        };
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(5), Duration::from_secs(32));
        assert_eq!(policy.delay(6), Duration::from_secs(60));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn test_properties_serialize_with_dollar_keys() {
        let value = serde_json::to_value(Properties {
            os: "Linux".to_string(),
            browser: "Chrome".to_string(),
            device: "DeezerCord".to_string(),
        })
        .unwrap();

        assert_eq!(
            value,
            serde_json::json!({"$os": "Linux", "$browser": "Chrome", "$device": "DeezerCord"})
        );
    }
}
