//! Discord HTTP API response types and the gateway endpoint

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::Deserialize;
use snafu::prelude::*;

/// Gateway protocol version used when the url does not name one
pub const DEFAULT_GATEWAY_VERSION: u8 = 9;

/// Gateway used when nothing else is configured
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=9&encoding=json";

/// data type for api /gateway
#[derive(Debug, Deserialize)]
pub struct GatewayIndexData {
    /// gateway url
    pub url: String,
}

/// Parse string as gateway url error
#[derive(Debug, Snafu)]
#[snafu(
    visibility(pub(crate)),
    module(parse_gateway_url_error_variant),
    context(suffix(false))
)]
pub enum ParseGatewayURLError {
    #[snafu(display("{s} is an invalid url: {source}"))]
    /// the str is not a valid url
    InvalidURL {
        /// string be parsed
        s: String,
        /// source error
        source: url::ParseError,
    },

    /// the parsed url schema is not websocket
    #[snafu(display("the url {s} has invalid schema {schema}, only ws or wss is ok"))]
    InvalidSchema {
        /// the url
        s: String,
        /// invalid schema
        schema: String,
    },

    /// the parsed url has no host
    #[snafu(display("the gateway url {s} has no host"))]
    NoHost {
        /// the url
        s: String,
    },

    /// the parsed url has a version that is not a number
    #[snafu(display("the gateway url {s} has invalid version"))]
    InvalidVersion {
        /// the url
        s: String,
        /// source error
        source: std::num::ParseIntError,
    },

    /// the parsed url asks for an encoding other than json
    #[snafu(display("the gateway url {s} asks for unsupported encoding {encoding}"))]
    UnsupportedEncoding {
        /// the url
        s: String,
        /// requested encoding
        encoding: String,
    },
}

/// parsed gateway url
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayURLInfo {
    base: url::Url,
    /// gateway protocol version
    pub version: u8,
}

impl GatewayURLInfo {
    /// construct final url, always json encoded and uncompressed
    pub fn url(&self) -> url::Url {
        let mut u = self.base.clone();

        u.query_pairs_mut()
            .clear()
            .append_pair("v", &self.version.to_string())
            .append_pair("encoding", "json");

        u
    }
}

impl Default for GatewayURLInfo {
    fn default() -> Self {
        DEFAULT_GATEWAY_URL
            .parse()
            .expect("default gateway url is valid")
    }
}

impl FromStr for GatewayURLInfo {
    type Err = ParseGatewayURLError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut url = url::Url::parse(s)
            .with_context(|_| parse_gateway_url_error_variant::InvalidURL { s: s.to_string() })?;

        ensure!(
            url.scheme() == "wss" || url.scheme() == "ws",
            parse_gateway_url_error_variant::InvalidSchema {
                s,
                schema: url.scheme(),
            }
        );

        ensure!(
            url.host().is_some(),
            parse_gateway_url_error_variant::NoHost { s }
        );

        let query = url.query_pairs().into_owned().collect::<HashMap<_, _>>();

        let version = match query.get("v") {
            Some(v) => v
                .parse()
                .with_context(|_| parse_gateway_url_error_variant::InvalidVersion { s })?,
            None => DEFAULT_GATEWAY_VERSION,
        };

        if let Some(encoding) = query.get("encoding") {
            ensure!(
                encoding == "json",
                parse_gateway_url_error_variant::UnsupportedEncoding { s, encoding }
            );
        }

        url.set_query(None);

        Ok(GatewayURLInfo { base: url, version })
    }
}

impl Display for GatewayURLInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.url().fmt(f)
    }
}
