//! crate error types

use snafu::prelude::*;

use super::api::Error as APIError;
use super::store::ApplyChangeError;

/// crate result type
pub type Result<T> = std::result::Result<T, Error>;

/// crate error type
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), context(suffix(false)))]
pub enum Error {
    /// Call discord api failed
    #[snafu(display("call discord api failed: {source}"))]
    CallAPIFailed {
        /// source error
        source: APIError,
    },

    /// Received invalid websocket gateway url address
    #[snafu(display("invalid gateway url {url}"))]
    InvalidGatewayURL {
        /// received url
        url: String,
        /// source error
        source: crate::api::types::ParseGatewayURLError,
    },

    /// A key-value change could not be applied to the stores
    #[snafu(display("apply store change failed: {source}"))]
    ApplyChangeFailed {
        /// source error
        source: ApplyChangeError,
    },
}
