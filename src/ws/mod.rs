//! Discord gateway protocol client

mod client;
pub mod message;

pub use client::{Client, ClientHandle, ConnectGatewayError, ConnectionState};
