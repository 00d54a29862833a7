//! snapdock-core: Shared library for the snapdock desktop client
//!
//! This crate provides:
//! - Wire types for the live WebSocket channel
//! - The reconnecting connection manager
//! - The pairing (QR link) client
//! - REST client for photo listing and folder configuration
//! - Flat application state consumed by the UI layer

pub mod config;
pub mod connection;
pub mod pairing;
pub mod photos;
pub mod protocol;
pub mod startup;
pub mod state;

pub use config::Config;
pub use connection::{
    ConnectionEvent, ConnectionHandle, ConnectionManager, ConnectionState, ReconnectPolicy,
};
pub use pairing::{PairingClient, PairingCode};
pub use photos::{PhotoClient, PhotoEntry, UploadStatus};
pub use protocol::{ClientMessage, ServerEvent};
pub use state::AppState;

/// Default HTTP + WebSocket port of the companion server
pub const DEFAULT_SERVER_PORT: u16 = 8080;
