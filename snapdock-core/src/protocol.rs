//! Wire types for the snapdock live channel
//!
//! All frames are JSON text. Outbound frames are tagged action records;
//! inbound frames are loosely structured pushes from the server, of which
//! this client only consumes the session-token push. Anything else on the
//! inbound side is ignored without closing the channel.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Messages sent from client to server over the live channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// User-initiated action request
    Action {
        name: ActionName,
        payload: ActionPayload,
    },
}

/// Named actions the server understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    /// Copy the selected photos into the configured upload folder
    CopyFiles,
}

/// Action payload; currently only carries the selected item hashes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionPayload {
    #[serde(default)]
    pub hashes: Vec<String>,
}

impl ClientMessage {
    /// Build a `copy_files` action for the given item hashes
    pub fn copy_files(hashes: Vec<String>) -> Self {
        Self::Action {
            name: ActionName::CopyFiles,
            payload: ActionPayload { hashes },
        }
    }
}

/// Events extracted from inbound frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// Session token issued after pairing completed on the server
    Token(String),
}

/// Parse one inbound text frame.
///
/// Returns `Some` only for frames carrying a string `token` field. Frames
/// without one, and frames that are not valid JSON, yield `None`; neither
/// may tear down the channel, so there is no error path here.
pub fn parse_frame(text: &str) -> Option<ServerEvent> {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(err) => {
            debug!(%err, "ignoring malformed frame");
            return None;
        }
    };

    value
        .get("token")
        .and_then(|token| token.as_str())
        .map(|token| ServerEvent::Token(token.to_string()))
}
