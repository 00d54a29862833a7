//! Pairing client
//!
//! Fetches a single-use pairing code from the server and derives the link
//! that gets rendered as a QR card for out-of-band scanning. Pairing
//! itself completes elsewhere: the session token arrives as a push on the
//! live channel once the phone has redeemed the code.
//!
//! The fetch is one-shot. On failure the caller keeps its "generating"
//! placeholder and may issue a fresh fetch on user request; there is no
//! automatic retry for this path.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("pairing request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Server-issued pairing artifact.
///
/// `code` and `ip` are opaque display data; `expires_in` is the validity
/// window in seconds as reported by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingCode {
    pub code: String,
    pub ip: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl PairingCode {
    /// Display link encoded into the QR card.
    ///
    /// The server reports its own LAN address; the link always points at
    /// the fixed HTTP port, regardless of which host the client used to
    /// reach the server.
    pub fn link(&self, port: u16) -> String {
        format!("http://{}:{}?code={}", self.ip, port, self.code)
    }
}

/// HTTP client for the pairing endpoint
pub struct PairingClient {
    http: reqwest::Client,
    base_url: String,
}

impl PairingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Request a fresh pairing code. Each call replaces any previously
    /// displayed code wholesale.
    pub async fn fetch_code(&self) -> Result<PairingCode, PairingError> {
        let resp = self
            .http
            .get(format!("{}/generate_code", self.base_url))
            .send()
            .await?;

        let code = resp.error_for_status()?.json::<PairingCode>().await?;
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_construction() {
        let code: PairingCode =
            serde_json::from_str(r#"{"code":"42F9","ip":"192.168.1.10"}"#).unwrap();

        assert_eq!(code.link(8080), "http://192.168.1.10:8080?code=42F9");
        assert_eq!(code.expires_in, 0);
    }

    #[test]
    fn test_code_with_expiry() {
        let code: PairingCode =
            serde_json::from_str(r#"{"code":"aB3kZ9","ip":"10.0.0.2","expires_in":60}"#).unwrap();

        assert_eq!(code.code, "aB3kZ9");
        assert_eq!(code.expires_in, 60);
        assert_eq!(code.link(8080), "http://10.0.0.2:8080?code=aB3kZ9");
    }

    #[test]
    fn test_base_url_normalization() {
        let client = PairingClient::new("http://192.168.1.10:8080/");
        assert_eq!(client.base_url, "http://192.168.1.10:8080");
    }
}
