//! Photo listing REST client
//!
//! The companion server exposes the synced photo thumbnails over plain
//! HTTP; this client fetches the listing consumed by the gallery view and
//! forwards the upload-folder choice. Both calls are collaborators of the
//! live-channel core: the listing feeds the selection UI, the folder
//! config is an opaque pass-through.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: HTTP {status} on {path}")]
    Status { status: u16, path: String },
}

/// Per-item upload state as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Error,
    Uploading,
}

/// One item in the photo listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// Content hash; doubles as the identifier in copy actions
    pub id: String,
    pub url: String,
    pub name: String,
    pub size: u64,
    pub status: UploadStatus,
}

/// Photo API client
pub struct PhotoClient {
    client: Client,
    base_url: String,
}

impl PhotoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the ordered photo listing
    pub async fn list_photos(&self) -> Result<Vec<PhotoEntry>, PhotoApiError> {
        let url = format!("{}/api/thumbs/list", self.base_url);

        let resp = self.client.get(&url).send().await?;
        check_status(&resp, "/api/thumbs/list")?;

        Ok(resp.json().await?)
    }

    /// Tell the server which folder to copy uploads into.
    ///
    /// The path comes from a platform folder picker and is passed through
    /// untouched; the response body is ignored.
    pub async fn set_upload_folder(&self, folder: &str) -> Result<(), PhotoApiError> {
        #[derive(Serialize)]
        struct FolderPayload<'a> {
            folder: &'a str,
        }

        let url = format!("{}/config", self.base_url);

        let resp = self
            .client
            .post(&url)
            .json(&FolderPayload { folder })
            .send()
            .await?;
        check_status(&resp, "/config")?;

        Ok(())
    }
}

fn check_status(resp: &reqwest::Response, path: &str) -> Result<(), PhotoApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(PhotoApiError::Status {
            status: status.as_u16(),
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_deserialization() {
        let json = r#"[
            {"id":"a1","url":"http://192.168.1.10:8080/thumbs/a1.jpg","name":"IMG_0001.jpg","size":2500000,"status":"success"},
            {"id":"b2","url":"http://192.168.1.10:8080/thumbs/b2.jpg","name":"IMG_0002.jpg","size":1800000,"status":"uploading"},
            {"id":"c3","url":"http://192.168.1.10:8080/thumbs/c3.jpg","name":"IMG_0003.jpg","size":900000,"status":"error"}
        ]"#;

        let photos: Vec<PhotoEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(photos.len(), 3);
        assert_eq!(photos[0].status, UploadStatus::Success);
        assert_eq!(photos[1].status, UploadStatus::Uploading);
        assert_eq!(photos[2].status, UploadStatus::Error);
        // order is the server's, preserved as-is
        assert_eq!(photos[0].id, "a1");
        assert_eq!(photos[2].name, "IMG_0003.jpg");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&UploadStatus::Uploading).unwrap(),
            r#""uploading""#
        );
        let status: UploadStatus = serde_json::from_str(r#""success""#).unwrap();
        assert_eq!(status, UploadStatus::Success);
    }

    #[test]
    fn test_base_url_normalization() {
        let client = PhotoClient::new("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
