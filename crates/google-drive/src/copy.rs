//! Drive v3 `files.copy` call
//!
//! POST `/files/{id}/copy` with the destination folder in `parents`.
//! `supportsAllDrives=true` keeps shared-drive sources and destinations
//! working; `fields` trims the response to what the service reports back.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Google Drive v3 API base
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Metadata of the file a copy produced.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopiedFile {
    /// Drive ID of the new file (fresh on every copy)
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Browser link to the new file
    #[serde(default)]
    pub web_view_link: Option<String>,
}

/// Client for the one Drive call the migration performs.
pub struct DriveClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DriveClient {
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self {
            http,
            base_url: DRIVE_API_BASE.to_string(),
            timeout,
        }
    }

    /// Override the API base (tests point this at a local mock).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Copy `source_file_id` into `destination_folder_id` as the user the
    /// access token belongs to.
    ///
    /// Not idempotent: every successful call creates a new file, so this is
    /// issued exactly once per user action and never retried.
    pub async fn copy_file(
        &self,
        access_token: &str,
        source_file_id: &str,
        destination_folder_id: &str,
    ) -> Result<CopiedFile> {
        let url = format!(
            "{}/files/{}/copy?supportsAllDrives=true&fields=id,name,webViewLink",
            self.base_url, source_file_id
        );

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "parents": [destination_folder_id] }))
            .send()
            .await
            .map_err(|e| Error::Http(format!("copy request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Copy {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let copied = response.json::<CopiedFile>().await.map_err(|e| Error::Copy {
            status: status.as_u16(),
            detail: format!("invalid copy response: {e}"),
        })?;

        debug!(file_id = copied.id, "drive copy completed");
        Ok(copied)
    }
}

/// Pull the human-readable message out of a Google API error body.
/// Falls back to the raw body when it isn't the documented JSON shape.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
