//! Gist API client used for cloud backups.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BackupPayload;
use crate::config::CloudSettings;
use crate::util::{error_excerpt, is_http_url, non_empty_trimmed};

const GIST_HTTP_TIMEOUT_SECS: u64 = 30;
const GIST_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Error)]
pub enum GistError {
    #[error("Cloud backup is not configured: no access token stored")]
    NotConfigured,
    #[error("Invalid cloud configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid access token ({0})")]
    Unauthorized(String),
    #[error("Cloud HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Cloud API error: {0}")]
    Api(String),
    #[error("Invalid backup payload: {0}")]
    InvalidPayload(String),
}

pub type GistResult<T> = Result<T, GistError>;

/// Access token with a redacted `Debug`
#[derive(Clone, PartialEq, Eq)]
pub struct GistToken(String);

impl GistToken {
    pub fn new(raw: impl Into<String>) -> GistResult<Self> {
        let raw: String = raw.into();
        non_empty_trimmed(&raw)
            .map(Self)
            .ok_or_else(|| GistError::InvalidConfiguration("access token must not be empty".into()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GistToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("GistToken([REDACTED])")
    }
}

/// Account the token belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GistUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// HTTP client for the gist endpoints.
#[derive(Debug, Clone)]
pub struct GistClient {
    api_base_url: String,
    file_name: String,
    description: String,
    token: GistToken,
    client: reqwest::Client,
}

impl GistClient {
    pub fn new(settings: &CloudSettings, token: GistToken) -> GistResult<Self> {
        let api_base_url = normalize_base_url(&settings.api_base_url)?;
        let file_name = non_empty_trimmed(&settings.file_name).ok_or_else(|| {
            GistError::InvalidConfiguration("backup file name must not be empty".into())
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GIST_HTTP_TIMEOUT_SECS))
            .user_agent(concat!("notepin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_base_url,
            file_name,
            description: settings.description.clone(),
            token,
            client,
        })
    }

    /// Fetch the token owner; used to validate a credential before storing it.
    pub async fn current_user(&self) -> GistResult<GistUser> {
        tracing::debug!("Validating gist token against {}/user", self.api_base_url);
        let request = self.authorized(self.client.get(format!("{}/user", self.api_base_url)));
        let response = send(request).await?;
        Ok(response.json::<GistUser>().await?)
    }

    /// Create a private gist holding `payload`; returns the new gist id.
    pub async fn create_backup(&self, payload: &BackupPayload) -> GistResult<String> {
        let body = self.gist_body(payload)?;
        let request = self.authorized(
            self.client
                .post(format!("{}/gists", self.api_base_url))
                .json(&body),
        );
        let response = send(request).await?;
        let created = response.json::<GistResponse>().await?;
        tracing::info!("Created backup gist {}", created.id);
        Ok(created.id)
    }

    /// Overwrite the backup file of an existing gist.
    pub async fn update_backup(&self, gist_id: &str, payload: &BackupPayload) -> GistResult<()> {
        let body = self.gist_body(payload)?;
        let request = self.authorized(
            self.client
                .patch(self.gist_url(gist_id)?)
                .json(&body),
        );
        send(request).await?;
        tracing::info!("Updated backup gist {}", gist_id);
        Ok(())
    }

    /// Read the backup payload stored in `gist_id`.
    pub async fn fetch_backup(&self, gist_id: &str) -> GistResult<BackupPayload> {
        let request = self.authorized(self.client.get(self.gist_url(gist_id)?));
        let response = send(request).await?;
        let gist = response.json::<GistResponse>().await?;

        let file = gist.files.get(&self.file_name).ok_or_else(|| {
            GistError::InvalidPayload(format!("gist has no file named {}", self.file_name))
        })?;

        let content = match (&file.content, file.truncated, &file.raw_url) {
            (Some(content), false, _) => content.clone(),
            (_, _, Some(raw_url)) => {
                let request = self.authorized(self.client.get(raw_url));
                send(request).await?.text().await?
            }
            (Some(content), true, None) => content.clone(),
            (None, _, None) => {
                return Err(GistError::InvalidPayload(
                    "backup file has no content".to_string(),
                ))
            }
        };

        serde_json::from_str::<BackupPayload>(&content)
            .map_err(|error| GistError::InvalidPayload(error.to_string()))
    }

    fn gist_body(&self, payload: &BackupPayload) -> GistResult<GistRequest> {
        let content = serde_json::to_string_pretty(payload)
            .map_err(|error| GistError::InvalidPayload(error.to_string()))?;
        let mut files = BTreeMap::new();
        files.insert(self.file_name.clone(), GistFileContent { content });
        Ok(GistRequest {
            description: self.description.clone(),
            public: false,
            files,
        })
    }

    fn gist_url(&self, gist_id: &str) -> GistResult<String> {
        let gist_id = non_empty_trimmed(gist_id).ok_or_else(|| {
            GistError::InvalidConfiguration("gist id must not be empty".to_string())
        })?;
        Ok(format!(
            "{}/gists/{}",
            self.api_base_url,
            urlencoding::encode(&gist_id)
        ))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.token.expose())
            .header(reqwest::header::ACCEPT, GIST_ACCEPT)
    }
}

#[derive(Debug, Serialize)]
struct GistRequest {
    description: String,
    public: bool,
    files: BTreeMap<String, GistFileContent>,
}

#[derive(Debug, Serialize)]
struct GistFileContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct GistResponse {
    id: String,
    #[serde(default)]
    files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    raw_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GistErrorBody {
    message: Option<String>,
}

async fn send(request: RequestBuilder) -> GistResult<reqwest::Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = parse_api_error(status, &body);
    if status == StatusCode::UNAUTHORIZED {
        Err(GistError::Unauthorized(message))
    } else {
        Err(GistError::Api(message))
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<GistErrorBody>(body) {
        if let Some(message) = payload.message {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = error_excerpt(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: &str) -> GistResult<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(GistError::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(&base) {
        return Err(GistError::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}
