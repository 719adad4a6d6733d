// API client module: a small blocking HTTP client that talks to the
// video-hosting backend. Every call returns the raw status and body so the
// probes can print whatever the server answered, success or not.

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const MY_VIDEOS_PATH: &str = "/api/videos/my-videos";
pub const SHARED_VIDEOS_PATH: &str = "/api/videos/shared-videos";
pub const UPLOAD_PATH: &str = "/api/videos/upload";

/// Blocking API client holding the reqwest client, the backend base URL and
/// the bearer token obtained at login (kept in memory only).
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Account roles understood by the backend's `restrictTo` guards.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Viewer => "viewer",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "viewer" => Ok(Role::Viewer),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role: {}", other),
        }
    }
}

/// Registration payload. The backend rejects registrations without an
/// organization id, so it is always sent.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(rename = "organizationId")]
    pub organization_id: String,
}

/// Login request payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body returned by both register and login. Everything is optional so a
/// surprising response still parses far enough to be printed.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AuthResponse {
    pub message: Option<String>,
    pub token: Option<String>,
    pub user: Option<UserSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    pub id: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
}

/// A file to send to the upload endpoint together with its metadata.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub path: PathBuf,
    pub mime: String,
    pub title: String,
    pub description: String,
}

impl VideoUpload {
    /// Name used for the multipart file part.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("video.mp4")
            .to_string()
    }
}

/// Response body, parsed as JSON when possible and kept as raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn new(status: StatusCode, raw: String) -> Self {
        let body = match serde_json::from_str::<Value>(&raw) {
            Ok(v) => ResponseBody::Json(v),
            Err(_) => ResponseBody::Text(raw),
        };
        ApiResponse { status, body }
    }

    fn read(res: Response) -> Result<Self> {
        let status = res.status();
        let raw = res.text().context("Failed to read response body")?;
        Ok(ApiResponse::new(status, raw))
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(v) => Some(v),
            ResponseBody::Text(_) => None,
        }
    }

    /// Deserialize the JSON body into `T`, or `None` when it does not fit.
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        self.json()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Non-empty `token` field of the body, if any.
    pub fn token(&self) -> Option<String> {
        self.parse::<AuthResponse>()
            .and_then(|r| r.token)
            .filter(|t| !t.is_empty())
    }

    /// The backend puts a human readable `message` in most bodies.
    pub fn message(&self) -> Option<&str> {
        self.json()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
    }

    /// Body as shown to the user: indented JSON, or the raw text.
    pub fn pretty(&self) -> String {
        match &self.body {
            ResponseBody::Json(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            ResponseBody::Text(t) => t.clone(),
        }
    }
}

impl ApiClient {
    /// Create a client for `base_url`. `timeout` applies to every request
    /// issued by this client; `None` means wait indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a bearer token for subsequent authenticated requests.
    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Authorization header map; empty when no token is set.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(t) = &self.token {
            let val = HeaderValue::from_str(&format!("Bearer {}", t))
                .context("Token contains characters not allowed in a header")?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }

    fn send(&self, req: RequestBuilder, what: &str) -> Result<ApiResponse> {
        let res = req
            .send()
            .with_context(|| format!("Failed to send {} request", what))?;
        ApiResponse::read(res)
    }

    /// POST /api/auth/register. Success is 201; any status is returned as-is.
    pub fn register(&self, req: &RegisterRequest) -> Result<ApiResponse> {
        let url = self.url(REGISTER_PATH);
        tracing::debug!(%url, email = %req.email, role = %req.role, "register");
        self.send(self.client.post(&url).json(req), "register")
    }

    /// POST /api/auth/login. Success is 200; any status is returned as-is.
    pub fn login(&self, req: &LoginRequest) -> Result<ApiResponse> {
        let url = self.url(LOGIN_PATH);
        tracing::debug!(%url, email = %req.email, "login");
        self.send(self.client.post(&url).json(req), "login")
    }

    /// GET an arbitrary backend path, attaching the bearer token only when
    /// `authenticated` is set and a token is present.
    pub fn get(&self, path: &str, authenticated: bool) -> Result<ApiResponse> {
        let url = self.url(path);
        tracing::debug!(%url, authenticated, "get");
        let mut req = self.client.get(&url);
        if authenticated {
            req = req.headers(self.auth_headers()?);
        }
        self.send(req, path)
    }

    pub fn my_videos(&self) -> Result<ApiResponse> {
        self.get(MY_VIDEOS_PATH, true)
    }

    pub fn shared_videos(&self) -> Result<ApiResponse> {
        self.get(SHARED_VIDEOS_PATH, true)
    }

    /// Upload a video as multipart/form-data: `title` and `description` text
    /// fields plus a `video` file part with the declared MIME type. The file
    /// is opened here and dropped once the request has completed.
    pub fn upload_video(&self, upload: &VideoUpload) -> Result<ApiResponse> {
        let url = self.url(UPLOAD_PATH);

        let file = File::open(&upload.path)
            .with_context(|| format!("Failed to open video file {}", upload.path.display()))?;
        let len = file
            .metadata()
            .context("Failed to read video file metadata")?
            .len();
        tracing::debug!(%url, bytes = len, mime = %upload.mime, "upload");

        let part = multipart::Part::reader_with_length(file, len)
            .file_name(upload.file_name())
            .mime_str(&upload.mime)
            .with_context(|| format!("Invalid MIME type: {}", upload.mime))?;
        let form = multipart::Form::new()
            .text("title", upload.title.clone())
            .text("description", upload.description.clone())
            .part("video", part);

        let req = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .multipart(form);
        self.send(req, "upload")
    }
}
