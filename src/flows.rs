// The four probe flows. Each one authenticates, calls its target endpoints
// one after another and returns a report; printing is left to `ui` so a
// spinner can run while requests are in flight.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{ApiClient, ApiResponse, LoginRequest, RegisterRequest, Role, VideoUpload};
use crate::claims::TokenClaims;
use crate::config::Credentials;
use crate::video::{infer_mime, upload_warnings, CreatedVideo, UploadResponse, VideoListing};

/// Timeout used by the auth check when none is configured.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_UPLOAD_TITLE: &str = "My MOV Test Upload";
pub const DEFAULT_UPLOAD_DESCRIPTION: &str = "Testing explicit mimetype";

/// Outcome of a single request: the server's answer, or the transport error
/// that prevented one.
#[derive(Debug)]
pub enum Attempt {
    Completed(ApiResponse),
    Failed(anyhow::Error),
}

impl Attempt {
    fn from_result(result: Result<ApiResponse>) -> Self {
        match result {
            Ok(resp) => Attempt::Completed(resp),
            Err(e) => Attempt::Failed(e),
        }
    }

    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Attempt::Completed(resp) => Some(resp),
            Attempt::Failed(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    /// Token from the body, only when the status is `expected`.
    fn token_if(&self, expected: StatusCode) -> Option<String> {
        self.response()
            .filter(|r| r.status == expected)
            .and_then(ApiResponse::token)
    }
}

// ---------------------------------------------------------------------------
// Auth check
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AuthReport {
    pub register: Attempt,
    /// `None` when login was skipped because registration failed.
    pub login: Option<Attempt>,
    pub duplicate: Attempt,
}

impl AuthReport {
    pub fn registered_token(&self) -> Option<String> {
        self.register.token_if(StatusCode::CREATED)
    }

    pub fn login_token(&self) -> Option<String> {
        self.login
            .as_ref()
            .and_then(|a| a.token_if(StatusCode::OK))
    }

    /// The second registration got an answer and it was not 201.
    pub fn duplicate_rejected(&self) -> bool {
        matches!(self.duplicate.status(), Some(s) if s != StatusCode::CREATED)
    }
}

/// Register, log in with the same credentials, then register again and
/// expect the backend to refuse. Transport errors are recorded, never fatal.
pub fn check_auth(api: &ApiClient, request: &RegisterRequest) -> AuthReport {
    let register = Attempt::from_result(api.register(request));

    let login = register.token_if(StatusCode::CREATED).map(|_| {
        let login = LoginRequest {
            email: request.email.clone(),
            password: request.password.clone(),
        };
        Attempt::from_result(api.login(&login))
    });

    let duplicate = Attempt::from_result(api.register(request));

    AuthReport {
        register,
        login,
        duplicate,
    }
}

/// Log in and keep the token on `api`. Any non-200 answer halts the caller.
pub fn authenticate(api: &mut ApiClient, credentials: &Credentials) -> Result<String> {
    let req = LoginRequest {
        email: credentials.email.clone(),
        password: credentials.password.clone(),
    };
    let resp = api.login(&req)?;
    if resp.status != StatusCode::OK {
        anyhow::bail!("Login failed: {} {}", resp.status, resp.pretty());
    }
    let token = resp
        .token()
        .context("Login succeeded but the response carried no token")?;
    api.set_token(&token);
    tracing::info!(email = %credentials.email, "logged in");
    Ok(token)
}

// ---------------------------------------------------------------------------
// Protected routes
// ---------------------------------------------------------------------------

/// Access tiers of the backend's test routes, least to most restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    Public,
    Authenticated,
    Editor,
    Admin,
}

impl AccessTier {
    pub fn requires_token(&self) -> bool {
        !matches!(self, AccessTier::Public)
    }

    /// Whether the backend lets a caller holding `role` through. `None`
    /// means no token. The editor route admits editors only.
    pub fn permits(&self, role: Option<Role>) -> bool {
        match (self, role) {
            (AccessTier::Public, _) => true,
            (_, None) => false,
            (AccessTier::Authenticated, Some(_)) => true,
            (AccessTier::Editor, Some(r)) => r == Role::Editor,
            (AccessTier::Admin, Some(r)) => r == Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRoute {
    pub path: &'static str,
    pub tier: AccessTier,
}

pub const PROBE_ROUTES: [ProbeRoute; 4] = [
    ProbeRoute {
        path: "/api/test/public",
        tier: AccessTier::Public,
    },
    ProbeRoute {
        path: "/api/test/protected",
        tier: AccessTier::Authenticated,
    },
    ProbeRoute {
        path: "/api/test/editor-only",
        tier: AccessTier::Editor,
    },
    ProbeRoute {
        path: "/api/test/admin-only",
        tier: AccessTier::Admin,
    },
];

#[derive(Debug)]
pub struct RouteProbe {
    pub route: ProbeRoute,
    pub with_token: bool,
    pub attempt: Attempt,
}

impl RouteProbe {
    /// Whether the backend policy should let this probe through for a
    /// token carrying `role`.
    pub fn expected_allowed(&self, role: Option<Role>) -> bool {
        let role = if self.with_token { role } else { None };
        self.route.tier.permits(role)
    }
}

#[derive(Debug)]
pub struct RoutesReport {
    pub token: String,
    pub claims: Option<TokenClaims>,
    pub probes: Vec<RouteProbe>,
}

impl RoutesReport {
    pub fn status_of(&self, path: &str, with_token: bool) -> Option<StatusCode> {
        self.probes
            .iter()
            .find(|p| p.route.path == path && p.with_token == with_token)
            .and_then(|p| p.attempt.status())
    }

    pub fn role(&self) -> Option<Role> {
        self.claims.as_ref().and_then(TokenClaims::role)
    }
}

/// Log in, then GET every test route in tier order. The public route goes
/// out without a token; the others carry it. With `anonymous`, each gated
/// route is probed a second time without a token.
pub fn probe_routes(
    api: &mut ApiClient,
    credentials: &Credentials,
    anonymous: bool,
) -> Result<RoutesReport> {
    let token = authenticate(api, credentials).context("Cannot continue without token")?;
    let claims = TokenClaims::decode(&token);

    let mut probes = Vec::new();
    for route in PROBE_ROUTES {
        let with_token = route.tier.requires_token();
        probes.push(probe(api, route, with_token));
        if anonymous && with_token {
            probes.push(probe(api, route, false));
        }
    }

    Ok(RoutesReport {
        token,
        claims,
        probes,
    })
}

fn probe(api: &ApiClient, route: ProbeRoute, with_token: bool) -> RouteProbe {
    RouteProbe {
        route,
        with_token,
        attempt: Attempt::from_result(api.get(route.path, with_token)),
    }
}

// ---------------------------------------------------------------------------
// Video listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoScope {
    Mine,
    Shared,
}

#[derive(Debug)]
pub struct ListReport {
    pub scope: VideoScope,
    pub response: ApiResponse,
    pub listing: VideoListing,
}

/// Log in and fetch the caller's own (or shared) videos.
pub fn list_videos(
    api: &mut ApiClient,
    credentials: &Credentials,
    scope: VideoScope,
) -> Result<ListReport> {
    authenticate(api, credentials)?;
    let response = match scope {
        VideoScope::Mine => api.my_videos()?,
        VideoScope::Shared => api.shared_videos()?,
    };
    let listing = VideoListing::from_response(&response);
    Ok(ListReport {
        scope,
        response,
        listing,
    })
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// What the user asked to upload, before the MIME type is settled.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub path: PathBuf,
    pub mime: Option<String>,
    pub title: String,
    pub description: String,
}

impl UploadOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mime: None,
            title: DEFAULT_UPLOAD_TITLE.to_string(),
            description: DEFAULT_UPLOAD_DESCRIPTION.to_string(),
        }
    }

    /// Resolve into a concrete upload, inferring the MIME type from the
    /// extension when none was given.
    pub fn resolve(self) -> Result<VideoUpload> {
        let mime = match self.mime {
            Some(m) => m,
            None => infer_mime(&self.path)
                .with_context(|| {
                    format!(
                        "Cannot infer a video MIME type for {}; pass one explicitly",
                        self.path.display()
                    )
                })?
                .to_string(),
        };
        Ok(VideoUpload {
            path: self.path,
            mime,
            title: self.title,
            description: self.description,
        })
    }
}

#[derive(Debug)]
pub struct UploadReport {
    pub upload: VideoUpload,
    pub warnings: Vec<String>,
    pub response: ApiResponse,
    pub created: Option<CreatedVideo>,
}

/// Log in and send one multipart upload.
pub fn upload_video(
    api: &mut ApiClient,
    credentials: &Credentials,
    options: UploadOptions,
) -> Result<UploadReport> {
    let upload = options.resolve()?;
    let size = std::fs::metadata(&upload.path)
        .with_context(|| format!("Cannot read {}", upload.path.display()))?
        .len();
    let warnings = upload_warnings(&upload.mime, size);
    for w in &warnings {
        tracing::warn!("{}", w);
    }

    authenticate(api, credentials)?;
    let response = api.upload_video(&upload)?;
    let created = response
        .parse::<UploadResponse>()
        .and_then(|r| r.video);

    Ok(UploadReport {
        upload,
        warnings,
        response,
        created,
    })
}
