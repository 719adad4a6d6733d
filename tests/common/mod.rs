#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

use vidhost_probe::api::ApiClient;
use vidhost_probe::config::Credentials;

pub const EMAIL: &str = "nikhil.test.editor@example.com";
pub const PASSWORD: &str = "testpass123";

pub fn credentials() -> Credentials {
    Credentials {
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
    }
}

pub fn client_for(server: &ServerGuard) -> ApiClient {
    ApiClient::new(&server.url(), None).unwrap()
}

/// A JWT-shaped token whose payload carries `role`. The signature is junk.
pub fn token_for_role(role: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "id": "65f1a2b3c4d5e6f708192a3b",
            "email": EMAIL,
            "role": role,
            "organizationId": "org_main",
            "iat": 1_760_000_000,
            "exp": 1_760_604_800
        })
        .to_string(),
    );
    format!("{header}.{payload}.dGVzdC1zaWduYXR1cmU")
}

/// Login mock that accepts the default credentials and returns `token`.
pub fn mock_login(server: &mut ServerGuard, token: &str) -> Mock {
    server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({"email": EMAIL, "password": PASSWORD})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "message": "Login successful",
                "token": token,
                "user": {"id": "65f1a2b3c4d5e6f708192a3b", "email": EMAIL, "role": "editor", "organizationId": "org_main"}
            })
            .to_string(),
        )
        .create()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
