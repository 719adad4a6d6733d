mod common;

use mockito::Matcher;
use reqwest::StatusCode;
use serde_json::json;

use common::{client_for, credentials, mock_login, token_for_role, EMAIL, PASSWORD};
use vidhost_probe::api::{ApiClient, LoginRequest, RegisterRequest, Role};
use vidhost_probe::flows::{authenticate, check_auth};

fn register_request() -> RegisterRequest {
    RegisterRequest {
        email: EMAIL.to_string(),
        password: PASSWORD.to_string(),
        role: Role::Editor,
        organization_id: "org_main".to_string(),
    }
}

#[test]
fn register_login_then_duplicate_is_rejected() {
    let mut server = mockito::Server::new();
    let token = token_for_role("editor");

    let expected_body = Matcher::Json(json!({
        "email": EMAIL,
        "password": PASSWORD,
        "role": "editor",
        "organizationId": "org_main"
    }));
    let created = server
        .mock("POST", "/api/auth/register")
        .match_body(expected_body.clone())
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"message": "User registered successfully", "token": token}).to_string())
        .expect(1)
        .create();
    let duplicate = server
        .mock("POST", "/api/auth/register")
        .match_body(expected_body)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"User already exists"}"#)
        .expect(1)
        .create();
    let login = mock_login(&mut server, &token);

    let api = client_for(&server);
    let report = check_auth(&api, &register_request());

    assert_eq!(report.register.status(), Some(StatusCode::CREATED));
    assert_eq!(report.registered_token().as_deref(), Some(token.as_str()));
    assert_eq!(report.login_token().as_deref(), Some(token.as_str()));
    assert_eq!(report.duplicate.status(), Some(StatusCode::BAD_REQUEST));
    assert!(report.duplicate_rejected());
    assert_eq!(
        report.duplicate.response().and_then(|r| r.message()),
        Some("User already exists")
    );

    created.assert();
    duplicate.assert();
    login.assert();
}

#[test]
fn failed_registration_skips_login() {
    let mut server = mockito::Server::new();
    let register = server
        .mock("POST", "/api/auth/register")
        .with_status(400)
        .with_body(r#"{"message":"Email, password, and Organization ID are required"}"#)
        .expect(2)
        .create();
    let login = server.mock("POST", "/api/auth/login").expect(0).create();

    let report = check_auth(&client_for(&server), &register_request());

    assert!(report.registered_token().is_none());
    assert!(report.login.is_none());
    assert!(report.duplicate_rejected());
    register.assert();
    login.assert();
}

#[test]
fn created_without_token_is_not_a_registration() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/auth/register")
        .with_status(201)
        .with_body("{}")
        .create();

    let report = check_auth(&client_for(&server), &register_request());
    assert!(report.registered_token().is_none());
    assert!(report.login.is_none());
    assert!(!report.duplicate_rejected());
}

#[test]
fn unreachable_backend_is_recorded_not_fatal() {
    let api = ApiClient::new("http://127.0.0.1:1", None).unwrap();
    let report = check_auth(&api, &register_request());

    assert!(report.register.status().is_none());
    assert!(report.login.is_none());
    assert!(report.duplicate.status().is_none());
    assert!(!report.duplicate_rejected());
}

#[test]
fn login_with_valid_credentials_returns_token() {
    let mut server = mockito::Server::new();
    let token = token_for_role("editor");
    let login = mock_login(&mut server, &token);

    let mut api = client_for(&server);
    let got = authenticate(&mut api, &credentials()).unwrap();

    assert_eq!(got, token);
    assert_eq!(api.token(), Some(token.as_str()));
    login.assert();
}

#[test]
fn login_with_invalid_credentials_fails() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(r#"{"message":"Invalid credentials"}"#)
        .create();

    let mut api = client_for(&server);
    let mut creds = credentials();
    creds.password = "wrong".to_string();
    let err = authenticate(&mut api, &creds).unwrap_err();

    assert!(err.to_string().contains("401"), "got: {err}");
    assert!(!api.has_token());

    let resp = api
        .login(&LoginRequest {
            email: creds.email,
            password: creds.password,
        })
        .unwrap();
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.token().is_none());
}
