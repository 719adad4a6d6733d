// Read-only view of the JWT payload the backend issues at login. The
// signature is never checked; the claims are only shown to the user so the
// route probe output can be matched against the role the server will see.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;

use crate::api::Role;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub id: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "organizationId")]
    pub organization_id: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Decode the payload segment of `token`. Returns `None` for anything
    /// that is not a three-part JWT with a JSON payload.
    pub fn decode(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return None,
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_backend_claims() {
        let token = token_with(json!({
            "id": "65f0c0ffee",
            "email": "nikhil.test.editor@example.com",
            "role": "editor",
            "organizationId": "org_main",
            "iat": 1_700_000_000,
            "exp": 1_700_604_800
        }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.role(), Some(Role::Editor));
        assert_eq!(claims.organization_id.as_deref(), Some("org_main"));
        assert_eq!(claims.exp, Some(1_700_604_800));
    }

    #[test]
    fn unknown_role_decodes_but_has_no_role() {
        let claims = TokenClaims::decode(&token_with(json!({"role": "superuser"}))).unwrap();
        assert_eq!(claims.role.as_deref(), Some("superuser"));
        assert!(claims.role().is_none());
    }

    #[test]
    fn opaque_tokens_are_not_claims() {
        assert!(TokenClaims::decode("not-a-jwt").is_none());
        assert!(TokenClaims::decode("a.b").is_none());
        assert!(TokenClaims::decode("a.!!!.c").is_none());
        assert!(TokenClaims::decode("a.b.c.d").is_none());
    }
}
