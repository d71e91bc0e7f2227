//! OAuth implicit-flow sign-in for the leaderboard backend.
//!
//! The identity provider redirects back with the tokens in the URL fragment.
//! Instead of parking them in ambient storage, this module turns them into an
//! expiring [`Credential`] held by a caller-owned [`Session`]. Every authorized
//! request asks the session for a bearer token, which is where expiry is checked
//! and where the session moves to [`SessionState::Expired`].
//!
//! ```
//! use leaderboard_rs::auth::AuthConfig;
//!
//! let cfg = AuthConfig::new("auth.example.com", "my-client");
//! let url = cfg.login_url("http://localhost:5173/");
//! assert!(url.starts_with("https://auth.example.com/login?client_id=my-client"));
//! ```

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::info;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::form_encode;

pub const DEFAULT_SCOPES: &str = "openid profile email";
pub const DEFAULT_RESPONSE_TYPE: &str = "token";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("callback did not contain an id_token")]
    MissingToken,
    #[error("malformed id token: {0}")]
    Malformed(String),
    #[error("token carries no expiry (neither an exp claim nor expires_in)")]
    MissingExpiry,
    #[error("credential expired at {0}")]
    Expired(DateTime<Utc>),
    #[error("not signed in")]
    SignedOut,
}

/// Identity provider settings for the hosted login page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub domain: String,
    pub client_id: String,
    pub scopes: String,
    pub response_type: String,
}

impl AuthConfig {
    pub fn new(domain: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            scopes: DEFAULT_SCOPES.into(),
            response_type: DEFAULT_RESPONSE_TYPE.into(),
        }
    }

    /// URL of the hosted login page; the provider redirects to `redirect_uri`
    /// with the tokens in the fragment.
    pub fn login_url(&self, redirect_uri: &str) -> String {
        let domain = self.domain.trim().trim_end_matches('/');
        let origin = if domain.contains("://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };
        let query = form_encode(&[
            ("client_id", self.client_id.as_str()),
            ("response_type", self.response_type.as_str()),
            ("scope", self.scopes.as_str()),
            ("redirect_uri", redirect_uri),
        ]);
        format!("{}/login?{}", origin, query)
    }
}

/// Raw values carried by the redirect fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenResponse {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
}

/// Parse the fragment of a redirect callback.
///
/// Accepts a full URL (`https://app/#id_token=...`), a bare fragment with or
/// without the leading `#`, or a query-style `?id_token=...` for providers that
/// put the values in the query string.
pub fn parse_callback(input: &str) -> TokenResponse {
    let input = input.trim();
    let params = match input.split_once('#') {
        Some((_, frag)) => frag,
        None => match input.split_once('?') {
            Some((_, q)) => q,
            None => input,
        },
    };

    let mut out = TokenResponse::default();
    for pair in params.split('&').filter(|p| !p.is_empty()) {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let v = form_decode(v);
        if v.is_empty() {
            continue;
        }
        match k {
            "id_token" => out.id_token = Some(v),
            "access_token" => out.access_token = Some(v),
            "expires_in" => out.expires_in = v.parse().ok(),
            "token_type" => out.token_type = Some(v),
            _ => {}
        }
    }
    out
}

fn form_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

/// Claims of the identity token the UI cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdClaims {
    #[serde(default)]
    pub sub: String,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
    pub preferred_username: Option<String>,
    #[serde(rename = "cognito:username")]
    pub cognito_username: Option<String>,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub picture: Option<String>,
}

impl IdClaims {
    /// Best display name available.
    pub fn display_name(&self) -> &str {
        self.preferred_username
            .as_deref()
            .or(self.cognito_username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// Decode the payload of a JWT without checking its signature. The backend
/// verifies the token; the client only reads expiry and profile fields.
pub fn decode_claims(id_token: &str) -> Result<IdClaims, AuthError> {
    let mut parts = id_token.split('.');
    let (Some(_header), Some(payload), Some(_sig), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(AuthError::Malformed("expected three dot-separated parts".into()));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::Malformed(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Malformed(format!("payload is not a claims object: {e}")))
}

/// An identity token plus the instant it stops being accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id_token: String,
    pub access_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Build a credential from a parsed callback. The `exp` claim wins over
    /// `expires_in` because it is anchored to the issuer's clock.
    pub fn from_callback(tokens: TokenResponse, now: DateTime<Utc>) -> Result<Self, AuthError> {
        let id_token = tokens.id_token.ok_or(AuthError::MissingToken)?;
        let claims = decode_claims(&id_token)?;
        let expires_at = match (claims.exp, tokens.expires_in) {
            (Some(exp), _) => Utc
                .timestamp_opt(exp, 0)
                .single()
                .ok_or_else(|| AuthError::Malformed(format!("exp out of range: {exp}")))?,
            (None, Some(secs)) => now + Duration::seconds(secs),
            (None, None) => return Err(AuthError::MissingExpiry),
        };
        Ok(Self {
            id_token,
            access_token: tokens.access_token,
            expires_at,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn claims(&self) -> Result<IdClaims, AuthError> {
        decode_claims(&self.id_token)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SignedOut,
    Active(Credential),
    Expired { expired_at: DateTime<Utc> },
}

/// Caller-owned sign-in state, passed `&mut` to authorized API calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl Session {
    pub fn signed_out() -> Self {
        Self {
            state: SessionState::SignedOut,
        }
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            state: SessionState::Active(credential),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn credential(&self) -> Option<&Credential> {
        match &self.state {
            SessionState::Active(c) => Some(c),
            _ => None,
        }
    }

    pub fn sign_in(&mut self, credential: Credential) {
        info!("session signed in, expires at {}", credential.expires_at);
        self.state = SessionState::Active(credential);
    }

    /// Drop the credential, e.g. after the backend answered 401.
    pub fn invalidate(&mut self) {
        if !matches!(self.state, SessionState::SignedOut) {
            info!("session invalidated");
        }
        self.state = SessionState::SignedOut;
    }

    /// The bearer token for an authorized request. An expired credential moves
    /// the session to `Expired` and is never handed out.
    pub fn bearer(&mut self, now: DateTime<Utc>) -> Result<&str, AuthError> {
        let lapsed = match &self.state {
            SessionState::Active(c) if c.is_expired(now) => Some(c.expires_at),
            _ => None,
        };
        if let Some(expired_at) = lapsed {
            info!("session expired at {}", expired_at);
            self.state = SessionState::Expired { expired_at };
        }
        match &self.state {
            SessionState::Active(c) => Ok(c.id_token.as_str()),
            SessionState::Expired { expired_at } => Err(AuthError::Expired(*expired_at)),
            SessionState::SignedOut => Err(AuthError::SignedOut),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn decode_rejects_wrong_shape() {
        assert!(matches!(decode_claims("abc"), Err(AuthError::Malformed(_))));
        assert!(matches!(decode_claims("a.b.c.d"), Err(AuthError::Malformed(_))));
        assert!(matches!(decode_claims("a.!!!.c"), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn display_name_prefers_username() {
        let c = decode_claims(&token_with(
            r#"{"sub":"s-1","email":"a@b.c","preferred_username":"alice"}"#,
        ))
        .unwrap();
        assert_eq!(c.display_name(), "alice");
        let c = decode_claims(&token_with(r#"{"sub":"s-1"}"#)).unwrap();
        assert_eq!(c.display_name(), "s-1");
    }

    #[test]
    fn expires_in_used_without_exp_claim() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let tokens = TokenResponse {
            id_token: Some(token_with(r#"{"sub":"x"}"#)),
            expires_in: Some(60),
            ..Default::default()
        };
        let c = Credential::from_callback(tokens, now).unwrap();
        assert_eq!(c.expires_at.timestamp(), 1_060);
    }

    #[test]
    fn missing_expiry_is_an_error() {
        let tokens = TokenResponse {
            id_token: Some(token_with(r#"{"sub":"x"}"#)),
            ..Default::default()
        };
        assert_eq!(
            Credential::from_callback(tokens, Utc::now()),
            Err(AuthError::MissingExpiry)
        );
    }
}
