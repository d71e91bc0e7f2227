/// Synchronous client for the **leaderboard backend API**.
///
/// Covers the user and game endpoints and returns the typed responses from
/// `models`. Reads are public; writes need a bearer token taken from a
/// caller-owned [`Session`].
///
/// ### Notes
/// - Query strings are form-encoded with every key present (empty when unset),
///   which is what the backend's parameter parsing expects.
/// - GET requests retry transient failures (5xx, connect errors, timeouts).
/// - A `401` invalidates the session and surfaces as [`ApiError::Unauthorized`];
///   the caller decides when to send the user through the login page again.
///
/// Typical usage:
/// ```no_run
/// # use leaderboard_rs::api::{Client, UserQuery};
/// let client = Client::new("https://leaderboard.example.com")?;
/// let page = client.fetch_users(&UserQuery::region("europe").with_pagesize(20))?;
/// for user in &page.users {
///     println!("{} {}", user.username, user.elo);
/// }
/// # Ok::<(), leaderboard_rs::api::ApiError>(())
/// ```
use crate::auth::{AuthError, Session};
use crate::models::{
    AddGameRequest, AddGameResponse, FetchGameResponse, FetchUserResponse, UpdateUserRequest,
    UpdateUserResponse,
};
use chrono::Utc;
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::redirect::Policy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Largest page the backend serves; bigger requests are clamped.
pub const MAX_PAGESIZE: u32 = 100;

const RETRY_BACKOFF_MS: [u64; 3] = [100, 300, 700];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not authorized; sign in again")]
    Unauthorized,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request failed with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base url {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// True when the user has to go through the login page before retrying.
    pub fn needs_sign_in(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::Auth(_))
    }
}

// application/x-www-form-urlencoded: keep `*-._` and alphanumerics, spaces become `+`.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b' ');

fn form_component(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, FORM)
        .to_string()
        .replace(' ', "+")
}

/// Serialize key/value pairs as a form-encoded query string, in order.
pub fn form_encode(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", form_component(k), form_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Filters for `/api/user/fetch`. The backend evaluates `username` first, then
/// `elo`, then falls back to paging through `region`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserQuery {
    pub username: String,
    pub region: String,
    pub pagesize: Option<u32>,
    pub elo: Option<i64>,
    pub lastpagekey: String,
}

impl UserQuery {
    pub fn region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }

    pub fn with_pagesize(mut self, pagesize: u32) -> Self {
        self.pagesize = Some(pagesize.min(MAX_PAGESIZE));
        self
    }

    pub fn with_elo(mut self, elo: i64) -> Self {
        self.elo = Some(elo);
        self
    }

    /// Continue after the cursor returned as `newpagekey` by the previous page.
    pub fn after(mut self, lastpagekey: impl Into<String>) -> Self {
        self.lastpagekey = lastpagekey.into();
        self
    }

    pub fn to_query_string(&self) -> String {
        let pagesize = self
            .pagesize
            .map(|p| p.min(MAX_PAGESIZE).to_string())
            .unwrap_or_default();
        let elo = self.elo.map(|e| e.to_string()).unwrap_or_default();
        form_encode(&[
            ("username", self.username.as_str()),
            ("region", self.region.as_str()),
            ("pagesize", pagesize.as_str()),
            ("elo", elo.as_str()),
            ("lastpagekey", self.lastpagekey.as_str()),
        ])
    }
}

/// Filters for `/api/game/fetch`: by id, or every game of a date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameQuery {
    pub gameid: String,
    pub date: String,
}

impl GameQuery {
    pub fn by_id(gameid: impl Into<String>) -> Self {
        Self {
            gameid: gameid.into(),
            ..Default::default()
        }
    }

    pub fn by_date(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    pub fn to_query_string(&self) -> String {
        form_encode(&[("gameid", self.gameid.as_str()), ("date", self.date.as_str())])
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("leaderboard_rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str, query: Option<String>) -> String {
        match query {
            Some(q) => format!("{}{}?{}", self.base_url, path, q),
            None => format!("{}{}", self.base_url, path),
        }
    }

    /// Fetch one page of users.
    pub fn fetch_users(&self, query: &UserQuery) -> Result<FetchUserResponse, ApiError> {
        let url = self.url("/api/user/fetch", Some(query.to_query_string()));
        decode(check_status(self.get(&url)?)?)
    }

    /// Follow `newpagekey` cursors starting at `query`, stopping after
    /// `max_pages` pages or when the backend returns no further cursor.
    pub fn fetch_user_pages(
        &self,
        query: &UserQuery,
        max_pages: usize,
    ) -> Result<Vec<FetchUserResponse>, ApiError> {
        let mut pages = Vec::new();
        let mut next = query.clone();
        while pages.len() < max_pages {
            let page = self.fetch_users(&next)?;
            let cursor = page.newpagekey.clone();
            pages.push(page);
            if cursor.is_empty() || !next.username.is_empty() || next.elo.is_some() {
                break;
            }
            next = next.after(cursor);
        }
        Ok(pages)
    }

    pub fn fetch_games(&self, query: &GameQuery) -> Result<FetchGameResponse, ApiError> {
        let url = self.url("/api/game/fetch", Some(query.to_query_string()));
        decode(check_status(self.get(&url)?)?)
    }

    /// Confirm a participant's result with the code mailed to them. Returns the
    /// backend's plain-text confirmation message.
    pub fn confirm_game(&self, gameid: &str, username: &str, code: &str) -> Result<String, ApiError> {
        let query = form_encode(&[("gameid", gameid), ("username", username), ("code", code)]);
        let url = self.url("/api/game/confirm", Some(query));
        let resp = check_status(self.get(&url)?)?;
        Ok(resp.text()?.trim().to_string())
    }

    /// Register or update the signed-in user.
    pub fn update_user(
        &self,
        session: &mut Session,
        request: &UpdateUserRequest,
    ) -> Result<UpdateUserResponse, ApiError> {
        self.post_authorized(session, "/api/user/update", request)
    }

    pub fn add_game(
        &self,
        session: &mut Session,
        request: &AddGameRequest,
    ) -> Result<AddGameResponse, ApiError> {
        self.post_authorized(session, "/api/game/add", request)
    }

    // Small retry for transient failures (5xx / network errors)
    fn get(&self, url: &str) -> Result<Response, ApiError> {
        let mut attempt = 0;
        loop {
            debug!("GET {}", url);
            let result = self.http.get(url).send();
            let transient = match &result {
                Ok(r) => r.status().is_server_error(),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if !transient || attempt >= RETRY_BACKOFF_MS.len() {
                return Ok(result?);
            }
            warn!("GET {} failed transiently (attempt {}), retrying", url, attempt + 1);
            std::thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS[attempt]));
            attempt += 1;
        }
    }

    fn post_authorized<B: Serialize, T: DeserializeOwned>(
        &self,
        session: &mut Session,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let token = session.bearer(Utc::now())?.to_string();
        let url = self.url(path, None);
        debug!("POST {}", url);
        let resp = self.http.post(&url).bearer_auth(token).json(body).send()?;
        match check_status(resp) {
            Err(ApiError::Unauthorized) => {
                session.invalidate();
                Err(ApiError::Unauthorized)
            }
            other => decode(other?),
        }
    }
}

fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    let message = resp.text().unwrap_or_default().trim().to_string();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let bytes = resp.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
}
