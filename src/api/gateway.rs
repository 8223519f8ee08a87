//! The authorization gateway.
//!
//! Every API call goes through here. The gateway owns the credential pair,
//! attaches the bearer token to outgoing requests, and transparently
//! recovers from an expired access token: the first 401 seen for a request
//! triggers one refresh call and one reissue of the original request.
//! Anything else - a second 401, a non-401 error, a transport failure - is
//! surfaced to the caller untouched.
//!
//! All session mutation is funneled through this type; nothing else in the
//! crate writes tokens.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{watch, Mutex, RwLock};
use tracing::{debug, warn};

use crate::auth::{Role, SessionData, SessionState, SessionStore};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token refresh endpoint, relative to the base URL
const REFRESH_PATH: &str = "/api/users/token/refresh/";

/// Which issue of a request this is.
///
/// Passed explicitly alongside every dispatch instead of stamping a hidden
/// retry flag onto the request: a request is reissued at most once, and
/// only ever as `Retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

impl Attempt {
    pub fn is_first(self) -> bool {
        matches!(self, Attempt::First)
    }
}

/// What the gateway does with a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    /// First-time 401: attempt a token refresh, then reissue once.
    Refresh,
    /// Everything else passes through to the caller unchanged.
    Surface,
}

fn recovery_for(status: StatusCode, attempt: Attempt) -> Recovery {
    if status == StatusCode::UNAUTHORIZED && attempt.is_first() {
        Recovery::Refresh
    } else {
        Recovery::Surface
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Request gateway holding the session and the HTTP connection pool.
pub struct AuthGateway {
    http: Client,
    base_url: String,
    session: RwLock<Option<SessionData>>,
    store: SessionStore,
    /// Serializes concurrent 401 handlers so only one refresh call goes out.
    refresh_lock: Mutex<()>,
    state_tx: watch::Sender<SessionState>,
}

impl AuthGateway {
    /// Create a gateway, loading any previously persisted session.
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let session = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable session file");
            None
        });
        let initial = if session.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (state_tx, _) = watch::channel(initial);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session: RwLock::new(session),
            store,
            refresh_lock: Mutex::new(()),
            state_tx,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current lifecycle state of the session.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to session lifecycle changes. A transition to `Anonymous`
    /// is the signal to send the user back to the login screen.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Snapshot of the current session, if any.
    pub async fn session(&self) -> Option<SessionData> {
        self.session.read().await.clone()
    }

    /// Role carried by the current session. Only meaningful while an
    /// access token is held.
    pub async fn role(&self) -> Option<Role> {
        self.session.read().await.as_ref().map(|d| d.role)
    }

    /// Install a freshly minted session (login) and persist it.
    pub async fn install_session(&self, data: SessionData) -> anyhow::Result<()> {
        self.store.save(&data)?;
        *self.session.write().await = Some(data);
        self.state_tx.send_replace(SessionState::Authenticated);
        Ok(())
    }

    /// Destroy the session in memory and on disk (logout, fatal refresh
    /// failure). Safe to call when no session exists.
    pub async fn clear_session(&self) {
        *self.session.write().await = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to remove persisted session");
        }
        self.state_tx.send_replace(SessionState::Anonymous);
    }

    // ===== Request execution =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send_with_retry(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::to_body(body)?;
        let response = self.send_with_retry(Method::POST, path, Some(body)).await?;
        Self::decode(response).await
    }

    /// POST where the response body is irrelevant (e.g. logout).
    pub async fn post_no_content<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let body = Self::to_body(body)?;
        self.send_with_retry(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = Self::to_body(body)?;
        let response = self.send_with_retry(Method::PUT, path, Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_with_retry(Method::DELETE, path, None).await?;
        Ok(())
    }

    /// POST without credentials or retry. Used for login and registration,
    /// which must never carry a stale bearer token.
    pub async fn post_public<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        if response.status().is_success() {
            Self::decode(response).await
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Issue a request, recovering once from a first-time 401 via refresh.
    /// Returns the successful response; every failure is already mapped.
    async fn send_with_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ApiError> {
        let sent_token = self.access_token().await;
        let response = self
            .dispatch(&method, path, body.as_ref(), Attempt::First)
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match recovery_for(status, Attempt::First) {
            Recovery::Surface => Err(Self::error_from(response).await),
            Recovery::Refresh => {
                debug!(path, "Access token rejected, attempting refresh");
                self.refresh_access_token(sent_token).await?;

                let retry = self
                    .dispatch(&method, path, body.as_ref(), Attempt::Retry)
                    .await?;
                // A second 401 here surfaces as-is: recovery_for never
                // refreshes on a Retry attempt.
                if retry.status().is_success() {
                    Ok(retry)
                } else {
                    Err(Self::error_from(retry).await)
                }
            }
        }
    }

    /// Build and send one request. Attaches the bearer token when a
    /// session exists; this step never fails.
    async fn dispatch(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        attempt: Attempt,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.attach(self.http.request(method.clone(), &url)).await;
        if let Some(body) = body {
            request = request.json(body);
        }
        debug!(%url, ?attempt, "Dispatching request");
        request.send().await.map_err(ApiError::from)
    }

    async fn attach(&self, request: RequestBuilder) -> RequestBuilder {
        let guard = self.session.read().await;
        match guard.as_ref() {
            Some(data) => request.bearer_auth(&data.access_token),
            None => request,
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `sent_token` is the access token the failed request went out with.
    /// Concurrent 401 handlers serialize on the refresh lock; a handler
    /// that wins the lock and finds the token already rotated skips the
    /// redundant refresh call.
    ///
    /// On refresh failure the whole session is destroyed and the caller
    /// receives the refresh failure, not the original 401. When no refresh
    /// token exists, the stored session is left untouched and the 401 is
    /// surfaced.
    async fn refresh_access_token(&self, sent_token: Option<String>) -> Result<(), ApiError> {
        let refresh_token = {
            let guard = self.session.read().await;
            match guard.as_ref() {
                Some(data) => data.refresh_token.clone(),
                None => return Err(ApiError::Unauthorized),
            }
        };

        let _refresh_guard = self.refresh_lock.lock().await;

        // Re-check under the lock: another task may have finished a refresh
        // (or torn the session down) while we waited.
        {
            let guard = self.session.read().await;
            match guard.as_ref() {
                Some(data) if Some(&data.access_token) != sent_token.as_ref() => {
                    debug!("Access token already rotated by concurrent refresh");
                    return Ok(());
                }
                Some(_) => {}
                None => return Err(ApiError::RefreshRejected),
            }
        }

        self.state_tx.send_replace(self.state().begin_refresh());

        let url = format!("{}{}", self.base_url, REFRESH_PATH);
        let body = serde_json::json!({ "refresh": refresh_token });
        let result = self.http.post(&url).json(&body).send().await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Refresh call failed to reach the server");
                self.clear_session().await;
                return Err(ApiError::Network(e));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "Refresh token rejected");
            self.clear_session().await;
            return Err(ApiError::RefreshRejected);
        }

        let decoded = Self::decode::<RefreshResponse>(response).await;
        self.apply_refresh_result(decoded).await
    }

    /// Commit the outcome of a refresh call to the session and the state
    /// machine. `Refreshing` only ever exits to `Authenticated` or
    /// `Anonymous`: an undecodable refresh body counts as a refresh
    /// failure and tears the session down like a rejected token.
    async fn apply_refresh_result(
        &self,
        decoded: Result<RefreshResponse, ApiError>,
    ) -> Result<(), ApiError> {
        let refreshed = match decoded {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!(error = %e, "Refresh response was undecodable");
                self.clear_session().await;
                return Err(ApiError::RefreshRejected);
            }
        };

        // Swap the access token in place: role and refresh token survive.
        {
            let mut guard = self.session.write().await;
            if let Some(data) = guard.as_mut() {
                data.access_token = refreshed.access;
                if let Err(e) = self.store.save(data) {
                    warn!(error = %e, "Failed to persist refreshed session");
                }
            }
        }
        self.state_tx.send_replace(self.state().finish_refresh(true));
        debug!("Access token refreshed");
        Ok(())
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|d| d.access_token.clone())
    }

    fn to_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode request body: {}", e)))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, &body)
    }
}
