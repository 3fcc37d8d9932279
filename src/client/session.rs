//! Session state and the authenticated request pipeline.
//!
//! Every resource call goes through [`Session::api_request`], which
//! - waits for a login already in flight,
//! - logs in lazily when the session has credentials but no token yet,
//! - follows redirects itself (at most [`MAX_REDIRECTS`] hops),
//! - on a 403 for an authenticated call, reauthenticates once through a single-winner gate
//!   and retries the request exactly once.
//!
//! Redirect following and the 403 retry never compose into a second reauthentication.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{OnceCell, broadcast};
use tracing::{debug, info, warn};

use super::gate::ReauthenticationGate;
use super::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, Protocol};
use super::pending::PendingOperations;
use super::{ServiceFault, YouMailError};
use crate::domain::{AuthToken, Password, Username, ValidationError};
use crate::transport::{
    DataFormat, build_url, cache_buster, decode_error_envelope, decode_login_token,
    resolve_redirect,
};

/// Login endpoint; credentials travel in headers, not in the body.
pub const LOGIN_PATH: &str = "/api/v4/authenticate";
pub const USERNAME_HEADER: &str = "X-YouMail-Username";
pub const PASSWORD_HEADER: &str = "X-YouMail-Password";
/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

const AUTHORIZATION_SCHEME: &str = "YouMail";
const AUTHORIZATION_HEADER: &str = "Authorization";
const LOGIN_PROTOCOL: Protocol = Protocol::Https;
const FORBIDDEN: u16 = 403;
const SEE_OTHER: u16 = 303;
const AUTH_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
/// Username/password pair used for (re)login.
pub struct Credentials {
    username: Username,
    password: Password,
}

impl Credentials {
    /// Validate both parts; see [`Username`] and [`Password`] for the rules.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            username: Username::new(username)?,
            password: Password::new(password)?,
        })
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Broadcast whenever the session token is set, including when it is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationChanged {
    pub username: Option<Username>,
    pub token: Option<AuthToken>,
}

#[derive(Debug, Clone)]
/// One call through [`Session::api_request`].
///
/// Requests require authentication unless [`ApiRequest::anonymous`] is used.
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    requires_auth: bool,
    headers: Vec<(String, String)>,
    protocol: Option<Protocol>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            requires_auth: true,
            headers: Vec::new(),
            protocol: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(HttpMethod::Post, path).body(body)
    }

    pub fn put(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self::new(HttpMethod::Put, path).body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Send without an `Authorization` header and never reauthenticate.
    pub fn anonymous(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Force the scheme regardless of [`Session::secure_connections`].
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }
}

#[derive(Debug, Default)]
struct SessionState {
    auth_token: Option<AuthToken>,
    /// Pre-rendered `Authorization` value for `auth_token`.
    authorization: Option<String>,
    is_connected: bool,
    authentication_failed: bool,
    has_attempted_login: bool,
}

/// Token as seen by one attempt, taken before sending.
#[derive(Debug, Clone, Default)]
struct AuthSnapshot {
    token: Option<AuthToken>,
    authorization: Option<String>,
    /// Completed reauthentications at snapshot time.
    reauthentications: u64,
}

type LoginAttempt = Arc<OnceCell<Result<(), YouMailError>>>;

/// One attempt after redirects were followed.
enum RequestOutcome {
    Success(HttpResponse),
    /// 403 that a fresh login may fix.
    AuthRequired(HttpResponse),
    Failure(YouMailError),
}

pub(crate) struct SessionConfig {
    pub host: String,
    pub format: DataFormat,
    pub secure_connections: bool,
    pub credentials: Option<Credentials>,
    pub auth_token: Option<AuthToken>,
    pub pending: Arc<PendingOperations>,
}

/// One logical connection to the service.
///
/// Safe to share between tasks; all state is behind short-lived locks or atomics.
pub struct Session {
    credentials: Option<Credentials>,
    host: String,
    format: DataFormat,
    secure_connections: AtomicBool,
    state: RwLock<SessionState>,
    pending_login: Mutex<Option<LoginAttempt>>,
    reauthentication: ReauthenticationGate,
    pending: Arc<PendingOperations>,
    auth_events: broadcast::Sender<AuthenticationChanged>,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username())
            .field("host", &self.host)
            .field("format", &self.format)
            .field("secure_connections", &self.secure_connections())
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(config: SessionConfig, http: Arc<dyn HttpTransport>) -> Self {
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        let authorization = config.auth_token.as_ref().map(render_authorization);
        Self {
            credentials: config.credentials,
            host: config.host,
            format: config.format,
            secure_connections: AtomicBool::new(config.secure_connections),
            state: RwLock::new(SessionState {
                auth_token: config.auth_token,
                authorization,
                ..SessionState::default()
            }),
            pending_login: Mutex::new(None),
            reauthentication: ReauthenticationGate::default(),
            pending: config.pending,
            auth_events,
            http,
        }
    }

    pub fn username(&self) -> Option<&Username> {
        self.credentials.as_ref().map(Credentials::username)
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// `true` while the session has credentials and the last login did not fail.
    ///
    /// A fresh session with credentials reports `true` before any login: authentication
    /// happens lazily on first use.
    pub fn is_logged_in(&self) -> bool {
        self.has_credentials() && !self.state.read().authentication_failed
    }

    /// Whether the last request reached the server (any HTTP status counts).
    pub fn is_connected(&self) -> bool {
        self.state.read().is_connected
    }

    pub fn authentication_failed(&self) -> bool {
        self.state.read().authentication_failed
    }

    pub fn has_attempted_login(&self) -> bool {
        self.state.read().has_attempted_login
    }

    pub fn secure_connections(&self) -> bool {
        self.secure_connections.load(Ordering::Relaxed)
    }

    pub fn set_secure_connections(&self, secure: bool) {
        self.secure_connections.store(secure, Ordering::Relaxed);
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn auth_token(&self) -> Option<AuthToken> {
        self.state.read().auth_token.clone()
    }

    /// `Authorization` header value attached to authenticated requests.
    pub fn authorization_header(&self) -> Option<String> {
        self.state.read().authorization.clone()
    }

    /// Replace the token and notify subscribers. Every call notifies, even with an
    /// unchanged value.
    pub fn set_auth_token(&self, token: Option<AuthToken>) {
        let authorization = token.as_ref().map(render_authorization);
        {
            let mut state = self.state.write();
            state.auth_token = token.clone();
            state.authorization = authorization;
        }
        let _ = self.auth_events.send(AuthenticationChanged {
            username: self.username().cloned(),
            token,
        });
    }

    /// Token changes, in order. Use this to persist refreshed tokens.
    pub fn subscribe_authentication(&self) -> broadcast::Receiver<AuthenticationChanged> {
        self.auth_events.subscribe()
    }

    pub fn pending_operations(&self) -> &Arc<PendingOperations> {
        &self.pending
    }

    pub fn login_in_flight(&self) -> bool {
        self.pending_login.lock().is_some()
    }

    /// Log in with the stored credentials.
    ///
    /// Concurrent callers share one attempt and all observe its result.
    ///
    /// Errors:
    /// - [`YouMailError::MissingCredentials`] when the session has none,
    /// - [`YouMailError::Service`] when the login endpoint rejects the request,
    /// - [`YouMailError::InvalidResponse`] when it answers without a token.
    pub async fn login(&self) -> Result<(), YouMailError> {
        let attempt = {
            let mut slot = self.pending_login.lock();
            Arc::clone(slot.get_or_insert_with(|| Arc::new(OnceCell::new())))
        };
        self.finish_login(attempt).await
    }

    /// Wait for a login in flight, then report [`Session::is_logged_in`].
    pub async fn login_wait(&self) -> bool {
        if self.has_credentials() {
            let in_flight = self.pending_login.lock().clone();
            if let Some(attempt) = in_flight {
                let _ = self.finish_login(attempt).await;
            }
        }
        self.is_logged_in()
    }

    async fn finish_login(&self, attempt: LoginAttempt) -> Result<(), YouMailError> {
        let waiter = LoginWaiter {
            slot: &self.pending_login,
            attempt,
        };
        waiter
            .attempt
            .get_or_init(|| self.perform_login())
            .await
            .clone()
    }

    async fn perform_login(&self) -> Result<(), YouMailError> {
        let Some(credentials) = self.credentials.as_ref() else {
            return Err(YouMailError::MissingCredentials);
        };

        self.state.write().has_attempted_login = true;
        self.set_auth_token(None);
        info!(username = %credentials.username, "logging in");

        match self.request_token(credentials).await {
            Ok(token) => {
                self.set_auth_token(Some(token));
                self.state.write().authentication_failed = false;
                info!(username = %credentials.username, "login succeeded");
                Ok(())
            }
            Err(err) => {
                self.state.write().authentication_failed = true;
                warn!(username = %credentials.username, error = %err, "login failed");
                Err(err)
            }
        }
    }

    async fn request_token(&self, credentials: &Credentials) -> Result<AuthToken, YouMailError> {
        let request = ApiRequest::get(LOGIN_PATH)
            .anonymous()
            .header(USERNAME_HEADER, credentials.username.as_str())
            .header(PASSWORD_HEADER, credentials.password.as_str())
            .protocol(LOGIN_PROTOCOL);

        let _pending = self.pending.begin();
        let response = self
            .send_following_redirects(&request, &AuthSnapshot::default())
            .await?;
        if !response.is_success() {
            return Err(self.classify_failure(&request, &response));
        }

        let token = decode_login_token(self.format, &response.body)?
            .ok_or(YouMailError::InvalidResponse("login response carried no token"))?;
        AuthToken::new(token)
            .map_err(|_| YouMailError::InvalidResponse("login response carried a malformed token"))
    }

    /// Issue `request`, handling login, redirects, and one reauthentication retry.
    ///
    /// Errors:
    /// - [`YouMailError::Validation`] for an empty path,
    /// - [`YouMailError::Transport`] when the request never got an HTTP response,
    /// - [`YouMailError::AuthenticationRequired`] for a 403 that survived reauthentication,
    /// - [`YouMailError::Service`] for any other non-2xx status,
    /// - login errors when reauthentication itself fails.
    pub async fn api_request(&self, request: ApiRequest) -> Result<HttpResponse, YouMailError> {
        if request.path.trim().is_empty() {
            return Err(ValidationError::Empty { field: "path" }.into());
        }

        let _pending = self.pending.begin();

        if request.requires_auth {
            self.login_wait().await;
        }

        let first = self.auth_snapshot();
        if request.requires_auth && self.has_credentials() && first.token.is_none() {
            debug!(path = %request.path, "no session token yet, logging in before sending");
        } else {
            let response = self.send_following_redirects(&request, &first).await?;
            match self.classify(&request, response) {
                RequestOutcome::Success(response) => return Ok(response),
                RequestOutcome::Failure(err) => return Err(err),
                RequestOutcome::AuthRequired(_) => {
                    warn!(path = %request.path, "request forbidden, reauthenticating");
                }
            }
        }

        self.reauthenticate(&first).await?;

        let retry = self.auth_snapshot();
        let response = self.send_following_redirects(&request, &retry).await?;
        match self.classify(&request, response) {
            RequestOutcome::Success(response) => Ok(response),
            RequestOutcome::AuthRequired(response) => {
                Err(self.classify_failure(&request, &response))
            }
            RequestOutcome::Failure(err) => Err(err),
        }
    }

    fn classify(&self, request: &ApiRequest, response: HttpResponse) -> RequestOutcome {
        if response.is_success() {
            RequestOutcome::Success(response)
        } else if request.requires_auth
            && response.status == FORBIDDEN
            && self.has_credentials()
        {
            RequestOutcome::AuthRequired(response)
        } else {
            RequestOutcome::Failure(self.classify_failure(request, &response))
        }
    }

    /// Refresh the token after the one in `stale` was rejected. Only one caller logs in; the
    /// rest wait for it and report success so they get their single retry.
    async fn reauthenticate(&self, stale: &AuthSnapshot) -> Result<(), YouMailError> {
        let ticket = self.reauthentication.ticket();
        match self.reauthentication.try_acquire() {
            Some(_guard) => {
                if self.reauthentication.completed() != stale.reauthentications {
                    debug!("reauthentication already ran since this request was sent");
                    return Ok(());
                }
                let current = self.auth_token();
                if current.is_some() && current != stale.token {
                    debug!("token already refreshed by another request");
                    return Ok(());
                }
                self.login().await
            }
            None => {
                debug!("waiting for reauthentication in progress");
                self.reauthentication.wait(ticket).await;
                Ok(())
            }
        }
    }

    async fn send_following_redirects(
        &self,
        request: &ApiRequest,
        auth: &AuthSnapshot,
    ) -> Result<HttpResponse, YouMailError> {
        let protocol = request.protocol.unwrap_or(if self.secure_connections() {
            Protocol::Https
        } else {
            Protocol::Http
        });
        let cache_bust = (request.method == HttpMethod::Get).then(cache_buster);
        let mut url = build_url(
            protocol.scheme(),
            &self.host,
            &request.path,
            &request.query,
            cache_bust,
        )
        .map_err(|err| YouMailError::InvalidUrl(err.to_string()))?;
        let original_query = url.query().map(str::to_owned);
        let mut headers = self.request_headers(request, auth);
        let mut method = request.method;
        let mut body = request.body.clone();

        let mut redirects = 0;
        loop {
            debug!(method = %method, path = url.path(), "sending request");
            let sent = self
                .http
                .send(HttpRequest {
                    method,
                    url: url.to_string(),
                    headers: headers.clone(),
                    body: body.clone(),
                })
                .await;

            let response = match sent {
                Ok(response) => {
                    self.state.write().is_connected = true;
                    response
                }
                Err(err) => {
                    self.state.write().is_connected = false;
                    warn!(path = url.path(), error = %err, "transport failure");
                    return Err(YouMailError::Transport(Arc::from(err)));
                }
            };

            if !response.is_redirect() {
                return Ok(response);
            }
            let Some(location) = response.header("Location") else {
                return Ok(response);
            };
            if redirects == MAX_REDIRECTS {
                return Err(YouMailError::TooManyRedirects {
                    limit: MAX_REDIRECTS,
                });
            }
            redirects += 1;

            let target = resolve_redirect(&url, location, original_query.as_deref())
                .map_err(|err| YouMailError::InvalidUrl(err.to_string()))?;
            if url.scheme() == Protocol::Https.scheme() && target.scheme() != url.scheme() {
                warn!(from = %url.origin().ascii_serialization(), "refusing redirect off https");
                return Err(YouMailError::InsecureRedirect {
                    location: target.origin().ascii_serialization(),
                });
            }
            if target.origin() != url.origin() {
                headers.retain(|(name, _)| !is_credential_header(name));
            }
            if response.status == SEE_OTHER && method != HttpMethod::Get {
                method = HttpMethod::Get;
                body = None;
                headers.retain(|(name, _)| !name.eq_ignore_ascii_case("Content-Type"));
            }
            url = target;
            debug!(status = response.status, hop = redirects, to = url.path(), "following redirect");
        }
    }

    fn request_headers(&self, request: &ApiRequest, auth: &AuthSnapshot) -> Vec<(String, String)> {
        let mut headers = vec![("Accept".to_owned(), self.format.content_type().to_owned())];
        if request.body.is_some() {
            headers.push((
                "Content-Type".to_owned(),
                self.format.content_type().to_owned(),
            ));
        }
        if request.requires_auth {
            if let Some(authorization) = &auth.authorization {
                headers.push((AUTHORIZATION_HEADER.to_owned(), authorization.clone()));
            }
        }
        headers.extend(request.headers.iter().cloned());
        headers
    }

    fn classify_failure(&self, request: &ApiRequest, response: &HttpResponse) -> YouMailError {
        let envelope = decode_error_envelope(self.format, &response.body);
        let fault = ServiceFault::from_envelope(response.status, envelope);
        debug!(
            path = %request.path,
            status = response.status,
            message = fault.message(),
            "request failed"
        );
        if request.requires_auth && response.status == FORBIDDEN {
            YouMailError::AuthenticationRequired(fault)
        } else {
            YouMailError::Service(fault)
        }
    }

    fn auth_snapshot(&self) -> AuthSnapshot {
        let state = self.state.read();
        AuthSnapshot {
            token: state.auth_token.clone(),
            authorization: state.authorization.clone(),
            reauthentications: self.reauthentication.completed(),
        }
    }
}

/// Holds one caller's share of a login attempt. The last caller out clears the slot, also
/// when it is cancelled before the attempt finished.
struct LoginWaiter<'a> {
    slot: &'a Mutex<Option<LoginAttempt>>,
    attempt: LoginAttempt,
}

impl Drop for LoginWaiter<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock();
        let Some(current) = slot.as_ref() else {
            return;
        };
        // Slot plus this waiter: nobody else is still driving the attempt.
        let abandoned = Arc::strong_count(&self.attempt) <= 2;
        if Arc::ptr_eq(current, &self.attempt) && (self.attempt.initialized() || abandoned) {
            *slot = None;
        }
    }
}

fn render_authorization(token: &AuthToken) -> String {
    format!("{AUTHORIZATION_SCHEME} {}", token.as_str())
}

fn is_credential_header(name: &str) -> bool {
    [AUTHORIZATION_HEADER, USERNAME_HEADER, PASSWORD_HEADER]
        .iter()
        .any(|it| it.eq_ignore_ascii_case(name))
}
