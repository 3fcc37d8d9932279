//! Client layer: the authenticated session plus one resource wrapper per API area.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{AuthToken, ValidationError};
use crate::transport::{CodecError, DataFormat, ErrorEnvelope};

mod account;
mod carriers;
mod contacts;
mod folders;
mod gate;
mod greetings;
mod http;
mod messages;
mod pending;
mod push;
mod session;
mod spam;
mod transcription;
mod virtual_numbers;

#[cfg(test)]
mod testing;

pub use http::{
    BoxFuture, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Protocol, TransportFailure,
};
pub use pending::{PendingOperationEvent, PendingOperations};
pub use session::{
    ApiRequest, AuthenticationChanged, Credentials, LOGIN_PATH, MAX_REDIRECTS, PASSWORD_HEADER,
    Session, USERNAME_HEADER,
};

use http::ReqwestTransport;
use session::SessionConfig;

const DEFAULT_HOST: &str = "api.youmail.com";
const DEFAULT_USER_AGENT: &str = concat!("youmail-rs/", env!("CARGO_PKG_VERSION"));
pub(crate) const API_ROOT: &str = "/api/v4";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Details of a non-2xx response.
///
/// `status` is the HTTP status; the remaining fields come from the service error envelope
/// when the body could be parsed as one.
pub struct ServiceFault {
    pub status: u16,
    pub error_code: Option<String>,
    pub short_message: Option<String>,
    pub long_message: Option<String>,
}

impl ServiceFault {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            error_code: None,
            short_message: None,
            long_message: None,
        }
    }

    pub(crate) fn from_envelope(status: u16, envelope: Option<ErrorEnvelope>) -> Self {
        let first = envelope.and_then(|envelope| envelope.errors.into_iter().next());
        match first {
            Some(entry) => Self {
                status,
                error_code: entry.error_code,
                short_message: entry.short_message,
                long_message: entry.long_message,
            },
            None => Self::new(status),
        }
    }

    /// Best human-readable message: long, then short, then a fixed fallback.
    pub fn message(&self) -> &str {
        self.long_message
            .as_deref()
            .or(self.short_message.as_deref())
            .unwrap_or("no message available")
    }
}

impl fmt::Display for ServiceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message())?;
        if let Some(code) = &self.error_code {
            write!(f, " [{code}]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
/// Errors returned by [`YouMailClient`] and [`Session`].
///
/// `Clone` so one login outcome can be handed to every caller waiting on it.
pub enum YouMailError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc). Never retried.
    #[error("transport error: {0}")]
    Transport(#[source] Arc<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status.
    #[error("service error: {0}")]
    Service(ServiceFault),

    /// 403 on an authenticated call that reauthentication could not fix.
    #[error("authentication required: {0}")]
    AuthenticationRequired(ServiceFault),

    /// Successful response without the payload the call needs.
    #[error("invalid response: {0}")]
    InvalidResponse(&'static str),

    /// Request or response body could not be encoded/decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    /// Redirect from an https URL to a non-https one; not followed.
    #[error("refused insecure redirect to {location}")]
    InsecureRedirect { location: String },

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// Login was needed but the session has no username/password.
    #[error("no credentials configured")]
    MissingCredentials,

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl YouMailError {
    /// HTTP status for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service(fault) | Self::AuthenticationRequired(fault) => Some(fault.status),
            _ => None,
        }
    }

    /// Best available human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::Service(fault) | Self::AuthenticationRequired(fault) => {
                fault.message().to_owned()
            }
            Self::Transport(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Clone)]
/// Builder for [`YouMailClient`].
///
/// Use this when you need to customize the host, format, timeout, or transport.
pub struct YouMailClientBuilder {
    host: String,
    secure_connections: bool,
    format: DataFormat,
    timeout: Option<Duration>,
    user_agent: String,
    credentials: Option<Credentials>,
    auth_token: Option<AuthToken>,
    transport: Option<Arc<dyn HttpTransport>>,
    pending: Option<Arc<PendingOperations>>,
}

impl fmt::Debug for YouMailClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouMailClientBuilder")
            .field("host", &self.host)
            .field("secure_connections", &self.secure_connections)
            .field("format", &self.format)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("credentials", &self.credentials)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for YouMailClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl YouMailClientBuilder {
    /// Anonymous client against the production host over HTTPS, exchanging XML.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            secure_connections: true,
            format: DataFormat::default(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            credentials: None,
            auth_token: None,
            transport: None,
            pending: None,
        }
    }

    /// Host (and optional port) without scheme, e.g. `api.youmail.com`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Use `http` instead of `https` for regular calls. Login always uses `https`.
    pub fn secure_connections(mut self, secure: bool) -> Self {
        self.secure_connections = secure;
        self
    }

    pub fn format(mut self, format: DataFormat) -> Self {
        self.format = format;
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Start with a token persisted from an earlier session.
    pub fn auth_token(mut self, token: AuthToken) -> Self {
        self.auth_token = Some(token);
        self
    }

    /// Set an HTTP client timeout applied to each request. Ignored with a custom transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header. Ignored with a custom transport.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Send requests through a custom [`HttpTransport`]. It must not follow redirects.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Count in-flight calls on a private counter instead of [`PendingOperations::global`].
    pub fn pending_operations(mut self, pending: Arc<PendingOperations>) -> Self {
        self.pending = Some(pending);
        self
    }

    /// Build a [`YouMailClient`].
    pub fn build(self) -> Result<YouMailClient, YouMailError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::Empty { field: "host" }.into());
        }

        let http: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = ReqwestTransport::client_builder().user_agent(self.user_agent);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let client = builder
                    .build()
                    .map_err(|err| YouMailError::Transport(Arc::new(err)))?;
                Arc::new(ReqwestTransport::new(client))
            }
        };

        let session = Session::new(
            SessionConfig {
                host: self.host.trim().to_owned(),
                format: self.format,
                secure_connections: self.secure_connections,
                credentials: self.credentials,
                auth_token: self.auth_token,
                pending: self.pending.unwrap_or_else(PendingOperations::global),
            },
            http,
        );

        Ok(YouMailClient {
            session: Arc::new(session),
        })
    }
}

#[derive(Clone, Debug)]
/// High-level YouMail client.
///
/// Cheap to clone; clones share one [`Session`]. Resource methods log in lazily on first use
/// and transparently reauthenticate once when the service rejects an expired token.
pub struct YouMailClient {
    session: Arc<Session>,
}

impl YouMailClient {
    /// Client for `credentials` with default settings.
    ///
    /// For more customization, use [`YouMailClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, YouMailError> {
        Self::builder().credentials(credentials).build()
    }

    pub fn builder() -> YouMailClientBuilder {
        YouMailClientBuilder::new()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn encode<T>(&self, root: &str, value: &T) -> Result<Vec<u8>, YouMailError>
    where
        T: Serialize + ?Sized,
    {
        Ok(self.session.format().encode(root, value)?)
    }

    async fn fetch<T>(&self, request: ApiRequest) -> Result<T, YouMailError>
    where
        T: DeserializeOwned,
    {
        let response = self.session.api_request(request).await?;
        Ok(self.session.format().decode(&response.body)?)
    }

    async fn execute(&self, request: ApiRequest) -> Result<(), YouMailError> {
        self.session.api_request(request).await.map(drop)
    }
}
