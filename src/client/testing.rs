//! Scripted [`HttpTransport`] for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;

use super::http::{BoxFuture, HttpRequest, HttpResponse, HttpTransport, TransportFailure};
use super::pending::PendingOperations;
use super::session::{Credentials, LOGIN_PATH, Session, SessionConfig};
use super::YouMailClient;
use crate::domain::AuthToken;
use crate::transport::{CACHE_BUST_PARAM, DataFormat};

type Handler =
    dyn Fn(HttpRequest) -> BoxFuture<'static, Result<HttpResponse, TransportFailure>> + Send + Sync;

pub(crate) struct FakeTransport {
    requests: Mutex<Vec<HttpRequest>>,
    handler: Box<Handler>,
}

impl FakeTransport {
    /// Transport whose responses may suspend (barriers, yields).
    pub(crate) fn scripted<F>(handler: F) -> Arc<Self>
    where
        F: Fn(HttpRequest) -> BoxFuture<'static, Result<HttpResponse, TransportFailure>>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        })
    }

    /// Transport answering immediately.
    pub(crate) fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportFailure> + Send + Sync + 'static,
    {
        Self::scripted(move |request| {
            let result = handler(&request);
            Box::pin(async move { result })
        })
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub(crate) fn login_count(&self) -> usize {
        self.requests.lock().iter().filter(|it| is_login(it)).count()
    }
}

impl HttpTransport for FakeTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        self.requests.lock().push(request.clone());
        (self.handler)(request)
    }
}

pub(crate) fn is_login(request: &HttpRequest) -> bool {
    path_of(request) == LOGIN_PATH
}

pub(crate) fn path_of(request: &HttpRequest) -> String {
    url::Url::parse(&request.url)
        .map(|url| url.path().to_owned())
        .unwrap_or_default()
}

/// Query pairs without the cache buster.
pub(crate) fn query_of(request: &HttpRequest) -> Vec<(String, String)> {
    url::Url::parse(&request.url)
        .map(|url| {
            url.query_pairs()
                .filter(|(key, _)| key != CACHE_BUST_PARAM)
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn body_text(request: &HttpRequest) -> String {
    String::from_utf8_lossy(request.body.as_deref().unwrap_or_default()).into_owned()
}

pub(crate) fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

pub(crate) fn token_response(token: &str) -> HttpResponse {
    HttpResponse::new(200, format!(r#"{{"authtoken":"{token}"}}"#))
}

pub(crate) fn session(
    transport: Arc<FakeTransport>,
    credentials: Option<(&str, &str)>,
    token: Option<&str>,
) -> Session {
    Session::new(
        SessionConfig {
            host: "api.example.invalid".to_owned(),
            format: DataFormat::Json,
            secure_connections: true,
            credentials: credentials
                .map(|(username, password)| Credentials::new(username, password).unwrap()),
            auth_token: token.map(|token| AuthToken::new(token).unwrap()),
            pending: PendingOperations::new(),
        },
        transport,
    )
}

/// Client already holding token `tok`, so resource calls go straight out.
pub(crate) fn client(transport: Arc<FakeTransport>, format: DataFormat) -> YouMailClient {
    YouMailClient::builder()
        .host("api.example.invalid")
        .format(format)
        .credentials(Credentials::new("user", "pass").unwrap())
        .auth_token(AuthToken::new("tok").unwrap())
        .transport(transport)
        .pending_operations(PendingOperations::new())
        .build()
        .unwrap()
}
