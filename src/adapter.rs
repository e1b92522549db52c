use std::{
    borrow::Cow,
    future::Future,
    pin::Pin,
    sync::Arc,
    time::{Duration, Instant},
};

use bytes::Bytes;
use reqwest::header::HeaderValue;
use reqwest::{Client as ReqwestClient, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sonic_rs::{from_slice, to_vec};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;

pub type RestBytes = Bytes;
pub type RestFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;
pub type RestResult<T> = Result<T, RestError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestErrorKind {
    Connect,
    Send,
    Receive,
    Timeout,
    Rejected,
    Parse,
    Internal,
}

/// Failure reported by a transport, or a non-2xx status seen by
/// [`Client::execute_checked`]. Transport failures are carried to the caller
/// as-is. A rejected response keeps only its status and body text; its
/// headers are dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("rest error {kind:?} status={status:?} {message}")]
pub struct RestError {
    pub kind: RestErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl RestError {
    pub fn new(kind: RestErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::new(RestErrorKind::Connect, status, message)
    }

    pub fn send(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::new(RestErrorKind::Send, status, message)
    }

    pub fn receive(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::new(RestErrorKind::Receive, status, message)
    }

    pub fn timeout(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::new(RestErrorKind::Timeout, status, message)
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::new(RestErrorKind::Rejected, Some(status), message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(RestErrorKind::Parse, None, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RestErrorKind::Internal, None, message)
    }

    pub fn kind(&self) -> RestErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    fn from_reqwest(fallback: RestErrorKind, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            RestErrorKind::Timeout
        } else if err.is_connect() {
            RestErrorKind::Connect
        } else if err.is_builder() {
            RestErrorKind::Internal
        } else {
            fallback
        };
        let status = err.status().map(|s| s.as_u16());
        Self::new(kind, status, err.to_string())
    }
}

impl From<sonic_rs::Error> for RestError {
    fn from(err: sonic_rs::Error) -> Self {
        Self::parse(err.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct RestRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, RestBytes)>,
    pub body: Option<RestBytes>,
}

impl RestRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<RestBytes>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<RestBytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(&self, key: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_ref())
    }
}

#[derive(Clone, Debug)]
pub struct RestResponse {
    pub status: u16,
    pub headers: Vec<(String, RestBytes)>,
    pub body: RestBytes,
    pub elapsed: Duration,
}

impl RestResponse {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, key: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_ref())
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn json<T: DeserializeOwned>(&self) -> RestResult<T> {
        Ok(from_slice(&self.body)?)
    }
}

/// Seam between [`Client`] and the network. Implementations must report every
/// failure through the returned future and must not retry on their own.
pub trait RestTransport: Send + Sync {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>>;
}

pub type SharedRestTransport = dyn RestTransport + Send + Sync;

/// A transport bound to one base address. Clones share the transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<SharedRestTransport>,
    base_address: Arc<str>,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    pub fn with_transport<T>(config: &ClientConfig, transport: T) -> Self
    where
        T: RestTransport + 'static,
    {
        Self {
            transport: Arc::new(transport),
            base_address: Arc::from(config.base_address()),
        }
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    /// Joins `path` onto the base address with one `/` between them. Up to two
    /// trailing slashes are dropped from the base and all leading slashes from
    /// the path. An empty base address leaves the path relative.
    pub fn url(&self, path: &str) -> String {
        if self.base_address.is_empty() {
            return path.to_string();
        }
        let base: &str = &self.base_address;
        let base = base.strip_suffix('/').unwrap_or(base);
        let base = base.strip_suffix('/').unwrap_or(base);
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    pub async fn execute(&self, request: RestRequest) -> RestResult<RestResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(
            status = response.status,
            content_type = %String::from_utf8_lossy(response.header("content-type").unwrap_or_default()),
            elapsed_ms = response.elapsed.as_millis() as u64,
            "received response"
        );
        Ok(response)
    }

    /// Like [`Client::execute`], but a non-2xx status becomes a
    /// [`RestErrorKind::Rejected`] error holding the response text.
    pub async fn execute_checked(&self, request: RestRequest) -> RestResult<RestResponse> {
        let response = self.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "request rejected by server");
            return Err(RestError::rejected(response.status, response.text()));
        }
        Ok(response)
    }

    pub async fn post_json<T>(&self, path: &str, payload: &T) -> RestResult<RestResponse>
    where
        T: Serialize + ?Sized,
    {
        let body = to_vec(payload)?;
        let request = RestRequest::post(self.url(path))
            .with_header("content-type", Bytes::from_static(b"application/json"))
            .with_header("accept", Bytes::from_static(b"application/json"))
            .with_body(body);
        self.execute_checked(request).await
    }
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: ReqwestClient::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl RestTransport for ReqwestTransport {
    fn execute(&self, request: RestRequest) -> RestFuture<RestResult<RestResponse>> {
        let client = self.client.clone();
        Box::pin(async move {
            let start = Instant::now();
            let mut req = client.request(request.method, &request.url);

            for (key, value) in request.headers {
                let value = HeaderValue::from_maybe_shared(value)
                    .map_err(|err| RestError::internal(err.to_string()))?;
                req = req.header(key, value);
            }

            if let Some(body) = request.body {
                req = req.body(body);
            }

            let resp = req
                .send()
                .await
                .map_err(|err| RestError::from_reqwest(RestErrorKind::Send, err))?;

            let status = resp.status().as_u16();
            let headers = resp
                .headers()
                .iter()
                .map(|(name, value)| (name.to_string(), Bytes::copy_from_slice(value.as_ref())))
                .collect();
            let body = resp
                .bytes()
                .await
                .map_err(|err| RestError::from_reqwest(RestErrorKind::Receive, err))?;

            Ok(RestResponse {
                status,
                headers,
                body,
                elapsed: start.elapsed(),
            })
        })
    }
}
