//! Transports full of canned behavior, suitable for testing code which depends on a dispatcher.
//!
//! Both transports here implement [`Dispatcher`] and [`AsyncDispatcher`]. Bring
//! only one of [`DispatcherExt`](crate::DispatcherExt) or
//! [`AsyncDispatcherExt`](crate::AsyncDispatcherExt) into scope at a time, or
//! call their methods with fully qualified syntax.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode, Uri};
use parking_lot::Mutex;
use thiserror::Error;

use crate::body::{Body, Request, Response};
use crate::options::DispatchOptions;
use crate::{AsyncDispatcher, BoxFuture, Dispatcher, Error};

/// Error returned by a [`MockDispatcher`] set up to fail.
#[derive(Debug, Default, Error, PartialEq, Eq)]
#[error("mock transport error")]
pub struct MockTransportError {
    _private: (),
}

/// A request as seen by a [`MockDispatcher`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,

    /// Request URI, including any merged query parameters.
    pub uri: Uri,

    /// Request headers.
    pub headers: HeaderMap,

    /// The complete request body.
    pub body: Bytes,

    /// Options the request was sent with.
    pub options: DispatchOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MockMode {
    Respond(StatusCode),
    Fail,
}

#[derive(Debug, Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    closed: AtomicUsize,
}

/// A transport which records what it is asked to do.
///
/// Clones share their records, so a clone kept by a test still sees requests
/// sent after the original was moved into a scope or client.
#[derive(Debug, Clone)]
pub struct MockDispatcher {
    mode: MockMode,
    state: Arc<MockState>,
}

impl Default for MockDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDispatcher {
    /// A transport which answers every request with `200 OK` and an empty body.
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    /// A transport which answers every request with `status` and an empty body.
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            mode: MockMode::Respond(status),
            state: Arc::default(),
        }
    }

    /// A transport which records every request, then fails it with [`MockTransportError`].
    pub fn failing() -> Self {
        Self {
            mode: MockMode::Fail,
            state: Arc::default(),
        }
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Number of requests sent so far.
    pub fn send_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    /// Number of times `close` has been called.
    pub fn close_count(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn respond(
        &self,
        parts: http::request::Parts,
        body: Bytes,
        options: DispatchOptions,
    ) -> Result<Response, Error> {
        tracing::trace!(method=%parts.method, uri=%parts.uri, "mock transport received request");
        self.state.requests.lock().push(RecordedRequest {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            options,
        });

        match self.mode {
            MockMode::Respond(status) => Ok(http::Response::builder()
                .status(status)
                .body(Body::empty())?),
            MockMode::Fail => Err(Error::transport(MockTransportError::default())),
        }
    }

    fn mark_closed(&self) {
        self.state.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// A blocking transport can only read bodies which are already in memory.
fn in_memory_body(body: &Body) -> Result<Bytes, Error> {
    body.as_bytes()
        .cloned()
        .ok_or_else(|| Error::transport("streaming bodies need an async transport"))
}

impl Dispatcher for MockDispatcher {
    type Error = Error;

    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Error> {
        let (parts, body) = request.into_parts();
        let body = in_memory_body(&body)?;
        self.respond(parts, body, options)
    }

    fn close(&self) {
        self.mark_closed();
    }
}

impl AsyncDispatcher for MockDispatcher {
    type Error = Error;

    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let body = body.collect_bytes().await.map_err(Error::Transport)?;
            self.respond(parts, body, options)
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move { self.mark_closed() })
    }
}

/// A transport which answers each request with a JSON description of it.
///
/// The response body is an object with `method`, `url`, `headers` (an array of
/// `[name, value]` pairs in order) and `body` (the request body as text).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EchoDispatcher {
    _private: (),
}

impl EchoDispatcher {
    /// Create a new echo transport.
    pub fn new() -> Self {
        Self::default()
    }

    fn echo(parts: &http::request::Parts, body: &[u8]) -> Result<Response, Error> {
        let headers: Vec<serde_json::Value> = parts
            .headers
            .iter()
            .map(|(name, value)| {
                serde_json::json!([
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned()
                ])
            })
            .collect();

        let document = serde_json::json!({
            "method": parts.method.as_str(),
            "url": parts.uri.to_string(),
            "headers": headers,
            "body": String::from_utf8_lossy(body).into_owned(),
        });

        let payload = serde_json::to_vec(&document).map_err(Error::transport)?;
        Ok(http::Response::builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload))?)
    }
}

impl Dispatcher for EchoDispatcher {
    type Error = Error;

    fn send(&self, request: Request, _options: DispatchOptions) -> Result<Response, Error> {
        let (parts, body) = request.into_parts();
        let body = in_memory_body(&body)?;
        Self::echo(&parts, &body)
    }
}

impl AsyncDispatcher for EchoDispatcher {
    type Error = Error;

    fn send(
        &self,
        request: Request,
        _options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let body = body.collect_bytes().await.map_err(Error::Transport)?;
            Self::echo(&parts, &body)
        })
    }
}
