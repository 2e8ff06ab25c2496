//! Request and response payloads.
//!
//! [`Body`] wraps the different payloads a request or response can carry. In-memory
//! payloads stay inspectable (see [`Body::as_bytes`]) so that blocking transports
//! can read them without an executor; streaming payloads are boxed.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_util::TryStreamExt;
#[cfg(feature = "incoming")]
use http_body::Body as _;
use http_body::Frame;
use http_body_util::{BodyExt, Empty, Full, StreamBody};

use crate::BoxError;

/// An http request using [Body] as the body.
pub type Request = http::Request<Body>;

/// An http response using [Body] as the body.
pub type Response = http::Response<Body>;

/// A wrapper for different internal body types which implements [http_body::Body](http_body::Body)
///
/// Bodies can be created from [`Bytes`](bytes::Bytes), [`String`](std::string::String),
/// [`Vec<u8>`], or static strings and byte slices using [`From`](std::convert::From)
/// implementations.
///
/// An empty body can be created with [Body::empty](Body::empty).
#[derive(Debug)]
#[pin_project::pin_project]
pub struct Body {
    #[pin]
    inner: InnerBody,
}

impl Body {
    /// Create a new `Body` that wraps another [`http_body::Body`].
    pub fn new<B>(body: B) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self {
            inner: InnerBody::Boxed(Box::pin(
                body.map_err(|error| -> BoxError { error.into() }),
            )),
        }
    }

    /// Create a new `Body` from a stream of byte chunks.
    pub fn wrap_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::new(StreamBody::new(
            stream
                .map_ok(Frame::data)
                .map_err(|error| -> BoxError { error.into() }),
        ))
    }

    /// Create a new empty body.
    pub fn empty() -> Self {
        Self {
            inner: InnerBody::Empty,
        }
    }

    /// Create a new body from something which can be converted into [`Bytes`].
    pub fn full<D>(data: D) -> Self
    where
        D: Into<Bytes>,
    {
        Self::from(data.into())
    }

    /// The complete payload, if this body is held in memory and has not been read.
    ///
    /// Streaming bodies return `None`.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        static EMPTY: Bytes = Bytes::from_static(b"");
        match &self.inner {
            InnerBody::Empty => Some(&EMPTY),
            InnerBody::Full(data) => data.as_ref(),
            _ => None,
        }
    }

    /// Try to clone this body. Only in-memory bodies can be cloned.
    pub fn try_clone(&self) -> Option<Self> {
        match &self.inner {
            InnerBody::Empty => Some(Self::empty()),
            InnerBody::Full(Some(data)) => Some(Self::from(data.clone())),
            _ => None,
        }
    }

    /// Read the whole body into memory.
    pub async fn collect_bytes(self) -> Result<Bytes, BoxError> {
        Ok(BodyExt::collect(self).await?.to_bytes())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(body: Bytes) -> Self {
        let inner = if body.is_empty() {
            InnerBody::Empty
        } else {
            InnerBody::Full(Some(body))
        };
        Self { inner }
    }
}

impl From<String> for Body {
    fn from(body: String) -> Self {
        Self::from(Bytes::from(body))
    }
}

impl From<&'static str> for Body {
    fn from(body: &'static str) -> Self {
        Self::from(Bytes::from_static(body.as_bytes()))
    }
}

impl From<&'static [u8]> for Body {
    fn from(body: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(body))
    }
}

impl From<Vec<u8>> for Body {
    fn from(body: Vec<u8>) -> Self {
        Self::from(Bytes::from(body))
    }
}

impl From<Full<Bytes>> for Body {
    fn from(body: Full<Bytes>) -> Self {
        Self::new(body)
    }
}

impl From<Empty<Bytes>> for Body {
    fn from(_body: Empty<Bytes>) -> Self {
        Self::empty()
    }
}

#[cfg(feature = "incoming")]
impl From<hyper::body::Incoming> for Body {
    fn from(body: hyper::body::Incoming) -> Self {
        Self {
            inner: InnerBody::Incoming(body),
        }
    }
}

type BoxBody = Pin<Box<dyn http_body::Body<Data = Bytes, Error = BoxError> + Send + 'static>>;

#[pin_project::pin_project(project = InnerBodyProj)]
enum InnerBody {
    Empty,
    Full(Option<Bytes>),
    Boxed(BoxBody),

    #[cfg(feature = "incoming")]
    Incoming(#[pin] hyper::body::Incoming),
}

impl http_body::Body for Body {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        match this.inner.project() {
            InnerBodyProj::Empty => Poll::Ready(None),
            InnerBodyProj::Full(data) => Poll::Ready(data.take().map(|data| Ok(Frame::data(data)))),
            InnerBodyProj::Boxed(body) => body.as_mut().poll_frame(cx),

            #[cfg(feature = "incoming")]
            InnerBodyProj::Incoming(body) => body
                .poll_frame(cx)
                .map(|opt| opt.map(|res| res.map_err(Into::into))),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self.inner {
            InnerBody::Empty => true,
            InnerBody::Full(ref data) => data.is_none(),
            InnerBody::Boxed(ref body) => body.is_end_stream(),

            #[cfg(feature = "incoming")]
            InnerBody::Incoming(ref body) => body.is_end_stream(),
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self.inner {
            InnerBody::Empty => http_body::SizeHint::with_exact(0),
            InnerBody::Full(ref data) => {
                http_body::SizeHint::with_exact(data.as_ref().map_or(0, |data| data.len() as u64))
            }
            InnerBody::Boxed(ref body) => body.size_hint(),

            #[cfg(feature = "incoming")]
            InnerBody::Incoming(ref body) => body.size_hint(),
        }
    }
}

impl fmt::Debug for InnerBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InnerBody::Empty => f.debug_struct("Empty").finish(),
            InnerBody::Full(data) => f
                .debug_struct("Full")
                .field("len", &data.as_ref().map(Bytes::len))
                .finish(),
            InnerBody::Boxed(_) => f.debug_struct("Boxed").finish(),

            #[cfg(feature = "incoming")]
            InnerBody::Incoming(_) => f.debug_struct("Incoming").finish(),
        }
    }
}
