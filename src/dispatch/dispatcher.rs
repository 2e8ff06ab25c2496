//! The blocking dispatch contract.

use std::sync::Arc;

use http::{Method, Uri};

use crate::body::{Request, Response};
use crate::dispatch::Guarded;
use crate::options::DispatchOptions;
use crate::request::RequestArgs;
use crate::scope::{with_dispatcher, Scoped};

/// A transport which sends requests by blocking the calling thread.
///
/// Implementations may be shared between threads when they are `Sync`; this
/// trait neither requires nor forbids it.
pub trait Dispatcher {
    /// Error produced by the transport. It is returned to callers unchanged.
    type Error: From<crate::Error> + std::error::Error + Send + Sync + 'static;

    /// Send a request and wait for its response.
    ///
    /// # Errors
    ///
    /// Any failure to transmit the request or receive the response, as defined
    /// by the transport.
    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Self::Error>;

    /// Release any resources held by the transport.
    fn close(&self) {}
}

/// Convenience methods available on every [`Dispatcher`].
pub trait DispatcherExt: Dispatcher {
    /// Build a request from its parts and send it.
    ///
    /// Exactly one request is built and `send` is called exactly once, with the
    /// options from `args`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Request`](crate::Error::Request) when the parts do not
    /// form a valid request, otherwise with whatever `send` returns.
    fn request(
        &self,
        method: Method,
        uri: Uri,
        args: RequestArgs,
    ) -> Result<Response, Self::Error> {
        let (request, options) = args
            .into_request(method, uri)
            .map_err(crate::Error::from)?;
        tracing::trace!(method=%request.method(), uri=%request.uri(), "dispatching request");
        self.send(request, options)
    }

    /// Send a `GET` request with no body, parameters or headers.
    ///
    /// # Errors
    ///
    /// See [`DispatcherExt::request`].
    fn get(&self, uri: Uri) -> Result<Response, Self::Error> {
        self.request(Method::GET, uri, RequestArgs::default())
    }

    /// Hold this dispatcher in a guard which closes it when dropped.
    fn scoped(self) -> Scoped<Self>
    where
        Self: Sized,
    {
        Scoped::new(self)
    }

    /// Run `body` with this dispatcher, then close it, even if `body` panics.
    fn scope<T, F>(self, body: F) -> T
    where
        Self: Sized,
        F: FnOnce(&Self) -> T,
    {
        with_dispatcher(self, body)
    }

    /// Track this dispatcher's lifecycle, rejecting sends after close.
    fn guarded(self) -> Guarded<Self>
    where
        Self: Sized,
    {
        Guarded::new(self)
    }
}

impl<D> DispatcherExt for D where D: Dispatcher + ?Sized {}

impl<D> Dispatcher for &D
where
    D: Dispatcher + ?Sized,
{
    type Error = D::Error;

    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Self::Error> {
        (**self).send(request, options)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<D> Dispatcher for Box<D>
where
    D: Dispatcher + ?Sized,
{
    type Error = D::Error;

    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Self::Error> {
        (**self).send(request, options)
    }

    fn close(&self) {
        (**self).close()
    }
}

impl<D> Dispatcher for Arc<D>
where
    D: Dispatcher + ?Sized,
{
    type Error = D::Error;

    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Self::Error> {
        (**self).send(request, options)
    }

    fn close(&self) {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {

    use std::cell::{Cell, RefCell};

    use http::StatusCode;

    use super::*;
    use crate::Body;

    #[derive(Debug, Default)]
    struct Recorder {
        sent: RefCell<Vec<(Method, String, DispatchOptions)>>,
        closed: Cell<usize>,
    }

    impl Dispatcher for Recorder {
        type Error = crate::Error;

        fn send(
            &self,
            request: Request,
            options: DispatchOptions,
        ) -> Result<Response, Self::Error> {
            self.sent.borrow_mut().push((
                request.method().clone(),
                request.uri().to_string(),
                options,
            ));
            Ok(http::Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Body::empty())?)
        }

        fn close(&self) {
            self.closed.set(self.closed.get() + 1);
        }
    }

    #[test]
    fn request_sends_once_with_options() {
        let recorder = Recorder::default();
        let response = recorder
            .request(
                Method::PUT,
                "http://example.com/a".parse().unwrap(),
                RequestArgs::new().param("x", "1").verify(false),
            )
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let sent = recorder.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Method::PUT);
        assert_eq!(sent[0].1, "http://example.com/a?x=1");
        assert_eq!(sent[0].2, DispatchOptions::new().verify(false));
    }

    #[test]
    fn get_uses_defaults() {
        let recorder = Recorder::default();
        recorder.get("http://example.com/".parse().unwrap()).unwrap();

        let sent = recorder.sent.borrow();
        assert_eq!(sent[0].0, Method::GET);
        assert!(sent[0].2.is_empty());
    }

    #[test]
    fn references_and_boxes_forward() {
        let recorder = Recorder::default();
        {
            let by_ref = &recorder;
            by_ref.get("http://example.com/".parse().unwrap()).unwrap();
            Dispatcher::close(&by_ref);
        }

        let boxed: Box<dyn Dispatcher<Error = crate::Error>> = Box::new(Recorder::default());
        boxed.get("http://example.com/".parse().unwrap()).unwrap();

        assert_eq!(recorder.sent.borrow().len(), 1);
        assert_eq!(recorder.closed.get(), 1);
    }
}
