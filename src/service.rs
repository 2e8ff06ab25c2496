//! Interoperability with [`tower::Service`].
//!
//! Middleware built on tower (retries, redirects, cookie jars) can sit on top of a
//! dispatcher through [`DispatchService`]. In the other direction,
//! [`ServiceDispatcher`] lets an existing tower client stand in as a transport.
//!
//! In both directions, [`DispatchOptions`] travel in the request's extensions.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::ServiceExt;

use crate::body::{Request, Response};
use crate::options::DispatchOptions;
use crate::{AsyncDispatcher, BoxError, BoxFuture, Error};

/// A [`tower::Service`] which sends each request through an [`AsyncDispatcher`].
///
/// Options are read from the request's extensions; requests without them are
/// sent with transport defaults. The service is always ready.
pub struct DispatchService<D> {
    dispatcher: Arc<D>,
}

impl<D: fmt::Debug> fmt::Debug for DispatchService<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchService")
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<D> Clone for DispatchService<D> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<D> DispatchService<D> {
    /// Wrap a dispatcher as a service.
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// The dispatcher behind this service.
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }
}

impl<D> From<Arc<D>> for DispatchService<D> {
    fn from(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }
}

impl<D> tower::Service<Request> for DispatchService<D>
where
    D: AsyncDispatcher + 'static,
{
    type Response = Response;
    type Error = D::Error;
    type Future = BoxFuture<'static, Result<Response, D::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let dispatcher = self.dispatcher.clone();
        let options = request
            .extensions()
            .get::<DispatchOptions>()
            .cloned()
            .unwrap_or_default();

        Box::pin(async move { dispatcher.send(request, options).await })
    }
}

/// An [`AsyncDispatcher`] backed by a [`tower::Service`].
///
/// Each send clones the service and drives the clone to readiness before
/// calling it. The options for the request are inserted into its extensions
/// so the service can honor them. Service errors are reported as
/// [`Error::Transport`].
#[derive(Debug, Clone)]
pub struct ServiceDispatcher<S> {
    service: S,
}

impl<S> ServiceDispatcher<S> {
    /// Use `service` as a transport.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// The service behind this dispatcher.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Unwrap the service.
    pub fn into_inner(self) -> S {
        self.service
    }
}

impl<S> AsyncDispatcher for ServiceDispatcher<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Error = Error;

    fn send(
        &self,
        mut request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Error>> {
        request.extensions_mut().insert(options);
        let service = self.service.clone();
        Box::pin(async move { service.oneshot(request).await.map_err(Error::transport) })
    }
}

#[cfg(test)]
mod tests {

    use std::time::Duration;

    use http::StatusCode;
    use tower::{service_fn, Service as _};

    use super::*;
    use crate::{AsyncDispatcherExt as _, Body, RequestArgs};

    use static_assertions::assert_impl_all;

    assert_impl_all!(DispatchService<crate::Unimplemented>: tower::Service<Request>, Clone, Send, Sync);

    #[tokio::test]
    async fn service_dispatcher_passes_options_in_extensions() {
        let service = service_fn(|request: Request| async move {
            let timeout = request
                .extensions()
                .get::<DispatchOptions>()
                .and_then(|options| options.timeout)
                .and_then(|timeout| timeout.read);
            let status = match timeout {
                Some(read) if read == Duration::from_secs(3) => StatusCode::OK,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Ok::<_, BoxError>(
                http::Response::builder()
                    .status(status)
                    .body(Body::empty())
                    .expect("valid response"),
            )
        });

        let dispatcher = ServiceDispatcher::new(service);
        let response = dispatcher
            .request(
                http::Method::GET,
                "http://example.com/".parse().unwrap(),
                RequestArgs::new().timeout(Duration::from_secs(3)),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn service_errors_become_transport_errors() {
        let service = service_fn(|_request: Request| async move {
            Err::<Response, BoxError>("connection refused".into())
        });

        let error = ServiceDispatcher::new(service)
            .get("http://example.com/".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Transport(_)));
        assert_eq!(error.to_string(), "transport: connection refused");
    }

    #[tokio::test]
    async fn dispatch_service_surfaces_dispatcher_errors() {
        let mut service = DispatchService::new(crate::Unimplemented::new());
        let error = service
            .ready()
            .await
            .unwrap()
            .call(Request::new(Body::empty()))
            .await
            .unwrap_err();
        assert!(error.is_not_implemented());
    }
}
