//! The suspending dispatch contract.

use std::future::ready;
use std::sync::Arc;

use http::{Method, Uri};

use crate::body::{Request, Response};
use crate::dispatch::Guarded;
use crate::options::DispatchOptions;
use crate::request::RequestArgs;
use crate::scope::with_async_dispatcher;
use crate::BoxFuture;

/// A transport which sends requests by suspending the calling task.
///
/// Calls made concurrently on one dispatcher are independent of each other and
/// may complete in any order, unless the transport itself imposes a limit.
pub trait AsyncDispatcher: Send + Sync {
    /// Error produced by the transport. It is returned to callers unchanged.
    type Error: From<crate::Error> + std::error::Error + Send + Sync + 'static;

    /// Send a request, resolving to its response.
    ///
    /// # Errors
    ///
    /// Any failure to transmit the request or receive the response, as defined
    /// by the transport.
    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Self::Error>>;

    /// Release any resources held by the transport.
    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(ready(()))
    }
}

/// Convenience methods available on every [`AsyncDispatcher`].
pub trait AsyncDispatcherExt: AsyncDispatcher {
    /// Build a request from its parts and send it.
    ///
    /// The request is built before the returned future is first polled; `send`
    /// is called exactly once, with the options from `args`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Request`](crate::Error::Request) when the parts do not
    /// form a valid request, otherwise with whatever `send` resolves to.
    fn request(
        &self,
        method: Method,
        uri: Uri,
        args: RequestArgs,
    ) -> BoxFuture<'_, Result<Response, Self::Error>> {
        match args.into_request(method, uri) {
            Ok((request, options)) => {
                tracing::trace!(method=%request.method(), uri=%request.uri(), "dispatching request");
                self.send(request, options)
            }
            Err(error) => {
                let error: Self::Error = crate::Error::from(error).into();
                Box::pin(ready(Err(error)))
            }
        }
    }

    /// Send a `GET` request with no body, parameters or headers.
    ///
    /// # Errors
    ///
    /// See [`AsyncDispatcherExt::request`].
    fn get(&self, uri: Uri) -> BoxFuture<'_, Result<Response, Self::Error>> {
        self.request(Method::GET, uri, RequestArgs::default())
    }

    /// Run `body` with this dispatcher, then wait for it to close.
    ///
    /// See [`with_async_dispatcher`](crate::with_async_dispatcher).
    fn scope<T, F>(self, body: F) -> BoxFuture<'static, T>
    where
        Self: Sized + 'static,
        T: Send + 'static,
        F: for<'a> FnOnce(&'a Self) -> BoxFuture<'a, T> + Send + 'static,
    {
        Box::pin(with_async_dispatcher(self, body))
    }

    /// Track this dispatcher's lifecycle, rejecting sends after close.
    fn guarded(self) -> Guarded<Self>
    where
        Self: Sized,
    {
        Guarded::new(self)
    }
}

impl<D> AsyncDispatcherExt for D where D: AsyncDispatcher + ?Sized {}

impl<D> AsyncDispatcher for &D
where
    D: AsyncDispatcher + ?Sized,
{
    type Error = D::Error;

    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Self::Error>> {
        (**self).send(request, options)
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        (**self).close()
    }
}

impl<D> AsyncDispatcher for Box<D>
where
    D: AsyncDispatcher + ?Sized,
{
    type Error = D::Error;

    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Self::Error>> {
        (**self).send(request, options)
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        (**self).close()
    }
}

impl<D> AsyncDispatcher for Arc<D>
where
    D: AsyncDispatcher + ?Sized,
{
    type Error = D::Error;

    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Self::Error>> {
        (**self).send(request, options)
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        (**self).close()
    }
}
