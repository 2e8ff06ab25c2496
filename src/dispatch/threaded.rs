//! Run a blocking transport from async code.

use std::sync::Arc;

use tokio::task::JoinError;

use crate::body::{Request, Response};
use crate::options::DispatchOptions;
use crate::{AsyncDispatcher, BoxFuture, Dispatcher, Error};

/// An [`AsyncDispatcher`] which runs a blocking [`Dispatcher`] on tokio's
/// blocking thread pool.
///
/// Each `send` and `close` occupies one blocking thread for as long as the
/// inner transport takes. A panic inside the transport is resumed in the
/// awaiting task.
///
/// # Panics
///
/// The futures returned by `send` and `close` must be polled inside a tokio
/// runtime, since they hand work to [`tokio::task::spawn_blocking`].
#[derive(Debug)]
pub struct Threaded<D> {
    inner: Arc<D>,
}

impl<D> Clone for Threaded<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<D> Threaded<D> {
    /// Wrap a blocking transport.
    pub fn new(inner: D) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// A reference to the wrapped transport.
    pub fn get_ref(&self) -> &D {
        &self.inner
    }
}

impl<D> From<Arc<D>> for Threaded<D> {
    fn from(inner: Arc<D>) -> Self {
        Self { inner }
    }
}

fn join_error(error: JoinError) -> Error {
    if error.is_panic() {
        std::panic::resume_unwind(error.into_panic());
    }
    Error::transport(error)
}

impl<D> AsyncDispatcher for Threaded<D>
where
    D: Dispatcher + Send + Sync + 'static,
{
    type Error = D::Error;

    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Self::Error>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            match tokio::task::spawn_blocking(move || inner.send(request, options)).await {
                Ok(result) => result,
                Err(error) => Err(join_error(error).into()),
            }
        })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        let inner = self.inner.clone();
        Box::pin(async move {
            if let Err(error) = tokio::task::spawn_blocking(move || inner.close()).await {
                let error = join_error(error);
                tracing::warn!(%error, "blocking close did not complete");
            }
        })
    }
}
