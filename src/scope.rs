//! Scoped acquisition of dispatchers.
//!
//! Each helper here hands out the dispatcher unchanged, then closes it exactly
//! once when the scope ends, whether the scope finished normally, returned an
//! error, or panicked.

use std::fmt;
use std::ops::Deref;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::{AsyncDispatcher, BoxFuture, Dispatcher};

/// A guard which closes a blocking [`Dispatcher`] when dropped.
///
/// The guard dereferences to the dispatcher it holds.
pub struct Scoped<D: Dispatcher> {
    inner: D,
}

impl<D> fmt::Debug for Scoped<D>
where
    D: Dispatcher + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scoped").field(&self.inner).finish()
    }
}

impl<D: Dispatcher> Scoped<D> {
    /// Take ownership of a dispatcher for the lifetime of this guard.
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    /// End the scope now, closing the dispatcher.
    pub fn close(self) {
        drop(self)
    }
}

impl<D: Dispatcher> Deref for Scoped<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.inner
    }
}

impl<D: Dispatcher> Drop for Scoped<D> {
    fn drop(&mut self) {
        tracing::debug!("closing dispatcher at end of scope");
        self.inner.close();
    }
}

/// Run `body` with `dispatcher`, then close it.
///
/// The close happens on every exit path, including unwinding out of `body`.
pub fn with_dispatcher<D, T, F>(dispatcher: D, body: F) -> T
where
    D: Dispatcher,
    F: FnOnce(&D) -> T,
{
    let scoped = Scoped::new(dispatcher);
    body(&*scoped)
}

/// Run `body` with `dispatcher`, then wait for it to close.
///
/// The returned future resolves only after `close` has completed. If `body`
/// panics, the dispatcher is still closed before the panic continues. Dropping
/// the returned future before it completes skips the close, like any other
/// cancelled future.
///
/// # Example
/// ```no_run
/// # use hyperdispatch::{with_async_dispatcher, AsyncDispatcher, AsyncDispatcherExt};
/// # async fn run<D: AsyncDispatcher>(transport: D) -> Result<(), D::Error> {
/// let _status = with_async_dispatcher(transport, |transport| {
///     Box::pin(async move {
///         let response = transport.get("https://example.com/".parse().unwrap()).await?;
///         Ok::<_, D::Error>(response.status())
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_async_dispatcher<D, T, F>(dispatcher: D, body: F) -> T
where
    D: AsyncDispatcher,
    F: for<'a> FnOnce(&'a D) -> BoxFuture<'a, T>,
{
    let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| body(&dispatcher))) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(panic) => Err(panic),
    };

    tracing::debug!("closing dispatcher at end of scope");
    dispatcher.close().await;

    match outcome {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
