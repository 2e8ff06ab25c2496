//! Run an async transport from blocking code.

use std::fmt;

use tokio::runtime::Runtime;

use crate::body::{Request, Response};
use crate::options::DispatchOptions;
use crate::{AsyncDispatcher, Dispatcher};

/// A [`Dispatcher`] which drives an [`AsyncDispatcher`] on its own
/// single-threaded tokio runtime.
///
/// Every call blocks the current thread until the inner future completes. This
/// type must not be created, used or dropped from inside an async runtime.
pub struct Blocking<D> {
    inner: D,
    runtime: Runtime,
}

impl<D: fmt::Debug> fmt::Debug for Blocking<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blocking")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<D> Blocking<D> {
    /// Wrap an async transport, creating a runtime to drive it.
    ///
    /// # Errors
    ///
    /// Fails when the runtime cannot be created.
    pub fn new(inner: D) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self::with_runtime(inner, runtime))
    }

    /// Wrap an async transport, driving it with an existing runtime.
    pub fn with_runtime(inner: D, runtime: Runtime) -> Self {
        Self { inner, runtime }
    }

    /// A reference to the wrapped transport.
    pub fn get_ref(&self) -> &D {
        &self.inner
    }
}

impl<D: AsyncDispatcher> Dispatcher for Blocking<D> {
    type Error = D::Error;

    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Self::Error> {
        self.runtime.block_on(self.inner.send(request, options))
    }

    fn close(&self) {
        self.runtime.block_on(self.inner.close())
    }
}

#[cfg(test)]
mod tests {

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{Body, BoxFuture, DispatcherExt as _};

    #[derive(Debug, Default)]
    struct Sleepy {
        closed: AtomicUsize,
    }

    impl AsyncDispatcher for Sleepy {
        type Error = crate::Error;

        fn send(
            &self,
            request: Request,
            _options: DispatchOptions,
        ) -> BoxFuture<'_, Result<Response, Self::Error>> {
            Box::pin(async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                Ok(Response::new(Body::from(request.uri().to_string())))
            })
        }

        fn close(&self) -> BoxFuture<'_, ()> {
            Box::pin(async move {
                tokio::task::yield_now().await;
                self.closed.fetch_add(1, Ordering::SeqCst);
            })
        }
    }

    #[test]
    fn drives_async_transport_to_completion() {
        let dispatcher = Blocking::new(Sleepy::default()).unwrap();
        let response = dispatcher
            .get("http://example.com/sleep".parse().unwrap())
            .unwrap();
        assert_eq!(
            response.body().as_bytes().unwrap(),
            "http://example.com/sleep"
        );

        Dispatcher::close(&dispatcher);
        assert_eq!(dispatcher.get_ref().closed.load(Ordering::SeqCst), 1);
    }
}
