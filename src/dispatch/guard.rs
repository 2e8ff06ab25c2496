//! Explicit lifecycle tracking for dispatchers.

use std::fmt;
use std::future::ready;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::body::{Request, Response};
use crate::options::DispatchOptions;
use crate::{AsyncDispatcher, BoxFuture, Dispatcher, Error};

const CREATED: u8 = 0;
const READY: u8 = 1;
const CLOSED: u8 = 2;

/// Where a [`Guarded`] dispatcher is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// No request has been sent yet.
    Created,

    /// At least one request has been sent.
    Ready,

    /// The dispatcher has been closed. This state is terminal.
    Closed,
}

/// Wraps a dispatcher to enforce its lifecycle.
///
/// Once closed, every send fails with [`Error::Closed`] without reaching the
/// transport, and further closes are ignored, so the inner transport is closed
/// at most once. A send already in flight when `close` is called is not
/// interrupted.
pub struct Guarded<D> {
    inner: D,
    state: AtomicU8,
}

impl<D: fmt::Debug> fmt::Debug for Guarded<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded")
            .field("inner", &self.inner)
            .field("state", &self.state())
            .finish()
    }
}

impl<D> Guarded<D> {
    /// Start tracking `inner` in the created state.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            state: AtomicU8::new(CREATED),
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> DispatcherState {
        match self.state.load(Ordering::Acquire) {
            CREATED => DispatcherState::Created,
            READY => DispatcherState::Ready,
            _ => DispatcherState::Closed,
        }
    }

    /// Has this dispatcher been closed?
    pub fn is_closed(&self) -> bool {
        self.state() == DispatcherState::Closed
    }

    /// A reference to the wrapped transport.
    pub fn get_ref(&self) -> &D {
        &self.inner
    }

    /// Unwrap the transport, discarding its lifecycle state.
    pub fn into_inner(self) -> D {
        self.inner
    }

    fn begin_send(&self) -> Result<(), Error> {
        match self
            .state
            .compare_exchange(CREATED, READY, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) | Err(READY) => Ok(()),
            Err(_) => {
                tracing::warn!("rejecting request sent on a closed dispatcher");
                Err(Error::Closed)
            }
        }
    }

    /// Move to closed, returning true only for the call which did so.
    fn begin_close(&self) -> bool {
        let previous = self.state.swap(CLOSED, Ordering::AcqRel);
        if previous == CLOSED {
            tracing::trace!("dispatcher already closed");
            false
        } else {
            tracing::debug!("closing dispatcher");
            true
        }
    }
}

impl<D: Dispatcher> Dispatcher for Guarded<D> {
    type Error = D::Error;

    fn send(&self, request: Request, options: DispatchOptions) -> Result<Response, Self::Error> {
        self.begin_send()?;
        self.inner.send(request, options)
    }

    fn close(&self) {
        if self.begin_close() {
            self.inner.close();
        }
    }
}

impl<D: AsyncDispatcher> AsyncDispatcher for Guarded<D> {
    type Error = D::Error;

    fn send(
        &self,
        request: Request,
        options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Self::Error>> {
        if let Err(error) = self.begin_send() {
            let error: Self::Error = error.into();
            return Box::pin(ready(Err(error)));
        }
        self.inner.send(request, options)
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if self.begin_close() {
                self.inner.close().await;
            }
        })
    }
}
