//! Dispatch contracts.
//!
//! A dispatcher is composed of two extension points and one fixed convenience
//! path:
//!
//! ## `send`
//!
//! Transmit an already built request and produce its response. Every transport
//! must provide this. A transport must not modify the request it is given, must
//! return a complete response or fail with its own error type, and must honor
//! any [`DispatchOptions`](crate::DispatchOptions) field which is set, falling
//! back to its own defaults for the rest.
//!
//! ## `close`
//!
//! Release whatever the transport holds (pooled connections, background tasks).
//! The default does nothing. Closing cannot fail: transports which hit errors
//! while releasing resources should log them. Closing twice must be harmless.
//!
//! ## `request`
//!
//! Provided by [`DispatcherExt`] and [`AsyncDispatcherExt`] for every dispatcher.
//! It assembles a request from a method, URI and [`RequestArgs`](crate::RequestArgs),
//! then calls `send` exactly once. Because the extension traits are implemented
//! for all dispatchers, transports cannot replace this path.
//!
//! ## Lifecycle
//!
//! Dispatchers move from created, to ready (any number of sends), to closed.
//! The traits themselves keep no state, so nothing stops a send after close;
//! wrap a transport in [`Guarded`] to have that rejected with
//! [`Error::Closed`](crate::Error::Closed). Use [`Scoped`](crate::Scoped) or the
//! `scope` helpers to guarantee a close on every exit path.
//!
//! ## Concurrency models
//!
//! [`Dispatcher`] blocks the calling thread, [`AsyncDispatcher`] suspends the
//! calling task. A client picks one. [`Threaded`] and [`Blocking`] bridge a
//! transport written for one model into the other.

mod async_dispatcher;
mod blocking;
mod dispatcher;
mod guard;
mod threaded;
mod unimplemented;

pub use self::async_dispatcher::{AsyncDispatcher, AsyncDispatcherExt};
pub use self::blocking::Blocking;
pub use self::dispatcher::{Dispatcher, DispatcherExt};
pub use self::guard::{DispatcherState, Guarded};
pub use self::threaded::Threaded;
pub use self::unimplemented::Unimplemented;
