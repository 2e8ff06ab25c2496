//! Hyperdispatch
//!
//! The seam between building an HTTP request and transmitting it.
//!
//! A *dispatcher* takes a fully built [`Request`] and produces a [`Response`].
//! Real transports (connection pools, proxies, TLS stacks, mocks) implement one
//! of the two dispatch contracts:
//!
//! - [`Dispatcher`] for blocking transports, which hold the calling thread until
//!   the response arrives.
//! - [`AsyncDispatcher`] for transports which suspend the calling task instead.
//!
//! Both contracts have exactly two extension points, `send` and `close`. The
//! convenience path from primitive parts to a dispatched request lives on the
//! blanket-implemented [`DispatcherExt`] and [`AsyncDispatcherExt`] traits, so every
//! transport receives requests built the same way.
//!
//! # Example
//! ```no_run
//! # use hyperdispatch::{Dispatcher, DispatcherExt, RequestArgs};
//! # fn run<D: Dispatcher>(transport: D) -> Result<(), D::Error> {
//! let response = transport.scope(|transport| {
//!     transport.request(
//!         http::Method::GET,
//!         "https://example.com/".parse().unwrap(),
//!         RequestArgs::new().param("q", "rust"),
//!     )
//! })?;
//! println!("status: {}", response.status());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::future::Future;
use std::pin::Pin;

pub mod body;
pub use body::{Body, Request, Response};
pub mod dispatch;
pub use dispatch::{
    AsyncDispatcher, AsyncDispatcherExt, Blocking, Dispatcher, DispatcherExt, DispatcherState,
    Guarded, Threaded, Unimplemented,
};
mod error;
pub use error::Error;
#[cfg(feature = "mocks")]
pub mod mock;
pub mod options;
pub use options::{ClientCert, DispatchOptions, TimeoutConfig, Verify};
pub mod request;
pub use request::{QueryParams, RequestArgs};
pub mod scope;
pub use scope::{with_async_dispatcher, with_dispatcher, Scoped};
pub mod service;

/// A boxed error which can be sent across threads.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A boxed future which can be sent across threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
