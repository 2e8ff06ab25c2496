use thiserror::Error;

use crate::BoxError;

/// Errors raised by the dispatch layer itself.
///
/// Transports report their own failures through their associated error type,
/// which must be constructible from this one. Failures which happen inside a
/// transport are never wrapped here unless the transport chooses to.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// `send` was called on a dispatcher which has no transport behind it.
    #[error("{transport} does not implement send")]
    NotImplemented {
        /// Name of the dispatcher type which was asked to send.
        transport: &'static str,
    },

    /// The dispatcher was closed before the request was sent.
    #[error("dispatcher is closed")]
    Closed,

    /// The request could not be assembled from its parts.
    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    /// Error occured in the underlying transport.
    #[error("transport: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    /// Wrap a transport failure.
    pub fn transport<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Transport(error.into())
    }

    /// Is this error the result of dispatching on a closed dispatcher?
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }

    /// Is this error the result of dispatching without a transport?
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, Error::NotImplemented { .. })
    }
}
