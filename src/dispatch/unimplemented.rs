//! A dispatcher with no transport behind it.

use std::future::ready;

use crate::body::{Request, Response};
use crate::options::DispatchOptions;
use crate::{AsyncDispatcher, BoxFuture, Dispatcher, Error};

/// The bare dispatch skeleton: every send fails with [`Error::NotImplemented`].
///
/// Useful as a placeholder where a transport has not been configured yet. Closing
/// it does nothing and may be repeated freely.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Unimplemented {
    _private: (),
}

impl Unimplemented {
    /// Create a new placeholder dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    fn error() -> Error {
        Error::NotImplemented {
            transport: "Unimplemented",
        }
    }
}

impl Dispatcher for Unimplemented {
    type Error = Error;

    fn send(&self, _request: Request, _options: DispatchOptions) -> Result<Response, Error> {
        Err(Self::error())
    }
}

impl AsyncDispatcher for Unimplemented {
    type Error = Error;

    fn send(
        &self,
        _request: Request,
        _options: DispatchOptions,
    ) -> BoxFuture<'_, Result<Response, Error>> {
        Box::pin(ready(Err(Self::error())))
    }
}
