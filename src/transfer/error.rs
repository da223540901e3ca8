//! Errors surfaced by the file transfer service.

use thiserror::Error;

use crate::datastore::NoHealthyHost;
use crate::http::{BodyError, HttpError};
use crate::retry::RetryError;
use crate::ticket::TicketError;

/// Errors raised while moving a file to or from a datastore.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TransferError {
    /// The server answered with a failing status code.
    #[error("Could not transfer file '{url}', received status code '{status}'")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned by the final attempt.
        status: u16,
    },
    /// The request never produced a status code.
    #[error(transparent)]
    Transport(#[from] HttpError),
    /// A service ticket could not be acquired.
    #[error(transparent)]
    Ticket(#[from] TicketError),
    /// None of the datastore's hosts can serve the request.
    #[error(transparent)]
    NoHealthyHost(#[from] NoHealthyHost),
    /// The local payload could not be measured or read.
    #[error(transparent)]
    Body(#[from] BodyError),
    /// Cancellation was requested before the transfer completed.
    #[error("transfer of '{url}' cancelled")]
    Cancelled {
        /// Requested URL.
        url: String,
    },
}

impl TransferError {
    /// Collapses a retry outcome into the error the caller sees.
    ///
    /// Exhausted and permanent outcomes surface the underlying error; a
    /// cancelled retry becomes [`TransferError::Cancelled`].
    #[must_use]
    pub fn from_retry(error: RetryError<Self>, url: &str) -> Self {
        match error {
            RetryError::Exhausted { last, .. } | RetryError::Permanent(last) => last,
            RetryError::Cancelled { .. } => Self::Cancelled {
                url: url.to_owned(),
            },
        }
    }
}
