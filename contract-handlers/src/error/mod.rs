//! All errors that can occur while compiling or invoking contract handlers,
//! including but not limited to: executor failures during a read, a write
//! simulation or a write submission, and wiring mistakes such as a missing
//! provider or a missing contract address.

mod impls;

use std::borrow::Cow;

/// Error type that contract-handlers will make use of for all the errors
/// returned from this library.
///
/// Failures reported by an executor are kept as-is inside the error and can be
/// taken back out with [`Error::into_inner`], so callers are able to inspect the
/// exact rejection the remote endpoint produced.
#[derive(Debug)]
pub struct Error {
    repr: ErrorRepr,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorRepr {
    #[error("{0}")]
    Simple(ErrorKind),
    #[error("{message}")]
    Message {
        kind: ErrorKind,
        message: Cow<'static, str>,
    },
    #[error("{error}")]
    Custom {
        kind: ErrorKind,
        error: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{message}: {error}")]
    Full {
        kind: ErrorKind,
        message: Cow<'static, str>,
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A list specifying general categories of errors.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The read executor rejected a read-only query.
    #[error("remote query failed")]
    Query,
    /// The write executor rejected the dry-run of a state-changing call.
    /// The submission phase was never entered.
    #[error("simulation of the call failed")]
    Simulation,
    /// The write executor rejected the prepared payload after a successful
    /// simulation.
    #[error("submission of the prepared call failed")]
    Submission,
    /// Handlers were requested without contracts being bound in scope.
    #[error("contracts provider is not configured")]
    Configuration,
    /// A contract factory without a default address was asked for handlers
    /// without an explicit address.
    #[error("no contract address was supplied")]
    MissingAddress,
    /// No factory exists for the requested contract name.
    #[error("unknown contract")]
    UnknownContract,
    /// No handler exists for the requested function name.
    #[error("unknown contract function")]
    UnknownFunction,
    /// Interface definitions, arguments or results could not be converted.
    #[error("data conversion error")]
    DataConversion,
    #[error("I/O error")]
    Io,
}
