//! Result and outcome types produced by invoking contract handlers.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ErrorKind;
use crate::types::TxHandle;

pub type Result<T, E = crate::error::Error> = core::result::Result<T, E>;

/// Outcome of a state-changing call: the handle of the submitted transaction
/// along with the return value observed while simulating it.
///
/// The handle is `None` when the write executor had no active signer to submit
/// with. In that case the call was simulated but never submitted, and callers
/// should check [`WriteOutcome::is_submitted`] before treating it as sent.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct WriteOutcome {
    pub handle: Option<TxHandle>,
    pub result: Value,
}

impl WriteOutcome {
    pub(crate) fn new(handle: Option<TxHandle>, result: Value) -> Self {
        Self { handle, result }
    }

    /// Whether the prepared call was actually handed over for submission.
    pub fn is_submitted(&self) -> bool {
        self.handle.is_some()
    }

    /// Split the outcome into the `(handle, simulated_result)` pair.
    pub fn into_parts(self) -> (Option<TxHandle>, Value) {
        (self.handle, self.result)
    }

    /// Deserialize the simulated return value into `T`.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.result.clone()).map_err(|e| ErrorKind::DataConversion.custom(e))
    }
}

/// Outcome of invoking a [`Handler`](crate::operations::Handler) without knowing
/// ahead of time whether it reads or writes.
#[derive(Clone, Debug, PartialEq)]
pub enum CallOutcome {
    /// Decoded value returned from a read-only query.
    Read(Value),
    /// Submission handle and simulated value of a state-changing call.
    Write(WriteOutcome),
}

impl CallOutcome {
    /// Returns the decoded value of a read, or the simulated value of a write.
    pub fn value(&self) -> &Value {
        match self {
            Self::Read(value) => value,
            Self::Write(outcome) => &outcome.result,
        }
    }

    pub fn into_read(self) -> Option<Value> {
        match self {
            Self::Read(value) => Some(value),
            Self::Write(_) => None,
        }
    }

    pub fn into_write(self) -> Option<WriteOutcome> {
        match self {
            Self::Read(_) => None,
            Self::Write(outcome) => Some(outcome),
        }
    }
}
