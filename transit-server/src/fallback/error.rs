//! Fallback computation error types.

use crate::async_value::TaskFailed;

use super::backend::StreetNetworkError;

/// Errors from a fallback duration computation.
///
/// An empty or short routing matrix is not an error; the computation then
/// falls back to free-access places only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    /// The routing collaborator failed.
    #[error(transparent)]
    Routing(#[from] StreetNetworkError),

    /// An input (or the computation itself) never resolved.
    #[error(transparent)]
    Task(#[from] TaskFailed),
}
