use std::time::Duration;

use thiserror::Error;

/// Failures of the owner itself. A missing key is not one of them: it comes
/// back as an unsuccessful `OperationResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("store did not respond within {}ms", .timeout.as_millis())]
    OwnerUnresponsive { timeout: Duration },
}

impl StoreError {
    pub fn unresponsive(timeout: Duration) -> Self { Self::OwnerUnresponsive { timeout } }
}
