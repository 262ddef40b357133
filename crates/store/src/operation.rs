use std::fmt;

use tokio::sync::oneshot;

/// Kind of an operation, used for logging and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Set,
    Get,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Set => "set",
            OperationKind::Get => "get",
            OperationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply sent back by the owner.
///
/// - `set`: always successful, `value` echoes what was stored.
/// - `get`: successful when the key exists, `value` carries the stored payload.
/// - `delete`: successful when the key existed before removal, `value` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub value: Option<String>,
}

impl OperationResult {
    pub fn found(value: String) -> Self {
        Self { success: true, value: Some(value) }
    }

    pub fn missing() -> Self {
        Self { success: false, value: None }
    }

    pub fn removed(existed: bool) -> Self {
        Self { success: existed, value: None }
    }
}

/// Request sent to the owner. Each one carries its own single-use reply
/// channel, so replies never cross between concurrent callers.
#[derive(Debug)]
pub enum Operation {
    Set {
        key: String,
        value: String,
        reply: oneshot::Sender<OperationResult>,
    },
    Get {
        key: String,
        reply: oneshot::Sender<OperationResult>,
    },
    Delete {
        key: String,
        reply: oneshot::Sender<OperationResult>,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Set { .. } => OperationKind::Set,
            Operation::Get { .. } => OperationKind::Get,
            Operation::Delete { .. } => OperationKind::Delete,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Operation::Set { key, .. } | Operation::Get { key, .. } | Operation::Delete { key, .. } => key,
        }
    }
}
