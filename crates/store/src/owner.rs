use std::{collections::HashMap, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use crate::handle::StoreHandle;
use crate::observability;
use crate::operation::{Operation, OperationResult};

/// Exclusive custodian of the key -> value map.
///
/// The map lives inside this struct and `run` takes `self` by value, so once
/// the owner is spawned the only way to reach the data is through the inbox.
pub struct StoreOwner {
    entries: HashMap<String, String>,
    inbox: mpsc::Receiver<Operation>,
}

impl StoreOwner {
    pub fn new(inbox: mpsc::Receiver<Operation>) -> Self {
        Self { entries: HashMap::new(), inbox }
    }

    /// Create the inbound channel, spawn the owner loop on the current runtime
    /// and return a handle for callers plus the owner's join handle.
    ///
    /// The loop ends once every clone of the returned handle is dropped.
    pub fn spawn(channel_capacity: usize, request_timeout: Duration) -> (StoreHandle, JoinHandle<()>) {
        // mpsc::channel panics on zero capacity
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let owner = tokio::spawn(StoreOwner::new(rx).run());
        (StoreHandle::new(tx, request_timeout), owner)
    }

    /// Process operations in arrival order until the inbound channel closes.
    pub async fn run(mut self) {
        info!(event = "owner_start", "store owner started");
        while let Some(op) = self.inbox.recv().await {
            self.apply(op);
        }
        info!(event = "owner_stop", entries = self.entries.len(), "inbound channel closed; store owner stopped");
    }

    /// Execute one operation and reply before returning.
    fn apply(&mut self, op: Operation) {
        let kind = op.kind();
        debug!(%kind, key = op.key(), "applying operation");

        let (result, reply) = match op {
            Operation::Set { key, value, reply } => {
                self.entries.insert(key, value.clone());
                (OperationResult::found(value), reply)
            }
            Operation::Get { key, reply } => {
                let result = match self.entries.get(&key) {
                    Some(value) => OperationResult::found(value.clone()),
                    None => OperationResult::missing(),
                };
                (result, reply)
            }
            Operation::Delete { key, reply } => {
                let existed = self.entries.remove(&key).is_some();
                (OperationResult::removed(existed), reply)
            }
        };

        observability::record_outcome(kind, result.success);
        if reply.send(result).is_err() {
            // caller gave up (timeout or cancelled request); the effect stands
            debug!(%kind, "caller dropped before reply was delivered");
        }
    }
}
