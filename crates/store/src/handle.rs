use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::errors::StoreError;
use crate::observability;
use crate::operation::{Operation, OperationKind, OperationResult};

/// Caller-side gateway to a `StoreOwner`.
///
/// Cheap to clone; every clone feeds the same owner. Each call builds its own
/// reply channel and waits at most `request_timeout` for the owner, covering
/// both the handoff and the reply.
#[derive(Clone, Debug)]
pub struct StoreHandle {
    tx: mpsc::Sender<Operation>,
    request_timeout: Duration,
}

impl StoreHandle {
    pub fn new(tx: mpsc::Sender<Operation>, request_timeout: Duration) -> Self {
        Self { tx, request_timeout }
    }

    /// True once the owner's inbox has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Insert or overwrite `key`; returns the stored value.
    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<String, StoreError> {
        let key = key.into();
        let value = value.into();
        let result = self
            .dispatch(OperationKind::Set, |reply| Operation::Set { key, value, reply })
            .await?;
        Ok(result.value.unwrap_or_default())
    }

    /// Look up `key`; `None` when it does not exist.
    pub async fn get(&self, key: impl Into<String>) -> Result<Option<String>, StoreError> {
        let key = key.into();
        let result = self
            .dispatch(OperationKind::Get, |reply| Operation::Get { key, reply })
            .await?;
        Ok(if result.success { result.value } else { None })
    }

    /// Remove `key`; returns whether it existed before removal.
    pub async fn delete(&self, key: impl Into<String>) -> Result<bool, StoreError> {
        let key = key.into();
        let result = self
            .dispatch(OperationKind::Delete, |reply| Operation::Delete { key, reply })
            .await?;
        Ok(result.success)
    }

    async fn dispatch<F>(&self, kind: OperationKind, build: F) -> Result<OperationResult, StoreError>
    where
        F: FnOnce(oneshot::Sender<OperationResult>) -> Operation,
    {
        let started = Instant::now();
        let (reply, response) = oneshot::channel();
        let op = build(reply);

        let exchange = async {
            self.tx.send(op).await.map_err(|_| StoreError::Unavailable)?;
            // sender dropped without replying means the owner died mid-operation
            response.await.map_err(|_| StoreError::Unavailable)
        };

        let outcome = match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(res) => res,
            Err(_) => Err(StoreError::unresponsive(self.request_timeout)),
        };

        match &outcome {
            Ok(_) => observability::OPERATION_DURATION.observe(started.elapsed().as_secs_f64()),
            Err(StoreError::Unavailable) => {
                observability::STORE_UNAVAILABLE_TOTAL.inc();
                warn!(%kind, "store owner unavailable");
            }
            Err(StoreError::OwnerUnresponsive { timeout }) => {
                observability::OWNER_TIMEOUTS_TOTAL.inc();
                warn!(%kind, timeout_ms = timeout.as_millis() as u64, "store owner did not reply in time");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owner::StoreOwner;
    use std::collections::HashSet;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn spawn_store() -> StoreHandle {
        let (handle, _owner) = StoreOwner::spawn(1, TIMEOUT);
        handle
    }

    #[tokio::test]
    async fn set_then_get_returns_value() -> anyhow::Result<()> {
        let store = spawn_store();
        assert_eq!(store.set("robin", "jasonTodd").await?, "jasonTodd");
        assert_eq!(store.get("robin").await?, Some("jasonTodd".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn last_writer_wins() -> anyhow::Result<()> {
        let store = spawn_store();
        store.set("robin", "dickGrayson").await?;
        store.set("robin", "jasonTodd").await?;
        assert_eq!(store.get("robin").await?, Some("jasonTodd".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_entry() -> anyhow::Result<()> {
        let store = spawn_store();
        store.set("robin", "jasonTodd").await?;
        assert!(store.delete("robin").await?);
        assert_eq!(store.get("robin").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn delete_of_absent_key_stays_false() -> anyhow::Result<()> {
        let store = spawn_store();
        assert!(!store.delete("nessie").await?);
        assert!(!store.delete("nessie").await?);
        Ok(())
    }

    #[tokio::test]
    async fn get_of_absent_key_is_not_an_error() -> anyhow::Result<()> {
        let store = spawn_store();
        assert_eq!(store.get("bigfoot").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn scenario_from_fresh_store() -> anyhow::Result<()> {
        let store = spawn_store();

        assert_eq!(store.get("batman").await?, None);
        assert_eq!(store.set("batman", "bruceWayne").await?, "bruceWayne");

        store.set("robin", "jasonTodd").await?;
        assert_eq!(store.get("robin").await?, Some("jasonTodd".to_string()));
        assert!(store.delete("robin").await?);
        assert_eq!(store.get("robin").await?, None);

        assert!(!store.delete("nessie").await?);
        assert_eq!(store.get("batman").await?, Some("bruceWayne".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn independent_stores_do_not_share_state() -> anyhow::Result<()> {
        let a = spawn_store();
        let b = spawn_store();
        a.set("robin", "jasonTodd").await?;
        assert_eq!(b.get("robin").await?, None);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sets_leave_exactly_one_sent_value() -> anyhow::Result<()> {
        let store = spawn_store();
        let sent: HashSet<String> = (0..64).map(|i| format!("value-{i}")).collect();

        let mut tasks = Vec::new();
        for value in sent.iter().cloned() {
            let store = store.clone();
            tasks.push(tokio::spawn(async move { store.set("k", value).await }));
        }
        for task in tasks {
            task.await??;
        }

        let winner = store.get("k").await?.expect("key must exist after sets");
        assert!(sent.contains(&winner), "unexpected value {winner}");
        // a second read sees the same winner
        assert_eq!(store.get("k").await?, Some(winner));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_get_their_own_replies() -> anyhow::Result<()> {
        let store = spawn_store();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let key = format!("key-{i}");
                let value = format!("value-{i}");
                let stored = store.set(key.clone(), value.clone()).await?;
                let read = store.get(key).await?;
                Ok::<_, StoreError>((value, stored, read))
            }));
        }
        for task in tasks {
            let (value, stored, read) = task.await??;
            assert_eq!(stored, value);
            assert_eq!(read, Some(value));
        }
        Ok(())
    }

    #[tokio::test]
    async fn calls_fail_fast_once_owner_is_gone() {
        let (store, owner) = StoreOwner::spawn(1, TIMEOUT);
        owner.abort();
        let _ = owner.await;

        assert!(store.is_closed());
        assert_eq!(store.set("robin", "jasonTodd").await, Err(StoreError::Unavailable));
        assert_eq!(store.get("robin").await, Err(StoreError::Unavailable));
        assert_eq!(store.delete("robin").await, Err(StoreError::Unavailable));
    }

    #[tokio::test]
    async fn dropped_reply_is_reported_as_unavailable() {
        let (tx, mut rx) = mpsc::channel::<Operation>(1);
        let store = StoreHandle::new(tx, TIMEOUT);

        // consume the operation but never answer it
        let sink = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                drop(op);
            }
        });

        assert_eq!(store.get("robin").await, Err(StoreError::Unavailable));
        drop(store);
        sink.await.unwrap();
    }

    #[tokio::test]
    async fn stalled_owner_times_out() {
        let (tx, _rx) = mpsc::channel::<Operation>(1);
        let timeout = Duration::from_millis(50);
        let store = StoreHandle::new(tx, timeout);

        // the operation is queued but nobody ever receives it
        assert_eq!(store.get("robin").await, Err(StoreError::unresponsive(timeout)));
    }
}
