//! Single-owner key-value store.
//! - One task (`StoreOwner`) holds the map; nothing else can reach it.
//! - Callers talk to it through a cloneable `StoreHandle` that sends typed
//!   `Operation`s and waits on a per-call reply channel.
//! - `KvStore` is the seam adapters depend on, so HTTP handlers never see
//!   channels directly.

pub mod errors;
pub mod operation;
pub mod owner;
pub mod handle;
pub mod kv_store;
pub mod observability;

pub use errors::StoreError;
pub use handle::StoreHandle;
pub use kv_store::KvStore;
pub use operation::{Operation, OperationKind, OperationResult};
pub use owner::StoreOwner;
