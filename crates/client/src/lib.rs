//! Test client for the kv service.
//!
//! A small HTTP proxy that forwards `/kv/{key}` calls to the kv service and
//! exposes canned end-to-end checks (`/test_deletion`, `/test_overwrite`).

pub mod errors;
pub mod retry;
pub mod upstream;
pub mod proxy;
pub mod scenarios;
pub mod routes;
pub mod bootstrap;

pub use routes::{build_router, ClientState};
pub use upstream::KvServiceClient;
