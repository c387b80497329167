//! Bearer credential lifecycle for Flexbe API clients
//!
//! `TokenManager` owns the cached credential for one process and coordinates
//! refreshes so concurrent callers share a single token fetch. Other contexts
//! sharing the same `CredentialStore` see its writes, and it adopts theirs.
//!
//! Lifecycle:
//! 1. `TokenManager::load` adopts a live stored credential
//! 2. `get_credential` serves the cache, or joins/starts one refresh
//! 3. `spawn_check_task` refreshes ahead of expiry in the background
//! 4. `spawn_sync_task` applies other contexts' store changes
//! 5. `revoke` clears locally first, then revokes server-side

pub mod error;
pub mod global;
pub mod manager;
pub mod tasks;

pub use error::{Error, Result};
pub use manager::{DEFAULT_REFRESH_LEAD, LifecycleState, TokenManager, TokenSettings};
pub use tasks::{DEFAULT_CHECK_INTERVAL, spawn_check_task, spawn_sync_task};
