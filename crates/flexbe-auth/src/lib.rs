//! Flexbe bearer credential library
//!
//! Provides the credential type, its durable shared store, token expiry
//! decoding, and the token/revoke endpoint calls. This crate has no notion
//! of refresh policy; `flexbe-session` builds the lifecycle on top of it.
//!
//! Credential flow:
//! 1. `token::fetch_token()` obtains an access token for the current session
//! 2. `Credential::from_token()` derives the expiry from the token's `exp` claim
//! 3. The credential is persisted via `CredentialStore::write()`
//! 4. Sibling contexts observe it through `CredentialStore::subscribe()`
//! 5. `token::revoke_token()` invalidates it server-side on logout

pub mod constants;
pub mod credentials;
pub mod error;
pub mod file_store;
pub mod jwt;
pub mod memory_store;
pub mod token;

pub use constants::*;
pub use credentials::{Credential, CredentialStore, StoreEvent, StoreFuture, now_millis};
pub use error::{Error, Result};
pub use file_store::FileCredentialStore;
pub use memory_store::{MemoryCredentialStore, MemoryStoreHub};
pub use token::{TokenResponse, fetch_token, revoke_token};
