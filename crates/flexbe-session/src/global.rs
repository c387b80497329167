//! Process-wide token manager
//!
//! Most programs want one credential lifecycle per process. `init` installs
//! it once, `get` hands it out, and `reset` drops it so tests or a logout
//! flow can start over. Code that needs isolation builds its own manager
//! with `TokenManager::load` instead.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::manager::TokenManager;

static MANAGER: RwLock<Option<Arc<TokenManager>>> = RwLock::new(None);

/// Install `manager` unless one is already installed. Returns the installed one.
pub fn init(manager: Arc<TokenManager>) -> Arc<TokenManager> {
    let mut slot = MANAGER.write().unwrap_or_else(PoisonError::into_inner);
    match slot.as_ref() {
        Some(existing) => Arc::clone(existing),
        None => {
            debug!(mode = %manager.mode(), "installed process-wide token manager");
            *slot = Some(Arc::clone(&manager));
            manager
        }
    }
}

pub fn get() -> Option<Arc<TokenManager>> {
    MANAGER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Remove the installed manager, returning it.
pub fn reset() -> Option<Arc<TokenManager>> {
    MANAGER
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::TokenSettings;
    use flexbe_auth::MemoryCredentialStore;
    use provider::AuthMode;
    use std::time::Duration;

    async fn manager() -> Arc<TokenManager> {
        TokenManager::load(
            AuthMode::Bearer,
            Arc::new(MemoryCredentialStore::standalone()),
            reqwest::Client::new(),
            TokenSettings::new("http://127.0.0.1:9", Duration::from_secs(1)),
        )
        .await
    }

    // Single test so parallel test threads never race on the global slot
    #[tokio::test]
    async fn init_get_reset_lifecycle() {
        reset();
        assert!(get().is_none());

        let first = manager().await;
        let installed = init(first.clone());
        assert!(Arc::ptr_eq(&installed, &first));

        let second = manager().await;
        let kept = init(second.clone());
        assert!(Arc::ptr_eq(&kept, &first));
        assert!(Arc::ptr_eq(&get().unwrap(), &first));

        let removed = reset().unwrap();
        assert!(Arc::ptr_eq(&removed, &first));
        assert!(get().is_none());

        assert!(Arc::ptr_eq(&init(second.clone()), &second));
        reset();
    }
}
