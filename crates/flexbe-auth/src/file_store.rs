//! File-backed credential store shared between processes
//!
//! The credential lives in one JSON file. Writes use atomic temp-file +
//! rename so a reader never observes a partial value, and the file is 0600
//! since it holds a bearer token.
//!
//! Other processes' changes are detected by polling (`watch`). The store
//! remembers the content it last wrote, cleared, or reported, so its own
//! writes are never echoed back as events.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use crate::credentials::{Credential, CredentialStore, StoreEvent, StoreFuture};
use crate::error::{Error, Result};

const EVENT_CAPACITY: usize = 16;

pub struct FileCredentialStore {
    path: PathBuf,
    /// File content as this instance last knew it; `None` means no file.
    last_seen: Mutex<Option<String>>,
    events: broadcast::Sender<StoreEvent>,
}

impl FileCredentialStore {
    /// Open the store at `path`, creating the parent directory if needed.
    ///
    /// A missing file is a valid empty store. The file is not created until
    /// the first write.
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::Io(format!("creating credential directory: {e}")))?;
        }
        let current = read_raw(&path).await;
        debug!(path = %path.display(), present = current.is_some(), "opened credential file");
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            path,
            last_seen: Mutex::new(current),
            events,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Spawn a task that polls the file every `interval` and publishes
    /// changes made by other processes.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // Skip the immediate first tick, the file was just read by open()
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Some(event) = store.poll_once().await {
                    // No receivers is fine, nobody is listening yet
                    let _ = store.events.send(event);
                }
            }
        })
    }

    /// Compare the file against the last known content and return the change,
    /// if another writer made one.
    pub async fn poll_once(&self) -> Option<StoreEvent> {
        // Lock before reading so an in-progress local write can't be reported
        // as a foreign change.
        let mut last_seen = self.last_seen.lock().await;
        let current = read_raw(&self.path).await;
        if *last_seen == current {
            return None;
        }
        debug!(path = %self.path.display(), "credential file changed externally");
        let event = StoreEvent::from_raw(current.as_deref());
        *last_seen = current;
        Some(event)
    }
}

impl CredentialStore for FileCredentialStore {
    fn read(&self) -> StoreFuture<'_, Option<Credential>> {
        Box::pin(async move {
            let raw = read_raw(&self.path).await?;
            Credential::parse_stored(&raw)
        })
    }

    fn write<'a>(&'a self, credential: &'a Credential) -> StoreFuture<'a, Result<()>> {
        Box::pin(async move {
            let json = credential.to_json()?;
            let mut last_seen = self.last_seen.lock().await;
            write_atomic(&self.path, &json).await?;
            *last_seen = Some(json);
            Ok(())
        })
    }

    fn clear(&self) -> StoreFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut last_seen = self.last_seen.lock().await;
            match tokio::fs::remove_file(&self.path).await {
                Ok(()) => debug!(path = %self.path.display(), "removed credential file"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(Error::Io(format!("removing credential file: {e}"))),
            }
            *last_seen = None;
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

/// Read the file content; missing or unreadable files read as `None`.
async fn read_raw(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "credential file unreadable, treating as absent"
            );
            None
        }
    }
}

/// Write the credential file atomically.
///
/// Writes to a uniquely named temporary file in the same directory, then
/// renames it over the target. Permissions are 0600 on unix.
async fn write_atomic(path: &Path, json: &str) -> Result<()> {
    let dir = path
        .parent()
        .map(|d| {
            if d.as_os_str().is_empty() {
                Path::new(".")
            } else {
                d
            }
        })
        .ok_or_else(|| Error::Io("credential path has no parent directory".into()))?;

    let tmp_path = dir.join(format!(".credential.tmp.{}", uuid::Uuid::new_v4()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting credential file permissions: {e}")))?;
    }

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(Error::Io(format!("renaming temp credential file: {e}")));
    }

    debug!(path = %path.display(), "persisted credential");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(suffix: &str) -> Credential {
        Credential::new(format!("at_{suffix}"), 4_102_444_800_000)
    }

    async fn open_in(dir: &tempfile::TempDir) -> FileCredentialStore {
        FileCredentialStore::open(dir.path().join("flexbe_jwt_token.json"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn empty_store_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir).await;
        assert!(store.read().await.is_none());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn write_then_read_from_second_instance() {
        let dir = tempfile::tempdir().unwrap();
        let first = open_in(&dir).await;
        first.write(&credential("1")).await.unwrap();

        let second = open_in(&dir).await;
        assert_eq!(second.read().await.unwrap(), credential("1"));
    }

    #[tokio::test]
    async fn write_is_total_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir).await;
        store.write(&credential("old")).await.unwrap();
        store.write(&Credential::new("at_new", 7)).await.unwrap();

        let contents = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(contents, r#"{"accessToken":"at_new","expiresAt":7}"#);
    }

    #[tokio::test]
    async fn malformed_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir).await;
        tokio::fs::write(store.path(), "{ not json").await.unwrap();
        assert!(store.read().await.is_none());
    }

    #[tokio::test]
    async fn clear_removes_file_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir).await;
        store.write(&credential("1")).await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
        store.clear().await.unwrap();
        assert!(store.read().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_permissions_are_0600() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir).await;
        store.write(&credential("1")).await.unwrap();

        let mode = tokio::fs::metadata(store.path())
            .await
            .unwrap()
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600, "credential file must be 0600, got {mode:o}");
    }

    #[tokio::test]
    async fn own_writes_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_in(&dir).await;
        store.write(&credential("1")).await.unwrap();
        assert!(store.poll_once().await.is_none());
        store.clear().await.unwrap();
        assert!(store.poll_once().await.is_none());
    }

    #[tokio::test]
    async fn foreign_writes_are_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let ours = open_in(&dir).await;
        let theirs = open_in(&dir).await;

        theirs.write(&credential("theirs")).await.unwrap();
        assert_eq!(
            ours.poll_once().await,
            Some(StoreEvent::Updated(credential("theirs")))
        );
        assert!(ours.poll_once().await.is_none());

        theirs.clear().await.unwrap();
        assert_eq!(ours.poll_once().await, Some(StoreEvent::Cleared));
    }

    #[tokio::test]
    async fn watcher_publishes_foreign_changes() {
        let dir = tempfile::tempdir().unwrap();
        let ours = Arc::new(open_in(&dir).await);
        let theirs = open_in(&dir).await;
        let mut events = ours.subscribe();
        let handle = ours.watch(Duration::from_millis(20));

        theirs.write(&credential("x")).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, StoreEvent::Updated(credential("x")));

        handle.abort();
    }

    #[tokio::test]
    async fn concurrent_writes_leave_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(open_in(&dir).await);

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.write(&credential(&i.to_string())).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert!(store.read().await.is_some());
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with(".credential.tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }
}
