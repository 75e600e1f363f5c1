use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use crate::core::{DocumentHandle, DocumentStore, StoreError, VaultEntry, ROOT_FOLDER};

static LOGGING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
///
/// This function is wrapped in a `Once` block to ensure that the global
/// subscriber is set exactly one time, even when tests are run in parallel.
/// All test modules should call this function at the beginning of their tests.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init() // Use try_init() to be safe, though Once makes it redundant.
            .ok(); // Ignore the error if it's already set by another crate.
    });
}

/// Returns true when the current process runs as root (UID 0).
/// We use this to skip permission-sensitive tests in Docker/act.
#[cfg(any(test, doctest))]
#[inline]
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: libc call has no side effects; used for testing only.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

/// An in-memory `DocumentStore` that records how it is used.
///
/// Documents keep their insertion order. Reads, writes and the listing can be
/// made to fail on demand to exercise error paths.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<(String, String)>>,
    failing_reads: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
    listings: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn from_documents(documents: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (path, content) in documents {
            store.insert(path, content);
        }
        store
    }

    pub fn insert(&self, path: &str, content: &str) {
        let mut documents = self.documents.lock().expect("Mutex was poisoned.");
        match documents.iter_mut().find(|(p, _)| p == path) {
            Some(existing) => existing.1 = content.to_string(),
            None => documents.push((path.to_string(), content.to_string())),
        }
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.documents
            .lock()
            .expect("Mutex was poisoned.")
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.clone())
    }

    pub fn fail_reads_for(&self, path: &str) {
        self.failing_reads
            .lock()
            .expect("Mutex was poisoned.")
            .insert(path.to_string());
    }

    pub fn fail_writes_for(&self, path: &str) {
        self.failing_writes
            .lock()
            .expect("Mutex was poisoned.")
            .insert(path.to_string());
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub fn listing_count(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn injected_error(path: &str, operation: &str) -> StoreError {
        StoreError::io(
            path,
            std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("injected {operation} failure"),
            ),
        )
    }

    fn check_listing(&self) -> Result<(), StoreError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Self::injected_error(ROOT_FOLDER, "listing"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<VaultEntry>, StoreError> {
        self.check_listing()?;
        let documents = self.documents.lock().expect("Mutex was poisoned.");

        // Folders are implied by the document paths.
        let mut folders = BTreeSet::new();
        for (path, _) in documents.iter() {
            let mut current = path.as_str();
            while let Some((parent, _)) = current.rsplit_once('/') {
                if parent.is_empty() || !folders.insert(parent.to_string()) {
                    break;
                }
                current = parent;
            }
        }

        let parent_of = |path: &str| match path.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => parent.to_string(),
            _ => ROOT_FOLDER.to_string(),
        };
        Ok(folders
            .iter()
            .map(String::as_str)
            .chain(documents.iter().map(|(p, _)| p.as_str()))
            .map(|path| VaultEntry {
                path: path.to_string(),
                parent_path: parent_of(path),
            })
            .collect())
    }

    async fn markdown_documents(&self) -> Result<Vec<DocumentHandle>, StoreError> {
        self.check_listing()?;
        Ok(self
            .documents
            .lock()
            .expect("Mutex was poisoned.")
            .iter()
            .filter(|(path, _)| path.ends_with(".md"))
            .map(|(path, _)| DocumentHandle::new(path.clone()))
            .collect())
    }

    async fn read(&self, handle: &DocumentHandle) -> Result<String, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_reads
            .lock()
            .expect("Mutex was poisoned.")
            .contains(&handle.path)
        {
            return Err(Self::injected_error(&handle.path, "read"));
        }
        self.content(&handle.path)
            .ok_or_else(|| StoreError::NotFound(handle.path.clone()))
    }

    async fn write(&self, handle: &DocumentHandle, content: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_writes
            .lock()
            .expect("Mutex was poisoned.")
            .contains(&handle.path)
        {
            return Err(Self::injected_error(&handle.path, "write"));
        }
        self.insert(&handle.path, content);
        Ok(())
    }
}
