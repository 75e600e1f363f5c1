//! The storage abstraction the replacement engine works against.

use async_trait::async_trait;

use super::error::StoreError;
use super::{DocumentHandle, VaultEntry};

/// Defines the interface between the replacement engine and whatever holds
/// the documents. This allows the engine to run against a vault on disk, an
/// embedding host's own storage, or an in-memory double during tests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lists every known file and folder in the vault.
    async fn list_all(&self) -> Result<Vec<VaultEntry>, StoreError>;

    /// Lists every Markdown document, in a stable order.
    async fn markdown_documents(&self) -> Result<Vec<DocumentHandle>, StoreError>;

    /// Reads the full text content of a document.
    async fn read(&self, handle: &DocumentHandle) -> Result<String, StoreError>;

    /// Replaces the full text content of a document.
    async fn write(&self, handle: &DocumentHandle, content: &str) -> Result<(), StoreError>;
}
