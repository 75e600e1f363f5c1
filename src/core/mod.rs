pub mod error;
pub mod matcher;
pub mod replacer;
pub mod scope;
pub mod store;
pub mod vault;

use serde::{Deserialize, Serialize};

/// The folder value that selects the entire vault.
pub const ROOT_FOLDER: &str = "/";

/// A single find-and-replace job as confirmed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementRequest {
    /// Scope root; `ROOT_FOLDER` means every document in the vault.
    pub folder: String,
    pub find: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,
    #[serde(default)]
    pub use_regex: bool,
}

fn default_case_sensitive() -> bool {
    true
}

impl ReplacementRequest {
    /// A request with the form's initial values: case-sensitive, literal matching.
    pub fn with_defaults(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            find: String::new(),
            replace: String::new(),
            case_sensitive: true,
            use_regex: false,
        }
    }

    pub fn is_whole_vault(&self) -> bool {
        self.folder == ROOT_FOLDER
    }
}

/// An entry in the vault listing, file or folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VaultEntry {
    pub path: String,
    /// Path of the containing folder, `ROOT_FOLDER` for top-level entries.
    pub parent_path: String,
}

/// A handle to a document the store can read and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentHandle {
    pub path: String,
}

impl DocumentHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Outcome of one document that could not be processed.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFailure {
    pub path: String,
    pub reason: String,
}

/// Summary of a finished batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    /// Number of documents whose content actually changed and was written.
    pub modified_count: usize,
    /// Number of documents the batch looked at, including failed ones.
    pub scanned_count: usize,
    pub failures: Vec<DocumentFailure>,
    /// `true` if the batch stopped early because cancellation was requested.
    pub cancelled: bool,
}

pub use error::{CoreError, InvalidPatternError, StoreError};
pub use matcher::CompiledMatcher;
pub use replacer::{BatchReplacer, ReplaceOutcome};
pub use scope::ScopeResolver;
pub use store::DocumentStore;
pub use vault::FsVault;
