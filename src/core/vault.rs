//! A `DocumentStore` backed by a vault directory on the local file system.

use async_trait::async_trait;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use super::error::StoreError;
use super::store::DocumentStore;
use super::{DocumentHandle, VaultEntry, ROOT_FOLDER};

/// A vault rooted at a directory.
///
/// Document paths are relative to the root and always use `/` as separator,
/// e.g. `Journal/2024/jan.md`. Hidden entries (such as `.obsidian`) and
/// anything matching the configured ignore patterns are not listed.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: Utf8PathBuf,
    ignore_patterns: HashSet<String>,
    markdown_extensions: Vec<String>,
}

/// One walked entry, relative to the vault root.
struct WalkedEntry {
    path: String,
    is_dir: bool,
}

impl FsVault {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore_patterns: HashSet::new(),
            markdown_extensions: vec!["md".to_string()],
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: HashSet<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_markdown_extensions(mut self, extensions: Vec<String>) -> Self {
        self.markdown_extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn is_markdown(&self, path: &str) -> bool {
        Utf8Path::new(path)
            .extension()
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.markdown_extensions.iter().any(|known| *known == ext)
            })
            .unwrap_or(false)
    }

    fn build_ignore_matcher(&self) -> Gitignore {
        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.ignore_patterns {
            let trimmed = pattern.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Err(e) = builder.add_line(None, trimmed) {
                tracing::warn!("Ignoring invalid ignore pattern {:?}: {}", trimmed, e);
            }
        }
        builder.build().unwrap_or_else(|e| {
            tracing::error!("Failed to build ignore matcher: {}", e);
            Gitignore::empty()
        })
    }

    /// Walks the vault synchronously. Entries come out depth-first with
    /// siblings sorted by name, so the order is stable between runs.
    ///
    /// Only an unreadable root fails the walk. Anything below it that cannot
    /// be read is logged and left out of the listing.
    fn walk(&self) -> Result<Vec<WalkedEntry>, StoreError> {
        if let Err(e) = std::fs::read_dir(&self.root) {
            return Err(match e.kind() {
                std::io::ErrorKind::NotFound => StoreError::NotFound(self.root.to_string()),
                _ => StoreError::io(self.root.as_str(), e),
            });
        }

        let matcher = self.build_ignore_matcher();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !matcher.matched(entry.path(), is_dir).is_ignore()
            })
            .build();

        let mut entries = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable vault entry: {}", e);
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let relative = match entry.path().strip_prefix(self.root.as_std_path()) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let Some(relative) = Utf8Path::from_path(relative) else {
                tracing::warn!("Skipping non UTF-8 path: {}", entry.path().display());
                continue;
            };
            entries.push(WalkedEntry {
                path: to_vault_path(relative),
                is_dir: entry.file_type().is_some_and(|t| t.is_dir()),
            });
        }
        Ok(entries)
    }

    async fn walk_in_background(&self) -> Result<Vec<WalkedEntry>, StoreError> {
        let vault = self.clone();
        tokio::task::spawn_blocking(move || vault.walk()).await?
    }

    /// Maps a handle to its absolute location, refusing paths that would
    /// leave the vault.
    fn absolute_path(&self, handle: &DocumentHandle) -> Result<Utf8PathBuf, StoreError> {
        let relative = Utf8Path::new(handle.path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
        if escapes || relative.as_str().is_empty() {
            return Err(StoreError::NotFound(handle.path.clone()));
        }
        Ok(self.root.join(relative))
    }

    async fn resolve_in_background(
        &self,
        handle: &DocumentHandle,
    ) -> Result<PathBuf, StoreError> {
        let root = self.root.clone();
        let path = self.absolute_path(handle)?;
        let display_path = handle.path.clone();
        tokio::task::spawn_blocking(move || resolve_target(&root, &path, &display_path)).await?
    }
}

/// Follows symlinks to the real file, refusing targets outside the vault.
fn resolve_target(
    root: &Utf8Path,
    path: &Utf8Path,
    display_path: &str,
) -> Result<PathBuf, StoreError> {
    let target = std::fs::canonicalize(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound(display_path.to_string()),
        _ => StoreError::io(display_path, e),
    })?;
    let canonical_root =
        std::fs::canonicalize(root).map_err(|e| StoreError::io(root.as_str(), e))?;
    if !target.starts_with(&canonical_root) {
        return Err(StoreError::OutsideVault(display_path.to_string()));
    }
    Ok(target)
}

fn to_vault_path(relative: &Utf8Path) -> String {
    relative
        .components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_of(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => parent.to_string(),
        _ => ROOT_FOLDER.to_string(),
    }
}

#[async_trait]
impl DocumentStore for FsVault {
    async fn list_all(&self) -> Result<Vec<VaultEntry>, StoreError> {
        let entries = self.walk_in_background().await?;
        Ok(entries
            .into_iter()
            .map(|entry| VaultEntry {
                parent_path: parent_of(&entry.path),
                path: entry.path,
            })
            .collect())
    }

    async fn markdown_documents(&self) -> Result<Vec<DocumentHandle>, StoreError> {
        let entries = self.walk_in_background().await?;
        let documents: Vec<DocumentHandle> = entries
            .into_iter()
            .filter(|entry| !entry.is_dir && self.is_markdown(&entry.path))
            .map(|entry| DocumentHandle::new(entry.path))
            .collect();
        tracing::debug!("Found {} Markdown documents in {}", documents.len(), self.root);
        Ok(documents)
    }

    async fn read(&self, handle: &DocumentHandle) -> Result<String, StoreError> {
        let path = self.resolve_in_background(handle).await?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(handle.path.clone())
            } else {
                StoreError::io(handle.path.clone(), e)
            }
        })?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8(handle.path.clone()))
    }

    /// Writes through a temporary file next to the real document which is
    /// then renamed over it, so a failed write never truncates it. Symlinks
    /// are resolved first and the document keeps its permissions.
    async fn write(&self, handle: &DocumentHandle, content: &str) -> Result<(), StoreError> {
        let root = self.root.clone();
        let path = self.absolute_path(handle)?;
        let display_path = handle.path.clone();
        let content = content.to_owned();

        tokio::task::spawn_blocking(move || {
            let io_err = |e: std::io::Error| StoreError::io(display_path.clone(), e);
            let target = resolve_target(&root, &path, &display_path)?;
            let permissions = std::fs::metadata(&target).map_err(io_err)?.permissions();

            let dir = target.parent().unwrap_or(std::path::Path::new("."));
            let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
            temp.write_all(content.as_bytes()).map_err(io_err)?;
            temp.as_file().set_permissions(permissions).map_err(io_err)?;
            temp.persist(&target).map_err(|e| io_err(e.error))?;
            Ok(())
        })
        .await?
    }
}
