//! Decides which documents a replacement applies to.

use std::collections::BTreeSet;

use super::{DocumentHandle, VaultEntry, ROOT_FOLDER};

/// A utility struct for resolving folder scopes.
///
/// This struct is stateless and provides methods as associated functions.
pub struct ScopeResolver;

impl ScopeResolver {
    /// Returns the documents under `folder`, preserving listing order.
    ///
    /// The root marker selects everything. Any other folder matches on a whole
    /// path segment, so `Notes` never picks up documents in `Notes2/`.
    pub fn resolve(folder: &str, documents: &[DocumentHandle]) -> Vec<DocumentHandle> {
        if folder == ROOT_FOLDER {
            return documents.to_vec();
        }

        let prefix = format!("{}/", folder.trim_end_matches('/'));
        documents
            .iter()
            .filter(|doc| doc.path.starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Collects the folders a user can pick from: the root marker plus the
    /// parent of every known entry.
    ///
    /// The root marker always comes first, the rest are sorted.
    pub fn folder_choices(entries: &[VaultEntry]) -> Vec<String> {
        let parents: BTreeSet<&str> = entries
            .iter()
            .map(|entry| entry.parent_path.as_str())
            .filter(|parent| !parent.is_empty() && *parent != ROOT_FOLDER)
            .collect();

        std::iter::once(ROOT_FOLDER.to_string())
            .chain(parents.into_iter().map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(paths: &[&str]) -> Vec<DocumentHandle> {
        paths.iter().map(|p| DocumentHandle::new(*p)).collect()
    }

    fn paths(handles: &[DocumentHandle]) -> Vec<&str> {
        handles.iter().map(|h| h.path.as_str()).collect()
    }

    fn entry(path: &str, parent: &str) -> VaultEntry {
        VaultEntry {
            path: path.to_string(),
            parent_path: parent.to_string(),
        }
    }

    #[test]
    fn test_folder_selects_nested_documents() {
        let all = docs(&["/A/x.md", "/A/B/y.md", "/C/z.md"]);
        let result = ScopeResolver::resolve("/A", &all);
        assert_eq!(paths(&result), vec!["/A/x.md", "/A/B/y.md"]);
    }

    #[test]
    fn test_root_selects_everything() {
        let all = docs(&["/A/x.md", "/A/B/y.md", "/C/z.md"]);
        let result = ScopeResolver::resolve(ROOT_FOLDER, &all);
        assert_eq!(result, all);
    }

    #[test]
    fn test_prefix_respects_segment_boundary() {
        let all = docs(&["Notes/a.md", "Notes2/b.md", "Notes/sub/c.md"]);
        let result = ScopeResolver::resolve("Notes", &all);
        assert_eq!(paths(&result), vec!["Notes/a.md", "Notes/sub/c.md"]);
    }

    #[test]
    fn test_trailing_slash_is_tolerated() {
        let all = docs(&["Notes/a.md", "Notes2/b.md"]);
        let result = ScopeResolver::resolve("Notes/", &all);
        assert_eq!(paths(&result), vec!["Notes/a.md"]);
    }

    #[test]
    fn test_unknown_folder_is_empty_not_error() {
        let all = docs(&["Notes/a.md"]);
        assert!(ScopeResolver::resolve("Missing", &all).is_empty());
    }

    #[test]
    fn test_folder_choices_are_deduplicated_with_root_first() {
        let entries = vec![
            entry("Journal/2024/jan.md", "Journal/2024"),
            entry("Journal/2024", "Journal"),
            entry("Journal", ROOT_FOLDER),
            entry("Journal/2024/feb.md", "Journal/2024"),
            entry("README.md", ROOT_FOLDER),
            entry("Archive/old.md", "Archive"),
        ];
        let choices = ScopeResolver::folder_choices(&entries);
        assert_eq!(
            choices,
            vec![ROOT_FOLDER, "Archive", "Journal", "Journal/2024"]
        );
    }

    #[test]
    fn test_folder_choices_for_empty_vault() {
        assert_eq!(ScopeResolver::folder_choices(&[]), vec![ROOT_FOLDER]);
    }
}
