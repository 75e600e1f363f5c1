//! Drives a find-and-replace batch across the documents of a folder scope.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::{CoreError, StoreError};
use super::matcher::CompiledMatcher;
use super::scope::ScopeResolver;
use super::store::DocumentStore;
use super::{BatchResult, DocumentFailure, DocumentHandle, ReplacementRequest};

const YIELD_INTERVAL: usize = 10;

/// Progress of a running batch, reported once per document.
#[derive(Serialize, Clone, Debug)]
pub struct ReplaceProgress {
    pub current_path: String,
    pub processed: usize,
    pub total: usize,
    pub modified: usize,
}

/// How a batch ended when it was not rejected up front.
#[derive(Debug, Clone)]
pub enum ReplaceOutcome {
    /// The folder scope contained no documents. Nothing was read.
    NoDocuments,
    /// Every document in scope was visited (or the batch was cancelled part-way).
    Completed(BatchResult),
}

impl ReplaceOutcome {
    pub fn modified_count(&self) -> usize {
        match self {
            Self::NoDocuments => 0,
            Self::Completed(result) => result.modified_count,
        }
    }
}

/// A utility struct for running replacement batches.
///
/// This struct is stateless and provides methods as associated functions.
pub struct BatchReplacer;

impl BatchReplacer {
    /// Validates a request and builds its matcher.
    ///
    /// This never touches the store, so a rejected request leaves every
    /// document unread.
    pub fn prepare(request: &ReplacementRequest) -> Result<CompiledMatcher, CoreError> {
        if request.find.is_empty() {
            return Err(CoreError::EmptySearchTerm);
        }
        let matcher =
            CompiledMatcher::build(&request.find, request.case_sensitive, request.use_regex)?;
        tracing::debug!(
            "Built {} matcher for {:?}",
            matcher.mode_name(),
            request.find
        );
        Ok(matcher)
    }

    /// Validates, builds and runs a request in one go.
    pub async fn replace_in_folder<S>(
        store: &S,
        request: &ReplacementRequest,
    ) -> Result<ReplaceOutcome, CoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let matcher = Self::prepare(request)?;
        let never_cancelled = AtomicBool::new(false);
        Self::run(store, request, &matcher, &never_cancelled, |_| {}).await
    }

    /// Applies `matcher` to every document in the request's folder scope.
    ///
    /// Documents are processed one after another in listing order. A document
    /// that fails to read or write is logged and recorded in
    /// `BatchResult::failures`; the batch carries on with the next one. Only a
    /// failure to produce the listing aborts the whole run.
    pub async fn run<S, F>(
        store: &S,
        request: &ReplacementRequest,
        matcher: &CompiledMatcher,
        cancel_flag: &AtomicBool,
        progress_callback: F,
    ) -> Result<ReplaceOutcome, CoreError>
    where
        S: DocumentStore + ?Sized,
        F: Fn(ReplaceProgress) + Send + Sync,
    {
        let all_documents = store.markdown_documents().await.map_err(|e| {
            tracing::error!("Failed to list documents: {}", e);
            CoreError::Store(e)
        })?;
        let documents = ScopeResolver::resolve(&request.folder, &all_documents);

        if documents.is_empty() {
            tracing::info!("No documents found in folder {:?}", request.folder);
            return Ok(ReplaceOutcome::NoDocuments);
        }

        let total = documents.len();
        tracing::info!(
            "Replacing {:?} in {} documents under {:?} ({})",
            request.find,
            total,
            request.folder,
            matcher.mode_name()
        );

        let mut result = BatchResult::default();
        for (i, document) in documents.iter().enumerate() {
            if cancel_flag.load(Ordering::Relaxed) {
                tracing::info!("🛑 Replacement cancelled after {} documents", i);
                result.cancelled = true;
                break;
            }

            progress_callback(ReplaceProgress {
                current_path: document.path.clone(),
                processed: i,
                total,
                modified: result.modified_count,
            });

            result.scanned_count += 1;
            match Self::process_document(store, document, matcher, &request.replace).await {
                Ok(true) => {
                    tracing::debug!("Modified {}", document.path);
                    result.modified_count += 1;
                }
                Ok(false) => tracing::debug!("No changes for {}", document.path),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", document.path, e);
                    result.failures.push(DocumentFailure {
                        path: document.path.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            if (i + 1) % YIELD_INTERVAL == 0 {
                tokio::task::yield_now().await;
            }
        }

        tracing::info!(
            "Replacement finished: {} of {} documents modified, {} failed",
            result.modified_count,
            result.scanned_count,
            result.failures.len()
        );
        Ok(ReplaceOutcome::Completed(result))
    }

    /// Returns `true` if the document changed and was written back.
    async fn process_document<S>(
        store: &S,
        document: &DocumentHandle,
        matcher: &CompiledMatcher,
        replacement: &str,
    ) -> Result<bool, StoreError>
    where
        S: DocumentStore + ?Sized,
    {
        let original = store.read(document).await?;
        let updated = matcher.apply(&original, replacement);
        if updated == original.as_str() {
            return Ok(false);
        }
        store.write(document, &updated).await?;
        Ok(true)
    }
}
