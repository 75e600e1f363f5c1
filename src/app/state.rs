//! Defines the central, mutable state of the application.

use crate::config::AppConfig;
use crate::core::BatchResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::i18n::Language;

/// Holds the complete, mutable state of the application.
///
/// This struct is wrapped in an `Arc<Mutex<...>>` to allow for safe, shared access
/// from different threads (e.g., the IPC handlers and the replacement task).
pub struct AppState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// The language messages are rendered in, resolved from the host's locale.
    pub language: Language,
    /// `true` while a replacement batch is running.
    pub is_replacing: bool,
    /// A handle to the currently running replacement task.
    pub replace_task: Option<JoinHandle<()>>,
    /// A flag used to signal cancellation to the replacement task.
    pub replace_cancellation_flag: Arc<AtomicBool>,
    /// The result of the most recent completed batch.
    pub last_result: Option<BatchResult>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let language = Language::from_locale(&config.language);
        Self {
            config,
            language,
            is_replacing: false,
            replace_task: None,
            replace_cancellation_flag: Arc::new(AtomicBool::new(false)),
            last_result: None,
        }
    }

    /// Re-resolves the message language after the host's locale changed.
    pub fn set_locale(&mut self, locale: &str) {
        self.config.language = locale.to_string();
        self.language = Language::from_locale(locale);
        tracing::info!("Language set to {:?} for locale {:?}", self.language, locale);
    }

    /// Asks the running replacement to stop after the current document.
    ///
    /// Documents already written stay written.
    pub fn cancel_current_replacement(&mut self) {
        if self.is_replacing {
            tracing::info!("Signalling cancellation to the replacement task.");
            self.replace_cancellation_flag.store(true, Ordering::SeqCst);
        } else {
            tracing::warn!("cancel_current_replacement called, but no replacement is running.");
        }
    }

    /// Marks a new batch as running and returns its fresh cancellation flag.
    pub fn begin_replacement(&mut self) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.replace_cancellation_flag = flag.clone();
        self.is_replacing = true;
        self.last_result = None;
        flag
    }

    pub fn finish_replacement(&mut self, result: Option<BatchResult>) {
        self.is_replacing = false;
        self.replace_task = None;
        self.last_result = result;
    }
}

impl Default for AppState {
    /// Creates a default `AppState` instance, loading the configuration from disk.
    fn default() -> Self {
        Self::new(AppConfig::load().unwrap_or_default())
    }
}
