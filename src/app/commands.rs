//! Contains all the command handlers that are callable from the host via IPC.
//!
//! Each function in this module corresponds to a specific `IpcMessage::command`.
//! These handlers are responsible for interacting with the `AppState` and the `core`
//! logic, and for sending `UserEvent`s back to the host.

use super::events::{NoticeKind, ReplaceForm, UserEvent};
use super::i18n::{self, FormLabels, MessageKey};
use super::proxy::EventProxy;
use super::request_source::RequestSource;
use super::state::AppState;
use super::tasks::start_replacement;
use crate::core::{DocumentStore, ReplacementRequest, ScopeResolver, ROOT_FOLDER};
use std::sync::{Arc, Mutex};

/// Lists the vault's folders and sends the find-and-replace form to the host.
pub async fn open_replace_form<P: EventProxy>(
    store: Arc<dyn DocumentStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let entries = store.list_all().await;

    let state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    let lang = state_guard.language;

    let entries = match entries {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to list vault entries for the form: {}", e);
            proxy.send_event(UserEvent::notice(
                NoticeKind::UnknownError,
                i18n::text(lang, MessageKey::ErrorUnknown),
            ));
            return;
        }
    };

    let folders = ScopeResolver::folder_choices(&entries);
    let initial_folder = folders
        .first()
        .cloned()
        .unwrap_or_else(|| ROOT_FOLDER.to_string());
    let mut defaults = ReplacementRequest::with_defaults(initial_folder);
    defaults.case_sensitive = state_guard.config.case_sensitive_by_default;
    defaults.use_regex = state_guard.config.use_regex_by_default;

    tracing::info!("Opening replace form with {} folder choices.", folders.len());
    proxy.send_event(UserEvent::ShowReplaceForm(Box::new(ReplaceForm {
        folders,
        defaults,
        labels: FormLabels::for_language(lang),
    })));
}

/// Collects a request from `source` and starts the replacement.
///
/// Does nothing if the user dismissed the form.
pub fn replace_in_folder<P: EventProxy, R: RequestSource + ?Sized>(
    source: &R,
    store: Arc<dyn DocumentStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    if let Some(request) = source.request_replacement() {
        start_replacement(request, store, proxy, state);
    } else {
        tracing::info!("User dismissed the replace form.");
    }
}

/// Cancels the running replacement after its current document.
pub fn cancel_replace(state: Arc<Mutex<AppState>>) {
    state
        .lock()
        .expect("Mutex was poisoned. This should not happen.")
        .cancel_current_replacement();
}

/// Applies the host's new locale to all subsequent messages.
pub fn set_language(payload: serde_json::Value, state: Arc<Mutex<AppState>>) {
    if let Ok(locale) = serde_json::from_value::<String>(payload.clone()) {
        state
            .lock()
            .expect("Mutex was poisoned. This should not happen.")
            .set_locale(&locale);
    } else {
        tracing::warn!(
            "Failed to deserialize locale string from payload: {:?}",
            payload
        );
    }
}
