use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use super::events::{NoticeKind, UserEvent};
use super::i18n::{self, Language, MessageKey};
use super::proxy::EventProxy;
use super::state::AppState;

use crate::core::{
    BatchReplacer, CompiledMatcher, CoreError, DocumentStore, ReplaceOutcome, ReplacementRequest,
};

/// Translates an engine error into the notice the user sees.
pub fn notice_for_error(lang: Language, error: &CoreError) -> UserEvent {
    match error {
        CoreError::EmptySearchTerm => UserEvent::notice(
            NoticeKind::ValidationError,
            i18n::text(lang, MessageKey::ErrorFindInputEmpty),
        ),
        CoreError::InvalidPattern(e) => {
            UserEvent::notice(NoticeKind::PatternError, i18n::invalid_regex(lang, &e.message))
        }
        CoreError::Store(_) => UserEvent::notice(
            NoticeKind::UnknownError,
            i18n::text(lang, MessageKey::ErrorUnknown),
        ),
    }
}

/// Validates a request and, if it is acceptable, starts the batch in the background.
///
/// Validation and pattern errors are reported right away and nothing is
/// spawned. Returns `true` if a batch was started.
pub fn start_replacement<P: EventProxy>(
    request: ReplacementRequest,
    store: Arc<dyn DocumentStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) -> bool {
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");

    if state_guard.is_replacing {
        tracing::warn!("A replacement is already running; ignoring new request.");
        return false;
    }

    let lang = state_guard.language;
    let matcher = match BatchReplacer::prepare(&request) {
        Ok(matcher) => matcher,
        Err(e) => {
            tracing::info!("Replacement request rejected: {}", e);
            proxy.send_event(notice_for_error(lang, &e));
            return false;
        }
    };

    proxy.send_event(UserEvent::notice(
        NoticeKind::Starting,
        i18n::text(lang, MessageKey::InfoStarting),
    ));

    let cancel_flag = state_guard.begin_replacement();
    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        replace_task(request, matcher, store, proxy, task_state, cancel_flag).await;
    });
    state_guard.replace_task = Some(handle);
    true
}

/// Clears the running batch from `AppState` if its task ends without
/// reporting, e.g. because it panicked.
struct RunningBatchGuard {
    state: Arc<Mutex<AppState>>,
    armed: bool,
}

impl RunningBatchGuard {
    fn new(state: Arc<Mutex<AppState>>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RunningBatchGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::error!("TASK:: replace_task ended without a result; clearing running state.");
        let mut state_guard = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state_guard.finish_replacement(None);
    }
}

/// The asynchronous task that runs one batch and reports its outcome.
async fn replace_task<P: EventProxy>(
    request: ReplacementRequest,
    matcher: CompiledMatcher,
    store: Arc<dyn DocumentStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
    cancel_flag: Arc<AtomicBool>,
) {
    tracing::info!("TASK:: replace_task started for folder {:?}", request.folder);
    let mut running = RunningBatchGuard::new(state.clone());

    let progress_proxy = proxy.clone();
    let outcome = BatchReplacer::run(
        store.as_ref(),
        &request,
        &matcher,
        &cancel_flag,
        move |progress| progress_proxy.send_event(UserEvent::ReplaceProgress(progress)),
    )
    .await;

    running.disarm();
    let mut state_guard = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.");
    // The host may have switched language while the batch was running.
    let lang = state_guard.language;

    match outcome {
        Ok(ReplaceOutcome::NoDocuments) => {
            proxy.send_event(UserEvent::notice(
                NoticeKind::NoDocumentsFound,
                i18n::no_files_found(lang, &request.folder),
            ));
            state_guard.finish_replacement(None);
        }
        Ok(ReplaceOutcome::Completed(result)) => {
            let notice = if result.cancelled {
                UserEvent::notice(
                    NoticeKind::Cancelled,
                    i18n::cancelled_results(lang, result.modified_count, &request.folder),
                )
            } else {
                UserEvent::notice(
                    NoticeKind::Success,
                    i18n::success_results(lang, result.modified_count, &request.folder),
                )
            };
            proxy.send_event(notice);
            proxy.send_event(UserEvent::ReplaceFinished(result.clone()));
            state_guard.finish_replacement(Some(result));
        }
        Err(e) => {
            tracing::error!("TASK:: Replacement failed: {}", e);
            proxy.send_event(notice_for_error(lang, &e));
            state_guard.finish_replacement(None);
        }
    }
    tracing::info!("TASK:: replace_task finished.");
}
