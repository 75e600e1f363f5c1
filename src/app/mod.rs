//! The host-facing layer: IPC dispatch, shared state, background tasks and
//! localized notices.

pub mod commands;
pub mod events;
pub mod i18n;
pub mod proxy;
pub mod request_source;
pub mod state;
pub mod tasks;

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::core::DocumentStore;
use events::{IpcMessage, UserEvent};
use proxy::EventProxy;
use request_source::PayloadRequestSource;
use state::AppState;

/// Parses one IPC message from the host and routes it to its command handler.
///
/// Long-running commands are spawned onto the tokio runtime, so this returns
/// immediately and must be called from within a runtime.
pub fn handle_ipc_message<P: EventProxy>(
    message: String,
    store: Arc<dyn DocumentStore>,
    proxy: P,
    state: Arc<Mutex<AppState>>,
) {
    let msg: IpcMessage = match serde_json::from_str(&message) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::error!("Failed to parse IPC message: {} ({})", e, message);
            return;
        }
    };

    tracing::debug!("IPC command received: {}", msg.command);
    match msg.command.as_str() {
        "openReplaceForm" => {
            tokio::spawn(commands::open_replace_form(store, proxy, state));
        }
        "replaceInFolder" => {
            let source = PayloadRequestSource::new(msg.payload);
            commands::replace_in_folder(&source, store, proxy, state);
        }
        "cancelReplace" => commands::cancel_replace(state),
        "setLanguage" => commands::set_language(msg.payload, state),
        unknown => tracing::warn!("Unknown IPC command: {}", unknown),
    }
}

/// Writes every event as one JSON line until the channel closes.
///
/// Stops early once the output can no longer be written.
pub async fn write_events<W: AsyncWrite + Unpin>(
    mut events: UnboundedReceiver<UserEvent>,
    mut out: W,
) {
    while let Some(event) = events.recv().await {
        let mut line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to serialize event: {}", e);
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = out.write_all(line.as_bytes()).await {
            tracing::error!("Failed to write event: {}", e);
            break;
        }
        if let Err(e) = out.flush().await {
            tracing::error!("Failed to flush events: {}", e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::ROOT_FOLDER;
    use crate::utils::test_helpers::{setup_test_logging, MemoryStore};
    use events::NoticeKind;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn setup() -> (
        Arc<MemoryStore>,
        mpsc::UnboundedSender<UserEvent>,
        mpsc::UnboundedReceiver<UserEvent>,
        Arc<Mutex<AppState>>,
    ) {
        setup_test_logging();
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::new(MemoryStore::from_documents(&[
            ("Notes/a.md", "hello world"),
            ("b.md", "hello"),
        ]));
        let state = Arc::new(Mutex::new(AppState::new(AppConfig::default())));
        (store, tx, rx, state)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<UserEvent>) -> UserEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn test_open_form_command() {
        let (store, tx, mut rx, state) = setup();
        handle_ipc_message(r#"{"command":"openReplaceForm"}"#.to_string(), store, tx, state);

        match recv(&mut rx).await {
            UserEvent::ShowReplaceForm(form) => {
                assert_eq!(form.folders, vec![ROOT_FOLDER, "Notes"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replace_command_runs_batch() {
        let (store, tx, mut rx, state) = setup();
        let message = serde_json::json!({
            "command": "replaceInFolder",
            "payload": { "folder": "Notes", "find": "hello", "replace": "bye" }
        });
        handle_ipc_message(message.to_string(), store.clone(), tx, state);

        loop {
            if let UserEvent::ReplaceFinished(result) = recv(&mut rx).await {
                assert_eq!(result.modified_count, 1);
                break;
            }
        }
        assert_eq!(store.content("Notes/a.md").as_deref(), Some("bye world"));
        assert_eq!(store.content("b.md").as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_set_language_command_localizes_notices() {
        let (store, tx, mut rx, state) = setup();
        handle_ipc_message(
            r#"{"command":"setLanguage","payload":"zh-CN"}"#.to_string(),
            store.clone(),
            tx.clone(),
            state.clone(),
        );
        handle_ipc_message(
            r#"{"command":"replaceInFolder","payload":{"folder":"/","find":""}}"#.to_string(),
            store,
            tx,
            state,
        );

        match recv(&mut rx).await {
            UserEvent::ShowNotice { kind, message, .. } => {
                assert_eq!(kind, NoticeKind::ValidationError);
                assert_eq!(message, "查找内容不能为空！");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_and_unknown_messages_are_ignored() {
        let (store, tx, mut rx, state) = setup();
        handle_ipc_message("not json".to_string(), store.clone(), tx.clone(), state.clone());
        handle_ipc_message(
            r#"{"command":"doSomethingElse"}"#.to_string(),
            store.clone(),
            tx.clone(),
            state.clone(),
        );
        handle_ipc_message(
            r#"{"command":"cancelReplace"}"#.to_string(),
            store.clone(),
            tx,
            state,
        );

        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
        assert_eq!(store.listing_count(), 0);
    }

    // Accepts every write but can never flush.
    struct UnflushableWriter;

    impl AsyncWrite for UnflushableWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_events_are_written_as_json_lines() {
        setup_test_logging();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UserEvent::notice(NoticeKind::Starting, "go")).unwrap();
        tx.send(UserEvent::notice(NoticeKind::UnknownError, "oops")).unwrap();
        drop(tx);

        let mut out = Vec::new();
        write_events(rx, &mut out).await;

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "showNotice");
        assert_eq!(first["payload"]["kind"], "starting");
        assert_eq!(first["payload"]["timeoutMs"], 3000);
    }

    #[tokio::test]
    async fn test_event_writer_stops_when_flush_fails() {
        setup_test_logging();
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(UserEvent::notice(NoticeKind::Starting, "go")).unwrap();

        // The sender stays open, so only the failed flush can end the loop.
        let finished =
            tokio::time::timeout(Duration::from_secs(5), write_events(rx, UnflushableWriter)).await;
        assert!(finished.is_ok());
        drop(tx);
    }
}
