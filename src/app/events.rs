//! Defines the event and message structures for communication between the engine and its host.

use serde::{Deserialize, Serialize};

use super::i18n::FormLabels;
use crate::core::replacer::ReplaceProgress;
use crate::core::{BatchResult, ReplacementRequest};

/// What a notice tells the user. Hosts may style or time them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    ValidationError,
    PatternError,
    Starting,
    NoDocumentsFound,
    Success,
    Cancelled,
    UnknownError,
}

impl NoticeKind {
    /// How long the host should keep the notice on screen, if not its default.
    pub fn timeout_ms(self) -> Option<u64> {
        match self {
            Self::Starting => Some(3_000),
            Self::Success | Self::Cancelled => Some(10_000),
            _ => None,
        }
    }
}

/// Everything a host needs to render the find-and-replace form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceForm {
    pub folders: Vec<String>,
    /// Initial field values: the first folder, empty terms and the configured flags.
    pub defaults: ReplacementRequest,
    pub labels: FormLabels,
}

/// Events sent from the engine to the host.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum UserEvent {
    /// The form with the current folder choices.
    ShowReplaceForm(Box<ReplaceForm>),
    /// A localized message to be displayed to the user.
    #[serde(rename_all = "camelCase")]
    ShowNotice {
        kind: NoticeKind,
        message: String,
        timeout_ms: Option<u64>,
    },
    /// A progress update while a batch is running.
    ReplaceProgress(ReplaceProgress),
    /// The machine-readable result of a finished batch.
    ReplaceFinished(BatchResult),
}

impl UserEvent {
    pub fn notice(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self::ShowNotice {
            kind,
            message: message.into(),
            timeout_ms: kind.timeout_ms(),
        }
    }
}

/// A message received from the host via the IPC channel.
#[derive(Deserialize, Debug)]
pub struct IpcMessage {
    /// The name of the command to execute.
    pub command: String,
    /// The payload associated with the command, as a JSON value.
    #[serde(default)]
    pub payload: serde_json::Value,
}
