use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `ToastKind` values.
pub enum ToastKind {
    Info,
    Success,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "signal", rename_all = "snake_case")]
/// Signals the workflow emits towards views and the router.
pub enum ComposeSignal {
    /// Compose is active for the current session. Emitted at most once per session.
    Ready,
    RenderAudience,
    RenderEntity,
    /// The selected entity has several identifiers; the user picks one.
    RenderRelationship,
    RenderEditor,
    MessageSaved,
    MessageSent,
    /// Navigate to the inbox.
    InboxOpen,
    Toast {
        content: String,
        kind: ToastKind,
    },
    EditorUiUpdate {
        is_disabled: bool,
        is_saved: bool,
    },
}

impl ComposeSignal {
    pub fn toast(content: impl Into<String>, kind: ToastKind) -> Self {
        Self::Toast {
            content: content.into(),
            kind,
        }
    }

    /// Channel name the signal is published under.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "compose:ready",
            Self::RenderAudience => "render:audience",
            Self::RenderEntity => "render:entity",
            Self::RenderRelationship => "render:relationship",
            Self::RenderEditor => "render:editor",
            Self::MessageSaved => "message:saved",
            Self::MessageSent => "message:sent",
            Self::InboxOpen => "inbox:open",
            Self::Toast { .. } => "toaster:open",
            Self::EditorUiUpdate { .. } => "editor:ui-update",
        }
    }
}
