//! User-facing notifications.
//!
//! Cart failures never reach calling code as errors. They are turned into one
//! of a fixed set of [`Notice`]s and handed to a [`Notifier`], which decides
//! how to show them (toast, status line, log).

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// The fixed user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Adding one more unit would exceed available stock.
    AddOutOfStock,
    /// The requested quantity exceeds available stock.
    UpdateOutOfStock,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl Notice {
    /// Localized (pt-BR) message text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AddOutOfStock | Self::UpdateOutOfStock => "Quantidade solicitada fora de estoque",
            Self::AddFailed => "Erro na adição do produto",
            Self::RemoveFailed => "Erro na remoção do produto",
            Self::UpdateFailed => "Erro na alteração de quantidade do produto",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A notice as delivered to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub notice: Notice,
    pub message: &'static str,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn new(notice: Notice) -> Self {
        Self {
            id: Uuid::new_v4(),
            notice,
            message: notice.message(),
            created_at: Utc::now(),
        }
    }
}

/// Fire-and-forget notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(
            notification_id = %notification.id,
            notice = ?notification.notice,
            "{}",
            notification.message
        );
    }
}

/// Forwards notifications to a channel, typically drained by a UI.
///
/// Sending never blocks. Notifications sent after the receiver is dropped
/// are discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}
