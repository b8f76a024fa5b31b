//! # Status Board
//!
//! The single transient message line under the auth form.
//!
//! ## Timer Ownership
//! ```text
//! post("A") ──► slot = A(id1) ──► spawn clear(id1) after ttl
//!                                        │
//! post("B") ──► slot = B(id2) ──► abort clear(id1), spawn clear(id2)
//!                                        │
//!                         ttl later ─────┴──► slot.id == id2 ? clear : keep
//! ```
//! A message is only ever cleared by its own timer. Aborting the previous
//! timer is the fast path; the id check covers a timer that already woke up
//! and is waiting on the lock.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Tone of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Success,
    Error,
}

/// One message on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub id: Uuid,
    pub text: String,
    pub kind: StatusKind,
}

type Slot = Arc<Mutex<Option<StatusMessage>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<StatusMessage>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the current message and the timer that will clear it.
#[derive(Debug)]
pub struct StatusBoard {
    slot: Slot,
    clear_task: Mutex<Option<JoinHandle<()>>>,
    ttl: Duration,
}

impl StatusBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            clear_task: Mutex::new(None),
            ttl,
        }
    }

    /// How long a message stays up.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Shows `text`, replacing whatever was there, and schedules its removal.
    ///
    /// Outside a tokio runtime the message is shown but never auto-cleared.
    pub fn post(&self, text: impl Into<String>, kind: StatusKind) -> Uuid {
        let message = StatusMessage {
            id: Uuid::new_v4(),
            text: text.into(),
            kind,
        };
        let id = message.id;
        debug!(%id, kind = ?kind, text = %message.text, "Status message posted");

        *lock(&self.slot) = Some(message);

        let next = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let slot = Arc::clone(&self.slot);
                let ttl = self.ttl;
                Some(handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    let mut current = lock(&slot);
                    if current.as_ref().is_some_and(|m| m.id == id) {
                        *current = None;
                        debug!(%id, "Status message expired");
                    }
                }))
            }
            Err(_) => {
                warn!("No runtime available; status message will not auto-clear");
                None
            }
        };

        let previous = std::mem::replace(
            &mut *self.clear_task.lock().unwrap_or_else(PoisonError::into_inner),
            next,
        );
        if let Some(task) = previous {
            task.abort();
        }

        id
    }

    pub fn success(&self, text: impl Into<String>) -> Uuid {
        self.post(text, StatusKind::Success)
    }

    pub fn error(&self, text: impl Into<String>) -> Uuid {
        self.post(text, StatusKind::Error)
    }

    /// The visible message, if any.
    pub fn current(&self) -> Option<StatusMessage> {
        lock(&self.slot).clone()
    }

    /// The visible text, if any.
    pub fn text(&self) -> Option<String> {
        lock(&self.slot).as_ref().map(|m| m.text.clone())
    }

    /// Removes the message now and cancels its timer.
    pub fn clear(&self) {
        *lock(&self.slot) = None;
        if let Some(task) = self
            .clear_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

impl Drop for StatusBoard {
    fn drop(&mut self) {
        if let Some(task) = self
            .clear_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}
