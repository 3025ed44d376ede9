//! Review session state machine.
//!
//! `NoSession -> Active -> (Exhausted | Abandoned) -> NoSession`
//!
//! The engine owns the queue, the cursor into it, the decision history and
//! the pending-deletion list of the one open session. It never talks to the
//! asset source or to persistence: closing a session hands back a
//! [`ClosedSession`] for the caller to reconcile and fold into stats.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SizeEstimate;
use crate::domain::{AssetId, PhotoAsset, SwipeAction};
use crate::error::{Error, Result};

/// Running counters of one session.
///
/// `photos_reviewed == photos_kept + photos_deleted` holds after every
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwipeSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub photos_reviewed: u64,
    pub photos_kept: u64,
    pub photos_deleted: u64,
    /// Bytes.
    pub space_saved: u64,
}

/// One recorded decision. `size` is what the decision added to
/// `space_saved`, so undo can subtract exactly that.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeHistoryItem {
    pub photo: PhotoAsset,
    pub action: SwipeAction,
    pub queue_index: usize,
    pub size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    Active,
    Exhausted,
}

/// How a session came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    /// Every photo in the queue was decided.
    Exhausted,
    /// The user left before the end of the queue.
    Abandoned,
}

/// Everything the caller needs to finish a session.
#[derive(Debug, Clone)]
pub struct ClosedSession {
    pub session: SwipeSession,
    pub outcome: SessionOutcome,
    /// Ids marked for deletion, in decision order, without duplicates.
    pub pending_deletions: Vec<AssetId>,
}

struct OpenSession {
    session: SwipeSession,
    queue: Vec<PhotoAsset>,
    position: usize,
    history: Vec<SwipeHistoryItem>,
    pending: Vec<AssetId>,
}

impl OpenSession {
    fn is_exhausted(&self) -> bool {
        self.position >= self.queue.len()
    }
}

/// Owns the single open review session.
pub struct SessionEngine {
    open: Option<OpenSession>,
    size_estimate: SizeEstimate,
    last_id: i64,
}

impl SessionEngine {
    pub fn new(size_estimate: SizeEstimate) -> Self {
        Self {
            open: None,
            size_estimate,
            last_id: 0,
        }
    }

    /// Open a session over `queue`. Refuses while another session is open,
    /// leaving that session untouched.
    ///
    /// An empty queue is valid: the session starts out exhausted.
    pub fn start(&mut self, queue: Vec<PhotoAsset>) -> Result<&SwipeSession> {
        if self.open.is_some() {
            tracing::warn!("start refused, a session is already open");
            return Err(Error::SessionAlreadyActive);
        }

        let now = Utc::now();
        let id = now.timestamp_millis().max(self.last_id + 1);
        self.last_id = id;

        tracing::info!(session = id, photos = queue.len(), "session started");
        let open = self.open.insert(OpenSession {
            session: SwipeSession {
                id: id.to_string(),
                start_time: now,
                end_time: None,
                photos_reviewed: 0,
                photos_kept: 0,
                photos_deleted: 0,
                space_saved: 0,
            },
            queue,
            position: 0,
            history: Vec::new(),
            pending: Vec::new(),
        });
        Ok(&open.session)
    }

    /// Apply `action` to the photo under the cursor and advance.
    /// Returns `None` without changing anything when no session is open or
    /// the queue is exhausted.
    pub fn decide(&mut self, action: SwipeAction) -> Option<&SwipeHistoryItem> {
        let open = self.open.as_mut()?;
        if open.is_exhausted() {
            tracing::debug!(%action, "decide ignored, queue exhausted");
            return None;
        }

        let photo = open.queue[open.position].clone();
        let session = &mut open.session;
        session.photos_reviewed += 1;
        let size = match action {
            SwipeAction::Keep => {
                session.photos_kept += 1;
                0
            }
            SwipeAction::Delete => {
                let size = photo.effective_size(&self.size_estimate);
                session.photos_deleted += 1;
                session.space_saved += size;
                open.pending.push(photo.id.clone());
                size
            }
        };

        tracing::debug!(photo = %photo.id, %action, size, position = open.position, "decided");
        open.history.push(SwipeHistoryItem {
            photo,
            action,
            queue_index: open.position,
            size,
        });
        open.position += 1;
        open.history.last()
    }

    /// Revert the most recent decision. Returns the reverted item, or `None`
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> Option<SwipeHistoryItem> {
        let open = self.open.as_mut()?;
        let item = open.history.pop()?;

        let session = &mut open.session;
        session.photos_reviewed = session.photos_reviewed.saturating_sub(1);
        match item.action {
            SwipeAction::Keep => {
                session.photos_kept = session.photos_kept.saturating_sub(1);
            }
            SwipeAction::Delete => {
                session.photos_deleted = session.photos_deleted.saturating_sub(1);
                session.space_saved = session.space_saved.saturating_sub(item.size);
                if let Some(pos) = open.pending.iter().rposition(|id| *id == item.photo.id) {
                    open.pending.remove(pos);
                }
            }
        }
        open.position = item.queue_index;

        tracing::debug!(photo = %item.photo.id, action = %item.action, "undone");
        Some(item)
    }

    /// Close the open session. A second call returns `None`, so a session
    /// can only ever be folded into stats once.
    pub fn close(&mut self) -> Option<ClosedSession> {
        let open = self.open.take()?;
        let outcome = if open.is_exhausted() {
            SessionOutcome::Exhausted
        } else {
            SessionOutcome::Abandoned
        };

        let mut session = open.session;
        session.end_time = Some(Utc::now());

        let mut pending_deletions: Vec<AssetId> = Vec::with_capacity(open.pending.len());
        for id in open.pending {
            if !pending_deletions.contains(&id) {
                pending_deletions.push(id);
            }
        }

        tracing::info!(
            session = %session.id,
            ?outcome,
            reviewed = session.photos_reviewed,
            deleted = session.photos_deleted,
            "session closed"
        );
        Some(ClosedSession {
            session,
            outcome,
            pending_deletions,
        })
    }

    pub fn state(&self) -> SessionState {
        match &self.open {
            None => SessionState::NoSession,
            Some(open) if open.is_exhausted() => SessionState::Exhausted,
            Some(_) => SessionState::Active,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// True when the open session has no photos left. False with no session.
    pub fn is_exhausted(&self) -> bool {
        self.open.as_ref().is_some_and(|o| o.is_exhausted())
    }

    pub fn session(&self) -> Option<&SwipeSession> {
        self.open.as_ref().map(|o| &o.session)
    }

    /// Photo under the cursor.
    pub fn current(&self) -> Option<&PhotoAsset> {
        let open = self.open.as_ref()?;
        open.queue.get(open.position)
    }

    pub fn position(&self) -> usize {
        self.open.as_ref().map_or(0, |o| o.position)
    }

    pub fn queue_len(&self) -> usize {
        self.open.as_ref().map_or(0, |o| o.queue.len())
    }

    pub fn remaining(&self) -> usize {
        self.queue_len().saturating_sub(self.position())
    }

    /// `"3/10"` style progress label; `"0/0"` for an empty queue.
    pub fn progress(&self) -> String {
        let len = self.queue_len();
        if len == 0 {
            return "0/0".to_string();
        }
        format!("{}/{}", (self.position() + 1).min(len), len)
    }

    pub fn can_undo(&self) -> bool {
        self.open.as_ref().is_some_and(|o| !o.history.is_empty())
    }

    pub fn history(&self) -> &[SwipeHistoryItem] {
        self.open.as_ref().map_or(&[], |o| o.history.as_slice())
    }

    /// Ids marked for deletion and not yet reconciled.
    pub fn pending_deletions(&self) -> &[AssetId] {
        self.open.as_ref().map_or(&[], |o| o.pending.as_slice())
    }
}
