//! Live subscriptions to a single session.
//!
//! A [`SessionWatcher`] owns a background task that filters the store's
//! change feed down to one session and forwards matching events. The task
//! stops when the watcher is cancelled or dropped.

use pairup_core::session::{SessionEvent, SessionRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct SessionWatcher {
    session_id: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl SessionWatcher {
    /// Starts watching `session_id`.
    ///
    /// The subscription is taken before this returns, so no change made
    /// afterwards is missed. Teacher-chat events are only forwarded when
    /// `include_teacher_notes` is set. Must be called inside a tokio runtime.
    pub fn spawn(
        sessions: &Arc<dyn SessionRepository>,
        session_id: &str,
        include_teacher_notes: bool,
    ) -> (Self, UnboundedReceiver<SessionEvent>) {
        let feed = sessions.subscribe();
        let (event_tx, event_rx) = unbounded_channel();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(forward_events(
            session_id.to_string(),
            include_teacher_notes,
            feed,
            event_tx,
            cancel.clone(),
        ));

        let watcher = Self {
            session_id: session_id.to_string(),
            cancel,
            handle,
        };
        (watcher, event_rx)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn forward_events(
    session_id: String,
    include_teacher_notes: bool,
    mut feed: tokio::sync::broadcast::Receiver<SessionEvent>,
    event_tx: UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
) {
    debug!("Watching session {}", session_id);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = feed.recv() => match received {
                Ok(SessionEvent::TeacherNoteAppended { .. }) if !include_teacher_notes => {}
                Ok(event) if event.session_id() == session_id => {
                    if event_tx.send(event).is_err() {
                        // Consumer went away.
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Watcher for {} skipped {} events", session_id, skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    debug!("Stopped watching session {}", session_id);
}

/// At most one live watcher per view.
#[derive(Default)]
pub struct WatchRegistry {
    watchers: HashMap<String, SessionWatcher>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `watcher` for `view`, cancelling whatever that view held.
    pub fn register(&mut self, view: impl Into<String>, watcher: SessionWatcher) {
        let view = view.into();
        if let Some(previous) = self.watchers.insert(view.clone(), watcher) {
            debug!(
                "Replacing watcher on {} for view {}",
                previous.session_id(),
                view
            );
        }
    }

    pub fn unregister(&mut self, view: &str) -> bool {
        self.watchers.remove(view).is_some()
    }

    pub fn get(&self, view: &str) -> Option<&SessionWatcher> {
        self.watchers.get(view)
    }

    /// Number of views with a live watcher.
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}
