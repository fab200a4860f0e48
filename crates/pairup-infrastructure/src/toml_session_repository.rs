//! TOML-based implementation of SessionRepository.
//!
//! Each session lives in `sessions/<id>.toml` together with its participant
//! chat and teacher chat. Every write takes the document's file lock, so
//! two processes sharing a data directory still cannot both claim a seat.
//! Within one process, writes and their events are additionally serialized
//! so the change feed reports them in commit order.

use async_trait::async_trait;
use pairup_core::session::{
    ChatMessage, Session, SessionEvent, SessionFilter, SessionMutation, SessionRepository,
    SessionUpdate, TeacherNote, insert_ordered,
};
use pairup_core::{PairUpError, Result};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::memory_repository::EVENT_CAPACITY;
use crate::storage::{SessionDocument, TomlDir, run_blocking};

const SESSIONS_DIR: &str = "sessions";

/// A repository implementation for storing session data in TOML files.
///
/// The change feed reports writes made through this instance. Writes by
/// other processes show up only while a disk poller is running.
pub struct TomlSessionRepository {
    store: Arc<TomlDir<SessionDocument>>,
    events: broadcast::Sender<SessionEvent>,
    /// Held from the start of a write until its event is published.
    write_order: Mutex<()>,
}

impl TomlSessionRepository {
    /// Creates a repository rooted at `<data_dir>/sessions`.
    pub fn new(data_dir: &Path) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store: Arc::new(TomlDir::new(data_dir.join(SESSIONS_DIR))),
            events,
            write_order: Mutex::new(()),
        }
    }

    fn publish(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Re-reads the session directory every `every` and publishes whatever
    /// changed since the previous pass, until `cancel` fires.
    ///
    /// The baseline is read before this returns, so any write that lands
    /// afterwards is reported.
    pub async fn spawn_disk_poller(
        self: &Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let mut known: HashMap<String, SessionDocument> = HashMap::new();
        if let Some(documents) = self.read_all_for_poll().await {
            known.extend(documents.into_iter().map(|doc| (doc.session.id.clone(), doc)));
        }

        let repo = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick fires at once; the baseline already covers it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                // Keeps poll results from interleaving with local writes.
                let _order = repo.write_order.lock().await;
                let Some(documents) = repo.read_all_for_poll().await else {
                    continue;
                };
                for doc in documents {
                    repo.publish_changes(known.get(&doc.session.id), &doc);
                    known.insert(doc.session.id.clone(), doc);
                }
            }

            tracing::debug!("Session disk poller stopped");
        })
    }

    async fn read_all_for_poll(&self) -> Option<Vec<SessionDocument>> {
        let store = Arc::clone(&self.store);
        match run_blocking(move || store.list_all()).await {
            Ok(documents) => Some(documents),
            Err(e) => {
                tracing::warn!("Session poll failed: {}", e);
                None
            }
        }
    }

    fn publish_changes(&self, before: Option<&SessionDocument>, after: &SessionDocument) {
        let session_id = &after.session.id;

        if before.map(|doc| &doc.session) != Some(&after.session) {
            self.publish(SessionEvent::Updated(after.session.clone()));
        }

        let seen: HashSet<&str> = before
            .map(|doc| doc.chat.iter().map(|m| m.id.as_str()).collect())
            .unwrap_or_default();
        for message in after.chat.iter().filter(|m| !seen.contains(m.id.as_str())) {
            self.publish(SessionEvent::ChatAppended {
                session_id: session_id.clone(),
                message: message.clone(),
            });
        }

        let seen: HashSet<&str> = before
            .map(|doc| doc.teacher_chat.iter().map(|n| n.id.as_str()).collect())
            .unwrap_or_default();
        for note in after
            .teacher_chat
            .iter()
            .filter(|n| !seen.contains(n.id.as_str()))
        {
            self.publish(SessionEvent::TeacherNoteAppended {
                session_id: session_id.clone(),
                note: note.clone(),
            });
        }
    }

    async fn load_document(&self, session_id: &str) -> Result<Option<SessionDocument>> {
        let store = Arc::clone(&self.store);
        let id = session_id.to_string();
        run_blocking(move || store.load(&id)).await
    }
}

#[async_trait]
impl SessionRepository for TomlSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        let _order = self.write_order.lock().await;
        let store = Arc::clone(&self.store);
        let record = session.clone();
        run_blocking(move || {
            let id = record.id.clone();
            store.transact(&id, |doc| {
                if doc.is_some() {
                    return Err(PairUpError::data_access(format!(
                        "session {} already exists",
                        id
                    )));
                }
                *doc = Some(SessionDocument::new(record));
                Ok(())
            })
        })
        .await?;

        tracing::debug!("Created session file for {}", session.id);
        self.publish(SessionEvent::Updated(session.clone()));
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self
            .load_document(session_id)
            .await?
            .map(|doc| doc.session))
    }

    async fn list(&self, filter: SessionFilter) -> Result<Vec<Session>> {
        let store = Arc::clone(&self.store);
        let documents = run_blocking(move || store.list_all()).await?;

        let mut sessions: Vec<Session> = documents
            .into_iter()
            .map(|doc| doc.session)
            .filter(|session| filter.matches(session))
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn update(&self, session_id: &str, mutation: SessionMutation) -> Result<SessionUpdate> {
        let _order = self.write_order.lock().await;
        let store = Arc::clone(&self.store);
        let id = session_id.to_string();
        let updated = run_blocking(move || {
            store.transact_if(&id, |doc| {
                let doc = doc
                    .as_mut()
                    .ok_or_else(|| PairUpError::not_found("Session", id.as_str()))?;
                let before = doc.session.clone();
                // An error here skips the write-back.
                mutation(&mut doc.session)?;
                let changed = doc.session != before;
                let update = SessionUpdate {
                    session: doc.session.clone(),
                    changed,
                };
                Ok((update, changed))
            })
        })
        .await?;

        if updated.changed {
            self.publish(SessionEvent::Updated(updated.session.clone()));
        }
        Ok(updated)
    }

    async fn append_chat(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        let _order = self.write_order.lock().await;
        let store = Arc::clone(&self.store);
        let id = session_id.to_string();
        let entry = message.clone();
        run_blocking(move || {
            store.transact(&id, |doc| {
                let doc = doc
                    .as_mut()
                    .ok_or_else(|| PairUpError::not_found("Session", id.as_str()))?;
                doc.session.ensure_can_chat(&entry.uid)?;
                insert_ordered(&mut doc.chat, entry);
                Ok(())
            })
        })
        .await?;

        self.publish(SessionEvent::ChatAppended {
            session_id: session_id.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn chat(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        self.load_document(session_id)
            .await?
            .map(|doc| doc.chat)
            .ok_or_else(|| PairUpError::not_found("Session", session_id))
    }

    async fn append_teacher_note(&self, session_id: &str, note: &TeacherNote) -> Result<()> {
        let _order = self.write_order.lock().await;
        let store = Arc::clone(&self.store);
        let id = session_id.to_string();
        let entry = note.clone();
        run_blocking(move || {
            store.transact(&id, |doc| {
                let doc = doc
                    .as_mut()
                    .ok_or_else(|| PairUpError::not_found("Session", id.as_str()))?;
                insert_ordered(&mut doc.teacher_chat, entry);
                Ok(())
            })
        })
        .await?;

        self.publish(SessionEvent::TeacherNoteAppended {
            session_id: session_id.to_string(),
            note: note.clone(),
        });
        Ok(())
    }

    async fn teacher_notes(&self, session_id: &str) -> Result<Vec<TeacherNote>> {
        self.load_document(session_id)
            .await?
            .map(|doc| doc.teacher_chat)
            .ok_or_else(|| PairUpError::not_found("Session", session_id))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}
