//! Process-local repositories.
//!
//! Back the `memory` storage backend and the application tests. Each store
//! keeps its documents behind a tokio `RwLock`; session mutations run while
//! the write guard is held, which makes the seat check and the seat write
//! one step.

use async_trait::async_trait;
use pairup_core::session::{
    ChatMessage, Session, SessionEvent, SessionFilter, SessionMutation, SessionRepository,
    SessionUpdate, TeacherNote, insert_ordered,
};
use pairup_core::testimonial::{Testimonial, TestimonialRepository};
use pairup_core::user::{Notification, UserProfile, UserRepository};
use pairup_core::{PairUpError, Result};
use std::collections::HashMap;
use tokio::sync::{RwLock, broadcast};

use crate::storage::{SessionDocument, UserDocument};

/// Buffered change events per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 256;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserDocument>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(uid).map(|doc| doc.profile.clone()))
    }

    async fn save(&self, user: &UserProfile) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .entry(user.uid.clone())
            .and_modify(|doc| doc.profile = user.clone())
            .or_insert_with(|| UserDocument::new(user.clone()));
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.values().map(|doc| doc.profile.clone()).collect())
    }

    async fn push_notification(&self, uid: &str, notification: &Notification) -> Result<()> {
        let mut users = self.users.write().await;
        let doc = users
            .get_mut(uid)
            .ok_or_else(|| PairUpError::not_found("User", uid))?;
        insert_ordered(&mut doc.notifications, notification.clone());
        Ok(())
    }

    async fn notifications(&self, uid: &str) -> Result<Vec<Notification>> {
        let users = self.users.read().await;
        Ok(users
            .get(uid)
            .map(|doc| doc.notifications.clone())
            .unwrap_or_default())
    }
}

pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionDocument>>,
    events: broadcast::Sender<SessionEvent>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sessions: RwLock::new(HashMap::new()),
            events,
        }
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(PairUpError::data_access(format!(
                "session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), SessionDocument::new(session.clone()));
        self.publish(SessionEvent::Updated(session.clone()));
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).map(|doc| doc.session.clone()))
    }

    async fn list(&self, filter: SessionFilter) -> Result<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<Session> = sessions
            .values()
            .map(|doc| &doc.session)
            .filter(|session| filter.matches(session))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn update(&self, session_id: &str, mutation: SessionMutation) -> Result<SessionUpdate> {
        let mut sessions = self.sessions.write().await;
        let doc = sessions
            .get_mut(session_id)
            .ok_or_else(|| PairUpError::not_found("Session", session_id))?;

        // Mutate a copy so a failed mutation leaves the record untouched.
        let mut draft = doc.session.clone();
        mutation(&mut draft)?;
        let changed = draft != doc.session;
        if changed {
            doc.session = draft.clone();
            // Published under the guard so subscribers see writes in order.
            self.publish(SessionEvent::Updated(draft.clone()));
        }

        Ok(SessionUpdate {
            session: draft,
            changed,
        })
    }

    async fn append_chat(&self, session_id: &str, message: &ChatMessage) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let doc = sessions
            .get_mut(session_id)
            .ok_or_else(|| PairUpError::not_found("Session", session_id))?;
        doc.session.ensure_can_chat(&message.uid)?;
        insert_ordered(&mut doc.chat, message.clone());
        self.publish(SessionEvent::ChatAppended {
            session_id: session_id.to_string(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn chat(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|doc| doc.chat.clone())
            .ok_or_else(|| PairUpError::not_found("Session", session_id))
    }

    async fn append_teacher_note(&self, session_id: &str, note: &TeacherNote) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let doc = sessions
            .get_mut(session_id)
            .ok_or_else(|| PairUpError::not_found("Session", session_id))?;
        insert_ordered(&mut doc.teacher_chat, note.clone());
        self.publish(SessionEvent::TeacherNoteAppended {
            session_id: session_id.to_string(),
            note: note.clone(),
        });
        Ok(())
    }

    async fn teacher_notes(&self, session_id: &str) -> Result<Vec<TeacherNote>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|doc| doc.teacher_chat.clone())
            .ok_or_else(|| PairUpError::not_found("Session", session_id))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[derive(Default)]
pub struct InMemoryTestimonialRepository {
    testimonials: RwLock<Vec<Testimonial>>,
}

impl InMemoryTestimonialRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestimonialRepository for InMemoryTestimonialRepository {
    async fn add(&self, testimonial: &Testimonial) -> Result<()> {
        self.testimonials.write().await.push(testimonial.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Testimonial>> {
        Ok(self.testimonials.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairup_core::session::Slot;
    use pairup_core::user::{NotificationKind, Role};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_update_is_all_or_nothing() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new("d1", Role::Driver).unwrap();
        repo.create(&session).await.unwrap();

        let result = repo
            .update(
                &session.id,
                Box::new(|s: &mut Session| {
                    s.code = "half-written".to_string();
                    Err(PairUpError::validation("nope"))
                }),
            )
            .await;
        assert!(result.is_err());

        let stored = repo.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.code, "");
    }

    #[tokio::test]
    async fn test_update_missing_session_is_not_found() {
        let repo = InMemorySessionRepository::new();
        let err = repo
            .update("nope", Box::new(|_: &mut Session| Ok(())))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_noop_update_writes_and_publishes_nothing() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new("d1", Role::Driver).unwrap();
        repo.create(&session).await.unwrap();
        let mut feed = repo.subscribe();

        let rejoin = repo
            .update(
                &session.id,
                Box::new(|s: &mut Session| s.join(Role::Driver, "d1").map(|_| ())),
            )
            .await
            .unwrap();
        assert!(!rejoin.changed);
        assert_eq!(rejoin.session, session);
        assert!(matches!(
            feed.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        let edit = repo
            .update(
                &session.id,
                Box::new(|s: &mut Session| s.write_code("d1", "x")),
            )
            .await
            .unwrap();
        assert!(edit.changed);
        assert!(matches!(feed.try_recv(), Ok(SessionEvent::Updated(_))));
    }

    #[tokio::test]
    async fn test_chat_append_checks_seat_and_active_flag() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new("d1", Role::Driver).unwrap();
        repo.create(&session).await.unwrap();

        let err = repo
            .append_chat(&session.id, &ChatMessage::new("stranger", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, PairUpError::PermissionDenied(_)));

        repo.update(
            &session.id,
            Box::new(|s: &mut Session| s.finalize(Role::Profesor).map(|_| ())),
        )
        .await
        .unwrap();
        let err = repo
            .append_chat(&session.id, &ChatMessage::new("d1", "too late"))
            .await
            .unwrap_err();
        assert!(matches!(err, PairUpError::SessionInactive(_)));
        assert!(repo.chat(&session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new("d1", Role::Driver).unwrap();
        repo.create(&session).await.unwrap();
        assert!(repo.create(&session).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_claims_seat_exactly_one() {
        let repo = Arc::new(InMemorySessionRepository::new());
        let session = Session::new("d1", Role::Driver).unwrap();
        repo.create(&session).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = Arc::clone(&repo);
            let id = session.id.clone();
            handles.push(tokio::spawn(async move {
                let uid = format!("nav-{}", i);
                repo.update(
                    &id,
                    Box::new(move |s: &mut Session| {
                        s.join(Role::Navigator, &uid).map(|_| ())
                    }),
                )
                .await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(e.is_slot_occupied()),
            }
        }
        assert_eq!(winners, 1);

        let stored = repo.find_by_id(&session.id).await.unwrap().unwrap();
        assert!(stored.slots.occupant(Slot::Navigator).is_some());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_filter() {
        let repo = InMemorySessionRepository::new();
        let mut older = Session::new("a", Role::Driver).unwrap();
        older.created_at -= chrono::Duration::minutes(5);
        let newer = Session::new("b", Role::Driver).unwrap();
        let mut done = Session::new("c", Role::Driver).unwrap();
        done.active = false;
        for s in [&older, &newer, &done] {
            repo.create(s).await.unwrap();
        }

        let active = repo.list(SessionFilter::active()).await.unwrap();
        let ids: Vec<&str> = active.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);
        assert_eq!(repo.list(SessionFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_chat_is_ordered_and_published() {
        let repo = InMemorySessionRepository::new();
        let session = Session::new("d1", Role::Driver).unwrap();
        repo.create(&session).await.unwrap();
        let mut feed = repo.subscribe();

        let mut late = ChatMessage::new("d1", "second");
        late.timestamp = 200;
        let mut early = ChatMessage::new("d1", "first");
        early.timestamp = 100;
        repo.append_chat(&session.id, &late).await.unwrap();
        repo.append_chat(&session.id, &early).await.unwrap();

        let texts: Vec<String> = repo
            .chat(&session.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);

        let event = feed.recv().await.unwrap();
        assert_eq!(event.session_id(), session.id);
        assert!(matches!(event, SessionEvent::ChatAppended { .. }));
    }

    #[tokio::test]
    async fn test_notifications_require_user() {
        let repo = InMemoryUserRepository::new();
        let note = Notification::new("Hi", "Welcome", NotificationKind::General);
        assert!(
            repo.push_notification("ghost", &note)
                .await
                .unwrap_err()
                .is_not_found()
        );

        let user = UserProfile::new("Ana", "ana@example.com", Role::Navigator);
        repo.save(&user).await.unwrap();
        repo.push_notification(&user.uid, &note).await.unwrap();

        // Re-saving the profile keeps the inbox.
        repo.save(&user).await.unwrap();
        assert_eq!(repo.notifications(&user.uid).await.unwrap().len(), 1);
    }
}
