//! Session use case implementation.
//!
//! Orchestrates the session lifecycle on top of the user and session
//! repositories: creation, joining, the shared code buffer, both chats,
//! evaluation and finalization. Every state change is a conditional write
//! executed by the store; this layer only resolves who is asking and in
//! which role.

use futures::future::try_join_all;
use pairup_core::session::{
    ChatMessage, ClaimOutcome, Grade, Session, SessionFilter, SessionRepository, Slot,
    TeacherNote,
};
use pairup_core::user::{Role, UserProfile, UserRepository};
use pairup_core::{PairUpError, Result};
use serde::Serialize;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedSession {
    pub session: Session,
    pub outcome: ClaimOutcome,
}

/// A seat with its occupant's display name resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub slot: Slot,
    pub uid: String,
    pub name: String,
}

/// What a Driver or Navigator sees inside a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantView {
    pub session: Session,
    pub seat: Slot,
    pub can_edit_code: bool,
    pub chat: Vec<ChatMessage>,
}

/// What a Profesor sees: participants by name, both chats and the evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherPanel {
    pub session: Session,
    pub participants: Vec<Participant>,
    pub chat: Vec<ChatMessage>,
    pub teacher_notes: Vec<TeacherNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum SessionView {
    Participant(ParticipantView),
    Teacher(TeacherPanel),
}

/// Use case for pair-programming sessions.
pub struct SessionUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl SessionUseCase {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Creates a session with the caller seated in their role's slot.
    pub async fn create_session(&self, uid: &str) -> Result<Session> {
        let user = self.require_user(uid).await?;
        let session = Session::new(&user.uid, user.role)?;
        self.sessions.create(&session).await?;

        info!(
            "Session {} created by {} as {}",
            session.id, user.uid, user.role
        );
        Ok(session)
    }

    /// Active sessions whose slot for the caller's role is vacant, newest first.
    pub async fn list_joinable(&self, uid: &str) -> Result<Vec<Session>> {
        let user = self.require_user(uid).await?;
        let sessions = self.sessions.list(SessionFilter::active()).await?;

        let joinable: Vec<Session> = sessions
            .into_iter()
            .filter(|session| session.is_joinable_by(user.role))
            .collect();
        debug!("{} joinable sessions for {}", joinable.len(), uid);
        Ok(joinable)
    }

    /// Claims the caller's role slot in a session.
    ///
    /// Re-joining one's own seat succeeds without a write.
    pub async fn join_session(&self, session_id: &str, uid: &str) -> Result<JoinedSession> {
        let user = self.require_user(uid).await?;
        let role = user.role;
        let claimant = user.uid.clone();
        let result = self
            .sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| {
                    session.join(role, &claimant).map(|_| ())
                }),
            )
            .await;

        match result {
            Ok(update) if update.changed => {
                info!("{} joined session {} as {}", uid, session_id, role);
                Ok(JoinedSession {
                    session: update.session,
                    outcome: ClaimOutcome::Seated,
                })
            }
            Ok(update) => {
                debug!("{} already seated in {}", uid, session_id);
                Ok(JoinedSession {
                    session: update.session,
                    outcome: ClaimOutcome::AlreadySeated,
                })
            }
            Err(err) => {
                warn!("Join of {} by {} rejected: {}", session_id, uid, err);
                Err(err)
            }
        }
    }

    /// Opens the role-specific view of a session.
    ///
    /// Profesor users get the teacher panel for any session; everyone else
    /// must hold a seat.
    pub async fn open_session(&self, session_id: &str, uid: &str) -> Result<SessionView> {
        let user = self.require_user(uid).await?;
        let session = self.require_session(session_id).await?;

        if user.role.is_teacher() {
            let (participants, chat, teacher_notes) = futures::try_join!(
                self.participants(&session),
                self.sessions.chat(session_id),
                self.sessions.teacher_notes(session_id),
            )?;
            return Ok(SessionView::Teacher(TeacherPanel {
                session,
                participants,
                chat,
                teacher_notes,
            }));
        }

        let seat = session.slots.seat_of(uid).ok_or_else(|| {
            PairUpError::permission_denied("join the session before opening it")
        })?;
        let chat = self.sessions.chat(session_id).await?;
        Ok(SessionView::Participant(ParticipantView {
            can_edit_code: seat == Slot::Driver && session.active,
            session,
            seat,
            chat,
        }))
    }

    /// Replaces the shared code buffer. Driver only, while active.
    pub async fn update_code(&self, session_id: &str, uid: &str, code: &str) -> Result<Session> {
        let writer = uid.to_string();
        let code = code.to_string();
        self.sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| session.write_code(&writer, code)),
            )
            .await
            .map(|update| update.session)
            .inspect_err(|err| warn!("Code update on {} by {} rejected: {}", session_id, uid, err))
    }

    /// Posts to the participant chat.
    ///
    /// The store checks seat and active flag as part of the append.
    pub async fn send_chat(&self, session_id: &str, uid: &str, text: &str) -> Result<ChatMessage> {
        let text = require_text(text, "message")?;
        let message = ChatMessage::new(uid, text);
        self.sessions.append_chat(session_id, &message).await?;
        debug!("Chat message {} appended to {}", message.id, session_id);
        Ok(message)
    }

    pub async fn chat_history(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        self.sessions.chat(session_id).await
    }

    /// Ends a session. Any Profesor may do this; repeating it is a no-op.
    pub async fn finalize_session(&self, session_id: &str, uid: &str) -> Result<Session> {
        let user = self.require_teacher(uid).await?;
        let role = user.role;
        let update = self
            .sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| session.finalize(role).map(|_| ())),
            )
            .await?;

        if update.changed {
            info!("Session {} finalized by {}", session_id, uid);
        }
        Ok(update.session)
    }

    pub async fn save_notes(&self, session_id: &str, uid: &str, notes: &str) -> Result<Session> {
        self.require_teacher(uid).await?;
        let notes = notes.to_string();
        self.sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| {
                    session.evaluation.notes = Some(notes);
                    Ok(())
                }),
            )
            .await
            .map(|update| update.session)
    }

    pub async fn grade(&self, session_id: &str, uid: &str, grade: Grade) -> Result<Session> {
        self.require_teacher(uid).await?;
        let session = self
            .sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| {
                    session.evaluation.grade = Some(grade);
                    Ok(())
                }),
            )
            .await?
            .session;

        info!("Session {} graded {} by {}", session_id, grade, uid);
        Ok(session)
    }

    pub async fn save_feedback(
        &self,
        session_id: &str,
        uid: &str,
        feedback: &str,
    ) -> Result<Session> {
        self.require_teacher(uid).await?;
        let feedback = require_text(feedback, "feedback")?.to_string();
        self.sessions
            .update(
                session_id,
                Box::new(move |session: &mut Session| {
                    session.evaluation.feedback = Some(feedback);
                    Ok(())
                }),
            )
            .await
            .map(|update| update.session)
    }

    /// Posts to the private teacher chat.
    pub async fn send_teacher_note(
        &self,
        session_id: &str,
        uid: &str,
        text: &str,
    ) -> Result<TeacherNote> {
        self.require_teacher(uid).await?;
        let text = require_text(text, "note")?;

        let note = TeacherNote::new(uid, text);
        self.sessions.append_teacher_note(session_id, &note).await?;
        Ok(note)
    }

    pub async fn teacher_notes(&self, session_id: &str, uid: &str) -> Result<Vec<TeacherNote>> {
        self.require_teacher(uid).await?;
        self.sessions.teacher_notes(session_id).await
    }

    async fn require_user(&self, uid: &str) -> Result<UserProfile> {
        self.users
            .find_by_id(uid)
            .await?
            .ok_or_else(|| PairUpError::not_found("User", uid))
    }

    async fn require_teacher(&self, uid: &str) -> Result<UserProfile> {
        let user = self.require_user(uid).await?;
        if user.role != Role::Profesor {
            warn!("{} ({}) attempted a Profesor-only action", uid, user.role);
            return Err(PairUpError::permission_denied(
                "only a Profesor may do this",
            ));
        }
        Ok(user)
    }

    async fn require_session(&self, session_id: &str) -> Result<Session> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| PairUpError::not_found("Session", session_id))
    }

    /// Seated users with their display names; unknown users show their uid.
    async fn participants(&self, session: &Session) -> Result<Vec<Participant>> {
        let seats: Vec<(Slot, &str)> = Slot::iter()
            .filter_map(|slot| session.slots.occupant(slot).map(|uid| (slot, uid)))
            .collect();

        let profiles = try_join_all(seats.iter().map(|(_, uid)| self.users.find_by_id(uid))).await?;

        Ok(seats
            .into_iter()
            .zip(profiles)
            .map(|((slot, uid), profile)| Participant {
                slot,
                uid: uid.to_string(),
                name: profile.map(|p| p.name).unwrap_or_else(|| uid.to_string()),
            })
            .collect())
    }
}

fn require_text<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PairUpError::validation(format!("{} must not be empty", what)));
    }
    Ok(trimmed)
}
