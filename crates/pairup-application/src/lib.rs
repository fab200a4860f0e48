//! Use cases for PairUp.
//!
//! Each use case holds `Arc`s to the repository traits it needs and turns
//! a user request into conditional writes against the store.

pub mod account_usecase;
pub mod community_usecase;
pub mod notice;
pub mod progress_usecase;
pub mod session_usecase;
pub mod watcher;

pub use account_usecase::AccountUseCase;
pub use community_usecase::CommunityUseCase;
pub use notice::{NoticeLevel, UserNotice};
pub use progress_usecase::ProgressUseCase;
pub use session_usecase::{
    JoinedSession, Participant, ParticipantView, SessionUseCase, SessionView, TeacherPanel,
};
pub use watcher::{SessionWatcher, WatchRegistry};

use pairup_core::Result;
use pairup_core::session::{SessionEvent, SessionRepository};
use pairup_infrastructure::Repositories;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Every use case wired against one set of repositories.
pub struct PairUpApp {
    pub accounts: AccountUseCase,
    pub sessions: SessionUseCase,
    pub community: CommunityUseCase,
    pub progress: ProgressUseCase,
    session_repository: Arc<dyn SessionRepository>,
}

impl PairUpApp {
    pub fn new(repos: Repositories) -> Self {
        Self {
            accounts: AccountUseCase::new(repos.users.clone()),
            sessions: SessionUseCase::new(repos.users.clone(), repos.sessions.clone()),
            community: CommunityUseCase::new(repos.users.clone(), repos.testimonials.clone()),
            progress: ProgressUseCase::new(repos.users.clone(), repos.sessions.clone()),
            session_repository: repos.sessions,
        }
    }

    /// Starts a live watch on one session for `uid`.
    ///
    /// Fails like [`SessionUseCase::open_session`] when `uid` may not see
    /// the session. Only Profesor users receive teacher-chat events.
    pub async fn watch(
        &self,
        session_id: &str,
        uid: &str,
    ) -> Result<(SessionWatcher, UnboundedReceiver<SessionEvent>)> {
        let view = self.sessions.open_session(session_id, uid).await?;
        let is_teacher = matches!(view, SessionView::Teacher(_));
        Ok(SessionWatcher::spawn(
            &self.session_repository,
            session_id,
            is_teacher,
        ))
    }
}
