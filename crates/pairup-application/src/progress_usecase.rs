//! Per-user progress over finished sessions.

use pairup_core::progress::{ProgressSummary, SessionSummary, history_for};
use pairup_core::session::{Session, SessionFilter, SessionRepository};
use pairup_core::user::UserRepository;
use pairup_core::{PairUpError, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ProgressUseCase {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl ProgressUseCase {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    pub async fn summary(&self, uid: &str) -> Result<ProgressSummary> {
        let (finished, names) = self.load(uid).await?;
        Ok(ProgressSummary::compute(uid, &finished, &names))
    }

    /// Every finished session of `uid`, newest first.
    pub async fn history(&self, uid: &str) -> Result<Vec<SessionSummary>> {
        let (finished, names) = self.load(uid).await?;
        Ok(history_for(uid, &finished, &names))
    }

    async fn load(&self, uid: &str) -> Result<(Vec<Session>, HashMap<String, String>)> {
        if self.users.find_by_id(uid).await?.is_none() {
            return Err(PairUpError::not_found("User", uid));
        }

        let (finished, users) = futures::try_join!(
            self.sessions.list(SessionFilter::finished()),
            self.users.list_all(),
        )?;
        let names = users.into_iter().map(|u| (u.uid, u.name)).collect();
        Ok((finished, names))
    }
}
