//! Registration and profile maintenance.

use pairup_core::user::{Role, UserProfile, UserRepository};
use pairup_core::{PairUpError, Result};
use std::sync::Arc;
use tracing::info;

pub struct AccountUseCase {
    users: Arc<dyn UserRepository>,
}

impl AccountUseCase {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Registers a new member and returns the stored profile.
    ///
    /// # Errors
    ///
    /// `Validation` when the name or e-mail is blank.
    pub async fn register(&self, name: &str, email: &str, role: Role) -> Result<UserProfile> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(PairUpError::validation("name and email are required"));
        }

        let profile = UserProfile::new(name, email, role);
        self.users.save(&profile).await?;
        info!("Registered {} as {} ({})", profile.uid, role, name);
        Ok(profile)
    }

    pub async fn profile(&self, uid: &str) -> Result<UserProfile> {
        self.users
            .find_by_id(uid)
            .await?
            .ok_or_else(|| PairUpError::not_found("User", uid))
    }

    /// Replaces the language list; blanks and duplicates are dropped.
    pub async fn update_languages(&self, uid: &str, languages: &[String]) -> Result<UserProfile> {
        let mut cleaned: Vec<String> = Vec::new();
        for lang in languages.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
            if !cleaned.iter().any(|c| c.eq_ignore_ascii_case(lang)) {
                cleaned.push(lang.to_string());
            }
        }
        self.modify(uid, |profile| profile.languages = cleaned).await
    }

    pub async fn set_availability(&self, uid: &str, available: bool) -> Result<UserProfile> {
        self.modify(uid, |profile| profile.available = available)
            .await
    }

    pub async fn set_level(&self, uid: &str, level: &str) -> Result<UserProfile> {
        let level = level.trim().to_string();
        self.modify(uid, |profile| profile.level = level).await
    }

    pub async fn set_online(&self, uid: &str, online: bool) -> Result<UserProfile> {
        self.modify(uid, |profile| profile.active = online).await
    }

    // Last write wins: profiles are only edited by their owner.
    async fn modify<F>(&self, uid: &str, change: F) -> Result<UserProfile>
    where
        F: FnOnce(&mut UserProfile) + Send,
    {
        let mut profile = self.profile(uid).await?;
        change(&mut profile);
        self.users.save(&profile).await?;
        Ok(profile)
    }
}
