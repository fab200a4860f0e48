//! TOML-based implementation of UserRepository.
//!
//! One file per user at `users/<uid>.toml`, holding the profile and the
//! notification inbox.

use async_trait::async_trait;
use pairup_core::session::insert_ordered;
use pairup_core::user::{Notification, UserProfile, UserRepository};
use pairup_core::{PairUpError, Result};
use std::path::Path;
use std::sync::Arc;

use crate::storage::{TomlDir, UserDocument, run_blocking};

const USERS_DIR: &str = "users";

pub struct TomlUserRepository {
    store: Arc<TomlDir<UserDocument>>,
}

impl TomlUserRepository {
    /// Creates a repository rooted at `<data_dir>/users`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            store: Arc::new(TomlDir::new(data_dir.join(USERS_DIR))),
        }
    }

    async fn load_document(&self, uid: &str) -> Result<Option<UserDocument>> {
        let store = Arc::clone(&self.store);
        let uid = uid.to_string();
        run_blocking(move || store.load(&uid)).await
    }
}

#[async_trait]
impl UserRepository for TomlUserRepository {
    async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.load_document(uid).await?.map(|doc| doc.profile))
    }

    async fn save(&self, user: &UserProfile) -> Result<()> {
        let store = Arc::clone(&self.store);
        let profile = user.clone();
        run_blocking(move || {
            let uid = profile.uid.clone();
            store.transact(&uid, |doc| {
                match doc {
                    Some(existing) => existing.profile = profile,
                    None => *doc = Some(UserDocument::new(profile)),
                }
                Ok(())
            })
        })
        .await?;

        tracing::debug!("Saved user {}", user.uid);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>> {
        let store = Arc::clone(&self.store);
        let documents = run_blocking(move || store.list_all()).await?;
        Ok(documents.into_iter().map(|doc| doc.profile).collect())
    }

    async fn push_notification(&self, uid: &str, notification: &Notification) -> Result<()> {
        let store = Arc::clone(&self.store);
        let uid = uid.to_string();
        let entry = notification.clone();
        run_blocking(move || {
            store.transact(&uid, |doc| {
                let doc = doc
                    .as_mut()
                    .ok_or_else(|| PairUpError::not_found("User", uid.as_str()))?;
                insert_ordered(&mut doc.notifications, entry);
                Ok(())
            })
        })
        .await
    }

    async fn notifications(&self, uid: &str) -> Result<Vec<Notification>> {
        Ok(self
            .load_document(uid)
            .await?
            .map(|doc| doc.notifications)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairup_core::user::{NotificationKind, Role};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_find_and_list() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlUserRepository::new(temp_dir.path());
        assert!(repo.list_all().await.unwrap().is_empty());

        let mut ana = UserProfile::new("Ana", "ana@example.com", Role::Driver);
        ana.languages = vec!["Kotlin".to_string(), "Rust".to_string()];
        let luis = UserProfile::new("Luis", "luis@example.com", Role::Profesor);
        repo.save(&ana).await.unwrap();
        repo.save(&luis).await.unwrap();

        assert_eq!(repo.find_by_id(&ana.uid).await.unwrap(), Some(ana.clone()));
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
        assert!(repo.find_by_id("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inbox_survives_profile_update() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlUserRepository::new(temp_dir.path());
        let mut user = UserProfile::new("Ana", "ana@example.com", Role::Navigator);
        repo.save(&user).await.unwrap();

        let mut later = Notification::new("B", "second", NotificationKind::Session);
        later.timestamp = 2_000;
        let mut earlier = Notification::new("A", "first", NotificationKind::Warning);
        earlier.timestamp = 1_000;
        repo.push_notification(&user.uid, &later).await.unwrap();
        repo.push_notification(&user.uid, &earlier).await.unwrap();

        user.available = true;
        repo.save(&user).await.unwrap();

        let inbox = repo.notifications(&user.uid).await.unwrap();
        assert_eq!(inbox, vec![earlier, later]);
        assert!(repo.find_by_id(&user.uid).await.unwrap().unwrap().available);
    }

    #[tokio::test]
    async fn test_hand_written_profiles_load_and_bad_ones_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let users_dir = temp_dir.path().join("users");
        std::fs::create_dir_all(&users_dir).unwrap();
        std::fs::write(
            users_dir.join("u1.toml"),
            "[profile]\nuid = \"u1\"\nname = \"Dana\"\nemail = \"d@example.com\"\nrole = \"driver\"\n",
        )
        .unwrap();
        std::fs::write(users_dir.join("u2.toml"), "profile = 3").unwrap();

        let repo = TomlUserRepository::new(temp_dir.path());
        let dana = repo.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(dana.role, Role::Driver);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all, vec![dana]);
    }

    #[tokio::test]
    async fn test_push_to_unknown_user_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let repo = TomlUserRepository::new(temp_dir.path());
        let note = Notification::new("Hi", "there", NotificationKind::General);

        let err = repo.push_notification("ghost", &note).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.notifications("ghost").await.unwrap().is_empty());
    }
}
