//! Wiring of repository implementations for a chosen backend.

use pairup_core::config::{RootConfig, StorageBackend};
use pairup_core::session::SessionRepository;
use pairup_core::testimonial::TestimonialRepository;
use pairup_core::user::UserRepository;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config_service::resolve_data_dir;
use crate::memory_repository::{
    InMemorySessionRepository, InMemoryTestimonialRepository, InMemoryUserRepository,
};
use crate::paths::PairUpPaths;
use crate::toml_session_repository::TomlSessionRepository;
use crate::toml_testimonial_repository::TomlTestimonialRepository;
use crate::toml_user_repository::TomlUserRepository;

/// The set of stores the application layer runs against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub testimonials: Arc<dyn TestimonialRepository>,
    toml_sessions: Option<Arc<TomlSessionRepository>>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            testimonials: Arc::new(InMemoryTestimonialRepository::new()),
            toml_sessions: None,
        }
    }

    pub fn toml(data_dir: &Path) -> Self {
        let sessions = Arc::new(TomlSessionRepository::new(data_dir));
        Self {
            users: Arc::new(TomlUserRepository::new(data_dir)),
            sessions: sessions.clone(),
            testimonials: Arc::new(TomlTestimonialRepository::new(data_dir)),
            toml_sessions: Some(sessions),
        }
    }

    /// Starts publishing session changes written by other processes.
    ///
    /// Returns `None` for stores that only live in this process.
    pub async fn poll_foreign_writes(
        &self,
        every: Duration,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        match &self.toml_sessions {
            Some(sessions) => Some(sessions.spawn_disk_poller(every, cancel).await),
            None => None,
        }
    }

    /// Builds the stores `config` asks for.
    pub fn from_config(config: &RootConfig, paths: &PairUpPaths) -> Self {
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory storage");
                Self::in_memory()
            }
            StorageBackend::Toml => {
                let data_dir = resolve_data_dir(config, paths);
                tracing::info!("Using TOML storage at {}", data_dir.display());
                Self::toml(&data_dir)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairup_core::session::{Session, SessionEvent};
    use pairup_core::user::{Role, UserProfile};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_toml_backend_uses_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PairUpPaths::new(Some(temp_dir.path().join("home"))).unwrap();
        let mut config = RootConfig::default();
        config.storage.data_dir = Some(temp_dir.path().join("data"));

        let repos = Repositories::from_config(&config, &paths);
        let user = UserProfile::new("Ana", "ana@example.com", Role::Driver);
        repos.users.save(&user).await.unwrap();

        assert!(
            temp_dir
                .path()
                .join("data")
                .join("users")
                .join(format!("{}.toml", user.uid))
                .exists()
        );
    }

    #[tokio::test]
    async fn test_memory_backend_touches_no_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = PairUpPaths::new(Some(temp_dir.path().to_path_buf())).unwrap();
        let mut config = RootConfig::default();
        config.storage.backend = StorageBackend::Memory;

        let repos = Repositories::from_config(&config, &paths);
        let user = UserProfile::new("Ana", "ana@example.com", Role::Driver);
        repos.users.save(&user).await.unwrap();

        assert!(repos.users.find_by_id(&user.uid).await.unwrap().is_some());
        assert!(!temp_dir.path().join("users").exists());
    }

    #[tokio::test]
    async fn test_poller_reports_a_write_made_right_after_it_starts() {
        let temp_dir = TempDir::new().unwrap();
        let repos = Repositories::toml(temp_dir.path());
        let elsewhere = TomlSessionRepository::new(temp_dir.path());
        let mut feed = repos.sessions.subscribe();
        let cancel = CancellationToken::new();

        let poller = repos
            .poll_foreign_writes(Duration::from_millis(20), cancel.clone())
            .await
            .unwrap();
        let session = Session::new("d1", Role::Driver).unwrap();
        elsewhere.create(&session).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), feed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, SessionEvent::Updated(session));

        cancel.cancel();
        poller.await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_backend_has_no_poller() {
        let repos = Repositories::in_memory();
        let poller = repos
            .poll_foreign_writes(Duration::from_millis(20), CancellationToken::new())
            .await;
        assert!(poller.is_none());
    }
}
