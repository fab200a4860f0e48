pub mod community;
pub mod notifications;
pub mod progress;
pub mod session;
pub mod user;

pub use community::CommunityAction;
pub use notifications::NotificationAction;
pub use progress::ProgressAction;
pub use session::SessionAction;
pub use user::UserAction;

use anyhow::{Context as _, Result, anyhow};
use pairup_application::{PairUpApp, UserNotice};
use pairup_core::PairUpError;
use pairup_core::config::{RootConfig, StorageBackend};
use pairup_infrastructure::config_service::is_persistent;
use pairup_infrastructure::{ConfigService, PairUpPaths, Repositories};
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Cli;

/// A domain failure with the notice shown to the user.
#[derive(Debug, Error)]
#[error("{notice}")]
pub struct NoticeError {
    pub notice: UserNotice,
    #[source]
    pub source: PairUpError,
}

pub trait NoticeExt<T> {
    /// Attaches the notice for a failed `action`, e.g. `"join session"`.
    fn notice(self, action: &str) -> Result<T>;
}

impl<T> NoticeExt<T> for pairup_core::Result<T> {
    fn notice(self, action: &str) -> Result<T> {
        self.map_err(|source| {
            NoticeError {
                notice: UserNotice::from_error(action, &source),
                source,
            }
            .into()
        })
    }
}

/// Prints a failed command to stderr.
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<NoticeError>() {
        Some(failure) => {
            tracing::debug!("{}", failure.source);
            eprintln!("{}", failure.notice);
        }
        None => eprintln!("error: {:#}", err),
    }
}

/// Everything a command needs: the wired use cases, the config and the
/// acting user.
pub struct Context {
    pub app: PairUpApp,
    pub repos: Repositories,
    pub config: RootConfig,
    pub config_service: ConfigService,
    acting_uid: Option<String>,
    json: bool,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let paths = PairUpPaths::from_env().context("Failed to resolve PairUp directories")?;
        let config_service = match &cli.config {
            Some(path) => ConfigService::new(path.clone()),
            None => ConfigService::for_paths(&paths),
        };
        let mut config = config_service
            .load()
            .with_context(|| format!("Failed to load {}", config_service.path().display()))?;
        if cli.memory {
            config.storage.backend = StorageBackend::Memory;
        }

        init_tracing(&config);

        let repos = Repositories::from_config(&config, &paths);
        let acting_uid = cli
            .acting_uid
            .clone()
            .or_else(|| config.user.current_uid.clone());

        Ok(Self {
            app: PairUpApp::new(repos.clone()),
            repos,
            config,
            config_service,
            acting_uid,
            json: cli.json,
        })
    }

    /// The user the command runs as.
    pub fn actor(&self) -> Result<&str> {
        self.acting_uid.as_deref().ok_or_else(|| {
            anyhow!("no acting user; pass --as <UID> or run `pairup user register`")
        })
    }

    /// Remembers `uid` as the default acting user, if the store persists.
    pub fn remember_user(&self, uid: &str) -> Result<()> {
        if !is_persistent(&self.config) {
            return Ok(());
        }
        self.config_service
            .set_current_user(uid)
            .with_context(|| format!("Failed to update {}", self.config_service.path().display()))?;
        Ok(())
    }

    /// Prints `value` as JSON with `--json`, otherwise as `text` renders it.
    pub fn emit<T, F>(&self, value: &T, text: F) -> Result<()>
    where
        T: Serialize,
        F: FnOnce(&T) -> String,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            let rendered = text(value);
            if !rendered.is_empty() {
                println!("{}", rendered);
            }
        }
        Ok(())
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `[log] level`.
fn init_tracing(config: &RootConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}
