//! Storage layer for atomic file operations.

mod atomic_toml;
mod documents;
mod toml_dir;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
pub use documents::{SessionDocument, TestimonialsDocument, UserDocument};
pub use toml_dir::TomlDir;

use pairup_core::{PairUpError, Result};

/// Runs blocking file work off the async executor.
pub(crate) async fn run_blocking<R, F>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PairUpError::internal(format!("storage task failed: {}", e)))?
}
