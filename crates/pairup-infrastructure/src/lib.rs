//! Storage backends and file-system plumbing for PairUp.

pub mod config_service;
pub mod memory_repository;
pub mod paths;
pub mod repositories;
pub mod storage;
pub mod toml_session_repository;
pub mod toml_testimonial_repository;
pub mod toml_user_repository;

pub use crate::config_service::ConfigService;
pub use crate::memory_repository::{
    InMemorySessionRepository, InMemoryTestimonialRepository, InMemoryUserRepository,
};
pub use crate::paths::PairUpPaths;
pub use crate::repositories::Repositories;
pub use crate::toml_session_repository::TomlSessionRepository;
pub use crate::toml_testimonial_repository::TomlTestimonialRepository;
pub use crate::toml_user_repository::TomlUserRepository;
