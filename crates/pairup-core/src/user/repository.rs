//! User repository trait.
//!
//! Defines the interface for the `users/{uid}` documents and their
//! `notifications` sub-collection.

use async_trait::async_trait;

use super::model::UserProfile;
use super::notification::Notification;
use crate::error::Result;

/// An abstract repository for user profiles.
///
/// Implementations back this with whatever document store is in use; the
/// application holds no authoritative user state of its own.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by uid.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UserProfile))`: User found
    /// - `Ok(None)`: No such user
    /// - `Err(_)`: Store could not be read
    async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Creates or replaces a user profile.
    async fn save(&self, user: &UserProfile) -> Result<()>;

    /// Lists all registered users.
    async fn list_all(&self) -> Result<Vec<UserProfile>>;

    /// Appends a notification to a user's inbox.
    ///
    /// Fails with `NotFound` if the user does not exist.
    async fn push_notification(&self, uid: &str, notification: &Notification) -> Result<()>;

    /// Lists a user's notifications in ascending timestamp order.
    async fn notifications(&self, uid: &str) -> Result<Vec<Notification>>;
}
