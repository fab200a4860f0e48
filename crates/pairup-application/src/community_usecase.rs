//! Community features: testimonials, the member directory, partner search
//! and notifications.

use pairup_core::testimonial::{Testimonial, TestimonialRepository};
use pairup_core::user::{Notification, UserProfile, UserRepository};
use pairup_core::{PairUpError, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub struct CommunityUseCase {
    users: Arc<dyn UserRepository>,
    testimonials: Arc<dyn TestimonialRepository>,
}

impl CommunityUseCase {
    pub fn new(
        users: Arc<dyn UserRepository>,
        testimonials: Arc<dyn TestimonialRepository>,
    ) -> Self {
        Self {
            users,
            testimonials,
        }
    }

    /// Publishes a testimonial signed with the caller's display name.
    pub async fn post_testimonial(&self, uid: &str, text: &str, stars: u8) -> Result<Testimonial> {
        let author = self
            .users
            .find_by_id(uid)
            .await?
            .ok_or_else(|| PairUpError::not_found("User", uid))?;

        let testimonial = Testimonial::new(author.name, text.trim(), stars)?;
        self.testimonials.add(&testimonial).await?;
        info!("Testimonial {} posted by {}", testimonial.id, uid);
        Ok(testimonial)
    }

    pub async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        self.testimonials.list_all().await
    }

    /// All members, online ones first, then by name.
    pub async fn members(&self) -> Result<Vec<UserProfile>> {
        let mut members = self.users.list_all().await?;
        members.sort_by(|a, b| {
            b.active
                .cmp(&a.active)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(members)
    }

    /// Other members whose name or one of whose languages matches `query`.
    ///
    /// The match is a case-insensitive substring; an empty query matches
    /// everyone.
    pub async fn search_partners(
        &self,
        uid: &str,
        query: &str,
        available_only: bool,
    ) -> Result<Vec<UserProfile>> {
        let query = query.trim();
        let partners: Vec<UserProfile> = self
            .members()
            .await?
            .into_iter()
            .filter(|user| user.uid != uid)
            .filter(|user| !available_only || user.available)
            .filter(|user| user.matches_search(query))
            .collect();

        debug!("Partner search {:?} matched {}", query, partners.len());
        Ok(partners)
    }

    pub async fn notifications(&self, uid: &str) -> Result<Vec<Notification>> {
        self.users.notifications(uid).await
    }

    pub async fn notify(&self, uid: &str, notification: &Notification) -> Result<()> {
        self.users.push_notification(uid, notification).await?;
        debug!("Notification {} delivered to {}", notification.id, uid);
        Ok(())
    }
}
