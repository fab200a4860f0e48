//! Community testimonials.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PairUpError, Result};

/// Lowest and highest star rating a testimonial may carry.
pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// A short review left by a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: String,
    /// Display name of the author at the time of writing
    pub author: String,
    pub text: String,
    #[serde(default = "default_stars")]
    pub stars: u8,
}

fn default_stars() -> u8 {
    MAX_STARS
}

impl Testimonial {
    /// Builds a validated testimonial.
    ///
    /// # Errors
    ///
    /// `Validation` when the text is blank or the rating is outside 1..=5.
    pub fn new(author: impl Into<String>, text: impl Into<String>, stars: u8) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(PairUpError::validation("testimonial text must not be empty"));
        }
        if !(MIN_STARS..=MAX_STARS).contains(&stars) {
            return Err(PairUpError::validation(format!(
                "stars must be between {MIN_STARS} and {MAX_STARS}, got {stars}"
            )));
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            author: author.into(),
            text,
            stars,
        })
    }
}

/// An abstract repository for the `testimonials` collection.
#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    async fn add(&self, testimonial: &Testimonial) -> Result<()>;

    /// All testimonials in insertion order.
    async fn list_all(&self) -> Result<Vec<Testimonial>>;
}
