//! TOML-based implementation of TestimonialRepository.

use async_trait::async_trait;
use pairup_core::Result;
use pairup_core::testimonial::{Testimonial, TestimonialRepository};
use std::path::Path;
use std::sync::Arc;

use crate::storage::{AtomicTomlFile, TestimonialsDocument, run_blocking};

const TESTIMONIALS_FILE: &str = "testimonials.toml";

/// Keeps every testimonial in a single `testimonials.toml`.
pub struct TomlTestimonialRepository {
    file: Arc<AtomicTomlFile<TestimonialsDocument>>,
}

impl TomlTestimonialRepository {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(data_dir.join(TESTIMONIALS_FILE))),
        }
    }
}

#[async_trait]
impl TestimonialRepository for TomlTestimonialRepository {
    async fn add(&self, testimonial: &Testimonial) -> Result<()> {
        let file = Arc::clone(&self.file);
        let entry = testimonial.clone();
        run_blocking(move || {
            file.update(TestimonialsDocument::default(), |doc| {
                doc.testimonials.push(entry);
                Ok(())
            })
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Testimonial>> {
        let file = Arc::clone(&self.file);
        let doc = run_blocking(move || Ok(file.load()?)).await?;
        Ok(doc.unwrap_or_default().testimonials)
    }
}
