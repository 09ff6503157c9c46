pub mod fixture;
pub mod http;
pub mod json;

pub use fixture::FixtureSource;
pub use http::HttpSource;
pub use json::JsonDirSource;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::{Review, SubjectId};

/// Trait for review data backends
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Fetch the reviews for a subject, in the order they should be shown
    async fn fetch(&self, subject: &SubjectId) -> Result<Vec<Review>, FetchError>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
