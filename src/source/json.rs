use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use super::ReviewSource;
use crate::error::FetchError;
use crate::models::{Review, SubjectId};

/// Directory of `<subject>.json` files, one array of reviews per app
pub struct JsonDirSource {
    base_path: PathBuf,
}

impl JsonDirSource {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        info!(path = %base_path.display(), "Initialized JSON review source");
        Self { base_path }
    }

    fn reviews_path(&self, subject: &SubjectId) -> Result<PathBuf, FetchError> {
        let id = subject.as_str();
        // Subjects are opaque, but must stay inside the base directory
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(FetchError::NotFound(id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", id)))
    }
}

#[async_trait]
impl ReviewSource for JsonDirSource {
    async fn fetch(&self, subject: &SubjectId) -> Result<Vec<Review>, FetchError> {
        let path = self.reviews_path(subject)?;

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No reviews file, treating as empty");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        let reviews: Vec<Review> = serde_json::from_str(&content)?;

        debug!(path = %path.display(), count = reviews.len(), "Loaded reviews from file");

        Ok(reviews)
    }

    fn name(&self) -> &'static str {
        "json_dir"
    }
}
