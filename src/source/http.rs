use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, info, instrument, warn};

use super::ReviewSource;
use crate::error::FetchError;
use crate::models::{Review, SubjectId};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Source backed by the storefront review API
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Transport(format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Transport(format!("invalid base url {}", base_url)));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// `{base}/api/apps/{subject}/reviews`, with the subject percent-encoded
    fn reviews_url(&self, subject: &SubjectId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "apps", subject.as_str(), "reviews"]);
        }
        url
    }
}

#[async_trait]
impl ReviewSource for HttpSource {
    #[instrument(skip_all, fields(subject = %subject))]
    async fn fetch(&self, subject: &SubjectId) -> Result<Vec<Review>, FetchError> {
        let url = self.reviews_url(subject);

        debug!(url = %url, "Requesting reviews");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!("Review service has no reviews for subject");
            return Err(FetchError::NotFound(subject.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Review service returned error");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reviews: Vec<Review> = response.json().await?;

        info!(count = reviews.len(), "Fetched reviews");

        Ok(reviews)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
