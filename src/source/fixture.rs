use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use super::ReviewSource;
use crate::error::FetchError;
use crate::models::{Review, SubjectId};

/// Subject that always fails, for exercising the error path
pub const DEFAULT_FAILING_SUBJECT: &str = "error-case";

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

pub const FIXTURE_FAILURE_MESSAGE: &str = "Failed to fetch reviews for this app.";

/// In-memory source serving a fixed dataset after an artificial delay
#[derive(Debug, Clone)]
pub struct FixtureSource {
    reviews: Vec<Review>,
    delay: Duration,
    failing_subject: Option<String>,
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureSource {
    pub fn new() -> Self {
        Self {
            reviews: sample_reviews(),
            delay: DEFAULT_DELAY,
            failing_subject: Some(DEFAULT_FAILING_SUBJECT.to_string()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_failing_subject(mut self, subject: Option<String>) -> Self {
        self.failing_subject = subject;
        self
    }

    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
        self.reviews = reviews;
        self
    }

    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }
}

#[async_trait]
impl ReviewSource for FixtureSource {
    async fn fetch(&self, subject: &SubjectId) -> Result<Vec<Review>, FetchError> {
        debug!(subject = %subject, delay_ms = self.delay.as_millis() as u64, "Serving fixture reviews");

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.failing_subject.as_deref() == Some(subject.as_str()) {
            info!(subject = %subject, "Fixture failing subject requested");
            return Err(FetchError::Unavailable(FIXTURE_FAILURE_MESSAGE.to_string()));
        }

        Ok(self.reviews.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

fn review(id: &str, author: &str, avatar: &str, rating: i64, text: &str, date: (i32, u32, u32)) -> Review {
    Review {
        id: id.to_string(),
        author: author.to_string(),
        avatar_url: Some(avatar.to_string()).filter(|url| !url.is_empty()),
        rating,
        text: text.to_string(),
        // Fixture dates are literals known to be valid
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
    }
}

/// The built-in four-review dataset
pub fn sample_reviews() -> Vec<Review> {
    vec![
        review(
            "1",
            "Jane Doe",
            "https://github.com/shadcn.png",
            5,
            "This is the best app I've ever used! It's incredibly intuitive and has all the features I need. Highly recommended to everyone.",
            (2024, 5, 15),
        ),
        review(
            "2",
            "John Smith",
            "",
            4,
            "Great app, works well for the most part. There are a few minor bugs here and there, but nothing that breaks the experience. The UI is clean.",
            (2024, 5, 12),
        ),
        review(
            "3",
            "Alice Johnson",
            "https://github.com/vercel.png",
            3,
            "It's an okay app. It gets the job done but lacks some advanced features that competitors have. The performance could also be better on older devices.",
            (2024, 5, 10),
        ),
        review(
            "4",
            "Mike Brown",
            "https://github.com/radix-ui.png",
            1,
            "I was very disappointed. The app crashed multiple times and I lost my work. I can't recommend this in its current state. Needs major improvements.",
            (2024, 5, 9),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> SubjectId {
        SubjectId::new(id).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_returns_dataset() {
        let source = FixtureSource::new();

        let reviews = source.fetch(&subject("photo-editor-pro")).await.unwrap();
        assert_eq!(reviews.len(), 4);
        assert_eq!(reviews[0].author, "Jane Doe");
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[1].avatar(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failing_subject() {
        let source = FixtureSource::new();

        let err = source.fetch(&subject("error-case")).await.unwrap_err();
        assert_eq!(err.user_message(), FIXTURE_FAILURE_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_delay() {
        let source = FixtureSource::new().with_delay(Duration::from_secs(2));
        let started = tokio::time::Instant::now();

        source.fetch(&subject("photo-editor-pro")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_failing_subject_disabled() {
        let source = FixtureSource::new()
            .with_delay(Duration::ZERO)
            .with_failing_subject(None);

        let reviews = source.fetch(&subject("error-case")).await.unwrap();
        assert_eq!(reviews.len(), 4);
    }
}
