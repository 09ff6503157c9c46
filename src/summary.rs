use serde::Serialize;

use crate::models::Review;
use crate::render::StarRating;

/// Share of reviews at one star level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarBucket {
    pub stars: u8,
    pub count: usize,
    pub percentage: u8,
}

/// Aggregate ratings for a set of reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: usize,
    pub average: f64,
    /// Ordered from 5 stars down to 1
    pub distribution: Vec<StarBucket>,
}

impl RatingSummary {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let count = reviews.len();

        let distribution = (1..=5u8)
            .rev()
            .map(|stars| {
                let bucket = reviews
                    .iter()
                    .filter(|r| StarRating::new(r.rating).filled() == stars)
                    .count();
                StarBucket {
                    stars,
                    count: bucket,
                    percentage: percentage(bucket, count),
                }
            })
            .collect();

        let average = if count == 0 {
            0.0
        } else {
            let total: i64 = reviews.iter().map(|r| r.rating.clamp(0, 5)).sum();
            total as f64 / count as f64
        };

        Self {
            count,
            average,
            distribution,
        }
    }

    /// Stars for the rounded average
    pub fn stars(&self) -> StarRating {
        StarRating::new(self.average.round() as i64)
    }

    /// Render as a markdown block
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("### Ratings\n\n");
        md.push_str(&format!(
            "**{:.1}** {} ({} ratings)\n\n",
            self.average,
            self.stars(),
            self.count
        ));

        md.push_str("| Stars | Share |\n|-------|-------|\n");
        for bucket in &self.distribution {
            md.push_str(&format!("| {} | {}% |\n", bucket.stars, bucket.percentage));
        }

        md
    }
}

fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u8
}
