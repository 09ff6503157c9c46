use std::fmt::{self, Write as _};

use chrono::NaiveDate;
use serde::Serialize;

use crate::loader::{LoadState, LoaderSnapshot};
use crate::models::Review;

pub const MAX_STARS: u8 = 5;

pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

pub const DEFAULT_SKELETON_ROWS: usize = 3;

pub const EMPTY_NOTICE: &str = "No reviews yet. Be the first to leave one!";

/// Five-unit star indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarRating {
    filled: u8,
}

impl StarRating {
    /// Out-of-range ratings clamp to 0..=5
    pub fn new(rating: i64) -> Self {
        Self {
            filled: rating.clamp(0, i64::from(MAX_STARS)) as u8,
        }
    }

    pub fn filled(&self) -> u8 {
        self.filled
    }

    pub fn unfilled(&self) -> u8 {
        MAX_STARS - self.filled
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.filled {
            f.write_char('★')?;
        }
        for _ in 0..self.unfilled() {
            f.write_char('☆')?;
        }
        Ok(())
    }
}

/// Image when available, initials otherwise
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Avatar {
    Image(String),
    Initials(String),
}

impl Avatar {
    pub fn for_review(review: &Review) -> Self {
        match review.avatar() {
            Some(url) => Avatar::Image(url.to_string()),
            None => Avatar::Initials(review.initials()),
        }
    }
}

/// One rendered review entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCard {
    pub id: String,
    pub avatar: Avatar,
    pub author: String,
    pub date: String,
    pub stars: StarRating,
    pub text: String,
}

/// Presentation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub date_format: String,
    pub skeleton_rows: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            skeleton_rows: DEFAULT_SKELETON_ROWS,
        }
    }
}

impl RenderOptions {
    pub fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        // chrono reports bad format strings as a fmt error
        if write!(out, "{}", date.format(&self.date_format)).is_err() {
            return date.format(DEFAULT_DATE_FORMAT).to_string();
        }
        out
    }
}

/// Exactly one view per loader state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ReviewView {
    Skeleton { rows: usize },
    Error { message: String },
    Empty,
    List { cards: Vec<ReviewCard> },
}

impl ReviewView {
    pub fn from_state(state: &LoadState, options: &RenderOptions) -> Self {
        match state {
            LoadState::Loading => ReviewView::Skeleton {
                rows: options.skeleton_rows,
            },
            LoadState::Failed { message } => ReviewView::Error {
                message: message.clone(),
            },
            LoadState::Loaded { reviews } if reviews.is_empty() => ReviewView::Empty,
            LoadState::Loaded { reviews } => ReviewView::List {
                cards: reviews
                    .iter()
                    .map(|review| ReviewCard {
                        id: review.id.clone(),
                        avatar: Avatar::for_review(review),
                        author: review.author.clone(),
                        date: options.format_date(review.date),
                        stars: StarRating::new(review.rating),
                        text: review.text.clone(),
                    })
                    .collect(),
            },
        }
    }

    /// Render as markdown for the terminal
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        match self {
            ReviewView::Skeleton { rows } => {
                md.push_str("## Reviews\n\n");
                for _ in 0..*rows {
                    md.push_str("░░ ░░░░░░░░░░    ░░░░░░░░\n░░░░░\n░░░░░░░░░░░░░░░░░░░░░░░░░░\n\n");
                }
            }
            ReviewView::Error { message } => {
                md.push_str("> **Error**\n>\n");
                md.push_str(&format!("> {}\n", message));
            }
            ReviewView::Empty => {
                md.push_str("## Reviews (0)\n\n");
                md.push_str(EMPTY_NOTICE);
                md.push('\n');
            }
            ReviewView::List { cards } => {
                md.push_str(&format!("## Reviews ({})\n\n", cards.len()));

                for card in cards {
                    let avatar = match &card.avatar {
                        Avatar::Image(url) => format!("![{}'s avatar]({})", card.author, url),
                        Avatar::Initials(initials) => format!("[{}]", initials),
                    };

                    md.push_str(&format!(
                        "{} **{}** · {}\n",
                        avatar, card.author, card.date
                    ));
                    md.push_str(&format!("{}\n\n", card.stars));
                    md.push_str(&format!("{}\n\n", card.text));
                    md.push_str("---\n\n");
                }
            }
        }

        md
    }
}

/// Render a loader state straight to markdown
pub fn render_state(state: &LoadState, options: &RenderOptions) -> String {
    ReviewView::from_state(state, options).to_markdown()
}

/// Render a snapshot under a heading naming its subject
pub fn render_snapshot(snapshot: &LoaderSnapshot, options: &RenderOptions) -> String {
    let mut md = String::new();
    if let Some(subject) = &snapshot.subject {
        md.push_str(&format!("# {}\n\n", subject));
    }
    md.push_str(&render_state(&snapshot.state, options));
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubjectId;
    use crate::source::fixture::sample_reviews;

    #[test]
    fn test_star_rating() {
        let stars = StarRating::new(4);
        assert_eq!(stars.filled(), 4);
        assert_eq!(stars.unfilled(), 1);
        assert_eq!(stars.to_string(), "★★★★☆");
    }

    #[test]
    fn test_star_rating_clamps() {
        assert_eq!(StarRating::new(0).filled(), 0);
        assert_eq!(StarRating::new(0).unfilled(), 5);
        assert_eq!(StarRating::new(6).filled(), 5);
        assert_eq!(StarRating::new(6).unfilled(), 0);
        assert_eq!(StarRating::new(-3).filled(), 0);
    }

    #[test]
    fn test_loading_renders_skeleton() {
        let view = ReviewView::from_state(&LoadState::Loading, &RenderOptions::default());
        assert_eq!(view, ReviewView::Skeleton { rows: 3 });
        assert!(view.to_markdown().starts_with("## Reviews\n"));
    }

    #[test]
    fn test_failed_renders_error() {
        let state = LoadState::Failed {
            message: "Failed to fetch reviews for this app.".to_string(),
        };
        let md = render_state(&state, &RenderOptions::default());

        assert!(md.contains("**Error**"));
        assert!(md.contains("Failed to fetch reviews for this app."));
        assert!(!md.contains("Reviews ("));
    }

    #[test]
    fn test_empty_renders_notice() {
        let state = LoadState::Loaded { reviews: Vec::new() };
        let view = ReviewView::from_state(&state, &RenderOptions::default());

        assert_eq!(view, ReviewView::Empty);
        assert!(view.to_markdown().contains(EMPTY_NOTICE));
    }

    #[test]
    fn test_loaded_renders_cards() {
        let state = LoadState::Loaded {
            reviews: sample_reviews(),
        };
        let ReviewView::List { cards } = ReviewView::from_state(&state, &RenderOptions::default())
        else {
            panic!("expected list view");
        };

        assert_eq!(cards.len(), 4);
        assert_eq!(cards[0].date, "5/15/2024");
        assert_eq!(cards[0].stars.filled(), 5);
        assert_eq!(
            cards[0].avatar,
            Avatar::Image("https://github.com/shadcn.png".to_string())
        );
        assert_eq!(cards[1].avatar, Avatar::Initials("JS".to_string()));

        let md = render_state(&state, &RenderOptions::default());
        assert!(md.starts_with("## Reviews (4)"));
        assert!(md.contains("[JS] **John Smith** · 5/12/2024"));
        assert!(md.contains("★☆☆☆☆"));
    }

    #[test]
    fn test_snapshot_labeled_with_subject() {
        let snapshot = LoaderSnapshot {
            subject: Some(SubjectId::new("photo-editor-pro").unwrap()),
            state: LoadState::Loading,
        };
        let md = render_snapshot(&snapshot, &RenderOptions::default());

        assert!(md.starts_with("# photo-editor-pro\n\n## Reviews\n"));
    }

    #[test]
    fn test_snapshot_without_subject() {
        let snapshot = LoaderSnapshot {
            subject: None,
            state: LoadState::Loaded { reviews: Vec::new() },
        };
        let md = render_snapshot(&snapshot, &RenderOptions::default());

        assert!(md.starts_with("## Reviews (0)"));
    }

    #[test]
    fn test_custom_date_format() {
        let options = RenderOptions {
            date_format: "%Y-%m-%d".to_string(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(options.format_date(date), "2024-05-09");
    }

    #[test]
    fn test_invalid_date_format_falls_back() {
        let options = RenderOptions {
            date_format: "%".to_string(),
            ..Default::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert_eq!(options.format_date(date), "5/9/2024");
    }
}
