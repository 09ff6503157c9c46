pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod render;
pub mod source;
pub mod summary;

pub use config::Config;
pub use error::FetchError;
pub use loader::{FetchTicket, LoadMachine, LoadState, LoaderSnapshot, ReviewLoader, SequenceReport};
pub use models::*;
pub use render::{render_snapshot, render_state, Avatar, RenderOptions, ReviewCard, ReviewView, StarRating};
pub use source::{FixtureSource, HttpSource, JsonDirSource, ReviewSource};
pub use summary::{RatingSummary, StarBucket};
