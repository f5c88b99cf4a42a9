//! Infrastructure layer - External integrations and persistence

pub mod batch;
pub mod bedrock;
pub mod logging;
pub mod ratings;
pub mod report;

pub use batch::{BatchProgress, BatchTranslator, ProgressSnapshot};
pub use ratings::{Granularity, NewRating, RatingStats, RatingsStore};
