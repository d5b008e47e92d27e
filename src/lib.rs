//! Result cache for AI-generated product review insights.
//!
//! Answers are keyed by brand, model and a normalized form of the question,
//! expire after a fixed TTL, and carry a usage count that drives the
//! "similar questions" fallback.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod state;

pub use application::resolver::CacheResolver;
pub use domain::error::CacheError;
pub use domain::model::{CacheEntry, CacheKind};
pub use domain::traits::{CacheStore, Clock, SystemClock};
