//! Daily trending selection.
//!
//! A generator seeded with the UTC date picks the same prompts for everyone on a given day.
//! The server computes it on every request; clients keep the result in a device-local cache
//! until the day changes.
pub mod cache;
pub mod clock;
pub mod rng;
pub mod sampler;
mod service;

pub use clock::{Clock, SystemClock};
pub use service::{CacheInfo, TrendingService, server_trending};

/// Number of prompts in the trending selection
pub const TRENDING_COUNT: usize = 9;
