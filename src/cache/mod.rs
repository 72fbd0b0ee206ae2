//! Response cache for read-mostly API endpoints
//!
//! This module provides an in-memory cache that stores decoded API responses
//! for a short, fixed TTL (time-to-live). Expired entries are dropped lazily on
//! read, and mutations invalidate the keys whose data they change. Time comes
//! from an injectable [`Clock`] so expiry can be tested without sleeping.

mod clock;
pub mod key;
mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{ResponseCache, DEFAULT_TTL_MS};
