//! Concrete [`StatsSource`](crate::StatsSource) implementations.
//!
//! | Feature       | Source             |
//! |---------------|--------------------|
//! | `http-source` | [`HttpStatsSource`] |

#[cfg(feature = "http-source")]
pub mod http;

#[cfg(feature = "http-source")]
pub use http::{HttpSourceConfig, HttpStatsSource};
