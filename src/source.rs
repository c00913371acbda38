//! Statistics source abstraction.
//!
//! The [`StatsSource`] trait hides where player records come from. The crate
//! ships [`HttpStatsSource`](crate::sources::http::HttpStatsSource) behind the
//! `http-source` feature; tests and embedders can provide their own.
//!
//! # Implementing a custom source
//!
//! ```rust
//! use async_trait::async_trait;
//! use lobby_board::{LobbyError, RawPlayerRecord, StatsSource};
//!
//! /// Serves a fixed roster.
//! struct FixedSource(Vec<RawPlayerRecord>);
//!
//! #[async_trait]
//! impl StatsSource for FixedSource {
//!     async fn fetch_players(&self) -> Result<Vec<RawPlayerRecord>, LobbyError> {
//!         Ok(self.0.clone())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::LobbyError;
use crate::protocol::RawPlayerRecord;

/// One-shot provider of the player roster.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch every player record the source knows about.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::Fetch`] or [`LobbyError::HttpStatus`] (or another
    /// source-specific variant) when no roster could be produced.
    async fn fetch_players(&self) -> Result<Vec<RawPlayerRecord>, LobbyError>;
}

#[async_trait]
impl<S: StatsSource + ?Sized> StatsSource for std::sync::Arc<S> {
    async fn fetch_players(&self) -> Result<Vec<RawPlayerRecord>, LobbyError> {
        (**self).fetch_players().await
    }
}
