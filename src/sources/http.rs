//! Statistics source backed by a JSON-over-HTTP endpoint.
//!
//! The endpoint answers a plain `GET` with a JSON array of player records in
//! the upstream vocabulary (see [`RawPlayerRecord`]).

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LobbyError;
use crate::protocol::RawPlayerRecord;
use crate::source::StatsSource;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for an [`HttpStatsSource`].
///
/// ```
/// use lobby_board::sources::HttpSourceConfig;
/// use std::time::Duration;
///
/// let config = HttpSourceConfig::new("http://localhost:5000/players")
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(config.timeout, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Endpoint returning the player list.
    pub url: String,
    /// Timeout for the whole request. Defaults to **5 seconds**.
    pub timeout: Duration,
}

impl HttpSourceConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Fetches the roster from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpStatsSource {
    client: reqwest::Client,
    config: HttpSourceConfig,
}

impl HttpStatsSource {
    /// Build a source with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`LobbyError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: HttpSourceConfig) -> Result<Self, LobbyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LobbyError::Fetch(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Reuse an existing client. The configured timeout is applied per request.
    pub fn with_client(client: reqwest::Client, config: HttpSourceConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }
}

#[async_trait]
impl StatsSource for HttpStatsSource {
    async fn fetch_players(&self) -> Result<Vec<RawPlayerRecord>, LobbyError> {
        let url = &self.config.url;
        debug!(%url, "stats source: fetching players");

        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LobbyError::Timeout
                } else {
                    LobbyError::Fetch(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "stats source: request rejected");
            return Err(LobbyError::HttpStatus(status.as_u16()));
        }

        let players: Vec<RawPlayerRecord> = response
            .json()
            .await
            .map_err(|e| LobbyError::Fetch(e.to_string()))?;
        debug!(count = players.len(), "stats source: players received");
        Ok(players)
    }
}
