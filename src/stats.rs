//! State machine for the player statistics table.
//!
//! The table owns the canonical roster and the selected [`ViewOptions`]. Every
//! mutation re-runs the [`projection`](crate::projection) pipeline, so the rows
//! on screen never drift from the options that produced them.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{Result, UnknownControl};
use crate::projection::{self, RankCeiling, SortDirection, SortKey, ViewOptions};
use crate::protocol::{PlayerRecord, RawPlayerRecord};
use crate::source::StatsSource;

/// Identifies one fetch started with [`StatisticsTable::begin_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRow {
    /// `"<id> <img src=\"<avatar>\" width=\"50\" height=\"50\"> <name> "`.
    /// The `src` attribute is left out when the player has no avatar.
    pub identity: String,
    /// Ranking position, empty when unranked.
    pub rank: String,
    /// `"<wins>/<draws>/<losses>"`
    pub summary: String,
}

impl StatsRow {
    pub fn render(player: &PlayerRecord) -> Self {
        Self {
            identity: identity_cell(player),
            rank: player
                .ranking_position
                .map(|rank| rank.to_string())
                .unwrap_or_default(),
            summary: format!("{}/{}/{}", player.wins, player.draws, player.losses),
        }
    }

    /// The three cells in column order.
    pub fn cells(&self) -> [&str; 3] {
        [&self.identity, &self.rank, &self.summary]
    }
}

fn identity_cell(player: &PlayerRecord) -> String {
    let src = if player.avatar_url.is_empty() {
        String::new()
    } else {
        format!("src=\"{}\" ", player.avatar_url)
    };
    format!(
        "{} <img {src}width=\"50\" height=\"50\"> {} ",
        player.id, player.display_name
    )
}

/// Column a sort control orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Rank,
    Wins,
    Draws,
    /// Labelled `lost` in control ids.
    Losses,
}

impl SortColumn {
    fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Rank => "rank",
            Self::Wins => "wins",
            Self::Draws => "draws",
            Self::Losses => "lost",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "name" => Some(Self::Name),
            "rank" => Some(Self::Rank),
            "wins" => Some(Self::Wins),
            "draws" => Some(Self::Draws),
            "lost" => Some(Self::Losses),
            _ => None,
        }
    }
}

impl From<SortColumn> for SortKey {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Name => Self::Name,
            SortColumn::Rank => Self::Rank,
            SortColumn::Wins => Self::Wins,
            SortColumn::Draws => Self::Draws,
            SortColumn::Losses => Self::Losses,
        }
    }
}

/// Actionable elements of the statistics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsControl {
    /// One of the rank filter presets, or `filter-by-all`.
    Filter(RankCeiling),
    Sort(SortColumn, SortDirection),
    NextPage,
    PreviousPage,
}

impl fmt::Display for StatsControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(RankCeiling::Unbounded) => f.write_str("filter-by-all"),
            Self::Filter(RankCeiling::AtMost(limit)) => write!(f, "filter-top-{limit}"),
            Self::Sort(column, direction) => {
                let dir = match direction {
                    SortDirection::Ascending => "up",
                    SortDirection::Descending => "down",
                };
                write!(f, "sort-{dir}-by-{}", column.label())
            }
            Self::NextPage => f.write_str("next-page"),
            Self::PreviousPage => f.write_str("previous-page"),
        }
    }
}

impl FromStr for StatsControl {
    type Err = UnknownControl;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let unknown = || UnknownControl(s.to_string());

        match s {
            "filter-by-all" => return Ok(Self::Filter(RankCeiling::Unbounded)),
            "next-page" => return Ok(Self::NextPage),
            "previous-page" => return Ok(Self::PreviousPage),
            _ => {}
        }

        if let Some(limit) = s.strip_prefix("filter-top-") {
            let limit: i64 = limit.parse().map_err(|_| unknown())?;
            if !projection::RANK_PRESETS.contains(&limit) {
                return Err(unknown());
            }
            return Ok(Self::Filter(RankCeiling::AtMost(limit)));
        }

        let (direction, field) = if let Some(field) = s.strip_prefix("sort-up-by-") {
            (SortDirection::Ascending, field)
        } else if let Some(field) = s.strip_prefix("sort-down-by-") {
            (SortDirection::Descending, field)
        } else {
            return Err(unknown());
        };
        let column = SortColumn::from_label(field).ok_or_else(unknown)?;
        Ok(Self::Sort(column, direction))
    }
}

/// The leaderboard view: roster, view options and the page on screen.
#[derive(Debug, Default)]
pub struct StatisticsTable {
    roster: Vec<PlayerRecord>,
    options: ViewOptions,
    /// Roster after filter and sort; the page is a window into it.
    arranged: Vec<PlayerRecord>,
    generation: u64,
    mounted: bool,
}

impl StatisticsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. Only the ticket of the most recent call stays valid.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation = self.generation.wrapping_add(1);
        self.mounted = true;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of the fetch identified by `ticket`.
    ///
    /// Returns `true` when the roster was replaced. Stale tickets and failed
    /// fetches leave the table untouched.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<RawPlayerRecord>>,
    ) -> bool {
        if !self.mounted || ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "stats: discarding stale fetch result"
            );
            return false;
        }

        match result {
            Ok(records) => {
                self.roster = records.into_iter().map(PlayerRecord::from).collect();
                self.options = ViewOptions::default();
                self.rearrange();
                debug!(players = self.roster.len(), "stats: roster loaded");
                true
            }
            Err(e) => {
                warn!("stats: fetch failed: {e}");
                false
            }
        }
    }

    /// Fetch the roster from `source` and apply it.
    pub async fn load<S: StatsSource + ?Sized>(&mut self, source: &S) -> bool {
        let ticket = self.begin_fetch();
        let result = source.fetch_players().await;
        self.complete_fetch(ticket, result)
    }

    /// Tear the view down. Results of fetches still in flight are discarded.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn roster(&self) -> &[PlayerRecord] {
        &self.roster
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn page_index(&self) -> usize {
        self.options.page_index
    }

    /// Pages available under the current filter.
    pub fn page_count(&self) -> usize {
        projection::page_count(self.arranged.len())
    }

    /// Players on the current page.
    pub fn visible(&self) -> &[PlayerRecord] {
        projection::paginate(&self.arranged, self.options.page_index)
    }

    pub fn rows(&self) -> Vec<StatsRow> {
        self.visible().iter().map(StatsRow::render).collect()
    }

    /// Apply a rank filter. The sort selection is kept; paging restarts.
    pub fn set_rank_ceiling(&mut self, ceiling: RankCeiling) {
        self.options.rank_ceiling = ceiling;
        self.options.page_index = 0;
        self.rearrange();
    }

    /// Apply a sort. The filter is kept; paging restarts.
    pub fn sort_by(&mut self, key: SortKey, direction: SortDirection) {
        self.options.sort_key = key;
        self.options.sort_direction = direction;
        self.options.page_index = 0;
        self.rearrange();
    }

    /// Returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        let next = self.options.page_index.saturating_add(1);
        if next >= self.page_count() {
            return false;
        }
        self.options.page_index = next;
        true
    }

    /// Returns `false` on the first page.
    pub fn previous_page(&mut self) -> bool {
        match self.options.page_index.checked_sub(1) {
            Some(previous) => {
                self.options.page_index = previous;
                true
            }
            None => false,
        }
    }

    /// Activate a UI control. Returns whether it had an effect.
    pub fn click(&mut self, control: StatsControl) -> bool {
        match control {
            StatsControl::Filter(ceiling) => {
                self.set_rank_ceiling(ceiling);
                true
            }
            StatsControl::Sort(column, direction) => {
                self.sort_by(column.into(), direction);
                true
            }
            StatsControl::NextPage => self.next_page(),
            StatsControl::PreviousPage => self.previous_page(),
        }
    }

    fn rearrange(&mut self) {
        self.arranged = projection::arrange(&self.roster, &self.options);
    }
}
