//! Roster projection: canonical player list + view options → rows on screen.
//!
//! Every function here is pure. The pipeline order is fixed:
//!
//! 1. [`filter`] by rank ceiling,
//! 2. [`sort`] by the selected key (stable),
//! 3. [`paginate`] to a window of [`PAGE_SIZE`] rows.
//!
//! [`project`] runs all three.

use std::cmp::Ordering;
use std::ops::Range;

use crate::protocol::PlayerRecord;

/// Rows shown per statistics page.
pub const PAGE_SIZE: usize = 10;

/// Rank ceilings offered as filter presets.
pub const RANK_PRESETS: [i64; 4] = [10, 20, 30, 50];

/// Inclusive upper bound on ranking position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankCeiling {
    #[default]
    Unbounded,
    AtMost(i64),
}

impl RankCeiling {
    /// Whether a player at `position` passes this ceiling.
    ///
    /// Players without a reported position only pass [`RankCeiling::Unbounded`].
    pub fn admits(self, position: Option<i64>) -> bool {
        match (self, position) {
            (Self::Unbounded, _) => true,
            (Self::AtMost(limit), Some(position)) => position <= limit,
            (Self::AtMost(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Name,
    Rank,
    Wins,
    Draws,
    Losses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// View options selected in the statistics table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewOptions {
    pub rank_ceiling: RankCeiling,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
    pub page_index: usize,
}

/// Keep the players admitted by `ceiling`, preserving order.
pub fn filter(players: &[PlayerRecord], ceiling: RankCeiling) -> Vec<PlayerRecord> {
    players
        .iter()
        .filter(|player| ceiling.admits(player.ranking_position))
        .cloned()
        .collect()
}

/// Sort `players` in place by `key`.
///
/// `slice::sort_by` is a stable merge sort, so players with equal keys keep
/// their incoming order in both directions.
pub fn sort(players: &mut [PlayerRecord], key: SortKey, direction: SortDirection) {
    if key == SortKey::None {
        return;
    }
    players.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &PlayerRecord, b: &PlayerRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::None => Ordering::Equal,
        SortKey::Name => a.display_name.cmp(&b.display_name),
        SortKey::Rank => compare_rank(a.ranking_position, b.ranking_position),
        SortKey::Wins => a.wins.cmp(&b.wins),
        SortKey::Draws => a.draws.cmp(&b.draws),
        SortKey::Losses => a.losses.cmp(&b.losses),
    }
}

// Unranked players go after every ranked one.
fn compare_rank(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter then sort, without pagination.
pub fn arrange(players: &[PlayerRecord], options: &ViewOptions) -> Vec<PlayerRecord> {
    let mut arranged = filter(players, options.rank_ceiling);
    sort(&mut arranged, options.sort_key, options.sort_direction);
    arranged
}

/// Number of pages needed for `len` rows.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Index range of page `page_index`, clipped to `len`.
pub fn page_window(len: usize, page_index: usize) -> Range<usize> {
    let start = page_index.saturating_mul(PAGE_SIZE).min(len);
    let end = start.saturating_add(PAGE_SIZE).min(len);
    start..end
}

/// The slice of `items` shown on page `page_index`. Empty past the last page.
pub fn paginate<T>(items: &[T], page_index: usize) -> &[T] {
    items
        .get(page_window(items.len(), page_index))
        .unwrap_or_default()
}

/// Full pipeline: filter, sort, paginate.
pub fn project(players: &[PlayerRecord], options: &ViewOptions) -> Vec<PlayerRecord> {
    let arranged = arrange(players, options);
    paginate(&arranged, options.page_index).to_vec()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn ranked(id: i64, rank: i64) -> PlayerRecord {
        PlayerRecord {
            id,
            ranking_position: Some(rank),
            ..Default::default()
        }
    }

    fn named(id: i64, name: &str) -> PlayerRecord {
        PlayerRecord {
            id,
            display_name: name.into(),
            ..Default::default()
        }
    }

    fn with_record(id: i64, wins: i64, draws: i64, losses: i64) -> PlayerRecord {
        PlayerRecord {
            id,
            wins,
            draws,
            losses,
            ..Default::default()
        }
    }

    fn ids(players: &[PlayerRecord]) -> Vec<i64> {
        players.iter().map(|p| p.id).collect()
    }

    #[test]
    fn top_20_keeps_only_ranks_at_or_below_20() {
        let players = vec![ranked(1, 4), ranked(2, 55), ranked(3, 1), ranked(4, 15)];
        let kept = filter(&players, RankCeiling::AtMost(20));
        assert_eq!(ids(&kept), vec![1, 3, 4]);
    }

    #[test]
    fn ceiling_is_inclusive() {
        let players = vec![ranked(1, 10), ranked(2, 11)];
        assert_eq!(ids(&filter(&players, RankCeiling::AtMost(10))), vec![1]);
    }

    #[test]
    fn presets_count_matches_admitted_players() {
        let players: Vec<_> = (1..=60).map(|r| ranked(r, r)).collect();
        for preset in RANK_PRESETS {
            let kept = filter(&players, RankCeiling::AtMost(preset));
            let expected = players
                .iter()
                .filter(|p| p.ranking_position.unwrap() <= preset)
                .count();
            assert_eq!(kept.len(), expected);
        }
    }

    #[test]
    fn unranked_players_only_pass_unbounded() {
        let players = vec![PlayerRecord::default(), ranked(2, 3)];
        assert_eq!(ids(&filter(&players, RankCeiling::AtMost(50))), vec![2]);
        assert_eq!(filter(&players, RankCeiling::Unbounded).len(), 2);
    }

    #[test]
    fn name_sort_both_directions() {
        let mut players = vec![
            named(1, "username0"),
            named(2, "username2"),
            named(3, "username1"),
            named(4, "username3"),
        ];
        sort(&mut players, SortKey::Name, SortDirection::Ascending);
        assert_eq!(ids(&players), vec![1, 3, 2, 4]);
        sort(&mut players, SortKey::Name, SortDirection::Descending);
        assert_eq!(ids(&players), vec![4, 2, 3, 1]);
    }

    #[test]
    fn rank_sort_puts_unranked_last_ascending() {
        let mut players = vec![ranked(1, 3), PlayerRecord::default(), ranked(3, 1)];
        sort(&mut players, SortKey::Rank, SortDirection::Ascending);
        assert_eq!(ids(&players), vec![3, 1, 0]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let players = vec![
            with_record(1, 5, 0, 0),
            with_record(2, 1, 0, 0),
            with_record(3, 5, 0, 0),
            with_record(4, 1, 0, 0),
            with_record(5, 5, 0, 0),
        ];
        let mut up = players.clone();
        sort(&mut up, SortKey::Wins, SortDirection::Ascending);
        assert_eq!(ids(&up), vec![2, 4, 1, 3, 5]);

        let mut down = players;
        sort(&mut down, SortKey::Wins, SortDirection::Descending);
        assert_eq!(ids(&down), vec![1, 3, 5, 2, 4]);
    }

    #[test]
    fn draws_and_losses_sort_by_their_own_field() {
        let mut players = vec![
            with_record(1, 3, 0, 1),
            with_record(2, 5, 7, 5),
            with_record(3, 1, 3, 0),
            with_record(4, 5, 10, 100),
        ];
        sort(&mut players, SortKey::Draws, SortDirection::Descending);
        assert_eq!(ids(&players), vec![4, 2, 3, 1]);
        sort(&mut players, SortKey::Losses, SortDirection::Ascending);
        assert_eq!(ids(&players), vec![3, 1, 2, 4]);
    }

    #[test]
    fn sort_key_none_keeps_order() {
        let mut players = vec![ranked(1, 9), ranked(2, 1)];
        sort(&mut players, SortKey::None, SortDirection::Descending);
        assert_eq!(ids(&players), vec![1, 2]);
    }

    #[test]
    fn pages_are_disjoint_and_reconstruct_the_list() {
        let players: Vec<_> = (0..27).map(|i| ranked(i, 27 - i)).collect();
        let options = ViewOptions {
            sort_key: SortKey::Rank,
            ..Default::default()
        };
        let arranged = arrange(&players, &options);
        assert_eq!(page_count(arranged.len()), 3);

        let mut rebuilt = Vec::new();
        for page_index in 0..page_count(arranged.len()) {
            let page = project(&players, &ViewOptions { page_index, ..options });
            rebuilt.extend(page);
        }
        assert_eq!(rebuilt, arranged);
    }

    #[test]
    fn page_window_clips_to_length() {
        assert_eq!(page_window(14, 0), 0..10);
        assert_eq!(page_window(14, 1), 10..14);
        assert_eq!(page_window(14, 2), 14..14);
        assert!(paginate(&[1, 2, 3], 5).is_empty());
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(11), 2);
    }

    #[test]
    fn project_is_deterministic_and_idempotent() {
        let players = vec![ranked(1, 40), ranked(2, 3), ranked(3, 23), ranked(4, 52)];
        let options = ViewOptions {
            rank_ceiling: RankCeiling::AtMost(30),
            sort_key: SortKey::Rank,
            sort_direction: SortDirection::Descending,
            page_index: 0,
        };
        let once = project(&players, &options);
        assert_eq!(once, project(&players, &options));
        assert_eq!(project(&once, &options), once);
        assert_eq!(ids(&once), vec![3, 2]);
    }

    #[test]
    fn filter_top_50_sort_up_second_page_starts_at_45() {
        let ranks = [5, 40, 24, 31, 20, 3, 17, 43, 100, 28, 19, 70, 120, 45];
        let players: Vec<_> = ranks
            .iter()
            .enumerate()
            .map(|(i, r)| ranked(i as i64 + 1, *r))
            .collect();
        let options = ViewOptions {
            rank_ceiling: RankCeiling::AtMost(50),
            sort_key: SortKey::Rank,
            sort_direction: SortDirection::Ascending,
            page_index: 1,
        };
        let page = project(&players, &options);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].ranking_position, Some(45));
    }
}
