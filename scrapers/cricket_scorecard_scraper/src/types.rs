use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::{error::ExtractionError, utils::strip_innings_suffix};

/// One of the two contesting teams, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::First, Side::Second];

    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Side for position `index` under strict alternation: even -> first, odd -> second.
    pub fn from_parity(index: usize) -> Self {
        if index % 2 == 0 {
            Side::First
        } else {
            Side::Second
        }
    }
}

/// The two team names of a match. Always distinct and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teams {
    first: String,
    second: String,
}

impl Teams {
    pub fn new(first: &str, second: &str) -> Result<Self, ExtractionError> {
        let first = first.trim();
        let second = second.trim();
        if first.is_empty() || second.is_empty() || first.eq_ignore_ascii_case(second) {
            return Err(ExtractionError::TeamsNotDetected);
        }

        Ok(Self {
            first: first.to_string(),
            second: second.to_string(),
        })
    }

    pub fn name(&self, side: Side) -> &str {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    /// Finds the team a header or label refers to.
    ///
    /// An exact (case-insensitive) match on the label with its innings suffix stripped wins;
    /// otherwise the longest team name contained in the label.
    pub fn named_in(&self, label: &str) -> Option<Side> {
        let stripped = strip_innings_suffix(label);
        if stripped.is_empty() {
            return None;
        }
        if let Some(side) = Side::BOTH
            .into_iter()
            .find(|&side| self.name(side).eq_ignore_ascii_case(&stripped))
        {
            return Some(side);
        }

        let lowered = stripped.to_lowercase();
        Side::BOTH
            .into_iter()
            .filter(|&side| lowered.contains(&self.name(side).to_lowercase()))
            .max_by_key(|&side| self.name(side).len())
    }

    /// Reorders so that `side` comes first.
    pub fn with_first(self, side: Side) -> Self {
        match side {
            Side::First => self,
            Side::Second => Self {
                first: self.second,
                second: self.first,
            },
        }
    }
}

/// A value for each team, addressed by [`Side`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTeam<T> {
    pub first: T,
    pub second: T,
}

impl<T> PerTeam<T> {
    pub fn new(first: T, second: T) -> Self {
        Self { first, second }
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            first: f(Side::First),
            second: f(Side::Second),
        }
    }
}

impl<T> Index<Side> for PerTeam<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::First => &self.first,
            Side::Second => &self.second,
        }
    }
}

impl<T> IndexMut<Side> for PerTeam<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Batting,
    Bowling,
}

/// How a table was tied to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSource {
    /// The table's leading header named the batting team.
    Header,
    /// Position in the table sequence, assuming innings strictly alternate.
    Alternation,
}

/// Players tied at a team's best batting score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopBatters {
    pub names: Vec<String>,
    pub runs: u32,
}

/// Top scorers of a single batting table, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsTopBatters {
    pub side: Side,
    pub top: TopBatters,
}

/// A team's best bowling figure, or the sentinel when it took no wickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TopBowlers {
    NoWickets,
    Best {
        names: Vec<String>,
        wickets: u32,
        runs_conceded: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestScore {
    pub name: String,
    pub runs: u32,
    pub side: Side,
}

/// Everything computed from one scorecard. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub fours: PerTeam<u32>,
    pub sixes: PerTeam<u32>,
    /// Credited to the bowling (fielding) side.
    pub run_outs: PerTeam<u32>,
    pub top_batters: PerTeam<TopBatters>,
    #[serde(default)]
    pub innings_top_batters: Vec<InningsTopBatters>,
    pub top_bowlers: PerTeam<TopBowlers>,
    pub highest_score: HighestScore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    pub label: String,
    pub value: String,
}

/// Result of one extraction: the statistics plus their rendered forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub teams: Teams,
    pub statistics: MatchStatistics,
    pub rows: Vec<StatRow>,
    pub lines: Vec<String>,
}

impl Report {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams() -> Teams {
        Teams::new("India", "India A").unwrap()
    }

    #[test]
    fn test_teams_must_be_distinct_and_non_empty() {
        assert_eq!(Teams::new("India", " india "), Err(ExtractionError::TeamsNotDetected));
        assert_eq!(Teams::new("", "Australia"), Err(ExtractionError::TeamsNotDetected));
        let teams = Teams::new("  India ", "Australia").unwrap();
        assert_eq!(teams.first(), "India");
    }

    #[test]
    fn test_named_in_prefers_exact_then_longest() {
        let teams = teams();
        assert_eq!(teams.named_in("India Innings"), Some(Side::First));
        assert_eq!(teams.named_in("INDIA A 1st Innings"), Some(Side::Second));
        assert_eq!(teams.named_in("India A (50 ovs maximum)"), Some(Side::Second));
        assert_eq!(teams.named_in("Batting"), None);
        assert_eq!(teams.named_in(""), None);
    }

    #[test]
    fn test_with_first_swaps() {
        let teams = teams().with_first(Side::Second);
        assert_eq!(teams.first(), "India A");
        assert_eq!(teams.second(), "India");
    }

    #[test]
    fn test_per_team_indexing() {
        let mut fours = PerTeam::<u32>::default();
        fours[Side::Second] += 3;
        assert_eq!(fours, PerTeam::new(0, 3));
        assert_eq!(Side::from_parity(2).opponent(), Side::Second);
        assert_eq!(PerTeam::from_fn(|side| side == Side::First), PerTeam::new(true, false));
    }
}
