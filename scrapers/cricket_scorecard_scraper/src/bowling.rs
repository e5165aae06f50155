use scraper::ElementRef;
use tracing::{debug, trace};

use crate::{
    config::{BowlingDefaults, HeaderSynonyms},
    document::{self, element_text},
    tables::ScorecardTable,
    types::{PerTeam, Side, TopBowlers},
    utils::{first_number, normalize_whitespace},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BowlerRow {
    pub name: String,
    pub wickets: u32,
    pub runs_conceded: u32,
}

/// Cell positions of the two figures that decide best bowling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BowlingColumns {
    pub runs_conceded: usize,
    pub wickets: usize,
}

impl BowlingColumns {
    /// Finds both columns by header label; layouts name them differently, so position is
    /// only the fallback.
    pub fn resolve(headers: &[String], synonyms: &HeaderSynonyms, defaults: &BowlingDefaults) -> Self {
        let find = |options: &[String], default: usize| {
            options
                .iter()
                .find_map(|option| headers.iter().position(|h| h == option))
                .unwrap_or(default)
        };

        Self {
            runs_conceded: find(&synonyms.runs_conceded, defaults.runs_conceded),
            wickets: find(&synonyms.wickets, defaults.wickets),
        }
    }
}

/// Parses one bowling row, or `None` for summary rows and rows too short for the figures.
pub fn parse_bowler_row(row: ElementRef<'_>, columns: BowlingColumns) -> Option<BowlerRow> {
    let texts: Vec<String> = document::cells(row).into_iter().map(element_text).collect();
    if texts.len() <= columns.runs_conceded.max(columns.wickets) {
        return None;
    }

    let name = normalize_whitespace(texts[0].split('(').next().unwrap_or_default());
    let lowered = name.to_lowercase();
    if name.is_empty() || lowered.starts_with("extras") || lowered.starts_with("total") {
        return None;
    }

    Some(BowlerRow {
        name,
        wickets: first_number(&texts[columns.wickets]),
        runs_conceded: first_number(&texts[columns.runs_conceded]),
    })
}

/// Best figure among `candidates`: most wickets, then fewest runs; exact ties share it.
pub fn best_bowling(candidates: &[BowlerRow]) -> TopBowlers {
    let Some(wickets) = candidates.iter().map(|b| b.wickets).max() else {
        return TopBowlers::NoWickets;
    };
    if wickets == 0 {
        return TopBowlers::NoWickets;
    }

    let runs_conceded = candidates
        .iter()
        .filter(|b| b.wickets == wickets)
        .map(|b| b.runs_conceded)
        .min()
        .unwrap_or(0);

    let mut names: Vec<String> = Vec::new();
    for bowler in candidates
        .iter()
        .filter(|b| b.wickets == wickets && b.runs_conceded == runs_conceded)
    {
        if !names.contains(&bowler.name) {
            names.push(bowler.name.clone());
        }
    }

    TopBowlers::Best {
        names,
        wickets,
        runs_conceded,
    }
}

/// Collects every bowling figure per bowling side.
#[derive(Debug, Clone, Default)]
pub struct BowlingAggregator {
    synonyms: HeaderSynonyms,
    defaults: BowlingDefaults,
    candidates: PerTeam<Vec<BowlerRow>>,
}

impl BowlingAggregator {
    pub fn new(synonyms: HeaderSynonyms, defaults: BowlingDefaults) -> Self {
        Self {
            synonyms,
            defaults,
            candidates: PerTeam::default(),
        }
    }

    pub fn add_table(&mut self, table: &ScorecardTable<'_>) {
        let columns = BowlingColumns::resolve(&table.column_headers, &self.synonyms, &self.defaults);
        let before = self.candidates[table.bowling_side].len();

        for row in document::rows(table.element) {
            match parse_bowler_row(row, columns) {
                Some(bowler) => self.record(table.bowling_side, bowler),
                None => trace!(row = %element_text(row), "Skipping non-bowler row"),
            }
        }

        debug!(
            bowling = ?table.bowling_side,
            ?columns,
            parsed = self.candidates[table.bowling_side].len() - before,
            "Aggregated bowling table"
        );
    }

    pub fn record(&mut self, bowling: Side, bowler: BowlerRow) {
        self.candidates[bowling].push(bowler);
    }

    pub fn candidates(&self, side: Side) -> &[BowlerRow] {
        &self.candidates[side]
    }

    pub fn finish(self) -> PerTeam<TopBowlers> {
        PerTeam::from_fn(|side| best_bowling(&self.candidates[side]))
    }
}
