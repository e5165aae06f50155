use scraper::ElementRef;
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::{
    config::BattingColumns,
    document::{self, element_text},
    error::ExtractionError,
    tables::ScorecardTable,
    types::{HighestScore, PerTeam, Side, TopBatters},
    utils::{clean_player_name, parse_count},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatterRow {
    pub name: String,
    pub runs: u32,
    pub fours: u32,
    pub sixes: u32,
    /// Full row text; layouts put the dismissal in different columns.
    pub dismissal: String,
}

impl BatterRow {
    pub fn is_run_out(&self) -> bool {
        self.dismissal.to_lowercase().contains("run out")
    }
}

/// Parses one batting row. Returns `None` for annotation rows and rows with a missing or
/// non-numeric figure; a batter is recorded completely or not at all.
pub fn parse_batter_row(row: ElementRef<'_>, columns: &BattingColumns) -> Option<BatterRow> {
    let texts: Vec<String> = document::cells(row).into_iter().map(element_text).collect();
    if texts.len() < columns.min_cells {
        return None;
    }

    let runs = parse_count(texts.get(columns.runs)?)?;
    let fours = parse_count(texts.get(columns.fours)?)?;
    let sixes = parse_count(texts.get(columns.sixes)?)?;

    Some(BatterRow {
        name: clean_player_name(&texts[0]),
        runs,
        fours,
        sixes,
        dismissal: texts.join(" "),
    })
}

/// Running set of names tied at the best score seen so far.
#[derive(Debug, Clone, Default)]
struct TopScorers {
    runs: Option<u32>,
    names: Vec<String>,
}

impl TopScorers {
    fn offer(&mut self, name: &str, runs: u32) {
        match self.runs {
            Some(best) if runs < best => {}
            Some(best) if runs == best => {
                if !self.names.iter().any(|n| n == name) {
                    self.names.push(name.to_string());
                }
            }
            _ => {
                self.runs = Some(runs);
                self.names = vec![name.to_string()];
            }
        }
    }

    fn into_top_batters(self) -> TopBatters {
        TopBatters {
            names: self.names,
            runs: self.runs.unwrap_or(0),
        }
    }
}

/// Per-player best innings across the whole extraction.
#[derive(Debug, Clone)]
struct PlayerBest {
    name: String,
    runs: u32,
    side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattingSummary {
    pub fours: PerTeam<u32>,
    pub sixes: PerTeam<u32>,
    pub run_outs: PerTeam<u32>,
    pub top_batters: PerTeam<TopBatters>,
    pub highest_score: HighestScore,
}

/// Accumulates batting figures for both teams across every batting table of a match.
#[derive(Debug, Clone, Default)]
pub struct BattingAggregator {
    columns: BattingColumns,
    fours: PerTeam<u32>,
    sixes: PerTeam<u32>,
    run_outs: PerTeam<u32>,
    top: PerTeam<TopScorers>,
    players: Vec<PlayerBest>,
    player_index: HashMap<String, usize>,
    rows_parsed: usize,
}

impl BattingAggregator {
    pub fn new(columns: BattingColumns) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Folds one batting table into the totals and returns that table's top scorers.
    pub fn add_table(&mut self, table: &ScorecardTable<'_>) -> TopBatters {
        let mut table_top = TopScorers::default();
        let mut parsed = 0;

        for row in document::rows(table.element) {
            let Some(batter) = parse_batter_row(row, &self.columns) else {
                trace!(row = %element_text(row), "Skipping non-batter row");
                continue;
            };
            table_top.offer(&batter.name, batter.runs);
            self.record(&batter, table.batting_side);
            parsed += 1;
        }

        debug!(
            batting = ?table.batting_side,
            parsed,
            "Aggregated batting table"
        );
        table_top.into_top_batters()
    }

    /// Records one parsed batter for `batting` side; run outs go to the opponent.
    pub fn record(&mut self, batter: &BatterRow, batting: Side) {
        self.fours[batting] += batter.fours;
        self.sixes[batting] += batter.sixes;
        if batter.is_run_out() {
            self.run_outs[batting.opponent()] += 1;
        }
        self.top[batting].offer(&batter.name, batter.runs);

        match self.player_index.get(&batter.name) {
            Some(&i) => {
                let best = &mut self.players[i];
                if batter.runs > best.runs {
                    best.runs = batter.runs;
                    best.side = batting;
                }
            }
            None => {
                self.player_index
                    .insert(batter.name.clone(), self.players.len());
                self.players.push(PlayerBest {
                    name: batter.name.clone(),
                    runs: batter.runs,
                    side: batting,
                });
            }
        }
        self.rows_parsed += 1;
    }

    pub fn finish(self) -> Result<BattingSummary, ExtractionError> {
        if self.rows_parsed == 0 {
            return Err(ExtractionError::NoBattingDataFound);
        }

        // First player seen wins a tie for the highest score.
        let highest = self
            .players
            .iter()
            .fold(None::<&PlayerBest>, |best, player| match best {
                Some(b) if b.runs >= player.runs => Some(b),
                _ => Some(player),
            })
            .ok_or(ExtractionError::NoBattingDataFound)?;

        let highest_score = HighestScore {
            name: highest.name.clone(),
            runs: highest.runs,
            side: highest.side,
        };
        let PerTeam { first, second } = self.top;

        Ok(BattingSummary {
            fours: self.fours,
            sixes: self.sixes,
            run_outs: self.run_outs,
            top_batters: PerTeam::new(first.into_top_batters(), second.into_top_batters()),
            highest_score,
        })
    }
}
