use scraper::ElementRef;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use crate::{
    config::HeaderSynonyms,
    document::{self, element_text, static_selector, Document},
    types::{Side, TableKind, TeamSource, Teams},
};

static TABLE: LazyLock<scraper::Selector> = LazyLock::new(|| static_selector("table"));

/// A table whose role is known but whose team is not yet.
#[derive(Debug, Clone)]
pub struct ClassifiedTable<'a> {
    pub element: ElementRef<'a>,
    /// Lower-cased labels of the header row that carries the kind's marker, used to
    /// resolve column positions.
    pub column_headers: Vec<String>,
    /// Text of the first header cell, as written.
    pub leading_header: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifiedTables<'a> {
    pub batting: Vec<ClassifiedTable<'a>>,
    pub bowling: Vec<ClassifiedTable<'a>>,
}

/// A classified table tied to the innings it records.
#[derive(Debug, Clone)]
pub struct ScorecardTable<'a> {
    pub kind: TableKind,
    pub element: ElementRef<'a>,
    pub column_headers: Vec<String>,
    pub batting_side: Side,
    pub bowling_side: Side,
    pub source: TeamSource,
}

/// Decides a table's role from its set of lower-cased header labels.
pub fn classify_headers(headers: &HashSet<String>, synonyms: &HeaderSynonyms) -> Option<TableKind> {
    if synonyms
        .batting_signature
        .iter()
        .all(|label| headers.contains(label))
    {
        Some(TableKind::Batting)
    } else if headers.contains(&synonyms.bowling_marker)
        && synonyms.wickets.iter().any(|label| headers.contains(label))
    {
        Some(TableKind::Bowling)
    } else {
        None
    }
}

/// Splits every table in the document into batting and bowling sequences, in document order.
pub fn classify<'a>(document: &'a Document, synonyms: &HeaderSynonyms) -> ClassifiedTables<'a> {
    let mut classified = ClassifiedTables::default();

    for (position, table) in document.select(&TABLE).enumerate() {
        let header_cells = document::header_cells(table);
        let labels: HashSet<String> = header_cells
            .iter()
            .map(|th| element_text(*th).to_lowercase())
            .collect();

        let Some(kind) = classify_headers(&labels, synonyms) else {
            debug!(position, "Ignoring table without a scorecard header signature");
            continue;
        };

        let marker = match kind {
            TableKind::Batting => synonyms.batting_marker(),
            TableKind::Bowling => synonyms.bowling_marker.as_str(),
        };
        let entry = ClassifiedTable {
            element: table,
            column_headers: column_headers(table, marker),
            leading_header: header_cells.first().map(|th| element_text(*th)),
        };

        match kind {
            TableKind::Batting => classified.batting.push(entry),
            TableKind::Bowling => classified.bowling.push(entry),
        }
    }

    debug!(
        batting = classified.batting.len(),
        bowling = classified.bowling.len(),
        "Classified scorecard tables"
    );
    classified
}

/// Header labels of the row containing `marker`; all header labels if no row does.
fn column_headers(table: ElementRef<'_>, marker: &str) -> Vec<String> {
    let lowered = |cells: Vec<ElementRef<'_>>| -> Vec<String> {
        cells
            .into_iter()
            .map(|th| element_text(th).to_lowercase())
            .collect()
    };

    document::rows(table)
        .into_iter()
        .map(|row| lowered(document::header_cells(row)))
        .find(|labels| labels.iter().any(|label| label == marker))
        .unwrap_or_else(|| lowered(document::header_cells(table)))
}

impl<'a> ClassifiedTables<'a> {
    /// Ties every table to an innings, batting tables first, each kind in document order.
    pub fn associate(self, teams: &Teams) -> Vec<ScorecardTable<'a>> {
        let batting = self
            .batting
            .into_iter()
            .enumerate()
            .map(|(i, table)| associate_table(TableKind::Batting, i, table, teams));
        let bowling = self
            .bowling
            .into_iter()
            .enumerate()
            .map(|(i, table)| associate_table(TableKind::Bowling, i, table, teams));

        batting.chain(bowling).collect()
    }
}

fn associate_table<'a>(
    kind: TableKind,
    position: usize,
    table: ClassifiedTable<'a>,
    teams: &Teams,
) -> ScorecardTable<'a> {
    let (batting_side, source) = match table
        .leading_header
        .as_deref()
        .and_then(|header| teams.named_in(header))
    {
        Some(side) => (side, TeamSource::Header),
        None => (alternating_batting_side(position), TeamSource::Alternation),
    };

    debug!(
        ?kind,
        position,
        ?source,
        batting = teams.name(batting_side),
        "Associated table with innings"
    );

    ScorecardTable {
        kind,
        element: table.element,
        column_headers: table.column_headers,
        batting_side,
        bowling_side: batting_side.opponent(),
        source,
    }
}

/// Fallback when a table does not name its team: innings alternate between the sides in
/// document order, so table `i` of either kind records the innings of side `i mod 2`.
pub fn alternating_batting_side(position: usize) -> Side {
    Side::from_parity(position)
}
