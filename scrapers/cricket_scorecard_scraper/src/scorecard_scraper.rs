use tracing::info;

use crate::{
    batting::BattingAggregator,
    bowling::BowlingAggregator,
    config::{ExtractionConfig, ScraperConfig},
    document::Document,
    error::ExtractionError,
    summary,
    tables::{self, ScorecardTable},
    teams,
    types::{InningsTopBatters, MatchStatistics, Report, TableKind, TopBatters},
};

/// Runs the extraction pipeline. Holds only configuration, so one instance can serve any
/// number of independent calls.
#[derive(Debug, Clone, Default)]
pub struct ScorecardScraper {
    config: ExtractionConfig,
}

impl ScorecardScraper {
    pub fn new(config: &ScraperConfig) -> Self {
        Self::with_extraction_config(config.extraction.clone())
    }

    pub fn with_extraction_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts match statistics from one scorecard page.
    ///
    /// The title is `title_hint` when non-empty, else the page heading, else the configured
    /// default.
    pub fn extract(&self, raw_html: &str, title_hint: Option<&str>) -> Result<Report, ExtractionError> {
        let document = Document::parse(raw_html)?;

        let classified = tables::classify(&document, &self.config.headers);
        let teams = teams::resolve_teams(&document, &classified.batting, &self.config)?;
        let scorecard_tables = classified.associate(&teams);

        let mut batting = BattingAggregator::new(self.config.batting.clone());
        let mut bowling =
            BowlingAggregator::new(self.config.headers.clone(), self.config.bowling.clone());
        let mut innings_top_batters = Vec::new();
        for table in &scorecard_tables {
            if let Some(top) = self.aggregate(table, &mut batting, &mut bowling) {
                innings_top_batters.push(InningsTopBatters {
                    side: table.batting_side,
                    top,
                });
            }
        }

        let batting = batting.finish()?;
        let statistics = MatchStatistics {
            fours: batting.fours,
            sixes: batting.sixes,
            run_outs: batting.run_outs,
            top_batters: batting.top_batters,
            innings_top_batters,
            top_bowlers: bowling.finish(),
            highest_score: batting.highest_score,
        };

        let title = title_hint
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .map(str::to_string)
            .or_else(|| document.title())
            .unwrap_or_else(|| self.config.default_title.clone());

        info!(
            title = %title,
            first = teams.first(),
            second = teams.second(),
            tables = scorecard_tables.len(),
            "Extracted match statistics"
        );
        Ok(summary::build_report(title, teams, statistics))
    }

    /// Feeds one table to its aggregator; batting tables yield their own top scorers.
    fn aggregate(
        &self,
        table: &ScorecardTable<'_>,
        batting: &mut BattingAggregator,
        bowling: &mut BowlingAggregator,
    ) -> Option<TopBatters> {
        match table.kind {
            TableKind::Batting => Some(batting.add_table(table)),
            TableKind::Bowling => {
                bowling.add_table(table);
                None
            }
        }
    }
}

/// Extracts with the default configuration.
pub fn extract(raw_html: &str, title_hint: Option<&str>) -> Result<Report, ExtractionError> {
    ScorecardScraper::default().extract(raw_html, title_hint)
}
