use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::{fs, io, path::Path};

use crate::types::Report;

pub const CSV_HEADER: [&str; 3] = ["Match", "Stat", "Value"];

/// Writes one `Match, Stat, Value` row per stat row of every report, in order.
pub fn write_csv<W: io::Write>(reports: &[Report], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for report in reports {
        for row in &report.rows {
            wtr.write_record([report.title.as_str(), row.label.as_str(), row.value.as_str()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(reports: &[Report]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(reports, &mut buffer).context("Failed to serialize reports as CSV")?;
    String::from_utf8(buffer).context("CSV output was not valid UTF-8")
}

pub fn write_csv_file(path: &Path, reports: &[Report]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(reports, file).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn default_export_filename(now: DateTime<Utc>) -> String {
    format!("cricket_matches_stats_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        summary::build_report,
        types::{HighestScore, MatchStatistics, PerTeam, Side, Teams, TopBatters, TopBowlers},
    };
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn report(title: &str) -> Report {
        let statistics = MatchStatistics {
            fours: PerTeam::new(4, 2),
            sixes: PerTeam::new(1, 0),
            run_outs: PerTeam::new(0, 2),
            top_batters: PerTeam::new(
                TopBatters { names: vec!["Kohli".to_string()], runs: 82 },
                TopBatters { names: vec!["Babar".to_string(), "Rizwan".to_string()], runs: 30 },
            ),
            innings_top_batters: Vec::new(),
            top_bowlers: PerTeam::new(TopBowlers::NoWickets, TopBowlers::NoWickets),
            highest_score: HighestScore { name: "Kohli".to_string(), runs: 82, side: Side::First },
        };
        build_report(title.to_string(), Teams::new("India", "Pakistan").unwrap(), statistics)
    }

    #[test]
    fn test_csv_rows_mirror_report_rows() {
        let reports = [report("Match 1"), report("Match 2")];
        let csv_text = to_csv_string(&reports).unwrap();

        let mut rdr = csv::Reader::from_reader(csv_text.as_bytes());
        assert_eq!(rdr.headers().unwrap(), CSV_HEADER.to_vec());
        let records: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();

        assert_eq!(records.len(), 12);
        assert_eq!(&records[0][0], "Match 1");
        assert_eq!(&records[0][2], "Kohli (82) – India");
        assert_eq!(&records[2][1], "Top Batter – Pakistan");
        assert_eq!(&records[2][2], "Babar, Rizwan (30)");
        assert_eq!(&records[11][0], "Match 2");
        assert_eq!(&records[11][2], "Pakistan 2 : 0 India");
    }

    #[test]
    fn test_write_csv_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_csv_file(&path, &[report("Final")]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Match,Stat,Value\n"));
        assert_eq!(written.lines().count(), 7);
    }

    #[test]
    fn test_default_export_filename() {
        let now = Utc.with_ymd_and_hms(2025, 2, 4, 19, 30, 5).unwrap();
        assert_eq!(default_export_filename(now), "cricket_matches_stats_20250204_193005.csv");
    }
}
