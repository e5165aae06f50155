use serde_json::Value;
use tracing::debug;

use crate::{
    config::ExtractionConfig,
    document::{element_text, raw_text, Document},
    error::ExtractionError,
    tables::ClassifiedTable,
    types::Teams,
    utils::strip_innings_suffix,
};

/// Resolves the two team names, first batting side first.
///
/// Embedded match metadata is preferred over innings labels. The order is then corrected
/// from the first batting table's header, or failing that from the first innings label.
pub fn resolve_teams(
    document: &Document,
    batting_tables: &[ClassifiedTable<'_>],
    config: &ExtractionConfig,
) -> Result<Teams, ExtractionError> {
    let labels = innings_labels(document, &config.innings_label_selector)?;

    let teams = match teams_from_metadata(document)? {
        Some(teams) => {
            debug!(first = teams.first(), second = teams.second(), "Teams from match metadata");
            teams
        }
        None => {
            let teams = teams_from_labels(&labels).ok_or(ExtractionError::TeamsNotDetected)?;
            debug!(first = teams.first(), second = teams.second(), "Teams from innings labels");
            teams
        }
    };

    Ok(order_by_first_innings(teams, batting_tables, &labels))
}

/// Looks for a schema.org `SportsEvent` with home and away teams in any JSON-LD block.
pub fn teams_from_metadata(document: &Document) -> Result<Option<Teams>, ExtractionError> {
    let scripts = document.find_with_attr("script", "type", "application/ld+json")?;

    for script in scripts {
        let Ok(data) = serde_json::from_str::<Value>(&raw_text(script)) else {
            debug!("Skipping unparseable JSON-LD block");
            continue;
        };

        if let Some(teams) = metadata_items(&data).into_iter().find_map(sports_event_teams) {
            return Ok(Some(teams));
        }
    }

    Ok(None)
}

fn metadata_items(data: &Value) -> Vec<&Value> {
    match data {
        Value::Array(items) => items.iter().flat_map(metadata_items).collect(),
        Value::Object(object) => match object.get("@graph") {
            Some(Value::Array(graph)) => graph.iter().collect(),
            _ => vec![data],
        },
        _ => Vec::new(),
    }
}

fn sports_event_teams(item: &Value) -> Option<Teams> {
    let is_event = match item.get("@type")? {
        Value::String(kind) => kind == "SportsEvent",
        Value::Array(kinds) => kinds.iter().any(|k| k.as_str() == Some("SportsEvent")),
        _ => false,
    };
    if !is_event {
        return None;
    }

    let home = item.get("homeTeam")?.get("name")?.as_str()?;
    let away = item.get("awayTeam")?.get("name")?.as_str()?;
    Teams::new(home, away).ok()
}

/// Distinct team names from the innings heading labels, in order of first appearance.
/// Labels differing only in case name the same team; the first spelling is kept.
pub fn innings_labels(document: &Document, selector: &str) -> Result<Vec<String>, ExtractionError> {
    let mut labels: Vec<String> = Vec::new();

    for element in document.select_css(selector)? {
        let label = strip_innings_suffix(&element_text(element));
        if !label.is_empty() && !labels.iter().any(|seen| seen.eq_ignore_ascii_case(&label)) {
            labels.push(label);
        }
    }

    Ok(labels)
}

fn teams_from_labels(labels: &[String]) -> Option<Teams> {
    match labels {
        [first, second, ..] => Teams::new(first, second).ok(),
        _ => None,
    }
}

fn order_by_first_innings(
    teams: Teams,
    batting_tables: &[ClassifiedTable<'_>],
    labels: &[String],
) -> Teams {
    let from_table = batting_tables
        .first()
        .and_then(|table| table.leading_header.as_deref())
        .and_then(|header| teams.named_in(header));
    let first_batting = from_table.or_else(|| labels.first().and_then(|label| teams.named_in(label)));

    match first_batting {
        Some(side) => teams.with_first(side),
        None => teams,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HeaderSynonyms, tables::classify};

    const LABEL: &str = r#"<span class="ds-text-title-xs ds-font-bold ds-capitalize">"#;

    fn resolve(html: &str) -> Result<Teams, ExtractionError> {
        let document = Document::parse(html)?;
        let config = ExtractionConfig::default();
        let tables = classify(&document, &HeaderSynonyms::default());
        resolve_teams(&document, &tables.batting, &config)
    }

    fn json_ld(body: &str) -> String {
        format!(r#"<script type="application/ld+json">{body}</script>"#)
    }

    #[test]
    fn test_metadata_graph() {
        let html = json_ld(
            r#"{"@context":"https://schema.org","@graph":[{"@type":"WebPage"},
               {"@type":"SportsEvent","homeTeam":{"name":" Sydney Sixers "},"awayTeam":{"name":"Perth Scorchers"}}]}"#,
        );
        let teams = resolve(&html).unwrap();
        assert_eq!(teams.first(), "Sydney Sixers");
        assert_eq!(teams.second(), "Perth Scorchers");
    }

    #[test]
    fn test_metadata_skips_broken_blocks_and_other_types() {
        let html = [
            json_ld("{ not json"),
            json_ld(r#"{"@type":"Organization","name":"Site"}"#),
            json_ld(
                r#"[{"@type":["Event","SportsEvent"],"homeTeam":{"name":"India"},"awayTeam":{"name":"Pakistan"}}]"#,
            ),
        ]
        .concat();
        let teams = resolve(&html).unwrap();
        assert_eq!((teams.first(), teams.second()), ("India", "Pakistan"));
    }

    #[test]
    fn test_innings_labels_fallback() {
        let html = format!(
            "{LABEL}England 1st Innings</span>{LABEL}Australia 1st Innings</span>\
             {LABEL}England 2nd Innings</span>{LABEL}Australia 2nd Innings</span>"
        );
        let teams = resolve(&html).unwrap();
        assert_eq!((teams.first(), teams.second()), ("England", "Australia"));
    }

    #[test]
    fn test_innings_labels_differing_in_case_are_one_team() {
        let html = format!(
            "{LABEL}India Innings</span>{LABEL}INDIA Innings</span>{LABEL}England Innings</span>\
             <table><tr><th>Batting</th><th>4s</th><th>6s</th></tr></table>\
             <table><tr><th>Batting</th><th>4s</th><th>6s</th></tr></table>"
        );
        let document = Document::parse(&html).unwrap();
        assert_eq!(
            innings_labels(&document, &ExtractionConfig::default().innings_label_selector).unwrap(),
            vec!["India", "England"]
        );
        let teams = resolve(&html).unwrap();
        assert_eq!((teams.first(), teams.second()), ("India", "England"));
    }

    #[test]
    fn test_first_batting_table_reorders_metadata_teams() {
        let html = json_ld(
            r#"{"@type":"SportsEvent","homeTeam":{"name":"Sydney Sixers"},"awayTeam":{"name":"Perth Scorchers"}}"#,
        ) + "<table><tr><th>Perth Scorchers Innings</th></tr>\
             <tr><th>Batting</th><th>4s</th><th>6s</th></tr></table>";
        let teams = resolve(&html).unwrap();
        assert_eq!(teams.first(), "Perth Scorchers");
    }

    #[test]
    fn test_first_innings_label_reorders_metadata_teams() {
        let html = json_ld(
            r#"{"@type":"SportsEvent","homeTeam":{"name":"India"},"awayTeam":{"name":"England"}}"#,
        ) + &format!("{LABEL}England Innings</span>{LABEL}India Innings</span>");
        let teams = resolve(&html).unwrap();
        assert_eq!((teams.first(), teams.second()), ("England", "India"));
    }

    #[test]
    fn test_teams_not_detected() {
        assert_eq!(
            resolve("<html><body><p>No scorecard here</p></body></html>"),
            Err(ExtractionError::TeamsNotDetected)
        );
        let one_team = format!("{LABEL}India Innings</span>{LABEL}India Innings</span>");
        assert_eq!(resolve(&one_team), Err(ExtractionError::TeamsNotDetected));
        let same_names = json_ld(
            r#"{"@type":"SportsEvent","homeTeam":{"name":"India"},"awayTeam":{"name":"India"}}"#,
        );
        assert_eq!(resolve(&same_names), Err(ExtractionError::TeamsNotDetected));
    }
}
