use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

/// Header labels that identify a table's role and its columns.
///
/// Layout variants of the scorecard page rename columns; a new variant is supported by
/// extending these lists rather than adding code paths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderSynonyms {
    /// Every label here must be present for a table to count as batting.
    pub batting_signature: Vec<String>,
    pub bowling_marker: String,
    pub wickets: Vec<String>,
    pub runs_conceded: Vec<String>,
}

impl Default for HeaderSynonyms {
    fn default() -> Self {
        Self {
            batting_signature: vec!["batting".to_string(), "4s".to_string(), "6s".to_string()],
            bowling_marker: "bowling".to_string(),
            wickets: ["w", "wk", "wkts", "wickets"].map(String::from).to_vec(),
            runs_conceded: ["r", "runs"].map(String::from).to_vec(),
        }
    }
}

impl HeaderSynonyms {
    /// The header that starts a batting header row.
    pub fn batting_marker(&self) -> &str {
        self.batting_signature
            .first()
            .map(String::as_str)
            .unwrap_or("batting")
    }
}

/// Fixed cell positions of the batting layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BattingColumns {
    /// Rows with fewer data cells are annotations (fall of wickets, extras), not batters.
    pub min_cells: usize,
    pub runs: usize,
    pub fours: usize,
    pub sixes: usize,
}

impl Default for BattingColumns {
    fn default() -> Self {
        Self {
            min_cells: 7,
            runs: 2,
            fours: 5,
            sixes: 6,
        }
    }
}

/// Positions used when a bowling table's headers name neither column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BowlingDefaults {
    pub runs_conceded: usize,
    pub wickets: usize,
}

impl Default for BowlingDefaults {
    fn default() -> Self {
        Self {
            runs_conceded: 3,
            wickets: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub innings_label_selector: String,
    pub headers: HeaderSynonyms,
    pub batting: BattingColumns,
    pub bowling: BowlingDefaults,
    pub default_title: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            innings_label_selector: "span.ds-text-title-xs.ds-font-bold.ds-capitalize".to_string(),
            headers: HeaderSynonyms::default(),
            batting: BattingColumns::default(),
            bowling: BowlingDefaults::default(),
            default_title: "Match Summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    /// Zero disables the cache.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 64 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: "parsed_html_output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScraperConfig {
    pub extraction: ExtractionConfig,
    pub web: WebConfig,
    pub cache: CacheConfig,
    pub export: ExportConfig,
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Loads a JSON config file; missing fields keep their defaults. Env overrides still apply.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(selector) = env::var("CRICKET_INNINGS_SELECTOR") {
            self.extraction.innings_label_selector = selector;
        }
        if let Ok(title) = env::var("CRICKET_DEFAULT_TITLE") {
            self.extraction.default_title = title;
        }
        if let Ok(host) = env::var("CRICKET_WEB_HOST") {
            self.web.host = host;
        }
        if let Some(port) = env::var("CRICKET_WEB_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.web.port = port;
        }
        if let Some(capacity) = env::var("CRICKET_CACHE_CAPACITY")
            .ok()
            .and_then(|c| c.parse::<usize>().ok())
        {
            self.cache.capacity = capacity;
        }
        if let Ok(dir) = env::var("CRICKET_OUTPUT_DIR") {
            self.export.output_dir = dir;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_synonyms_cover_known_layouts() {
        let headers = HeaderSynonyms::default();
        assert_eq!(headers.batting_marker(), "batting");
        assert!(headers.wickets.iter().any(|w| w == "wkts"));
        assert!(headers.runs_conceded.iter().any(|r| r == "runs"));
    }

    #[test]
    fn test_from_file_keeps_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"extraction": {{"headers": {{"wickets": ["w", "wkt"]}}}}, "cache": {{"capacity": 0}}}}"#
        )
        .unwrap();

        let config = ScraperConfig::from_file(file.path()).unwrap();
        assert_eq!(config.extraction.headers.wickets, vec!["w", "wkt"]);
        assert_eq!(config.extraction.headers.bowling_marker, "bowling");
        assert_eq!(config.extraction.batting, BattingColumns::default());
        assert_eq!(config.cache.capacity, 0);
        assert_eq!(config.web, WebConfig::default());
    }

    #[test]
    fn test_from_file_rejects_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(ScraperConfig::from_file(file.path()).is_err());
    }
}
