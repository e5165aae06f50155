use serde::Serialize;

use crate::{export, types::Report};

/// Reports gathered across several extractions for a combined export.
///
/// Owned by the caller (the web state or a batch run); extraction itself never touches it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchCollection {
    reports: Vec<Report>,
}

impl MatchCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a report and returns the new collection size.
    pub fn add(&mut self, report: Report) -> usize {
        self.reports.push(report);
        self.reports.len()
    }

    pub fn clear(&mut self) {
        self.reports.clear();
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Title for a match the user did not name, e.g. "Match 3".
    pub fn next_default_title(&self) -> String {
        format!("Match {}", self.reports.len() + 1)
    }

    pub fn to_csv(&self) -> anyhow::Result<String> {
        export::to_csv_string(&self.reports)
    }
}
