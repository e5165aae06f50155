//! Thin adapter over [`scraper::Html`] exposing the handful of queries the extractor needs.

use scraper::{html::Select, ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::{error::ExtractionError, utils::normalize_whitespace};

static ROW: LazyLock<Selector> = LazyLock::new(|| static_selector("tr"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| static_selector("td"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| static_selector("th"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| static_selector("h1"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| static_selector("title"));

pub(crate) fn static_selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("literal selector is valid")
}

/// A parsed scorecard page. Owned by a single extraction call.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses markup with html5ever's error recovery. Stray text parses into a document with
    /// no scorecard in it; only empty input is rejected.
    pub fn parse(raw: &str) -> Result<Self, ExtractionError> {
        if raw.trim().is_empty() {
            return Err(ExtractionError::MalformedDocument("input is empty".to_string()));
        }

        let html = Html::parse_document(raw);
        if !html.errors.is_empty() {
            debug!(recovered = html.errors.len(), "Recovered from markup errors");
        }

        Ok(Self { html })
    }

    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// Depth-first selection with a selector expression supplied at runtime.
    pub fn select_css(&self, css: &str) -> Result<Vec<ElementRef<'_>>, ExtractionError> {
        let selector = Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.html.select(&selector).collect())
    }

    /// Elements named `tag` whose attribute `attr` equals `value` exactly.
    pub fn find_with_attr(
        &self,
        tag: &str,
        attr: &str,
        value: &str,
    ) -> Result<Vec<ElementRef<'_>>, ExtractionError> {
        Ok(self
            .select_css(tag)?
            .into_iter()
            .filter(|el| el.value().attr(attr) == Some(value))
            .collect())
    }

    /// The page heading, falling back to the `<title>` element.
    pub fn title(&self) -> Option<String> {
        [&*HEADING, &*TITLE].into_iter().find_map(|selector| {
            self.html
                .select(selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
    }
}

/// Concatenated text of an element with whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

/// Raw (unnormalized) text content, for blocks such as embedded JSON.
pub fn raw_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Nearest enclosing `table`, not counting the element itself.
fn enclosing_table(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "table")
}

/// Descendants matching `selector` that belong to the same table as `element`; parts of
/// tables nested inside it are left to those tables.
fn own_descendants<'a>(element: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let scope = if element.value().name() == "table" {
        Some(element)
    } else {
        enclosing_table(element)
    };

    element
        .select(selector)
        .filter(|descendant| enclosing_table(*descendant) == scope)
        .collect()
}

pub fn rows(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    own_descendants(element, &ROW)
}

pub fn cells(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    own_descendants(element, &DATA_CELL)
}

pub fn header_cells(element: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    own_descendants(element, &HEADER_CELL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_empty_input() {
        assert!(matches!(
            Document::parse("   \n"),
            Err(ExtractionError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_parse_accepts_stray_text() {
        let document = Document::parse("India Innings vs England Innings, pasted as text").unwrap();
        assert!(document.select_css("table").unwrap().is_empty());
        assert_eq!(document.title(), None);
    }

    #[test]
    fn test_rows_and_cells_stay_within_their_table() {
        let document = Document::parse(
            "<table><tr><td>layout</td><td>\
               <table><tr><th>Batting</th></tr><tr><td>Rohit</td><td>45</td></tr></table>\
             </td></tr></table>",
        )
        .unwrap();
        let tables = document.select_css("table").unwrap();
        assert_eq!(tables.len(), 2);
        let (outer, inner) = (tables[0], tables[1]);

        assert_eq!(rows(outer).len(), 1);
        assert!(header_cells(outer).is_empty());
        assert_eq!(cells(rows(outer)[0]).len(), 2);

        assert_eq!(rows(inner).len(), 2);
        assert_eq!(header_cells(inner).len(), 1);
        let inner_cells: Vec<String> = cells(rows(inner)[1]).into_iter().map(element_text).collect();
        assert_eq!(inner_cells, vec!["Rohit", "45"]);
    }

    #[test]
    fn test_parse_recovers_from_unclosed_tags() {
        let document =
            Document::parse("<table><tr><th>Batting<td>Rohit <b>Sharma</table><p>stray").unwrap();
        let tables = document.select_css("table").unwrap();
        assert_eq!(tables.len(), 1);
        let row_cells = cells(tables[0]);
        assert_eq!(row_cells.len(), 1);
        assert_eq!(element_text(row_cells[0]), "Rohit Sharma");
        assert_eq!(header_cells(tables[0]).len(), 1);
        assert_eq!(rows(tables[0]).len(), 1);
    }

    #[test]
    fn test_select_css_reports_invalid_selector() {
        let document = Document::parse("<p>x</p>").unwrap();
        assert!(matches!(
            document.select_css("span[["),
            Err(ExtractionError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_find_with_attr() {
        let document = Document::parse(
            r#"<script type="application/ld+json">{}</script><script>var x = 1;</script>"#,
        )
        .unwrap();
        let scripts = document
            .find_with_attr("script", "type", "application/ld+json")
            .unwrap();
        assert_eq!(scripts.len(), 1);
        assert_eq!(raw_text(scripts[0]), "{}");
    }

    #[test]
    fn test_title_prefers_heading() {
        let document = Document::parse(
            "<html><head><title>Scorecard | Site</title></head><body><h1> MI  vs CSK </h1></body></html>",
        )
        .unwrap();
        assert_eq!(document.title().as_deref(), Some("MI vs CSK"));

        let document = Document::parse("<title>Scorecard</title><h1> </h1>").unwrap();
        assert_eq!(document.title().as_deref(), Some("Scorecard"));
    }

    #[test]
    fn test_element_text_normalizes_whitespace() {
        let document = Document::parse("<div>  Josh&nbsp;Inglis \n <span>†</span> </div>").unwrap();
        let div = document.select_css("div").unwrap()[0];
        assert_eq!(element_text(div), "Josh Inglis †");
    }
}
