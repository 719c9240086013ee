//! Minimal document capability used by the extractor, plus an HTML backend.
//!
//! The extractor only needs headings, the title, and tables as rows of cell
//! text. Anything that can produce those can be extracted from.

use scraper::{ElementRef, Html, Selector};

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// 1 for `h1` through 6 for `h6`.
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// All text in the table, whitespace-collapsed.
    pub text: String,
    /// Rows with at least one cell, each cell's text trimmed.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from rows of cells; the flattened text is derived.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let text = rows
            .iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        Self { text, rows }
    }

    /// Whether any row carries a label plus at least one value.
    pub fn has_data_row(&self) -> bool {
        self.rows.iter().any(|r| r.len() > 1)
    }
}

/// Read-only view of a retrieved document.
pub trait Document {
    fn headings(&self) -> &[Heading];
    fn title(&self) -> Option<&str>;
    fn tables(&self) -> &[Table];
}

/// An HTML page reduced to the parts the extractor reads.
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    headings: Vec<Heading>,
    title: Option<String>,
    tables: Vec<Table>,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        let doc = Html::parse_document(html);

        let headings = select_all(&doc, "h1, h2, h3, h4, h5, h6")
            .into_iter()
            .map(|el| Heading {
                level: el.value().name()[1..].parse().unwrap_or(6),
                text: element_text(&el),
            })
            .collect();

        let title = select_all(&doc, "title")
            .first()
            .map(element_text)
            .filter(|t| !t.is_empty());

        let tables = select_all(&doc, "table")
            .into_iter()
            .map(|table| parse_table(&table))
            .collect();

        Self { headings, title, tables }
    }
}

impl Document for HtmlDocument {
    fn headings(&self) -> &[Heading] {
        &self.headings
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn tables(&self) -> &[Table] {
        &self.tables
    }
}

fn parse_table(table: &ElementRef<'_>) -> Table {
    let mut rows = Vec::new();
    if let (Ok(tr), Ok(cell)) = (Selector::parse("tr"), Selector::parse("td, th")) {
        for row in table.select(&tr) {
            let cells: Vec<String> = row.select(&cell).map(|c| element_text(&c)).collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
    }
    Table { text: element_text(table), rows }
}

fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(sel) => doc.select(&sel).collect(),
        Err(_) => Vec::new(),
    }
}

/// Concatenated text of an element with runs of whitespace collapsed.
fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
