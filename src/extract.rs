//! Living wage record extraction from a heading-and-table document.
//!
//! Nothing here fails: every heuristic that misses leaves the corresponding
//! field empty and records a note, so a partly unreadable page still yields
//! whatever it does contain.
//!
//! Table columns are read positionally in the canonical family order. A
//! header row, when one can be read, is only used to warn about a reordered
//! table; it never changes which column feeds which family.

use crate::document::{Document, Table};
use crate::model::{ExpenseCategory, FamilyConfig, FamilyValues, LocationRecord};

/// Heading prefixes that introduce the location name.
const NAME_PREFIXES: &[&str] = &["Living Wage Calculation for ", "Living Wage Calculator for "];

pub const UNKNOWN_NAME: &str = "Unknown";

/// What an expense-table row can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTarget {
    Expense(ExpenseCategory),
    IncomeBeforeTax,
    Taxes,
    IncomeAfterTax,
}

const INCOME_TARGETS: [RowTarget; 3] = [
    RowTarget::IncomeBeforeTax,
    RowTarget::Taxes,
    RowTarget::IncomeAfterTax,
];

impl RowTarget {
    pub fn name(self) -> &'static str {
        match self {
            Self::Expense(cat) => cat.name(),
            Self::IncomeBeforeTax => "Required annual income before taxes",
            Self::Taxes => "Annual taxes",
            Self::IncomeAfterTax => "Required annual income after taxes",
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Expense(cat) => cat.aliases(),
            Self::IncomeBeforeTax => &[
                "required annual income before taxes",
                "annual income before taxes",
                "income before taxes",
            ],
            Self::Taxes => &["annual taxes", "taxes"],
            Self::IncomeAfterTax => &[
                "required annual income after taxes",
                "annual income after taxes",
                "income after taxes",
            ],
        }
    }
}

/// Parse a table cell such as `$1,234.56` or `−5`.
///
/// Returns `None` for blanks, a bare dash, and anything that is not a finite
/// decimal number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '¢' | '€' | '£' | '¥'))
        .map(|c| match c {
            '\u{2212}' | '\u{2013}' | '\u{2014}' => '-',
            other => other,
        })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn contains_either(label: &str, target: &str) -> bool {
    label.contains(target) || target.contains(label)
}

fn matches_alias(label: &str, target: RowTarget) -> bool {
    target.aliases().iter().any(|a| label.contains(a))
}

/// Fuzzy match of a row label against a target row name.
pub fn match_row_label(label: &str, target: RowTarget) -> bool {
    let label = label.trim().to_lowercase();
    let name = target.name().trim().to_lowercase();
    contains_either(&label, &name) || matches_alias(&label, target)
}

/// Classify an expense-table row label.
///
/// Categories are tried in canonical order, then the income rows in table
/// order; the first match wins. The bare "taxes" alias of the annual taxes
/// row therefore also takes "income after taxes" labels.
pub fn classify_row(label: &str) -> Option<RowTarget> {
    ExpenseCategory::ALL
        .iter()
        .map(|c| RowTarget::Expense(*c))
        .chain(INCOME_TARGETS)
        .find(|t| match_row_label(label, *t))
}

/// Build a location record from one document.
pub fn extract<D: Document + ?Sized>(doc: &D) -> LocationRecord {
    let mut record = LocationRecord::default();

    record.name = match name_from_headings(doc) {
        Some(name) => name,
        None => match name_from_title(doc) {
            Some(name) => {
                record.notes.push("location name taken from page title".into());
                name
            }
            None => {
                record.notes.push("location name not found".into());
                UNKNOWN_NAME.to_string()
            }
        },
    };

    match find_wage_table(doc.tables()) {
        Some(table) => {
            if check_column_order(&table.rows) == Some(false) {
                record.notes.push("wage table columns are not in the expected family order".into());
            }
            if let Some(row) = table
                .rows
                .iter()
                .find(|r| r.first().is_some_and(|c| c.to_lowercase().contains("living wage")))
            {
                record.wages = positional_values(&row[1..]);
            } else {
                record.notes.push("living wage row not found".into());
            }
        }
        None => record.notes.push("living wage table not found".into()),
    }

    match find_expense_table(doc.tables()) {
        Some(table) => {
            if check_column_order(&table.rows) == Some(false) {
                record.notes.push("expense table columns are not in the expected family order".into());
            }
            fill_expenses(&mut record, table);
        }
        None => record.notes.push("expense table not found".into()),
    }

    record
}

fn name_from_headings<D: Document + ?Sized>(doc: &D) -> Option<String> {
    doc.headings()
        .iter()
        .filter(|h| h.level == 2 || h.level == 3)
        .find_map(|h| {
            let text = h.text.trim();
            NAME_PREFIXES
                .iter()
                .find_map(|p| text.strip_prefix(p))
                .map(|rest| rest.trim().to_string())
        })
}

/// Text after the last standalone word "for" in the title.
fn name_from_title<D: Document + ?Sized>(doc: &D) -> Option<String> {
    let title = doc.title()?.trim();
    let lower = title.to_ascii_lowercase();
    lower
        .match_indices("for")
        .filter(|(i, _)| {
            let before = lower[..*i].chars().next_back();
            let after = lower[i + 3..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && after.is_some_and(char::is_whitespace)
        })
        .map(|(i, _)| title[i + 3..].trim())
        .filter(|rest| !rest.is_empty())
        .last()
        .map(str::to_string)
}

fn find_wage_table(tables: &[Table]) -> Option<&Table> {
    tables.iter().find(|t| {
        let text = t.text.to_lowercase();
        text.contains("living wage") && (text.contains("poverty wage") || text.contains("minimum wage"))
    })
}

fn find_expense_table(tables: &[Table]) -> Option<&Table> {
    tables.iter().find(|t| {
        let text = t.text.to_lowercase();
        let looks_right = text.contains("typical expenses")
            || (text.contains("food") && text.contains("housing") && text.contains("transportation"));
        looks_right && t.has_data_row()
    })
}

fn fill_expenses(record: &mut LocationRecord, table: &Table) {
    for row in &table.rows {
        if row.len() < 2 {
            continue;
        }
        let values = positional_values(&row[1..]);
        match classify_row(&row[0]) {
            Some(RowTarget::Expense(cat)) => {
                record.expenses.insert(cat, values);
            }
            Some(RowTarget::IncomeBeforeTax) => record.income_before_tax.extend(values),
            Some(RowTarget::Taxes) => record.taxes.extend(values),
            Some(RowTarget::IncomeAfterTax) => record.income_after_tax.extend(values),
            None => {}
        }
    }
}

/// Align cells to family configurations by position, skipping unparseable ones.
fn positional_values(cells: &[String]) -> FamilyValues {
    FamilyConfig::ALL
        .iter()
        .zip(cells)
        .filter_map(|(family, cell)| parse_amount(cell).map(|v| (*family, v)))
        .collect()
}

/// Compare header rows against the canonical family order.
///
/// `None` when no header row can be read, otherwise whether every readable
/// header agrees with the canonical order.
pub fn check_column_order(rows: &[Vec<String>]) -> Option<bool> {
    let mut verdict = None;
    for row in rows {
        if row.first().is_some_and(|c| parse_amount(c).is_some()) {
            continue;
        }

        let labelled: Vec<FamilyConfig> = row.iter().filter_map(|c| c.parse().ok()).collect();
        if labelled.len() == FamilyConfig::ALL.len() {
            let ok = labelled == FamilyConfig::ALL;
            verdict = Some(verdict.unwrap_or(true) && ok);
            continue;
        }

        let children: Vec<u32> = row
            .iter()
            .filter(|c| c.to_lowercase().contains("child"))
            .filter_map(|c| c.chars().find_map(|ch| ch.to_digit(10)))
            .collect();
        if children.len() == FamilyConfig::ALL.len() {
            let ok = FamilyConfig::ALL
                .iter()
                .zip(&children)
                .all(|(f, n)| u32::from(f.children()) == *n);
            verdict = Some(verdict.unwrap_or(true) && ok);
            continue;
        }

        let groups: Vec<u8> = row.iter().filter_map(|c| adult_group(c)).collect();
        if groups.len() == 3 {
            let ok = groups == [0, 1, 2];
            verdict = Some(verdict.unwrap_or(true) && ok);
        }
    }
    verdict
}

/// 0 for one adult, 1 for two adults with one working, 2 for both working.
fn adult_group(cell: &str) -> Option<u8> {
    let c = cell.to_lowercase();
    if !c.contains("adult") {
        None
    } else if c.contains("both") {
        Some(2)
    } else if c.contains("1 working") {
        Some(1)
    } else if c.contains("1 adult") {
        Some(0)
    } else {
        None
    }
}
