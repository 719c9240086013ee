//! Text and JSON rendering of location records and income equivalence.

use crate::equivalence::{Equivalence, EquivalenceMethod};
use crate::location::{LocationKind, NameTables};
use crate::model::{ExpenseCategory, FamilyConfig, LocationRecord};
use serde::Serialize;
use std::collections::BTreeSet;

const DATA_SOURCE: &str = "Data source: MIT Living Wage Calculator (https://livingwage.mit.edu)";
const CATEGORY_WIDTH: usize = 20;
const DIFF_WIDTH: usize = 10;

/// `$1,234`, rounded to whole dollars; negatives as `-$1,234`.
pub fn format_dollar(value: f64) -> String {
    let whole = value.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && whole > 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// `+12.3%` for increases, `-4.5%` otherwise.
pub fn format_pct(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.1}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

/// Percentage change from `a` to `b`; absent when `a` is zero.
pub fn pct_diff(a: f64, b: f64) -> Option<f64> {
    if a == 0.0 {
        None
    } else {
        Some((b - a) / a * 100.0)
    }
}

/// One income translation from the reference location to another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquivalenceRow {
    pub from: String,
    pub to: String,
    pub income: f64,
    pub equivalent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<f64>,
}

/// Equivalent incomes from the first record to each of the others.
///
/// Empty when the first record has no anchor for `family`; locations without
/// an anchor are skipped.
pub fn equivalence_rows(
    records: &[LocationRecord],
    family: FamilyConfig,
    income: f64,
    method: EquivalenceMethod,
    excluded: &BTreeSet<ExpenseCategory>,
) -> Vec<EquivalenceRow> {
    let Some((reference, others)) = records.split_first() else {
        return Vec::new();
    };
    let Some(anchor_a) = reference.anchor(family).filter(|a| *a != 0.0) else {
        return Vec::new();
    };

    others
        .iter()
        .filter_map(|other| {
            let anchor_b = other.anchor(family).filter(|b| *b != 0.0)?;
            let equivalent = Equivalence::new(method)
                .with_family(family)
                .with_excluded(excluded.clone())
                .with_records(Some(reference), Some(other))
                .compute(income, anchor_a, anchor_b);
            Some(EquivalenceRow {
                from: reference.name.clone(),
                to: other.name.clone(),
                income,
                equivalent,
                pct_change: pct_diff(income, equivalent),
            })
        })
        .collect()
}

/// Machine-readable output for `--json`.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub family: FamilyConfig,
    pub family_label: &'static str,
    pub method: EquivalenceMethod,
    #[serde(skip_serializing_if = "is_empty_set")]
    pub excluded: &'a BTreeSet<ExpenseCategory>,
    pub locations: &'a [LocationRecord],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equivalence: Vec<EquivalenceRow>,
}

fn is_empty_set(set: &&BTreeSet<ExpenseCategory>) -> bool {
    set.is_empty()
}

fn active_categories(excluded: &BTreeSet<ExpenseCategory>) -> impl Iterator<Item = ExpenseCategory> + '_ {
    ExpenseCategory::ALL.into_iter().filter(move |c| !excluded.contains(c))
}

fn excluded_line(excluded: &BTreeSet<ExpenseCategory>) -> Option<String> {
    if excluded.is_empty() {
        return None;
    }
    let mut names: Vec<&str> = excluded.iter().map(|c| c.name()).collect();
    names.sort_unstable();
    Some(format!("Excluded:    {}\n", names.join(", ")))
}

/// Figures for a single location.
pub fn render_single(record: &LocationRecord, family: FamilyConfig, excluded: &BTreeSet<ExpenseCategory>) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("Living Wage Data: {}\n", record.name));
    out.push_str(&format!("{}\n", "=".repeat(50)));
    out.push_str(&format!("Family type: {}\n", family.label()));
    if let Some(line) = excluded_line(excluded) {
        out.push_str(&line);
    }
    out.push('\n');

    if let Some(w) = record.wage(family) {
        out.push_str(&format!("  Living Wage: ${:.2}/hr\n", w));
    }
    if let Some(v) = record.anchor(family) {
        out.push_str(&format!("  Required Annual Income (before tax): {}\n", format_dollar(v)));
    }
    if let Some(v) = record.income_after_tax.get(&family) {
        out.push_str(&format!("  Required Annual Income (after tax):  {}\n", format_dollar(*v)));
    }

    out.push('\n');
    out.push_str("  Annual Expenses:\n");
    for cat in active_categories(excluded) {
        if let Some(v) = record.expense(cat, family) {
            out.push_str(&format!("    {:<22} {}\n", cat.name(), format_dollar(v)));
        }
    }
    if let Some(v) = record.taxes.get(&family) {
        out.push_str(&format!("    {:<22} {}\n", "Taxes", format_dollar(*v)));
    }

    out.push('\n');
    out.push_str(DATA_SOURCE);
    out.push_str("\n\n");
    out
}

/// Side-by-side comparison; the first record is the reference.
pub fn render_comparison(
    records: &[LocationRecord],
    family: FamilyConfig,
    income: Option<f64>,
    method: EquivalenceMethod,
    excluded: &BTreeSet<ExpenseCategory>,
) -> String {
    let mut out = String::new();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();

    out.push('\n');
    out.push_str("Cost of Living Comparison\n");
    out.push_str(&format!("{}\n", "=".repeat(60)));
    out.push_str(&format!("{}\n", names.join("  vs  ")));
    out.push_str(&format!("Family type: {}\n", family.label()));
    if let Some(line) = excluded_line(excluded) {
        out.push_str(&line);
    }
    out.push('\n');

    if let Some(income) = income.filter(|_| records.len() >= 2) {
        let rows = equivalence_rows(records, family, income, method, excluded);
        if records[0].anchor(family).is_some_and(|a| a != 0.0) {
            out.push_str(&format!("INCOME EQUIVALENCE  [method: {}]\n", method.label()));
            out.push_str(&format!("{}\n", "-".repeat(60)));
            for row in &rows {
                let pct = match row.pct_change {
                    Some(p) if p != 0.0 => {
                        let direction = if p < 0.0 { "less" } else { "more" };
                        format!(" ({:.1}% {})", p.abs(), direction)
                    }
                    _ => String::new(),
                };
                out.push_str(&format!(
                    "  {} in {}  ~  {} in {}{}\n",
                    format_dollar(row.income),
                    row.from,
                    format_dollar(row.equivalent),
                    row.to,
                    pct,
                ));
            }
            out.push('\n');
        }
    }

    let value_width = names.iter().map(|n| n.chars().count() + 2).max().unwrap_or(0).max(14);
    let compare = records.len() >= 2;

    let mut header = format!("{:<w$}", "Category", w = CATEGORY_WIDTH);
    for name in &names {
        header.push_str(&format!("{:>w$}", name, w = value_width));
    }
    if compare {
        header.push_str(&format!("{:>w$}", "Diff", w = DIFF_WIDTH));
    }
    let rule = "\u{2500}".repeat(header.chars().count());

    out.push_str("Expense Breakdown (Annual):\n");
    out.push_str(&header);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for cat in active_categories(excluded) {
        let values: Vec<Option<f64>> = records.iter().map(|r| r.expense(cat, family)).collect();
        out.push_str(&value_row(cat.name(), &values, value_width, compare));
    }
    let taxes: Vec<Option<f64>> = records.iter().map(|r| r.taxes.get(&family).copied()).collect();
    out.push_str(&value_row("Taxes", &taxes, value_width, compare));

    out.push_str(&rule);
    out.push('\n');

    let totals: Vec<Option<f64>> = records.iter().map(|r| r.anchor(family)).collect();
    out.push_str(&value_row("Total (pre-tax)", &totals, value_width, compare));
    out.push('\n');

    let mut wage_row = format!("{:<w$}", "Living Wage", w = CATEGORY_WIDTH);
    for r in records {
        let cell = match r.wage(family) {
            Some(w) => format!("${:.2}/hr", w),
            None => "N/A".to_string(),
        };
        wage_row.push_str(&format!("{:>w$}", cell, w = value_width));
    }
    out.push_str(&wage_row);
    out.push('\n');

    out.push('\n');
    out.push_str(DATA_SOURCE);
    out.push_str("\n\n");
    out
}

fn value_row(label: &str, values: &[Option<f64>], width: usize, compare: bool) -> String {
    let mut row = format!("{:<w$}", label, w = CATEGORY_WIDTH);
    for v in values {
        let cell = v.map(format_dollar).unwrap_or_else(|| "N/A".to_string());
        row.push_str(&format!("{:>w$}", cell, w = width));
    }
    if compare {
        if let (Some(Some(a)), Some(Some(b))) = (values.first(), values.get(1)) {
            let diff = pct_diff(*a, *b).map(format_pct).unwrap_or_else(|| "N/A".to_string());
            row.push_str(&format!("{:>w$}", diff, w = DIFF_WIDTH));
        }
    }
    row.push('\n');
    row
}

/// Every known location, grouped by namespace and sorted by name.
pub fn render_location_list(tables: &NameTables) -> String {
    let mut out = String::new();
    for (i, kind) in LocationKind::ALL.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "\n{} (use with {} <code>):\n",
            kind.group_label(),
            kind.flag()
        ));
        out.push_str(&format!("{}\n", "-".repeat(60)));
        for (code, name) in tables.sorted_by_name(*kind) {
            out.push_str(&format!("  {}  {}\n", code, name));
        }
    }
    out.push('\n');
    out.push_str("Any county or metro can also be used by FIPS/CBSA code directly,\n");
    out.push_str("even if not listed above. Find codes at https://livingwage.mit.edu\n\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FamilyValues;

    fn record(name: &str, anchor: f64, housing: f64, wage: f64) -> LocationRecord {
        let f = FamilyConfig::One0;
        let mut r = LocationRecord { name: name.into(), ..Default::default() };
        r.income_before_tax.insert(f, anchor);
        r.taxes.insert(f, anchor * 0.1);
        r.wages.insert(f, wage);
        r.expenses.insert(ExpenseCategory::Housing, FamilyValues::from([(f, housing)]));
        r.expenses.insert(ExpenseCategory::Food, FamilyValues::from([(f, 4000.0)]));
        r
    }

    #[test]
    fn test_format_dollar() {
        assert_eq!(format_dollar(0.0), "$0");
        assert_eq!(format_dollar(999.4), "$999");
        assert_eq!(format_dollar(1234.56), "$1,235");
        assert_eq!(format_dollar(1_234_567.0), "$1,234,567");
        assert_eq!(format_dollar(-48245.0), "-$48,245");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(12.345), "+12.3%");
        assert_eq!(format_pct(-4.5), "-4.5%");
        assert_eq!(format_pct(0.0), "0.0%");
    }

    #[test]
    fn test_pct_diff() {
        assert_eq!(pct_diff(0.0, 10.0), None);
        assert_eq!(pct_diff(100.0, 150.0), Some(50.0));
    }

    #[test]
    fn test_equivalence_rows() {
        let records = vec![record("A", 40000.0, 15000.0, 19.0), record("B", 60000.0, 30000.0, 28.0)];
        let rows = equivalence_rows(&records, FamilyConfig::One0, 80000.0, EquivalenceMethod::Sqrt, &BTreeSet::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].to, "B");
        assert!((rows[0].equivalent - 108989.8).abs() < 0.1);
        assert!(rows[0].pct_change.unwrap() > 36.0);
    }

    #[test]
    fn test_equivalence_rows_need_reference_anchor() {
        let mut a = record("A", 40000.0, 15000.0, 19.0);
        a.income_before_tax.clear();
        let records = vec![a, record("B", 60000.0, 30000.0, 28.0)];
        let rows = equivalence_rows(&records, FamilyConfig::One0, 80000.0, EquivalenceMethod::Sqrt, &BTreeSet::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_render_comparison() {
        let mut b = record("B", 60000.0, 30000.0, 28.0);
        b.expenses.remove(&ExpenseCategory::Food);
        let records = vec![record("A", 40000.0, 15000.0, 19.0), b];
        let text = render_comparison(
            &records,
            FamilyConfig::One0,
            Some(80000.0),
            EquivalenceMethod::Sqrt,
            &BTreeSet::new(),
        );
        assert!(text.contains("A  vs  B"));
        assert!(text.contains("INCOME EQUIVALENCE  [method: Blended Square Root]"));
        assert!(text.contains("$80,000 in A  ~  $108,990 in B (36.2% more)"));
        assert!(text.contains("+100.0%"));
        assert!(text.contains("N/A"));
        assert!(text.contains("$19.00/hr"));
    }

    #[test]
    fn test_render_comparison_excluded() {
        let records = vec![record("A", 40000.0, 15000.0, 19.0), record("B", 60000.0, 30000.0, 28.0)];
        let excluded = BTreeSet::from([ExpenseCategory::Housing]);
        let text = render_comparison(&records, FamilyConfig::One0, None, EquivalenceMethod::Sqrt, &excluded);
        assert!(text.contains("Excluded:    Housing"));
        assert!(!text.contains("INCOME EQUIVALENCE"));
        assert!(!text.lines().any(|l| l.starts_with("Housing")));
    }

    #[test]
    fn test_render_single() {
        let text = render_single(&record("Austin", 48245.0, 15604.0, 23.19), FamilyConfig::One0, &BTreeSet::new());
        assert!(text.contains("Living Wage Data: Austin"));
        assert!(text.contains("Living Wage: $23.19/hr"));
        assert!(text.contains("(before tax): $48,245"));
        assert!(text.contains("Housing"));
        assert!(!text.contains("(after tax)"));
    }

    #[test]
    fn test_render_location_list() {
        let mut tables = NameTables::default();
        tables.metros.insert("12060".into(), "Atlanta-Sandy Springs-Alpharetta, GA".into());
        tables.states.insert("48".into(), "Texas".into());
        let text = render_location_list(&tables);
        assert!(text.contains("Metro Areas (use with --metros <code>):"));
        assert!(text.contains("  12060  Atlanta-Sandy Springs-Alpharetta, GA"));
        assert!(text.contains("Counties (use with --counties <code>):"));
        assert!(text.contains("  48  Texas"));
    }

    #[test]
    fn test_json_report() {
        let records = vec![record("A", 40000.0, 15000.0, 19.0)];
        let excluded = BTreeSet::new();
        let report = JsonReport {
            family: FamilyConfig::One0,
            family_label: FamilyConfig::One0.label(),
            method: EquivalenceMethod::LogLinear,
            excluded: &excluded,
            locations: &records,
            equivalence: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["family"], "1a0c");
        assert_eq!(json["method"], "log-linear");
        assert!(json.get("excluded").is_none());
        assert_eq!(json["locations"][0]["name"], "A");
    }
}
