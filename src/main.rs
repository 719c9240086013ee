use clap::{ArgGroup, CommandFactory, Parser};
use col_compare::equivalence::EquivalenceMethod;
use col_compare::extract::extract;
use col_compare::location::{
    fetch_document, location_url, LocationDescriptor, LocationKind, LocationResolver, NameTables,
    DEFAULT_BASE_URL,
};
use col_compare::model::{ExpenseCategory, FamilyConfig, LocationRecord};
use col_compare::report::{self, JsonReport};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Compare cost of living between US locations using MIT Living Wage data.
///
/// Examples:
///   col-compare --search "New York" "Atlanta"
///   col-compare --search "New York" "Atlanta" --income 120000
///   col-compare --search "San Francisco" "Austin" --family 2a2w1c
///   col-compare --metros 35620 12060
///   col-compare --counties 06075 06037
///   col-compare --states 06 48
///   col-compare --list
#[derive(Parser)]
#[command(name = "col-compare", version, about, long_about = None)]
#[command(group(ArgGroup::new("locations").multiple(false)))]
struct Cli {
    /// Search for locations by name (e.g. "New York" "Atlanta").
    #[arg(long, num_args = 1.., value_name = "TERM", group = "locations")]
    search: Vec<String>,

    /// Metro areas by CBSA code (e.g. 35620 12060).
    #[arg(long, num_args = 1.., value_name = "CBSA", group = "locations")]
    metros: Vec<String>,

    /// Counties by FIPS code (e.g. 06075 06037).
    #[arg(long, num_args = 1.., value_name = "FIPS", group = "locations")]
    counties: Vec<String>,

    /// States by FIPS code (e.g. 06 48).
    #[arg(long, num_args = 1.., value_name = "FIPS", group = "locations")]
    states: Vec<String>,

    /// List all known metro areas, counties and states.
    #[arg(long, group = "locations")]
    list: bool,

    /// Family configuration, e.g. 1a0c (1 adult, 0 children) or 2a2w1c.
    #[arg(long, default_value = "1a0c", value_parser = parse_family)]
    family: FamilyConfig,

    /// Annual income in the first location for the equivalence calculation.
    #[arg(long, allow_hyphen_values = true)]
    income: Option<f64>,

    /// Income equivalence method: linear, sqrt (default), log-linear, engel.
    #[arg(long, default_value = "sqrt", value_parser = parse_method)]
    method: EquivalenceMethod,

    /// Expense categories to leave out of the comparison.
    #[arg(long, num_args = 1.., value_name = "CATEGORY", value_parser = parse_category)]
    exclude: Vec<ExpenseCategory>,

    /// Location database JSON file.
    #[arg(long, env = "COL_COMPARE_DB", value_name = "PATH")]
    database: Option<PathBuf>,

    /// Print records as JSON instead of tables.
    #[arg(long)]
    json: bool,

    /// Base URL of the living wage site.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

fn parse_family(s: &str) -> Result<FamilyConfig, String> {
    s.parse()
}

fn parse_method(s: &str) -> Result<EquivalenceMethod, String> {
    EquivalenceMethod::parse(s).ok_or_else(|| {
        format!("Unknown method '{}'. Use 'linear', 'sqrt', 'log-linear' or 'engel'.", s)
    })
}

fn parse_category(s: &str) -> Result<ExpenseCategory, String> {
    s.parse()
}

fn main() {
    let cli = Cli::parse();

    // ── Load name tables ────────────────────────────────────────

    let db_path = cli.database.clone().unwrap_or_else(NameTables::default_path);
    let tables = NameTables::load_from(&db_path).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.list {
        print!("{}", report::render_location_list(&tables));
        return;
    }

    // ── Resolve locations ───────────────────────────────────────

    let resolver = LocationResolver::new(&tables);
    let locations = resolve_locations(&cli, &resolver);
    if locations.is_empty() {
        let _ = Cli::command().print_help();
        return;
    }

    // ── Fetch and extract ───────────────────────────────────────

    let mut records: Vec<LocationRecord> = Vec::with_capacity(locations.len());
    for loc in &locations {
        let url = location_url(&cli.base_url, loc.kind, &loc.code);
        match fetch_document(&url) {
            Ok(doc) => {
                let record = extract(&doc);
                for note in &record.notes {
                    eprintln!("  Warning: {} ({} {}): {}", record.name, loc.kind, loc.code, note);
                }
                records.push(record);
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    if records.is_empty() {
        eprintln!("Error: No location data could be retrieved.");
        std::process::exit(1);
    }

    // ── Output ──────────────────────────────────────────────────

    let excluded: BTreeSet<ExpenseCategory> = cli.exclude.iter().copied().collect();

    if cli.json {
        let equivalence = match cli.income {
            Some(income) => report::equivalence_rows(&records, cli.family, income, cli.method, &excluded),
            None => Vec::new(),
        };
        let output = JsonReport {
            family: cli.family,
            family_label: cli.family.label(),
            method: cli.method,
            excluded: &excluded,
            locations: &records,
            equivalence,
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else if records.len() == 1 {
        print!("{}", report::render_single(&records[0], cli.family, &excluded));
    } else {
        print!(
            "{}",
            report::render_comparison(&records, cli.family, cli.income, cli.method, &excluded)
        );
    }
}

fn resolve_locations(cli: &Cli, resolver: &LocationResolver<'_>) -> Vec<LocationDescriptor> {
    // Search terms must all resolve; any failure ends the run.
    if !cli.search.is_empty() {
        return cli
            .search
            .iter()
            .map(|term| {
                resolver.resolve(term).unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                })
            })
            .collect();
    }

    let by_code = [
        (LocationKind::Metro, &cli.metros),
        (LocationKind::County, &cli.counties),
        (LocationKind::State, &cli.states),
    ];
    by_code
        .iter()
        .flat_map(|(kind, codes)| codes.iter().map(move |code| resolver.from_code(*kind, code)))
        .collect()
}
