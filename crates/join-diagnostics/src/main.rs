//! CLI entry point for join diagnostics.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use join_diagnostics::repair::{
    CaseMode, RepairOptions, preview_repairs, repair_columns, suggest_repairs,
};
use join_diagnostics::report::{ReportWriter, render};
use join_diagnostics::{
    AnalysisOptions, Cardinality, JoinAnalyzer, JoinType, KeySpec, ReportFormat, Table,
    TableSide, enforce_cardinality, explain, key_check,
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// CLI-compatible report format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// Human-readable summary
    Text,
    /// Markdown tables
    Markdown,
    /// Tab-separated section/metric/value rows
    Table,
    /// The full report as JSON
    Json,
}

impl From<CliFormat> for ReportFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Text => ReportFormat::Text,
            CliFormat::Markdown => ReportFormat::Markdown,
            CliFormat::Table => ReportFormat::DataTable,
            CliFormat::Json => ReportFormat::Json,
        }
    }
}

/// CLI-compatible join type enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliJoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl From<CliJoinType> for JoinType {
    fn from(cli: CliJoinType) -> Self {
        match cli {
            CliJoinType::Inner => JoinType::Inner,
            CliJoinType::Left => JoinType::Left,
            CliJoinType::Right => JoinType::Right,
            CliJoinType::Full => JoinType::Full,
        }
    }
}

/// CLI-compatible case folding enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCase {
    Lower,
    Upper,
}

impl From<CliCase> for CaseMode {
    fn from(cli: CliCase) -> Self {
        match cli {
            CliCase::Lower => CaseMode::Lower,
            CliCase::Upper => CaseMode::Upper,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Explain a join before running it",
    long_about = "Pre-join diagnostics for two CSV tables: key summaries, match rates,\n\
                  expected row counts per join type, cardinality, key quality issues\n\
                  and Cartesian-explosion risk.\n\n\
                  EXAMPLES:\n  \
                  # Diagnose a join on a shared column\n  \
                  join-diagnostics analyze orders.csv customers.csv --by customer_id\n\n  \
                  # Different column names, markdown output\n  \
                  join-diagnostics analyze orders.csv customers.csv --by cust_id=id --format markdown\n\n  \
                  # Fail unless every order has at most one customer\n  \
                  join-diagnostics analyze orders.csv customers.csv --by cust_id=id --strict m:1\n\n  \
                  # Trim and lowercase key columns\n  \
                  join-diagnostics repair orders.csv --columns cust_id --trim --case lower -o fixed.csv"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the result)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full diagnostic report for a join of two tables
    Analyze(AnalyzeArgs),
    /// Pass/fail check of the key columns; exits non-zero on failure
    Check(JoinArgs),
    /// Clean key columns of one table and write the result as CSV
    Repair(RepairArgs),
    /// Explain why a join returns the number of rows it does
    Explain(ExplainArgs),
}

/// Inputs shared by every two-table command.
#[derive(Args, Debug)]
struct JoinArgs {
    /// Left (x) table as CSV
    x: PathBuf,

    /// Right (y) table as CSV
    y: PathBuf,

    /// Key columns: "id,date" or "cust_id=id,region=region"
    #[arg(short, long)]
    by: String,

    /// Analyze a random sample of this many rows from each table
    #[arg(long)]
    sample_size: Option<usize>,

    /// Seed for sampling (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Expansion factor above which a Cartesian risk is reported
    #[arg(long)]
    cartesian_threshold: Option<f64>,

    /// Skip the Cartesian-risk estimate
    #[arg(long)]
    no_cartesian: bool,

    /// Maximum edit distance for near-match suggestions
    #[arg(long)]
    near_match_distance: Option<usize>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    join: JoinArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: CliFormat,

    /// Fail unless the keys satisfy this relationship (1:1, 1:m, m:1, m:m)
    #[arg(long)]
    strict: Option<String>,

    /// Write a JSON report record to the output directory
    ///
    /// The report will be saved as <x_name>_<y_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Output directory for emitted reports
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct RepairArgs {
    /// Table to repair as CSV
    input: PathBuf,

    /// Comma-separated key columns to repair
    #[arg(short, long)]
    columns: String,

    /// Trim leading and trailing whitespace
    #[arg(long)]
    trim: bool,

    /// Remove zero-width characters and normalize non-breaking spaces
    #[arg(long)]
    invisible: bool,

    /// Fold key values to one case
    #[arg(long, value_enum)]
    case: Option<CliCase>,

    /// Treat empty strings as missing
    #[arg(long)]
    empty_to_missing: bool,

    /// Apply every repair (lowercase unless --case is given)
    #[arg(long)]
    all: bool,

    /// Derive repairs from a diagnostic run against this table
    ///
    /// The input is treated as x; requires --by
    #[arg(long, requires = "by")]
    against: Option<PathBuf>,

    /// Key specification used with --against
    #[arg(long)]
    by: Option<String>,

    /// Print what would change without writing a file
    #[arg(long)]
    dry_run: bool,

    /// Output CSV path (defaults to <input>_repaired.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    /// Left (x) table as CSV
    x: PathBuf,

    /// Right (y) table as CSV
    y: PathBuf,

    /// Key columns: "id,date" or "cust_id=id,region=region"
    #[arg(short, long)]
    by: String,

    /// Join type to explain
    #[arg(long = "how", value_enum, default_value = "left")]
    join_type: CliJoinType,

    /// Observed result size, compared with the prediction
    #[arg(long)]
    actual_rows: Option<u64>,

    /// Output JSON instead of a human-readable explanation
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn wants_json(command: &Command) -> bool {
    match command {
        Command::Analyze(args) => matches!(args.format, CliFormat::Json),
        Command::Explain(args) => args.json,
        Command::Check(_) | Command::Repair(_) => false,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, wants_json(&cli.command));

    dotenv().ok();

    match &cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Check(args) => run_check(args),
        Command::Repair(args) => run_repair(args),
        Command::Explain(args) => run_explain(args),
    }
}

fn build_options(args: &JoinArgs) -> Result<AnalysisOptions> {
    let mut builder = AnalysisOptions::builder().check_cartesian(!args.no_cartesian);
    if let Some(size) = args.sample_size {
        builder = builder.sample_size(size);
    }
    if let Some(seed) = args.seed {
        builder = builder.sample_seed(seed);
    }
    if let Some(threshold) = args.cartesian_threshold {
        builder = builder.cartesian_threshold(threshold);
    }
    if let Some(distance) = args.near_match_distance {
        builder = builder.near_match_max_distance(distance);
    }
    builder.build().map_err(|e| anyhow!("Invalid options: {}", e))
}

fn load_pair(x: &Path, y: &Path) -> Result<(Table, Table)> {
    Ok((load_table(x)?, load_table(y)?))
}

fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let key_spec = KeySpec::parse(&args.join.by)?;
    let options = build_options(&args.join)?;
    let (x, y) = load_pair(&args.join.x, &args.join.y)?;

    let analyzer = JoinAnalyzer::builder().options(options).build()?;
    let report = analyzer.analyze(&x, &y, &key_spec)?;

    println!("{}", render(&report, args.format.into())?);

    if args.emit_report {
        let base = format!(
            "{}_{}",
            extract_file_stem(&args.join.x),
            extract_file_stem(&args.join.y)
        );
        ReportWriter::new(args.output.clone()).write_report_to_file(&report, &base)?;
    }

    if let Some(expected) = &args.strict {
        let expected: Cardinality = expected.parse()?;
        enforce_cardinality(expected, &report)?;
    }

    Ok(())
}

fn run_check(args: &JoinArgs) -> Result<()> {
    let key_spec = KeySpec::parse(&args.by)?;
    let options = build_options(args)?;
    let (x, y) = load_pair(&args.x, &args.y)?;

    let check = key_check(&x, &y, &key_spec, &options)?;

    for issue in &check.blocking {
        println!("[{}] {}", issue.severity, issue.message);
    }
    for issue in &check.informational {
        println!("[{}] {}", issue.severity, issue.message);
    }

    if check.passed {
        println!("Key check passed for {}", key_spec);
        Ok(())
    } else {
        bail!(
            "Key check failed for {}: {} blocking issue(s)",
            key_spec,
            check.blocking.len()
        )
    }
}

fn repair_options(args: &RepairArgs, table: &Table) -> Result<RepairOptions> {
    if let Some(other) = &args.against {
        let by = args
            .by
            .as_deref()
            .ok_or_else(|| anyhow!("--against requires --by"))?;
        let y = load_table(other)?;
        let report = join_diagnostics::analyze(
            table,
            &y,
            &KeySpec::parse(by)?,
            &AnalysisOptions::default(),
        )?;
        // The input is the x side; y-only findings belong to the other file.
        let suggestions = suggest_repairs(&report);
        for s in &suggestions {
            if s.applies_to(TableSide::X) {
                info!("Suggested: {} on {} ({})", s.action, s.columns.join(","), s.table);
            } else {
                debug!("Skipped: {} applies to {}", s.action, s.table);
            }
        }
        return Ok(RepairOptions::from_suggestions(&suggestions, TableSide::X));
    }

    if args.all {
        let mut options = RepairOptions::all();
        if let Some(case) = args.case {
            options.case = Some(case.into());
        }
        return Ok(options);
    }

    let mut builder = RepairOptions::builder()
        .trim_whitespace(args.trim)
        .remove_invisible(args.invisible)
        .empty_to_missing(args.empty_to_missing);
    if let Some(case) = args.case {
        builder = builder.case(case.into());
    }
    Ok(builder.build())
}

fn run_repair(args: &RepairArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    let columns: Vec<String> = args
        .columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    if columns.is_empty() {
        bail!("--columns must name at least one column");
    }

    let options = repair_options(args, &table)?;
    if options.is_noop() {
        warn!("No repairs selected; use --trim, --invisible, --case, --empty-to-missing or --all");
    }

    if args.dry_run {
        let summary = preview_repairs(&table, &columns, &options)?;
        for col in &summary.columns {
            println!(
                "{}: {} value(s) would change (trim {}, invisible {}, case {}, empty {})",
                col.column,
                col.values_changed,
                col.trimmed,
                col.invisible_removed,
                col.case_changed,
                col.empty_to_missing
            );
        }
        return Ok(());
    }

    let (repaired, summary) = repair_columns(&table, &columns, &options)?;
    let output = args.output.clone().unwrap_or_else(|| {
        args.input
            .with_file_name(format!("{}_repaired.csv", extract_file_stem(&args.input)))
    });
    write_csv(&repaired, &output)?;

    println!(
        "Repaired {} value(s) across {} column(s) -> {}",
        summary.total_changed(),
        summary.columns.len(),
        output.display()
    );
    Ok(())
}

fn run_explain(args: &ExplainArgs) -> Result<()> {
    let key_spec = KeySpec::parse(&args.by)?;
    let (x, y) = load_pair(&args.x, &args.y)?;

    let explanation = explain(&x, &y, &key_spec, args.join_type.into(), args.actual_rows)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        return Ok(());
    }

    println!("{}", explanation.headline());
    for reason in &explanation.reasons {
        println!("  {}", reason);
    }
    Ok(())
}

/// Extract file stem from path
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("table")
        .to_string()
}

fn load_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        error!("Input file not found: {}", path.display());
        bail!("Input file not found: {}", path.display());
    }
    let df = load_csv_with_fallbacks(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Loaded {} ({} rows x {} cols)", path.display(), df.height(), df.width());
    Ok(Table::from_dataframe(&df)?)
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut df = table.to_dataframe()?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Load CSV with multiple fallback strategies
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path)?;
    let cursor = std::io::Cursor::new(clean_csv_content(&content));
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|e| e.into())
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
