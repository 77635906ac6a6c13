use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{ConnectionConfig, ConnectionOverrides, DEFAULT_CONFIG_FILE};
use crate::domain::{FilterExpression, parse_domain};
use crate::loader::{CsvTable, error_path, import_rows};
use crate::rpc::OdooClient;
use crate::sinks::{CsvSink, JsonSink, RecordSink, column_order, delimiter_byte};
use crate::utils::{model_name, split_fields};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Load connection settings from FILE (YAML)
    #[arg(short, long, env = "ODOOQ_CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Connect to hostname
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// Connect to database
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Login as username
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Using password
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Connect using schema (http or https)
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Connect to port
    #[arg(long, global = true)]
    pub port: Option<u32>,

    /// Number of simultaneous import workers (default: all cores)
    #[arg(short, long, env = "ODOOQ_WORKERS", global = true)]
    pub workers: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Query a model and print matching records as JSON
    Query(QueryArgs),
    /// Export model records to a CSV file
    Export(ExportArgs),
    /// Import records from a CSV file into a model
    Import(ImportArgs),
}

#[derive(Args)]
pub struct QueryArgs {
    /// Model to query
    #[arg(short, long)]
    pub model: String,

    /// Comma-separated fields to return
    #[arg(short, long)]
    pub field: Option<String>,

    /// Filter domain
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Skip OFFSET records from the beginning
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Return at most LIMIT records (0 = no limit)
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Model to export
    #[arg(short, long)]
    pub model: String,

    /// Comma-separated fields to export
    #[arg(short, long)]
    pub field: Option<String>,

    /// Filter domain
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Skip OFFSET records from the beginning
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Export at most LIMIT records (0 = no limit)
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,

    /// Export file, MODEL.csv if omitted
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// CSV separator
    #[arg(short, long, default_value = ";")]
    pub separator: String,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Model to import into
    #[arg(short, long)]
    pub model: String,

    /// Skip OFFSET data rows from the beginning
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Import at most LIMIT rows (0 = no limit)
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,

    /// Import file, MODEL.csv if omitted
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// CSV separator
    #[arg(short, long, default_value = ";")]
    pub separator: String,
}

impl Cli {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            hostname: self.hostname.clone(),
            port: self.port,
            database: self.database.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            schema: self.schema.clone(),
        }
    }

    pub fn connection(&self) -> Result<ConnectionConfig> {
        ConnectionConfig::load(Some(&self.config), &self.overrides())
            .with_context(|| format!("Config: Failed to load settings from {:?}", self.config))
    }
}

/// Parse the user's domain, treating a missing flag as no filter.
pub fn parse_filter_arg(domain: Option<&str>) -> Result<FilterExpression> {
    let domain = domain.unwrap_or_default();
    parse_domain(domain).with_context(|| format!("invalid domain: {domain}"))
}

pub fn login(config: ConnectionConfig) -> Result<OdooClient> {
    let mut client = OdooClient::new(config).context("RPC: Failed to create client")?;
    client.login().context("login error")?;
    Ok(client)
}

fn default_data_file(model: &str, file: Option<&Path>) -> PathBuf {
    file.map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{model}.csv")))
}

pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Query(args) => run_query(cli, args),
        Command::Export(args) => run_export(cli, args),
        Command::Import(args) => run_import(cli, args),
    }
}

pub fn run_query(cli: &Cli, args: &QueryArgs) -> Result<()> {
    let model = model_name(&args.model);
    let fields = split_fields(args.field.as_deref());
    // Reject a bad domain before touching the network
    let filter = parse_filter_arg(args.domain.as_deref())?;

    let client = login(cli.connection()?)?;
    let records = client
        .search_read(&model, &filter, args.offset, args.limit, &fields)
        .with_context(|| format!("RPC: search_read on {model} failed"))?;
    tracing::info!("Query: {} records from {}", records.len(), model);

    let mut sink = JsonSink::stdout();
    for record in &records {
        sink.add_record(record)?;
    }
    sink.finish().context("Query: Failed to write records")
}

pub fn run_export(cli: &Cli, args: &ExportArgs) -> Result<()> {
    let model = model_name(&args.model);
    let fields = split_fields(args.field.as_deref());
    let filter = parse_filter_arg(args.domain.as_deref())?;
    let delimiter = delimiter_byte(&args.separator)?;

    let client = login(cli.connection()?)?;
    let records = client
        .search_read(&model, &filter, args.offset, args.limit, &fields)
        .with_context(|| format!("RPC: search_read on {model} failed"))?;

    if records.is_empty() {
        println!("no records found");
        return Ok(());
    }

    let path = default_data_file(&args.model, args.file.as_deref());
    let columns = column_order(&records, &fields);
    tracing::info!(
        "Export: {} records, {} columns -> {:?}",
        records.len(),
        columns.len(),
        path
    );

    let mut sink = CsvSink::new(&path, delimiter, columns)
        .with_context(|| format!("Export: Failed to create {:?}", path))?;
    for record in &records {
        sink.add_record(record)?;
    }
    sink.finish().context("Export: Failed to finalize CSV")
}

pub fn run_import(cli: &Cli, args: &ImportArgs) -> Result<()> {
    let model = model_name(&args.model);
    let delimiter = delimiter_byte(&args.separator)?;
    let path = default_data_file(&args.model, args.file.as_deref());

    let table = CsvTable::read(&path, delimiter)?;
    if table.rows.is_empty() {
        println!("file too short");
        return Ok(());
    }
    if args.offset >= table.rows.len() {
        println!("offset too large");
        return Ok(());
    }
    let rows = table.select(args.offset, args.limit);

    let client = login(cli.connection()?)?;

    let errors_path = error_path(&path);
    let errors = CsvSink::new(&errors_path, delimiter, table.header.clone())
        .with_context(|| format!("Import: Failed to create {:?}", errors_path))?;

    let start = std::time::Instant::now();
    let summary = import_rows(&client, &model, &table.header, rows, errors)?;
    tracing::info!(
        "Import: {} created, {} updated, {} rejected in {:.2}s",
        summary.created,
        summary.updated,
        summary.failed,
        start.elapsed().as_secs_f64()
    );

    if summary.failed > 0 {
        bail!(
            "Import: {} rows rejected, see {:?}",
            summary.failed,
            errors_path
        );
    }
    Ok(())
}
