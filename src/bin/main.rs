//! Prism CLI - Translate query IR into backend-native queries
//!
//! Usage:
//!   prism sql <query.json> [--dialect <dialect>] [--fields <fields.json>] [--table <name>...]
//!   prism document <query.json> [--mapping <mapping.json>]
//!   prism merge <reference.json>
//!   prism parse "<query string>"
//!
//! Examples:
//!   prism sql query.json --dialect doris --table 2_bklog_web
//!   prism document query.json --mapping mapping.json
//!   prism parse 'level:error AND NOT service:web*'

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand, ValueEnum};
use prism::config::{Settings, SettingsError};
use prism::document::DocumentTranslator;
use prism::ir::{FieldsMap, Query, QueryReference};
use prism::querystring::{self, ParseError};
use prism::reference::ReferenceMerger;
use prism::sql::{Dialect, SqlTranslator};
use prism::TranslateError;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prism")]
#[command(about = "Prism - Translate observability queries into backend-native queries")]
#[command(version)]
struct Cli {
    /// Path to a prism.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a query as SQL fragments
    Sql {
        /// Path to the query JSON file
        file: PathBuf,

        /// SQL dialect to generate (defaults to the configured one)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Field type metadata as a JSON object
        #[arg(short, long)]
        fields: Option<PathBuf>,

        /// Tables to select from; several are combined with UNION ALL
        #[arg(short, long)]
        table: Vec<String>,
    },

    /// Render a query as a document-store search body
    Document {
        /// Path to the query JSON file
        file: PathBuf,

        /// Index mapping JSON
        #[arg(short, long)]
        mapping: Option<PathBuf>,
    },

    /// Merge a query reference into one remote request plan
    Merge {
        /// Path to the query reference JSON file
        file: PathBuf,
    },

    /// Parse a query string and print its expression tree
    Parse {
        /// The query string
        query: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Default,
    Hdfs,
    Doris,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Default => Dialect::Default,
            DialectArg::Hdfs => Dialect::Hdfs,
            DialectArg::Doris => Dialect::Doris,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Error reading file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sql {
            file,
            dialect,
            fields,
            table,
        } => cmd_sql(&settings, &file, dialect, fields.as_deref(), &table),
        Commands::Document { file, mapping } => cmd_document(&settings, &file, mapping.as_deref()),
        Commands::Merge { file } => cmd_merge(&settings, &file),
        Commands::Parse { query } => return cmd_parse(&query),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Translate(TranslateError::QueryString(e))) => {
            print_diagnostics(&e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn cmd_sql(
    settings: &Settings,
    file: &Path,
    dialect: Option<DialectArg>,
    fields: Option<&Path>,
    tables: &[String],
) -> Result<(), CliError> {
    let query: Query = read_json(file)?;

    let mut translator = SqlTranslator::from_settings(settings);
    if let Some(d) = dialect {
        translator = translator.with_dialect(d.into());
    }
    if let Some(path) = fields {
        let fields: FieldsMap = read_json(path)?;
        translator = translator.with_fields(fields);
    }

    let stmt = translator.statement(&query, tables)?;

    println!("-- Dialect: {}", translator.dialect());
    println!("WHERE: {}", stmt.where_clause);
    println!("SELECT: {}", stmt.plan.select_fields.join(", "));
    println!("GROUP BY: {}", stmt.plan.group_by_fields.join(", "));
    println!("ORDER BY: {}", stmt.plan.order_by_fields.join(", "));
    if !tables.is_empty() {
        println!();
        println!("{}", stmt.sql);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&stmt.labels)?);
    Ok(())
}

fn cmd_document(settings: &Settings, file: &Path, mapping: Option<&Path>) -> Result<(), CliError> {
    let query: Query = read_json(file)?;

    let mut translator = DocumentTranslator::from_settings(settings);
    if let Some(path) = mapping {
        let mapping: serde_json::Value = read_json(path)?;
        translator = translator.with_fields(FieldsMap::from_mapping(&mapping));
    }

    let body = translator.search_body(&query)?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    println!();
    println!("{}", serde_json::to_string_pretty(&translator.labels(&query)?)?);
    Ok(())
}

fn cmd_merge(settings: &Settings, file: &Path) -> Result<(), CliError> {
    let reference: QueryReference = read_json(file)?;
    let expand = ReferenceMerger::from_settings(settings).merge(&reference)?;
    println!("{}", serde_json::to_string_pretty(&expand)?);
    Ok(())
}

fn cmd_parse(query: &str) -> ExitCode {
    match querystring::parse(query) {
        Ok(Some(expr)) => {
            println!("{}", expr);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("(match all)");
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_diagnostics(&e);
            ExitCode::FAILURE
        }
    }
}

fn print_diagnostics(error: &ParseError) {
    const SOURCE_ID: &str = "query";

    for diag in &error.diagnostics {
        let result = Report::build(ReportKind::Error, (SOURCE_ID, diag.span.clone()))
            .with_message("Invalid query string")
            .with_label(
                Label::new((SOURCE_ID, diag.span.clone()))
                    .with_message(&diag.message)
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((SOURCE_ID, Source::from(error.source.as_str())));

        if result.is_err() {
            eprintln!("  {}", diag);
        }
    }
}
