//! Northwind CLI - list, render and run the report catalog
//!
//! Usage:
//!   northwind list
//!   northwind render <report> [--backend sql|document] [--dialect <dialect>]
//!   northwind setup [--backend sql|document] [--dialect <dialect>]
//!   northwind run <report|all|before> [--data <file.json>] [--format table|json]
//!
//! Examples:
//!   northwind render task_1_4 --dialect postgres
//!   northwind render task_1_22 --backend document
//!   northwind run all --data ./data/northwind.json --format json

use clap::{Parser, Subcommand, ValueEnum};
use northwind_reports::config::{OutputFormat, Settings};
use northwind_reports::report::{self, ReportRunner, ResultSet, BEFORE};
use northwind_reports::sql::Dialect;
use northwind_reports::{document, sql, Dataset, MemoryStore};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "northwind")]
#[command(about = "Northwind sales reports for relational and document stores")]
#[command(version)]
struct Cli {
    /// Config file (defaults to NORTHWIND_CONFIG, ./northwind.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List report ids and titles
    List,

    /// Print the query for one report
    Render {
        /// Report id, e.g. task_1_4
        report: String,

        /// Target store
        #[arg(short, long, default_value = "sql")]
        backend: BackendArg,

        /// SQL dialect to generate (defaults to [sql] dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Print the index statements run before any report
    Setup {
        /// Target store
        #[arg(short, long, default_value = "sql")]
        backend: BackendArg,

        /// SQL dialect to generate (defaults to [sql] dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,
    },

    /// Run reports against a dataset held in memory
    Run {
        /// Report id, `all`, or `before`
        report: String,

        /// Dataset JSON (defaults to [dataset] path)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Output format (defaults to [output] format)
        #[arg(short, long)]
        format: Option<FormatArg>,
    },
}

#[derive(Clone, ValueEnum)]
enum BackendArg {
    Sql,
    Document,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Mysql,
    Postgres,
    Duckdb,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum FormatArg {
    Table,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "northwind_reports=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_settings(cli.config.as_ref()).and_then(|settings| match cli.command {
        Commands::List => cmd_list(),
        Commands::Render {
            report,
            backend,
            dialect,
        } => cmd_render(&settings, &report, backend, dialect),
        Commands::Setup { backend, dialect } => cmd_setup(&settings, backend, dialect),
        Commands::Run {
            report,
            data,
            format,
        } => cmd_run(&settings, &report, data, format),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, Box<dyn Error>> {
    let settings = match path {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };
    Ok(settings)
}

fn cmd_list() -> CliResult {
    println!("Reports:");
    println!("  - {:<10} provision lookup indexes", BEFORE);
    for def in report::reports() {
        println!("  - {:<10} {}", def.id, def.title);
    }
    Ok(())
}

fn cmd_render(
    settings: &Settings,
    id: &str,
    backend: BackendArg,
    dialect: Option<DialectArg>,
) -> CliResult {
    let def = report::find(id).ok_or_else(|| report::ReportError::UnknownReport(id.into()))?;
    let plan = def.plan(&settings.reports);
    match backend {
        BackendArg::Sql => {
            let dialect = dialect.map(Dialect::from).unwrap_or(settings.sql.dialect);
            println!("-- {}: {}", def.id, def.title);
            println!("-- Dialect: {}", dialect);
            println!("{};", sql::render_report(&plan, dialect)?);
        }
        BackendArg::Document => {
            let script = document::render_report(&plan);
            println!("{}", serde_json::to_string_pretty(&script)?);
        }
    }
    Ok(())
}

fn cmd_setup(settings: &Settings, backend: BackendArg, dialect: Option<DialectArg>) -> CliResult {
    match backend {
        BackendArg::Sql => {
            let dialect = dialect.map(Dialect::from).unwrap_or(settings.sql.dialect);
            for statement in sql::render_setup(dialect) {
                println!("{};", statement);
            }
        }
        BackendArg::Document => {
            for command in document::render_setup() {
                println!("{}", serde_json::to_string(&command)?);
            }
        }
    }
    Ok(())
}

fn cmd_run(
    settings: &Settings,
    id: &str,
    data: Option<PathBuf>,
    format: Option<FormatArg>,
) -> CliResult {
    let path = match data {
        Some(path) => path,
        None => settings
            .dataset
            .resolved_path()?
            .ok_or("no dataset: pass --data or set [dataset] path")?,
    };
    let format = format.map(OutputFormat::from).unwrap_or(settings.output.format);

    let dataset = Dataset::from_file(&path)?;
    let mut runner =
        ReportRunner::prepare(MemoryStore::from_dataset(&dataset), settings.reports.clone())?;

    let results = match id {
        "all" => runner.run_all()?,
        _ => match runner.invoke(id)? {
            Some(result) => vec![result],
            None => {
                println!("{}: indexes ready", BEFORE);
                return Ok(());
            }
        },
    };
    print_results(&results, format)
}

fn print_results(results: &[ResultSet], format: OutputFormat) -> CliResult {
    match format {
        OutputFormat::Json if results.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&results[0])?);
        }
        OutputFormat::Json => {
            let by_report: serde_json::Map<String, serde_json::Value> = results
                .iter()
                .map(|r| Ok((r.report.clone(), serde_json::to_value(r)?)))
                .collect::<Result<_, serde_json::Error>>()?;
            println!("{}", serde_json::to_string_pretty(&by_report)?);
        }
        OutputFormat::Table => {
            for result in results {
                let title = report::find(&result.report).map_or("", |d| d.title);
                println!("{}: {} ({} rows)", result.report, title, result.len());
                print!("{}", result.to_table());
                println!();
            }
        }
    }
    Ok(())
}
