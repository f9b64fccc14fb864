use anyhow::{bail, Result};
use civic_core::config::DashboardConfig;
use civic_core::{dataset, Filter, Issue, QueryConfig, Session, Severity, SortKey, Status};
use clap::{Args, Parser, Subcommand};
use schemars::schema_for;
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

mod render;
mod shell;

#[derive(Parser)]
#[command(name = "fixmytown")]
#[command(about = "FixMyTown admin CLI", long_about = None)]
struct Cli {
    /// Dashboard config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Issue dataset (yaml, json or toml); the built-in seed is used otherwise
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Plain output without ANSI colours
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse issues and change their status
    Issues {
        #[command(subcommand)]
        command: IssueCommands,
    },
    /// Stat cards, resolution trend and top upvoted issues
    Dashboard {
        #[arg(long)]
        json: bool,
    },
    /// Category, severity, date and status breakdowns
    Reports {
        #[arg(long)]
        json: bool,
    },
    /// Map centre and one marker per issue
    Map {
        #[arg(long)]
        json: bool,
    },
    /// Interactive issue management session on stdin
    Shell,
    /// Write a markdown vault and CSV export of the current dataset
    Export {
        /// Output directory (default: ./exports)
        #[arg(long, default_value = "exports")]
        out_dir: PathBuf,
    },
    /// Export canonical JSON Schemas to the ./schemas directory
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
}

#[derive(Subcommand)]
enum IssueCommands {
    /// Filtered, sorted view of one status tab
    List(ListArgs),
    /// Detail view of a single issue
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Change an issue's status for this run and print its former tab
    SetStatus {
        id: String,
        status: Status,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Status tab (default from config: unresolved)
    #[arg(long)]
    status: Option<Status>,

    #[arg(long, default_value = "all")]
    category: Filter<String>,

    #[arg(long, default_value = "all")]
    severity: Filter<Severity>,

    /// Case-insensitive match on title, id and category
    #[arg(long, default_value = "")]
    search: String,

    /// date, severity or upvotes (default from config: date)
    #[arg(long)]
    sort: Option<SortKey>,

    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Serialize)]
struct StatusChange<'a> {
    changed: bool,
    issue: Option<&'a Issue>,
    view: Vec<&'a Issue>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let color =
        !cli.no_color && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal();

    // schema export needs neither config nor dataset
    if let Commands::Schema {
        command: SchemaCommands::Export { out_dir },
    } = &cli.command
    {
        return schema_export(out_dir);
    }

    let config = DashboardConfig::load_or_default(cli.config.as_deref())?;
    let issues = load_issues(cli.dataset.as_deref(), &config)?;

    match cli.command {
        Commands::Issues { command } => issues_command(command, config, issues, color),
        Commands::Dashboard { json } => {
            let view = render::DashboardView::new(&config, &issues);
            if json {
                print_json(&view)
            } else {
                print!("{}", render::dashboard_text(&view));
                Ok(())
            }
        }
        Commands::Reports { json } => {
            let view = render::ReportsView::new(&issues);
            if json {
                print_json(&view)
            } else {
                print!("{}", render::reports_text(&view, color));
                Ok(())
            }
        }
        Commands::Map { json } => {
            let view = render::MapView::new(&config, &issues);
            if json {
                print_json(&view)
            } else {
                print!("{}", render::map_text(&view, color));
                Ok(())
            }
        }
        Commands::Shell => {
            let mut session = Session::with_config(issues, config.initial_query());
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            shell::run(&mut session, stdin.lock(), &mut stdout, color)
        }
        Commands::Export { out_dir } => {
            let summary = vault::build_vault(&issues, &config, &out_dir)?;
            println!(
                "Exported {} issue notes ({} files) to {}",
                summary.issue_notes,
                summary.files.len(),
                summary.root.display()
            );
            Ok(())
        }
        Commands::Schema { .. } => Ok(()),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("FIXMYTOWN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn load_issues(cli_dataset: Option<&Path>, config: &DashboardConfig) -> Result<Vec<Issue>> {
    match cli_dataset.or(config.dataset.path.as_deref()) {
        Some(path) => dataset::load(path),
        None => {
            let issues = dataset::builtin()?;
            info!(issues = issues.len(), "using built-in dataset");
            Ok(issues)
        }
    }
}

fn issues_command(
    command: IssueCommands,
    config: DashboardConfig,
    issues: Vec<Issue>,
    color: bool,
) -> Result<()> {
    match command {
        IssueCommands::List(args) => {
            let defaults = config.initial_query();
            let query = QueryConfig {
                status_tab: args.status.unwrap_or(defaults.status_tab),
                category: args.category,
                severity: args.severity,
                search_text: args.search,
                sort_key: args.sort.unwrap_or(defaults.sort_key),
            };
            let view = civic_core::query(&issues, &query);
            if args.json {
                print_json(&view)
            } else {
                print!("{}", render::issue_table(&view, color));
                Ok(())
            }
        }
        IssueCommands::Show { id, json } => {
            let Some(issue) = issues.iter().find(|issue| issue.id == id) else {
                bail!("no issue with id `{id}`");
            };
            if json {
                print_json(issue)
            } else {
                print!("{}", render::issue_detail(issue, color));
                Ok(())
            }
        }
        IssueCommands::SetStatus { id, status, json } => {
            let mut session = Session::with_config(issues, config.initial_query());
            let previous = session.find(&id).map(|issue| issue.status);
            let changed = session.set_status(&id, status);
            if !changed {
                warn!(%id, "no issue with this id; nothing changed");
            }
            if let Some(previous) = previous {
                session.set_tab(previous);
            }

            let issue = session.find(&id);
            let view = session.visible();
            if json {
                return print_json(&StatusChange { changed, issue, view });
            }
            match (previous, issue) {
                (Some(previous), Some(issue)) => {
                    println!("{}: {} -> {}", issue.id, previous, issue.status);
                    println!();
                    println!("[{}]", previous);
                }
                _ => println!("no issue with id `{id}`; nothing changed"),
            }
            print!("{}", render::issue_table(&view, color));
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn schema_export(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    // Export Issue schema
    let issue_schema = schema_for!(civic_core::schema::Issue);
    let issue_json = serde_json::to_string_pretty(&issue_schema)?;
    fs::write(out_dir.join("Issue.schema.json"), issue_json)?;

    // Export QueryConfig schema
    let query_schema = schema_for!(civic_core::query::QueryConfig);
    let query_json = serde_json::to_string_pretty(&query_schema)?;
    fs::write(out_dir.join("QueryConfig.schema.json"), query_json)?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}
