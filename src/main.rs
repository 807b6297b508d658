mod compare;
mod config;
mod console;
mod display;
mod error;
mod filter;
mod models;
mod normalize;
mod rank;
mod source;
mod store;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::Config;
use console::Session;
use display::{render_details, render_table};
use error::HuntError;
use filter::{FilterKind, FilterSet};
use models::Listing;
use normalize::{normalize, salary_label};
use source::{HeadHunterClient, ListingSource};
use store::ListingStore;

#[derive(Parser)]
#[command(name = "vacancy-hunt")]
#[command(about = "Search job listings, rank them by salary, and keep the best ones")]
struct Cli {
    /// Directory holding saved listing files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search (the default)
    Search {
        /// Keyword to search for; asked for if omitted
        keyword: Option<String>,
    },

    /// Print every listing in a saved file
    List {
        #[command(flatten)]
        file: FileArg,

        /// One line per listing instead of full details
        #[arg(short, long)]
        short: bool,

        /// Show only the listing at this position
        #[arg(short, long)]
        position: Option<usize>,
    },

    /// Compare salaries of two saved listings
    Compare {
        #[command(flatten)]
        file: FileArg,

        /// Position of the first listing (1-based)
        first: usize,

        /// Position of the second listing (1-based)
        second: usize,
    },

    /// Delete saved listings by position
    Delete {
        #[command(flatten)]
        file: FileArg,

        /// Positions to delete (1-based)
        #[arg(required = true)]
        positions: Vec<usize>,
    },

    /// Delete saved listings by listing id
    Forget {
        #[command(flatten)]
        file: FileArg,

        /// Listing id
        id: String,
    },

    /// Saved listings whose fields equal the given values exactly
    Match {
        #[command(flatten)]
        file: FileArg,

        /// FIELD=VALUE pairs, e.g. city=Москва or salary_from=100000
        #[arg(required = true, value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },

    /// Filter a saved file
    Filter {
        #[command(flatten)]
        file: FileArg,

        #[arg(long)]
        salary_from: Option<String>,

        #[arg(long)]
        salary_to: Option<String>,

        #[arg(long)]
        city: Option<String>,

        /// Published on or after this date (DD.MM.YYYY)
        #[arg(long)]
        date_from: Option<String>,

        #[arg(long)]
        experience: Option<String>,

        /// Rewrite the file with only the matching listings
        #[arg(long)]
        keep: bool,
    },

    /// Fetch one listing from the service by id
    Show {
        /// Listing id
        id: String,

        /// Append the fetched listing to this saved file
        #[arg(long)]
        save: Option<String>,
    },
}

#[derive(Args)]
struct FileArg {
    /// Saved file name (without .json)
    #[arg(short, long)]
    file: String,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let command = cli.command.unwrap_or(Commands::Search { keyword: None });
    match run(&config, command) {
        Err(e) if e.downcast_ref::<HuntError>().is_some_and(HuntError::is_recoverable) => {
            println!("{}", e);
            Ok(())
        }
        other => other,
    }
}

fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Search { keyword } => {
            let client = HeadHunterClient::new(config)?;
            let stdin = io::stdin();
            let mut session = Session::new(
                config,
                &client,
                stdin.lock(),
                io::stdout(),
                Utc::now(),
                Local::now().date_naive(),
            );
            session.run_search(keyword)?;
        }

        Commands::List {
            file,
            short,
            position,
        } => {
            let store = open_existing(config, &file.file)?;
            if let Some(position) = position {
                let listing = store.get_position(position)?;
                println!("{}", render_details(position, &listing, Utc::now()));
                return Ok(());
            }
            let listings = store.load_numbered(|_| true)?;
            if listings.is_empty() {
                println!("No listings saved.");
            } else if short {
                print!("{}", render_table(&listings));
            } else {
                let now = Utc::now();
                for (position, listing) in &listings {
                    println!("{}", render_details(*position, listing, now));
                }
            }
        }

        Commands::Compare {
            file,
            first,
            second,
        } => {
            let store = open_existing(config, &file.file)?;
            let comparison = store.compare_positions(first, second)?;
            println!("{}", comparison);
        }

        Commands::Delete { file, positions } => {
            let store = open_existing(config, &file.file)?;
            println!("Listings in the file: {}.", store.len()?);
            let resolved = store.resolve_positions(&positions)?;
            for (position, id) in positions.iter().zip(&resolved) {
                if id.is_none() {
                    println!("There is no listing #{}, skipped.", position);
                }
            }
            let removed = store.delete_by_positions(&positions)?;
            println!(
                "Removed {} listing(s). Listings left in the file: {}.",
                removed,
                store.len()?
            );
        }

        Commands::Forget { file, id } => {
            let store = open_existing(config, &file.file)?;
            let removed = store.delete_by_id(&id)?;
            if removed == 0 {
                return Err(HuntError::NotFound(format!("no saved listing with id {}", id)).into());
            }
            println!("Removed {} listing(s) with id {}.", removed, id);
        }

        Commands::Match { file, fields } => {
            let store = open_existing(config, &file.file)?;
            let fields: Vec<(&str, Value)> = fields
                .iter()
                .map(|(k, v)| (k.as_str(), v.clone()))
                .collect();
            let matched = store.load_matching(&fields)?;
            if matched.is_empty() {
                println!("No saved listings match.");
            } else {
                print!("{}", render_table(&matched));
            }
        }

        Commands::Filter {
            file,
            salary_from,
            salary_to,
            city,
            date_from,
            experience,
            keep,
        } => {
            let store = open_existing(config, &file.file)?;
            let mut filters = FilterSet::new();
            let given = [
                (FilterKind::SalaryFrom, salary_from),
                (FilterKind::SalaryTo, salary_to),
                (FilterKind::City, city),
                (FilterKind::PublishedFrom, date_from),
                (FilterKind::Experience, experience),
            ];
            for (kind, value) in given {
                if let Some(value) = value {
                    filters.insert(kind, &value)?;
                }
            }
            if filters.is_empty() {
                println!("No filters given, showing every saved listing.");
            }
            for criterion in filters.criteria() {
                println!("  {}", criterion);
            }

            let matched = store.load_filtered(&filters, Local::now().date_naive())?;
            if matched.is_empty() {
                println!("No saved listings match the filters.");
            } else {
                print!("{}", render_table(&matched));
            }
            if keep {
                let kept: Vec<Listing> = matched.into_iter().map(|(_, l)| l).collect();
                store.write(&kept)?;
                println!("The file now holds {} listings.", kept.len());
            }
        }

        Commands::Show { id, save } => {
            let client = HeadHunterClient::new(config)?;
            let raw = client.details(&id)?;
            let listing = normalize(&raw);
            println!("{}", render_details(1, &listing, Utc::now()));
            println!("  Salary range: {}", salary_label(raw.salary.as_ref()));

            if let Some(name) = save {
                let store = ListingStore::open(config.store_path(&name)?)
                    .with_context(|| format!("Failed to open saved file '{}'", name))?;
                store.append(&listing)?;
                println!("Appended to {}.", store.path().display());
            }
        }
    }

    Ok(())
}

// One-shot commands only work on files a search has already saved.
fn open_existing(config: &Config, name: &str) -> Result<ListingStore> {
    let path = config.store_path(name)?;
    if !path.exists() {
        return Err(HuntError::NotFound(format!(
            "no saved file '{}' in {}",
            name,
            config.data_dir.display()
        ))
        .into());
    }
    Ok(ListingStore::open(path)?)
}

// `key=value`; the value is read as JSON when it parses (numbers, quoted
// strings), otherwise taken as a plain string.
fn parse_field(arg: &str) -> Result<(String, Value)> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", arg))?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.trim().to_string(), value))
}
