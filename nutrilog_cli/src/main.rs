use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nutrilog_core::*;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nutrilog")]
#[command(about = "Food catalog and daily consumption log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record servings of an item for a day
    Add {
        item_id: String,
        servings: f64,

        /// Day to record against (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Meal label ("breakfast", "snack", ...)
        #[arg(long)]
        tag: Option<String>,
    },

    /// Remove an item's record for a day
    Remove {
        item_id: String,

        /// Day to remove from (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show a day's records and total value
    Total {
        /// Day to total (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Manage catalog items
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Interactive logging session with undo/redo
    Session {
        /// Day the session edits (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Export the whole log as CSV
    Export {
        /// Output path (defaults to <data-dir>/log.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// List all items with their per-serving values
    List,

    /// Show one item in detail
    Show { item_id: String },

    /// Add a basic food with a fixed per-serving value
    AddBasic {
        item_id: String,
        value: f64,

        /// Comma-separated search keywords
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Add a recipe from id=servings pairs (e.g. apple=2 banana=1)
    AddComposite {
        item_id: String,

        /// Component list as id=servings pairs
        #[arg(required = true)]
        components: Vec<String>,

        /// Comma-separated search keywords
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Remove an item (fails while other items still use it)
    Remove { item_id: String },

    /// Search items by keywords
    Search {
        keywords: Vec<String>,

        /// Require every keyword instead of any
        #[arg(long)]
        all: bool,
    },
}

fn main() -> Result<()> {
    nutrilog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;

    match cli.command {
        Commands::Add {
            item_id,
            servings,
            date,
            tag,
        } => cmd_add(&config, &data_dir, &item_id, servings, date, tag),
        Commands::Remove { item_id, date } => cmd_remove(&config, &data_dir, &item_id, date),
        Commands::Total { date } => cmd_total(&config, &data_dir, date),
        Commands::Items { command } => cmd_items(&config, &data_dir, command),
        Commands::Session { date } => cmd_session(&config, &data_dir, date),
        Commands::Export { out } => cmd_export(&config, &data_dir, out),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn load_catalog_for(config: &Config, data_dir: &std::path::Path) -> Result<Catalog> {
    load_catalog_seeded(
        &store::items_path(data_dir),
        config.catalog.seed_starter_items,
    )
}

/// Per-serving value under the configured strictness
fn item_value(config: &Config, catalog: &Catalog, item_id: &str) -> Result<f64> {
    if config.catalog.strict_values {
        catalog.value_per_serving_strict(item_id)
    } else {
        catalog.value_per_serving(item_id)
    }
}

fn cmd_add(
    config: &Config,
    data_dir: &std::path::Path,
    item_id: &str,
    servings: f64,
    date: Option<NaiveDate>,
    tag: Option<String>,
) -> Result<()> {
    let day = date.unwrap_or_else(today);
    let catalog = load_catalog_for(config, data_dir)?;
    let log_path = store::log_path(data_dir);
    let mut log = load_log(&catalog, &log_path)?;

    log.record(&catalog, day, item_id, servings, tag)?;
    save_log(&log, &log_path)?;

    println!(
        "✓ {} x{} on {} (day total: {:.1})",
        item_id,
        servings,
        day,
        log.total_value(&catalog, day)
    );
    Ok(())
}

fn cmd_remove(
    config: &Config,
    data_dir: &std::path::Path,
    item_id: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let day = date.unwrap_or_else(today);
    let catalog = load_catalog_for(config, data_dir)?;
    let log_path = store::log_path(data_dir);
    let mut log = load_log(&catalog, &log_path)?;

    let removed = log.remove(day, item_id)?;
    save_log(&log, &log_path)?;

    println!(
        "✓ removed {} x{} from {} (day total: {:.1})",
        removed.item_id,
        removed.servings,
        day,
        log.total_value(&catalog, day)
    );
    Ok(())
}

fn cmd_total(config: &Config, data_dir: &std::path::Path, date: Option<NaiveDate>) -> Result<()> {
    let day = date.unwrap_or_else(today);
    let catalog = load_catalog_for(config, data_dir)?;
    let log = load_log(&catalog, &store::log_path(data_dir))?;

    print_day(&catalog, &log, day);
    Ok(())
}

fn print_day(catalog: &Catalog, log: &DayLog, day: NaiveDate) {
    match log.entries_for(day) {
        None => println!("{}: nothing logged", day),
        Some(entry) => {
            println!("{}", day);
            for record in entry.consumed() {
                let unit = catalog.value_per_serving(&record.item_id).unwrap_or(0.0);
                let tag = record
                    .tag
                    .as_deref()
                    .map(|t| format!(" [{}]", t))
                    .unwrap_or_default();
                println!(
                    "  {:<20} x{:<6} {:>8.1}{}",
                    record.item_id,
                    record.servings,
                    record.servings * unit,
                    tag
                );
            }
            println!("  total: {:.1}", log.total_value(catalog, day));
        }
    }
}

fn cmd_items(config: &Config, data_dir: &std::path::Path, command: ItemCommands) -> Result<()> {
    let items_path = store::items_path(data_dir);
    let mut catalog = load_catalog_for(config, data_dir)?;

    match command {
        ItemCommands::List => {
            for item in catalog.items() {
                let value = item_value(config, &catalog, &item.id)?;
                println!("{:<20} {:>8.1}  [{}]", item.id, value, item.keywords.join(", "));
            }
        }

        ItemCommands::Show { item_id } => {
            let item = catalog
                .get(&item_id)
                .ok_or_else(|| Error::UnknownItem(item_id.clone()))?;
            println!("{}", item.id);
            println!("  keywords: {}", item.keywords.join(", "));
            match &item.kind {
                ItemKind::Leaf { value_per_serving } => {
                    println!("  per serving: {:.1}", value_per_serving);
                }
                ItemKind::Composite { components } => {
                    for (component_id, servings) in components {
                        println!("  {} x{}", component_id, servings);
                    }
                    println!(
                        "  per serving: {:.1}",
                        item_value(config, &catalog, &item.id)?
                    );
                }
            }
        }

        ItemCommands::AddBasic {
            item_id,
            value,
            keywords,
        } => {
            catalog.insert(Item::leaf(item_id.clone(), keywords, value))?;
            save_catalog(&catalog, &items_path)?;
            println!("✓ added basic food '{}'", item_id);
        }

        ItemCommands::AddComposite {
            item_id,
            components,
            keywords,
        } => {
            let components = parse_components(&components)?;
            catalog.insert(Item::composite(item_id.clone(), keywords, components))?;
            save_catalog(&catalog, &items_path)?;
            println!(
                "✓ added recipe '{}' ({:.1} per serving)",
                item_id,
                item_value(config, &catalog, &item_id)?
            );
        }

        ItemCommands::Remove { item_id } => {
            catalog.remove(&item_id)?;
            save_catalog(&catalog, &items_path)?;
            println!("✓ removed '{}'", item_id);
        }

        ItemCommands::Search { keywords, all } => {
            let hits = catalog.search(&keywords, all);
            if hits.is_empty() {
                println!("no items matched");
            }
            for item in hits {
                println!("{:<20} [{}]", item.id, item.keywords.join(", "));
            }
        }
    }

    Ok(())
}

/// Parse "id=servings" pairs from the command line
fn parse_components(pairs: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut components = BTreeMap::new();
    for pair in pairs {
        let (id, servings) = pair.split_once('=').ok_or_else(|| {
            Error::Other(format!(
                "expected id=servings, got '{}' (e.g. apple=2)",
                pair
            ))
        })?;
        let servings: f64 = servings
            .parse()
            .map_err(|_| Error::Other(format!("invalid servings in '{}'", pair)))?;
        components.insert(id.to_string(), servings);
    }
    Ok(components)
}

fn cmd_session(
    config: &Config,
    data_dir: &std::path::Path,
    date: Option<NaiveDate>,
) -> Result<()> {
    let day = date.unwrap_or_else(today);
    let catalog = load_catalog_for(config, data_dir)?;
    let log_path = store::log_path(data_dir);
    let mut log = load_log(&catalog, &log_path)?;
    let mut history = History::new();

    println!("Logging session for {}", day);
    println!("Commands: add <item> <servings> [tag] | remove <item> | undo | redo | total | done");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break, // EOF ends the session
        };

        match run_session_command(&line, day, &catalog, &mut log, &mut history) {
            Ok(SessionAction::Continue) => {}
            Ok(SessionAction::Quit) => break,
            Err(e) => println!("✗ {}", e),
        }
    }

    save_log(&log, &log_path)?;
    println!("✓ session saved (day total: {:.1})", log.total_value(&catalog, day));
    Ok(())
}

enum SessionAction {
    Continue,
    Quit,
}

fn run_session_command(
    line: &str,
    day: NaiveDate,
    catalog: &Catalog,
    log: &mut DayLog,
    history: &mut History,
) -> Result<SessionAction> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(SessionAction::Continue);
    };

    match verb {
        "add" => {
            let item_id = words
                .next()
                .ok_or_else(|| Error::Other("usage: add <item> <servings> [tag]".into()))?;
            let servings: f64 = words
                .next()
                .ok_or_else(|| Error::Other("usage: add <item> <servings> [tag]".into()))?
                .parse()
                .map_err(|_| Error::Other("servings must be a number".into()))?;
            let tag = words.next().map(String::from);

            history.run(Command::add(day, item_id, servings, tag)?, log, catalog)?;
            println!("  {} x{} (total: {:.1})", item_id, servings, log.total_value(catalog, day));
        }

        "remove" => {
            let item_id = words
                .next()
                .ok_or_else(|| Error::Other("usage: remove <item>".into()))?;
            let command = Command::remove(log, day, item_id)?;
            history.run(command, log, catalog)?;
            println!("  removed {} (total: {:.1})", item_id, log.total_value(catalog, day));
        }

        "undo" => {
            history.undo(log, catalog)?;
            println!("  undone (total: {:.1})", log.total_value(catalog, day));
        }

        "redo" => {
            history.redo(log, catalog)?;
            println!("  redone (total: {:.1})", log.total_value(catalog, day));
        }

        "total" => {
            println!("  total: {:.1}", log.total_value(catalog, day));
        }

        "done" | "quit" | "exit" => return Ok(SessionAction::Quit),

        other => {
            println!("  unknown command '{}'", other);
        }
    }

    Ok(SessionAction::Continue)
}

fn cmd_export(config: &Config, data_dir: &std::path::Path, out: Option<PathBuf>) -> Result<()> {
    let catalog = load_catalog_for(config, data_dir)?;
    let log = load_log(&catalog, &store::log_path(data_dir))?;
    let csv_path = out.unwrap_or_else(|| data_dir.join("log.csv"));

    let count = log_to_csv(&log, &catalog, &csv_path)?;
    println!("✓ exported {} rows to {}", count, csv_path.display());
    Ok(())
}
