//! worklog CLI — operator interface to the queue-processing log.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use worklog::diag::init_tracing;
use worklog::{DEFAULT_CATEGORY, ItemStream, Store};

#[derive(Parser)]
#[command(name = "worklog", about = "Persistent queue-processing log")]
struct Cli {
    /// Path to the JSON store file
    #[arg(long, default_value = "output.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drain pending items from an input list, marking each done
    Run {
        /// Input JSON file containing a top-level list of work items
        input: PathBuf,
    },
    /// Record an item under one or more categories
    Record {
        /// The item, as a JSON value
        item: String,
        /// Target categories (repeatable)
        #[arg(long = "category", default_values_t = [DEFAULT_CATEGORY.to_string()])]
        categories: Vec<String>,
        /// Message stored with the entry
        #[arg(long)]
        message: Option<String>,
    },
    /// Check whether an item was recorded under the given categories
    Check {
        /// The item, as a JSON value
        item: String,
        /// Categories to check (repeatable)
        #[arg(long = "category", default_values_t = [DEFAULT_CATEGORY.to_string()])]
        categories: Vec<String>,
    },
    /// Mark an item done, suppressing it from future runs
    Done {
        /// The item, as a JSON value
        item: String,
        /// Message stored with the entry
        #[arg(long)]
        message: Option<String>,
    },
    /// Show categories and entry counts
    Status,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let store = Store::open(&cli.store)
        .with_context(|| format!("failed to open store at {}", cli.store.display()))?;

    match cli.command {
        Command::Run { input } => cmd_run(input, store),
        Command::Record {
            item,
            categories,
            message,
        } => {
            let item = parse_item(&item)?;
            let names: Vec<&str> = categories.iter().map(String::as_str).collect();
            let mut store = store;
            store.record(&item, &names, message.as_deref())?;
            Ok(())
        }
        Command::Check { item, categories } => {
            let item = parse_item(&item)?;
            let names: Vec<&str> = categories.iter().map(String::as_str).collect();
            if store.exists(&item, &names) {
                println!("found");
                Ok(())
            } else {
                println!("not found");
                std::process::exit(1);
            }
        }
        Command::Done { item, message } => {
            let item = parse_item(&item)?;
            let mut store = store;
            store.mark_done(&item, message.as_deref())?;
            Ok(())
        }
        Command::Status => cmd_status(&store),
    }
}

/// Drain the input queue: yield every pending item and mark it done, so the
/// next run starts where this one stopped.
fn cmd_run(input: PathBuf, store: Store) -> anyhow::Result<()> {
    let store = Rc::new(RefCell::new(store));
    let stream = ItemStream::new(input, store.clone());

    for item in stream.generate() {
        store.borrow_mut().mark_done(&item, None)?;
    }
    Ok(())
}

fn cmd_status(store: &Store) -> anyhow::Result<()> {
    println!("{:<20}  ENTRIES", "CATEGORY");
    println!("{}", "-".repeat(30));
    for (name, entries) in store.categories() {
        println!("{name:<20}  {}", entries.len());
    }
    Ok(())
}

fn parse_item(text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).context("item must be a valid JSON value")
}
