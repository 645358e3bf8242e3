//! Command-line front end for Taggable.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use taggable_lib::commands;
use taggable_lib::config::TaggableConfig;
use taggable_lib::AppState;

const APP_NAME: &str = "taggable";
const DEFAULT_JUNCTION_TABLE: &str = "item_tags";

#[derive(Parser)]
#[command(name = "taggable")]
#[command(about = "Ordered, counted tags for SQLite-backed items")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// SQLite database file
    #[arg(long, global = true, env = "TAGGABLE_DB", default_value = "taggable.db")]
    db: PathBuf,

    /// JSON tagging configuration (defaults link items through `item_tags`)
    #[arg(long, global = true, env = "TAGGABLE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the rolling log file
    #[arg(long, global = true, env = "TAGGABLE_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an item
    Add {
        /// Item text
        text: String,
        /// Delimited tag list, e.g. "red, green"
        #[arg(long, short)]
        tags: Option<String>,
    },
    /// Replace an item's tags
    Tag {
        id: i64,
        /// Delimited tag list; empty removes all tags
        tags: String,
    },
    /// Show one item with its tags
    Show { id: i64 },
    /// List items with their tags
    List,
    /// List items carrying a tag
    Owners {
        tag_id: i64,
        /// Only items whose text contains this string
        #[arg(long)]
        contains: Option<String>,
    },
    /// List tags with usage counts
    Tags,
    /// Autocomplete tag names (JSON)
    Suggest { term: String },
    /// Render an item's tags as HTML links
    Links { id: i64 },
    /// Delete an item
    Rm { id: i64 },
    /// Delete a tag everywhere
    RmTag { id: i64 },
}

fn load_config(path: Option<&PathBuf>) -> Result<TaggableConfig> {
    match path {
        Some(path) => TaggableConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(TaggableConfig::new(DEFAULT_JUNCTION_TABLE)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(state: &AppState, command: Commands) -> std::result::Result<(), String> {
    match command {
        Commands::Add { text, tags } => {
            let item = commands::create_item(state, text, tags).await?;
            println!("{}", item.id);
        }
        Commands::Tag { id, tags } => {
            let report = commands::set_item_tags(state, id, tags).await?;
            println!(
                "created {}, added {}, removed {}, reordered {}",
                report.created, report.added, report.removed, report.reordered
            );
        }
        Commands::Show { id } => {
            let item = commands::load_item(state, id)
                .await?
                .ok_or_else(|| format!("Item {} not found", id))?;
            print_json(&item).map_err(|e| e.to_string())?;
        }
        Commands::List => {
            for item in commands::list_items(state).await? {
                println!("{}\t{}\t[{}]", item.id, item.text, item.tag_text);
            }
        }
        Commands::Owners { tag_id, contains } => {
            for item in commands::get_items_by_tag(state, tag_id, contains).await? {
                println!("{}\t{}", item.id, item.text);
            }
        }
        Commands::Tags => {
            for tag in commands::list_tags(state).await? {
                let count = commands::tag_usage(state, tag.id).await?;
                println!("{}\t{}\t{}", tag.id, tag.name, count);
            }
        }
        Commands::Suggest { term } => {
            println!("{}", commands::suggest_tags(state, &term).await?);
        }
        Commands::Links { id } => {
            println!("{}", commands::tag_links_for_item(state, id).await?);
        }
        Commands::Rm { id } => commands::delete_item(state, id).await?,
        Commands::RmTag { id } => commands::delete_tag(state, id).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { global, command } = Cli::parse();

    if let Some(dir) = &global.log_dir {
        rolling_logger::init_logger(dir, APP_NAME).map_err(|e| anyhow!(e))?;
    }

    let config = load_config(global.config.as_ref())?;
    let state = AppState::open(&global.db, config)
        .await
        .with_context(|| format!("failed to open {}", global.db.display()))?;

    if let Err(e) = run(&state, command).await {
        log::error!("{}", e);
        return Err(anyhow!(e));
    }
    Ok(())
}
