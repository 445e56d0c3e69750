use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use tagfeed::config::Config;
use tagfeed::freshness::freshness;
use tagfeed::storage::{Feed, FeedItem, JsonFileStorage, MemoryStorage, Persistence};
use tagfeed::store::{PreferencesPatch, Store};
use tagfeed::util::{single_line, truncate_to_width};
use tagfeed::view::FeedView;

/// Get the config directory path (~/.config/tagfeed/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("tagfeed"))
}

#[derive(Parser, Debug)]
#[command(name = "tagfeed", about = "Tag-ranked feed dashboard")]
struct Args {
    /// Discard persisted feeds and preferences before running the command
    #[arg(long)]
    reset: bool,

    /// Config file (defaults to ~/.config/tagfeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter and rank a batch of feed items (JSON array) and print the result
    Show {
        /// JSON file produced by the feed fetcher
        #[arg(long, value_name = "FILE")]
        items: PathBuf,

        /// Maximum title width in columns
        #[arg(long, default_value_t = 72)]
        width: usize,
    },
    /// Manage subscribed feeds
    Feeds {
        #[command(subcommand)]
        action: FeedsAction,
    },
    /// Toggle the bookmark on an item
    Bookmark { item_id: String },
    /// Toggle the read state of an item
    Read { item_id: String },
    /// Manage search tags
    Tags {
        #[command(subcommand)]
        action: TagsAction,
    },
    /// Manage tag presets
    Presets {
        #[command(subcommand)]
        action: PresetsAction,
    },
    /// Replace the selected categories
    Categories { categories: Vec<String> },
    /// Switch between light and dark theme
    Theme,
    /// Print current preferences as JSON
    Prefs,
}

#[derive(Subcommand, Debug)]
enum FeedsAction {
    List,
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        category: String,
    },
    Remove {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum TagsAction {
    List,
    Add { tag: String },
    Remove { tag: String },
}

#[derive(Subcommand, Debug)]
enum PresetsAction {
    List,
    Add {
        name: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    Remove {
        id: String,
    },
    Apply {
        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let mut storage: Box<dyn Persistence> = if config.persist {
        let data_dir = config.data_dir_or(&config_dir);
        tracing::debug!(dir = %data_dir.display(), "Using file storage");
        Box::new(JsonFileStorage::new(data_dir))
    } else {
        tracing::debug!("Persistence disabled, state lives in memory");
        Box::new(MemoryStorage::new())
    };

    if args.reset {
        storage
            .remove(&config.storage_name)
            .context("Failed to reset persisted state")?;
        println!("Persisted state reset.");
    }

    let mut store = Store::open(storage, config.storage_name.clone());
    run(&mut store, args.command)
}

fn run<P: Persistence>(store: &mut Store<P>, command: Command) -> Result<()> {
    match command {
        Command::Show { items, width } => {
            let batch = load_items(&items)?;
            store.set_feed_items(batch);
            print_view(&store.view(), width);
        }
        Command::Feeds { action } => match action {
            FeedsAction::List => {
                for feed in store.feeds() {
                    println!("{}\t{}\t{}\t{}", feed.id, feed.category, feed.title, feed.url);
                }
            }
            FeedsAction::Add {
                id,
                title,
                url,
                category,
            } => {
                store.add_feed(Feed {
                    id,
                    title,
                    url,
                    category,
                });
                println!("{} feeds", store.feeds().len());
            }
            FeedsAction::Remove { id } => {
                store.remove_feed(&id);
                println!("{} feeds", store.feeds().len());
            }
        },
        Command::Bookmark { item_id } => {
            let on = store.toggle_bookmark(&item_id).preferences.is_bookmarked(&item_id);
            println!("{item_id}: {}", if on { "bookmarked" } else { "not bookmarked" });
        }
        Command::Read { item_id } => {
            let on = store.toggle_read(&item_id).preferences.is_read(&item_id);
            println!("{item_id}: {}", if on { "read" } else { "unread" });
        }
        Command::Tags { action } => {
            match action {
                TagsAction::List => {}
                TagsAction::Add { tag } => {
                    store.add_search_tag(&tag);
                }
                TagsAction::Remove { tag } => {
                    store.remove_search_tag(&tag);
                }
            }
            println!("{}", store.preferences().search_tags.join(", "));
        }
        Command::Presets { action } => match action {
            PresetsAction::List => {
                for preset in &store.preferences().tag_presets {
                    println!("{}\t{}\t{}", preset.id, preset.name, preset.tags.join(", "));
                }
            }
            PresetsAction::Add { name, tags } => {
                let id = store.add_tag_preset(&name, tags);
                println!("{id}");
            }
            PresetsAction::Remove { id } => {
                store.remove_tag_preset(&id);
            }
            PresetsAction::Apply { id } => {
                if store.preferences().find_preset(&id).is_none() {
                    tracing::info!(preset = %id, "No such preset");
                }
                store.apply_tag_preset(&id);
                println!("{}", store.preferences().search_tags.join(", "));
            }
        },
        Command::Categories { categories } => {
            store.update_preferences(PreferencesPatch {
                selected_categories: Some(categories),
                ..Default::default()
            });
            println!("{}", store.preferences().selected_categories.join(", "));
        }
        Command::Theme => {
            println!("{}", store.toggle_theme().preferences.theme);
        }
        Command::Prefs => {
            let json = serde_json::to_string_pretty(store.preferences())
                .context("Failed to encode preferences")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn load_items(path: &Path) -> Result<Vec<FeedItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file: {}", path.display()))?;
    let items: Vec<FeedItem> = serde_json::from_str(&content)
        .with_context(|| format!("Items file is not a JSON array of feed items: {}", path.display()))?;
    tracing::info!(count = items.len(), "Loaded feed items");
    Ok(items)
}

fn print_view(view: &FeedView<'_>, width: usize) {
    match view {
        FeedView::Loading => println!("Loading..."),
        FeedView::NoMatches => {
            println!("No articles match your selected tags");
            println!("Try adjusting your search tags or categories");
        }
        FeedView::Items(items) => {
            for ranked in items {
                let item = ranked.item;
                let title = single_line(&item.title);
                let read = if ranked.is_read { "✓" } else { "·" };
                let mark = if ranked.is_bookmarked { "★" } else { " " };
                let age = freshness(&item.pub_date)
                    .map(|f| f.to_string())
                    .unwrap_or_default();

                println!(
                    "{read}{mark} {}  [{}] {age}",
                    truncate_to_width(&title, width),
                    single_line(&item.category)
                );
                if !ranked.matched_tags.is_empty() {
                    let tags: Vec<String> =
                        ranked.matched_tags.iter().map(|t| format!("#{t}")).collect();
                    println!("   {}", tags.join(" "));
                }
                println!("   {}", single_line(&item.link));
            }
        }
    }
}
