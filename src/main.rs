use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use tunet::config::snapshot::{apply_snapshot, collect_snapshot};
use tunet::config::{FileBackend, Preferences, SnapshotDocument};
use tunet::core::PageManager;
use tunet::sources::person::PersonOverrides;
use tunet::sources::{resolve_person_battery, resolve_person_location, EntitySource, StaticEntitySource};
use tunet::ui::resolve;
use tunet_core::ConfigStore;
use tunet_types::pages::HEADER_KEY;

/// Tunet - inspect and manage a Home Assistant dashboard layout
#[derive(Parser, Debug)]
#[command(name = "tunet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Storage file (defaults to the platform config directory)
    #[arg(long = "store", value_name = "PATH", global = true)]
    store: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0", global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List pages and their cards
    Show,
    /// Write a snapshot of the dashboard settings
    Export {
        /// Output file (stdout if omitted)
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Apply a snapshot file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show the grid layout for a viewport width
    Layout {
        #[arg(long = "width", value_name = "PX")]
        width: u32,
        /// Column preference (defaults to the saved one)
        #[arg(long = "columns", value_name = "N")]
        columns: Option<u32>,
        #[arg(long = "dynamic")]
        dynamic: bool,
    },
    /// Hide a visible card or show a hidden one
    Hide {
        #[arg(value_name = "CARD")]
        card: String,
    },
    /// Remove a card from a page
    RemoveCard {
        #[arg(value_name = "PAGE")]
        page: String,
        #[arg(value_name = "CARD")]
        card: String,
    },
    /// Resolve a person's location and battery from an entity dump
    Person {
        #[arg(value_name = "PERSON_ID")]
        person: String,
        /// JSON object of entity id to state
        #[arg(long = "entities", value_name = "FILE")]
        entities: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Level 0 (default): warn, 1: info, 2: debug, 3+: trace
    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting tunet v{}", env!("CARGO_PKG_VERSION"));

    let backend = match &cli.store {
        Some(path) => FileBackend::new(path),
        None => FileBackend::at_default_location()?,
    };
    info!("Using storage file {}", backend.path().display());
    let store = ConfigStore::new(backend);
    store.open().context("Failed to open storage")?;

    let result = run(cli.command, &store);
    if let Err(e) = store.close() {
        warn!("Failed to close storage: {}", e);
    }
    result
}

fn run(command: Command, store: &ConfigStore) -> Result<()> {
    match command {
        Command::Show => show(&PageManager::load(store.clone())),
        Command::Export { output } => {
            let json = collect_snapshot(store).to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Snapshot written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Command::Import { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let doc = SnapshotDocument::from_json(&content)
                .with_context(|| format!("{} is not a snapshot", file.display()))?;

            let mut manager = PageManager::load(store.clone());
            let mut prefs = Preferences::load(store.clone());
            let report = apply_snapshot(store, &doc, &mut (&mut manager, &mut prefs));
            manager.reload();
            prefs.reload();

            println!(
                "Applied {} field(s), skipped {}",
                report.applied.len(),
                report.skipped.len()
            );
            for field in &report.skipped {
                println!("  skipped malformed {}", field);
            }
            if !report.failed_writes.is_empty() {
                bail!("Failed to save: {}", report.failed_writes.join(", "));
            }
        }
        Command::Layout {
            width,
            columns,
            dynamic,
        } => {
            let columns = match columns {
                Some(columns) => columns,
                None => PageManager::load(store.clone()).grid_columns(),
            };
            let layout = resolve(width, columns, dynamic);
            println!("columns: {}", layout.column_count);
            println!("mobile: {}", layout.is_mobile);
            println!("compact cards: {}", layout.is_compact_cards);
        }
        Command::Hide { card } => {
            let mut manager = PageManager::load(store.clone());
            let hidden = manager.toggle_card_visibility(&card);
            ensure_saved(&manager)?;
            println!("{} is now {}", card, if hidden { "hidden" } else { "visible" });
        }
        Command::RemoveCard { page, card } => {
            let mut manager = PageManager::load(store.clone());
            if !manager.remove_card_from_page(&page, &card) {
                bail!("Card {} is not on page {}", card, page);
            }
            ensure_saved(&manager)?;
            println!("Removed {} from {}", card, page);
        }
        Command::Person { person, entities } => {
            let source = StaticEntitySource::from_json_file(&entities)?;
            if source.entity(&person).is_none() {
                warn!("{} not found in {}", person, entities.display());
            }
            let manager = PageManager::load(store.clone());
            let overrides = manager
                .card_settings_for(&person, "")
                .map(PersonOverrides::from_bag)
                .unwrap_or_default();

            let location = resolve_person_location(&person, source.entities(), &overrides);
            let battery = resolve_person_battery(&person, source.entities(), &overrides);
            println!("tracker: {}", location.tracked_entity_id);
            match location.coordinates() {
                Some((lat, lon)) => println!("position: {}, {}", lat, lon),
                None => println!("position: unknown"),
            }
            match battery.level {
                Some(level) => println!("battery: {}%", level),
                None => println!("battery: unknown"),
            }
        }
    }
    Ok(())
}

fn show(manager: &PageManager) {
    let config = manager.pages_config();
    let header = config.cards(HEADER_KEY);
    if !header.is_empty() {
        println!("header: {}", header.join(", "));
    }
    for page in &config.pages {
        let options = manager.page_options(page);
        let label = options.label.as_deref().unwrap_or(page);
        let mut flags = Vec::new();
        if options.hidden {
            flags.push("hidden");
        }
        if options.is_media() {
            flags.push("media");
        }
        if flags.is_empty() {
            println!("{}", label);
        } else {
            println!("{} ({})", label, flags.join(", "));
        }
        for card in config.cards(page) {
            let name = manager.custom_names().get(card).unwrap_or(card);
            let kind = manager
                .card_config(card, page)
                .map(|config| format!(" ({:?})", config.kind()))
                .unwrap_or_default();
            if manager.is_card_hidden(card) {
                println!("  - {}{} [hidden]", name, kind);
            } else {
                println!("  - {}{}", name, kind);
            }
        }
    }
    println!(
        "header font: {}",
        manager.header_settings().header_font.display_name()
    );
    println!(
        "grid: {} columns, {}px gap",
        manager.grid_columns(),
        manager.grid_gap()
    );
}

fn ensure_saved(manager: &PageManager) -> Result<()> {
    if manager.failed_writes() > 0 {
        bail!("{} change(s) could not be saved", manager.failed_writes());
    }
    Ok(())
}
