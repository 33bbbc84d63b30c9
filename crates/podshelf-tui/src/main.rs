mod action;
mod app;
mod app_state;
mod component;
mod components;
mod player;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, LeaveAlternateScreen},
};

use podshelf_core::api::CatalogClient;
use podshelf_core::audio::AudioSelection;
use podshelf_core::config::Config;
use podshelf_core::favorites::FavoritesStore;
use podshelf_core::genres::GenreTable;
use podshelf_core::listing::ListingEngine;
use podshelf_core::settings::Theme;
use podshelf_core::storage::{FileStore, KeyValueStore, Slot, AUDIO_KEY, FAVORITES_KEY, THEME_KEY};

use crate::action::View;
use crate::app_state::{AppState, DetailState, InputMode};
use crate::player::Player;

#[derive(Parser, Debug)]
#[command(name = "podshelf", version, about = "Browse and play podcasts in the terminal")]
struct Cli {
    /// Path to config.toml (default: ~/.config/podshelf/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the catalog API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Do not start mpv; selection and the player bar still work
    #[arg(long)]
    no_audio: bool,
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen);
        tracing::error!("panic: {}", info);
        previous(info);
    }));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if cli.no_audio {
        config.player.enabled = false;
    }

    let data_dir = config.paths.data_dir.clone();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let log_path = data_dir.join("podshelf.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("podshelf log: {}", log_path.display());
    tracing::info!("podshelf starting… api={}", config.api.base_url);

    install_panic_hook();

    // ── Stores ───────────────────────────────────────────────────────────────
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&data_dir));
    let favorites = FavoritesStore::load(Slot::new(Arc::clone(&kv), FAVORITES_KEY));
    let audio = AudioSelection::load(Slot::new(Arc::clone(&kv), AUDIO_KEY));
    let theme_slot: Slot<Theme> = Slot::new(kv, THEME_KEY);
    let theme = theme_slot.load();

    let listing = ListingEngine::new(config.listing.clone(), GenreTable::builtin());
    let client = CatalogClient::new(&config.api).context("building HTTP client")?;

    // ── Audio output ─────────────────────────────────────────────────────────
    let player = if config.player.enabled {
        Player::start(config.player.volume, &data_dir).await
    } else {
        tracing::info!("audio output disabled");
        Player::disabled()
    };

    let state = AppState {
        listing,
        favorites,
        audio,
        catalog_loading: false,
        catalog_error: None,
        detail: DetailState::default(),
        view: View::Home,
        input_mode: InputMode::Normal,
        theme,
        player_available: player.is_available(),
    };

    // ── Run TUI ──────────────────────────────────────────────────────────────
    app::App::new(state, client, player, theme_slot).run().await?;

    Ok(())
}
