//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this for the stores and fetch status, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use podshelf_core::audio::AudioSelection;
use podshelf_core::favorites::FavoritesStore;
use podshelf_core::listing::ListingEngine;
use podshelf_core::model::Show;
use podshelf_core::settings::Theme;

use crate::action::View;
use crate::theme::{palette, Palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Filter,
}

/// Status of a single fetched resource.
#[derive(Debug, Clone)]
pub struct Loadable<T> {
    pub value: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Self {
            value: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> Loadable<T> {
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn finish(&mut self, value: T) {
        self.value = Some(value);
        self.loading = false;
        self.error = None;
    }

    pub fn fail(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }
}

/// The open show: detail fetch plus its resolved genre titles.
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub show_id: Option<String>,
    pub show: Loadable<Show>,
    pub genre_titles: Vec<String>,
}

pub struct AppState {
    // ── Stores ──────────────────────────────────────────────────────────────
    pub listing: ListingEngine,
    pub favorites: FavoritesStore,
    pub audio: AudioSelection,

    // ── Fetch status ────────────────────────────────────────────────────────
    pub catalog_loading: bool,
    pub catalog_error: Option<String>,
    pub detail: DetailState,

    // ── UI mode ─────────────────────────────────────────────────────────────
    pub view: View,
    pub input_mode: InputMode,
    pub theme: Theme,

    /// False when mpv could not be started; selection still works.
    pub player_available: bool,
}

impl AppState {
    pub fn palette(&self) -> &'static Palette {
        palette(self.theme)
    }

    /// Catalog entry for `id`, used for the detail header while loading.
    pub fn catalog_show(&self, id: &str) -> Option<&Show> {
        self.listing.catalog().iter().find(|s| s.id == id)
    }
}
