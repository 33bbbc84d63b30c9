//! Action enum — all user-initiated intents and internal events.

use podshelf_core::audio::TrackRequest;
use podshelf_core::favorites::{EpisodeMeta, ShowMeta};

/// Which page fills the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Detail,
    Favorites,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    OpenShow(String),
    Back,
    ShowView(View),

    // ── Listing ──────────────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,
    SearchChanged(String),
    SetGenreFilter(String),
    CycleSort,
    CycleSortReverse,
    NextPage,
    PrevPage,
    SetPage(usize),

    // ── Favorites ────────────────────────────────────────────────────────────
    ToggleFavorite(ShowMeta, EpisodeMeta),

    // ── Playback ─────────────────────────────────────────────────────────────
    Play(TrackRequest),
    TogglePlay,
    StopPlayback,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleTheme,
    ToggleHelp,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Reload,
    Quit,
    Resize(u16, u16),
}
