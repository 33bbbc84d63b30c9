//! App — component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks:
//!   terminal input and catalog fetches.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action and is the
//!   only writer of the stores.
//! - Every fetch holds a `Ticket` from its `RequestSlot`; a result whose ticket
//!   has been superseded is dropped.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use podshelf_core::api::CatalogClient;
use podshelf_core::audio::{PlayerState, TrackRequest};
use podshelf_core::error::PodError;
use podshelf_core::favorites::ToggleOutcome;
use podshelf_core::model::Show;
use podshelf_core::settings::Theme;
use podshelf_core::slot::{RequestSlot, Ticket};
use podshelf_core::storage::Slot;

use crate::{
    action::{Action, View},
    app_state::{AppState, DetailState, InputMode},
    component::Component,
    components::{
        favorites_panel::FavoritesPanel,
        header::Header,
        help_overlay::HelpOverlay,
        player_bar::{PlayerBar, PLAYER_BAR_HEIGHT},
        show_detail::ShowDetail,
        show_grid::ShowGrid,
    },
    player::Player,
    widgets::toast::ToastManager,
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    CatalogLoaded(Ticket, Result<Vec<Show>, PodError>),
    ShowLoaded(Ticket, Result<Show, PodError>),
    GenreTitles(Ticket, Result<Vec<String>, PodError>),
}

/// How long the event reader blocks before rechecking its stop flag.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Forwards terminal events until `stop` is set or the receiver is gone.
fn pump_terminal_events<F>(tx: mpsc::Sender<AppMessage>, stop: Arc<AtomicBool>, mut poll: F)
where
    F: FnMut(Duration) -> io::Result<Option<Event>>,
{
    while !stop.load(Ordering::Relaxed) {
        match poll(EVENT_POLL_INTERVAL) {
            Ok(Some(ev)) => {
                if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!("terminal event read failed: {}", e);
                break;
            }
        }
    }
    debug!("event reader exiting");
}

fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

pub struct App {
    state: AppState,
    client: CatalogClient,
    player: Player,
    theme_slot: Slot<Theme>,

    catalog_req: RequestSlot,
    detail_req: RequestSlot,
    genre_req: RequestSlot,
    tx: Option<mpsc::Sender<AppMessage>>,

    /// Selection id currently loaded into mpv, if any.
    loaded_selection: Option<String>,
    /// Where `Back` returns to from the detail view.
    return_view: View,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    show_grid: ShowGrid,
    show_detail: ShowDetail,
    favorites_panel: FavoritesPanel,
    player_bar: PlayerBar,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    should_quit: bool,
}

impl App {
    pub fn new(state: AppState, client: CatalogClient, player: Player, theme_slot: Slot<Theme>) -> Self {
        Self {
            state,
            client,
            player,
            theme_slot,
            catalog_req: RequestSlot::new(),
            detail_req: RequestSlot::new(),
            genre_req: RequestSlot::new(),
            tx: None,
            loaded_selection: None,
            return_view: View::Home,
            header: Header::new(),
            show_grid: ShowGrid::new(),
            show_detail: ShowDetail::new(),
            favorites_panel: FavoritesPanel::new(),
            player_bar: PlayerBar::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());

        // ── Background task: terminal events ──────────────────────────────────
        let event_tx = tx.clone();
        let stop_events = Arc::new(AtomicBool::new(false));
        let events_stopped = Arc::clone(&stop_events);
        let event_reader = tokio::task::spawn_blocking(move || {
            pump_terminal_events(event_tx, events_stopped, poll_terminal)
        });

        if let Ok(size) = terminal.size() {
            self.state.listing.set_viewport_columns(size.width);
        }
        self.load_catalog();

        // Toast expiry check
        let mut toast_tick = tokio::time::interval(Duration::from_millis(250));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg).await;
                    // Drain whatever else is queued before the next frame.
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next).await;
                    }
                    needs_redraw = true;
                }
                _ = toast_tick.tick() => {
                    needs_redraw = self.toast.tick();
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        stop_events.store(true, Ordering::Relaxed);
        let _ = event_reader.await;
        self.player.shutdown().await;
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("podshelf exiting");

        Ok(())
    }

    // ── Message handler ───────────────────────────────────────────────────────

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a).await;
                    }
                }
                Event::Resize(w, h) => self.dispatch(Action::Resize(w, h)).await,
                _ => {}
            },

            AppMessage::CatalogLoaded(ticket, result) => {
                if !self.catalog_req.accepts(&ticket) {
                    debug!("dropping stale catalog result");
                    return;
                }
                self.state.catalog_loading = false;
                match result {
                    Ok(shows) => {
                        info!("catalog loaded: {} shows", shows.len());
                        self.state.catalog_error = None;
                        self.state.listing.set_catalog(shows);
                    }
                    Err(e) => {
                        warn!("catalog fetch failed: {}", e);
                        self.state.catalog_error = Some(e.to_string());
                    }
                }
            }

            AppMessage::ShowLoaded(ticket, result) => {
                if !self.detail_req.accepts(&ticket) {
                    debug!("dropping stale detail result for {}", ticket.key());
                    return;
                }
                match result {
                    Ok(show) => {
                        self.resolve_genres(&show);
                        self.state.detail.show.finish(show);
                    }
                    Err(e) => {
                        warn!("show {} fetch failed: {}", ticket.key(), e);
                        self.state.detail.show.fail(e.to_string());
                    }
                }
            }

            AppMessage::GenreTitles(ticket, result) => {
                if !self.genre_req.accepts(&ticket) {
                    debug!("dropping stale genre titles for {}", ticket.key());
                    return;
                }
                // Already logged by the client; no tags is the fallback.
                self.state.detail.genre_titles = result.unwrap_or_default();
            }
        }
    }

    // ── Fetches ───────────────────────────────────────────────────────────────

    fn load_catalog(&mut self) {
        let Some(tx) = self.tx.clone() else { return };
        self.state.catalog_loading = true;
        self.state.catalog_error = None;
        let ticket = self.catalog_req.begin("catalog");
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.fetch_catalog().await;
            let _ = tx.send(AppMessage::CatalogLoaded(ticket, result)).await;
        });
    }

    fn load_show(&mut self, id: &str) {
        let Some(tx) = self.tx.clone() else { return };
        let detail = &mut self.state.detail;
        if detail.show.value.as_ref().is_some_and(|s| s.id != id) {
            *detail = DetailState::default();
        }
        detail.show_id = Some(id.to_string());
        detail.show.start();
        detail.genre_titles.clear();
        self.genre_req.cancel();

        let ticket = self.detail_req.begin(id);
        let client = self.client.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let result = client.fetch_show(&id).await;
            let _ = tx.send(AppMessage::ShowLoaded(ticket, result)).await;
        });
    }

    fn resolve_genres(&mut self, show: &Show) {
        let Some(tx) = self.tx.clone() else { return };
        let ticket = self.genre_req.begin(show.id.clone());
        let client = self.client.clone();
        let show = show.clone();
        tokio::spawn(async move {
            let result = client.resolve_genre_titles(&show).await;
            let _ = tx.send(AppMessage::GenreTitles(ticket, result)).await;
        });
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('t') => return vec![Action::ToggleTheme],
                KeyCode::Char('r') => return vec![Action::Reload],
                KeyCode::Char(' ') => return vec![Action::TogglePlay],
                KeyCode::Char('x') => return vec![Action::StopPlayback],
                KeyCode::Tab | KeyCode::BackTab => {
                    let target = match self.state.view {
                        View::Favorites => View::Home,
                        View::Home | View::Detail => View::Favorites,
                    };
                    return vec![Action::ShowView(target)];
                }
                _ => {}
            }
        }

        let state = &self.state;
        match state.view {
            View::Home => self.show_grid.handle_key(key, state),
            View::Detail => self.show_detail.handle_key(key, state),
            View::Favorites => self.favorites_panel.handle_key(key, state),
        }
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        // Broadcast action to all components first
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.show_grid.on_action(&action, s));
            out.extend(self.show_detail.on_action(&action, s));
            out.extend(self.favorites_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action).await;

        // Dispatch any secondary actions (depth-limited to 1 level)
        for a in secondary {
            self.apply_action(a).await;
        }
    }

    async fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Navigation ────────────────────────────────────────────────────
            Action::OpenShow(id) => {
                if self.state.view != View::Detail {
                    self.return_view = self.state.view;
                }
                self.state.view = View::Detail;
                self.load_show(&id);
            }
            Action::Back => match self.state.view {
                View::Detail => {
                    self.detail_req.cancel();
                    self.genre_req.cancel();
                    self.state.detail.show.loading = false;
                    self.state.view = self.return_view;
                }
                View::Favorites => self.state.view = View::Home,
                View::Home => {}
            },
            Action::ShowView(view) => {
                if self.state.view == View::Detail {
                    self.detail_req.cancel();
                    self.genre_req.cancel();
                    self.state.detail.show.loading = false;
                }
                self.state.view = view;
            }

            // ── Listing ───────────────────────────────────────────────────────
            Action::OpenFilter => self.state.input_mode = InputMode::Filter,
            Action::CloseFilter => self.state.input_mode = InputMode::Normal,
            Action::SearchChanged(text) => self.state.listing.set_search_text(text),
            Action::SetGenreFilter(value) => self.state.listing.set_genre_filter(value),
            Action::CycleSort => {
                let next = self.state.listing.params().sort_key.next();
                self.state.listing.set_sort(next);
            }
            Action::CycleSortReverse => {
                let prev = self.state.listing.params().sort_key.prev();
                self.state.listing.set_sort(prev);
            }
            Action::NextPage => self.state.listing.next_page(),
            Action::PrevPage => self.state.listing.prev_page(),
            Action::SetPage(page) => self.state.listing.set_page(page),

            // ── Favorites ─────────────────────────────────────────────────────
            Action::ToggleFavorite(show, episode) => {
                let title = episode.title.clone();
                let outcome = self.state.favorites.toggle_favorite(show, episode);
                if let Err(e) = self.state.favorites.persist() {
                    warn!("failed to save favorites: {}", e);
                    self.toast.error(format!("could not save favorites: {}", e));
                }
                match outcome {
                    ToggleOutcome::Added => self.toast.success(format!("♥ {}", title)),
                    ToggleOutcome::Removed => self.toast.info(format!("removed {}", title)),
                }
            }

            // ── Playback ──────────────────────────────────────────────────────
            Action::Play(request) => self.play(request),
            Action::TogglePlay => {
                if self.state.audio.state() == PlayerState::Idle {
                    return;
                }
                self.state.audio.toggle_play();
                if self.state.audio.is_playing() {
                    self.resume();
                } else {
                    self.player.set_pause(true);
                }
            }
            Action::StopPlayback => {
                self.state.audio.stop();
                self.player.stop();
                self.loaded_selection = None;
            }

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleTheme => {
                self.state.theme = self.state.theme.toggled();
                if let Err(e) = self.theme_slot.save(&self.state.theme) {
                    warn!("failed to save theme: {}", e);
                }
            }
            Action::ToggleHelp => {}
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        // Truncate for toast display
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            // ── System ────────────────────────────────────────────────────────
            Action::Reload => {
                self.load_catalog();
                if self.state.view == View::Detail {
                    if let Some(id) = self.state.detail.show_id.clone() {
                        self.load_show(&id);
                    }
                }
            }
            Action::Quit => self.should_quit = true,
            Action::Resize(w, _) => self.state.listing.set_viewport_columns(w),
        }
    }

    fn play(&mut self, request: TrackRequest) {
        if !self.state.audio.select(request) {
            self.toast.warning("this episode has no audio file");
            return;
        }
        if let Err(e) = self.state.audio.persist() {
            warn!("failed to save audio selection: {}", e);
        }
        if let Some(track) = self.state.audio.current() {
            info!("playing {} ({})", track.title, track.src);
            self.player.load(&track.src);
            self.loaded_selection = Some(track.selection_id.clone());
        }
    }

    /// Unpause, loading the source first when mpv does not have it yet
    /// (restored selection, or after a stop).
    fn resume(&mut self) {
        let Some(track) = self.state.audio.current() else { return };
        if self.loaded_selection.as_deref() == Some(track.selection_id.as_str()) {
            self.player.set_pause(false);
        } else {
            self.player.load(&track.src);
            self.loaded_selection = Some(track.selection_id.clone());
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let p = self.state.palette();
        frame.render_widget(Block::default().style(p.style_default().bg(p.bg)), area);

        let player_h = if self.state.audio.state() == PlayerState::Idle {
            0
        } else {
            PLAYER_BAR_HEIGHT
        };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(player_h),
            ])
            .split(area);

        let state = &self.state;
        self.header.draw(frame, outer[0], false, state);

        let body = Rect {
            x: outer[1].x + 1,
            width: outer[1].width.saturating_sub(2),
            ..outer[1]
        };
        let focused = !self.help_overlay.visible;
        match state.view {
            View::Home => self.show_grid.draw(frame, body, focused, state),
            View::Detail => self.show_detail.draw(frame, body, focused, state),
            View::Favorites => self.favorites_panel.draw(frame, body, focused, state),
        }

        self.player_bar.draw(frame, outer[2], false, state);
        self.help_overlay.draw(frame, area, true, state);
        self.toast.draw(frame, area, p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_reader_stops_without_further_input() {
        let (tx, mut rx) = mpsc::channel(8);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let mut calls = 0;
        pump_terminal_events(tx, Arc::clone(&stop), move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(Event::Resize(80, 24)))
            } else {
                // Quit happens while the reader is idle.
                flag.store(true, Ordering::Relaxed);
                Ok(None)
            }
        });

        assert!(matches!(rx.try_recv(), Ok(AppMessage::Event(Event::Resize(80, 24)))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_reader_exits_when_app_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let stop = Arc::new(AtomicBool::new(false));
        pump_terminal_events(tx, stop, |_| Ok(Some(Event::FocusGained)));
    }

    #[test]
    fn test_event_reader_exits_on_read_error() {
        let (tx, _rx) = mpsc::channel(1);
        let stop = Arc::new(AtomicBool::new(false));
        pump_terminal_events(tx, stop, |_| Err(io::Error::other("tty gone")));
    }
}
