//! ShowGrid component — the home page.
//!
//! Search bar, genre and sort selectors, the current page of show cards and
//! the pagination bar. All listing state lives in the `ListingEngine`; this
//! component only keeps the card cursor and the search input.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use podshelf_core::format::format_updated;
use podshelf_core::model::Show;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::Palette,
    widgets::{
        filter_input::{FilterAction, FilterInput},
        fit_width, pagination,
    },
};

const CARD_MIN_WIDTH: u16 = 28;
const CARD_HEIGHT: u16 = 6;
const CARD_MIN_HEIGHT: u16 = 3;
const MAX_COLUMNS: u16 = 4;

pub struct ShowGrid {
    filter_input: FilterInput,
    /// Index of the highlighted card within the current page.
    cursor: usize,
    /// Columns used by the last draw, for up/down movement.
    columns: usize,
}

impl ShowGrid {
    pub fn new() -> Self {
        Self {
            filter_input: FilterInput::new("search shows by title…"),
            cursor: 0,
            columns: 1,
        }
    }

    fn page_len(state: &AppState) -> usize {
        state.listing.view().items.len()
    }

    fn move_cursor(&mut self, delta: isize, state: &AppState) {
        let len = Self::page_len(state);
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn selected<'a>(&self, state: &'a AppState) -> Option<&'a Show> {
        state.listing.view().items.get(self.cursor).copied()
    }
}

impl Component for ShowGrid {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if self.filter_input.is_active() {
            return match self.filter_input.handle_key(key) {
                FilterAction::Changed(text) => vec![Action::SearchChanged(text)],
                FilterAction::Confirmed | FilterAction::Cancelled => vec![Action::CloseFilter],
                FilterAction::None => vec![],
            };
        }

        let genres = state.listing.genres();
        let filter = &state.listing.params().genre_filter;
        match key.code {
            KeyCode::Char('/') => vec![Action::OpenFilter],
            KeyCode::Char('g') => vec![Action::SetGenreFilter(genres.next_filter(filter))],
            KeyCode::Char('G') => vec![Action::SetGenreFilter(genres.prev_filter(filter))],
            KeyCode::Char('s') => vec![Action::CycleSort],
            KeyCode::Char('S') => vec![Action::CycleSortReverse],
            KeyCode::PageDown | KeyCode::Char(']') => vec![Action::NextPage],
            KeyCode::PageUp | KeyCode::Char('[') => vec![Action::PrevPage],
            KeyCode::Char(c @ '1'..='9') if key.modifiers == KeyModifiers::NONE => {
                vec![Action::SetPage(c as usize - '0' as usize)]
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.move_cursor(-1, state);
                vec![]
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.move_cursor(1, state);
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-(self.columns as isize), state);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(self.columns as isize, state);
                vec![]
            }
            KeyCode::Home => {
                self.cursor = 0;
                vec![]
            }
            KeyCode::End => {
                self.cursor = Self::page_len(state).saturating_sub(1);
                vec![]
            }
            KeyCode::Enter => match self.selected(state) {
                Some(show) => vec![Action::OpenShow(show.id.clone())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenFilter => self.filter_input.activate(),
            Action::CloseFilter => self.filter_input.deactivate(),
            Action::SearchChanged(_)
            | Action::SetGenreFilter(_)
            | Action::CycleSort
            | Action::CycleSortReverse
            | Action::NextPage
            | Action::PrevPage
            | Action::SetPage(_)
            | Action::Reload => self.cursor = 0,
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let p = state.palette();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_controls(frame, rows[0], rows[1], state, p);

        let view = state.listing.view();
        let body = rows[2];

        if let Some(err) = &state.catalog_error {
            let msg = Paragraph::new(Line::from(Span::styled(
                format!("Error occurred while fetching podcasts: {}", err),
                ratatui::style::Style::default().fg(p.error),
            )))
            .wrap(Wrap { trim: true });
            frame.render_widget(msg, inset(body));
            return;
        }
        if state.catalog_loading && state.listing.catalog_len() == 0 {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading podcasts…", p.style_secondary())),
                inset(body),
            );
            return;
        }
        if view.items.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No podcasts match your filters.", p.style_secondary())),
                inset(body),
            );
            return;
        }

        self.cursor = self.cursor.min(view.items.len() - 1);
        let columns = (body.width / CARD_MIN_WIDTH).clamp(1, MAX_COLUMNS) as usize;
        self.columns = columns;
        let card_w = body.width / columns as u16;
        let card_rows = view.items.len().div_ceil(columns) as u16;
        // Shrink cards on short terminals so the whole page stays visible.
        let card_h = (body.height / card_rows.max(1)).clamp(CARD_MIN_HEIGHT, CARD_HEIGHT);
        let genres = state.listing.genres();

        for (i, show) in view.items.iter().enumerate() {
            let col = (i % columns) as u16;
            let row = (i / columns) as u16;
            let y = body.y + row * card_h;
            if y + card_h > body.y + body.height {
                break;
            }
            let card = Rect {
                x: body.x + col * card_w,
                y,
                width: card_w,
                height: card_h,
            };
            draw_card(frame, card, show, &genres.titles_for(show), i == self.cursor, focused, p);
        }

        pagination::draw(frame, rows[3], view.current_page, view.total_pages, p);
    }
}

impl ShowGrid {
    fn draw_controls(
        &self,
        frame: &mut Frame,
        search_area: Rect,
        status_area: Rect,
        state: &AppState,
        p: &Palette,
    ) {
        self.filter_input.draw(frame, search_area, p);

        let params = state.listing.params();
        let view = state.listing.view();
        let line = Line::from(vec![
            Span::styled(" genre ", p.style_muted()),
            Span::styled(
                state.listing.genres().filter_label(&params.genre_filter),
                p.style_tag(),
            ),
            Span::styled("  sort ", p.style_muted()),
            Span::styled(params.sort_key.label(), p.style_tag()),
            Span::styled(
                format!(
                    "  {} results · page {}/{}",
                    view.total_count, view.current_page, view.total_pages
                ),
                p.style_secondary(),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), status_area);
    }
}

fn draw_card(
    frame: &mut Frame,
    area: Rect,
    show: &Show,
    genre_titles: &[String],
    selected: bool,
    focused: bool,
    p: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.style_border(selected && focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let title_style = if selected {
        p.style_selected(focused)
    } else {
        p.style_title()
    };
    let seasons = show.season_count();
    let width = inner.width as usize;
    let lines = vec![
        Line::from(Span::styled(fit_width(&show.title, width), title_style)),
        Line::from(Span::styled(
            format!("{} season{}", seasons, if seasons == 1 { "" } else { "s" }),
            p.style_secondary(),
        )),
        Line::from(Span::styled(fit_width(&genre_titles.join(" · "), width), p.style_tag())),
        Line::from(Span::styled(
            format!("Updated {}", format_updated(&show.updated)),
            p.style_muted().add_modifier(Modifier::ITALIC),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(1),
    }
}
