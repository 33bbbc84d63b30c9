//! FavoritesPanel component — saved episodes grouped by show.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use podshelf_core::audio::TrackRequest;
use podshelf_core::favorites::{
    EpisodeMeta, FavoriteEntry, FavoriteShowGroup, FavoriteSort, ShowMeta,
};
use podshelf_core::format::format_added_at;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Group(usize),
    Entry(usize, usize),
}

pub struct FavoritesPanel {
    sort: FavoriteSort,
    list_state: ListState,
}

impl FavoritesPanel {
    pub fn new() -> Self {
        Self {
            sort: FavoriteSort::default(),
            list_state: ListState::default(),
        }
    }

    fn rows(groups: &[FavoriteShowGroup]) -> Vec<Row> {
        let mut rows = Vec::new();
        for (gi, group) in groups.iter().enumerate() {
            rows.push(Row::Group(gi));
            rows.extend((0..group.episodes.len()).map(|ei| Row::Entry(gi, ei)));
        }
        rows
    }

    fn selected<'a>(
        &self,
        groups: &'a [FavoriteShowGroup],
    ) -> Option<(&'a FavoriteShowGroup, Option<&'a FavoriteEntry>)> {
        let rows = Self::rows(groups);
        match rows.get(self.list_state.selected()?)? {
            Row::Group(gi) => Some((groups.get(*gi)?, None)),
            Row::Entry(gi, ei) => {
                let group = groups.get(*gi)?;
                Some((group, Some(group.episodes.get(*ei)?)))
            }
        }
    }

    fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.list_state.select(Some(next as usize));
    }
}

fn metas(group: &FavoriteShowGroup, entry: &FavoriteEntry) -> (ShowMeta, EpisodeMeta) {
    (
        ShowMeta {
            id: group.show_id.clone(),
            title: group.show_title.clone(),
            image: group.show_image.clone(),
        },
        EpisodeMeta {
            id: entry.episode_id.clone(),
            title: entry.episode_title.clone(),
            season_number: entry.season_number,
            episode_number: entry.episode_number,
            season_image: entry.season_image.clone(),
            src: entry.episode_src.clone(),
        },
    )
}

impl Component for FavoritesPanel {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let groups = state.favorites.groups(self.sort);
        let len = Self::rows(&groups).len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1, len);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1, len);
                vec![]
            }
            KeyCode::Home => {
                self.move_cursor(-(len as isize), len);
                vec![]
            }
            KeyCode::End => {
                self.move_cursor(len as isize, len);
                vec![]
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.next();
                vec![]
            }
            KeyCode::Esc | KeyCode::Backspace => vec![Action::Back],
            KeyCode::Enter => match self.selected(&groups) {
                Some((group, None)) => vec![Action::OpenShow(group.show_id.clone())],
                Some((group, Some(entry))) => vec![Action::Play(TrackRequest {
                    src: entry.episode_src.clone().unwrap_or_default(),
                    title: entry.episode_title.clone(),
                    show_title: Some(group.show_title.clone()),
                    season_number: Some(entry.season_number),
                    episode_number: Some(entry.episode_number),
                })],
                None => vec![],
            },
            KeyCode::Char('f') | KeyCode::Char('d') | KeyCode::Delete => {
                match self.selected(&groups) {
                    Some((group, Some(entry))) => {
                        let (show, episode) = metas(group, entry);
                        vec![Action::ToggleFavorite(show, episode)]
                    }
                    _ => vec![],
                }
            }
            KeyCode::Char('y') => match self.selected(&groups) {
                Some((_, Some(entry))) => entry
                    .episode_src
                    .clone()
                    .map(|src| vec![Action::CopyToClipboard(src)])
                    .unwrap_or_default(),
                _ => vec![],
            },
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let p = state.palette();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let count = state.favorites.len();
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Favorites ", p.style_title()),
                Span::styled(
                    format!("{} episode{}", count, if count == 1 { "" } else { "s" }),
                    p.style_secondary(),
                ),
                Span::styled("  sort ", p.style_muted()),
                Span::styled(self.sort.label(), p.style_tag()),
            ])),
            chunks[0],
        );

        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(p.style_border(focused));

        if state.favorites.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "You don't have any favorite episodes yet.",
                    p.style_secondary(),
                ))
                .block(block),
                chunks[1],
            );
            return;
        }

        let groups = state.favorites.groups(self.sort);
        let rows = Self::rows(&groups);
        let last = rows.len().saturating_sub(1);
        self.list_state
            .select(Some(self.list_state.selected().unwrap_or(0).min(last)));
        let playing_src = state.audio.current().map(|t| t.src.as_str());

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| match *row {
                Row::Group(gi) => {
                    let group = &groups[gi];
                    ListItem::new(Line::from(vec![
                        Span::styled(
                            group.show_title.clone(),
                            p.style_accent().add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(format!("  {}", group.episodes.len()), p.style_muted()),
                    ]))
                }
                Row::Entry(gi, ei) => {
                    let entry = &groups[gi].episodes[ei];
                    let playing = entry.episode_src.is_some()
                        && entry.episode_src.as_deref() == playing_src;
                    let marker = if playing {
                        Span::styled("▶ ", Style::default().fg(p.playing))
                    } else {
                        Span::raw("  ")
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw("  "),
                        marker,
                        Span::styled("♥ ", Style::default().fg(p.favorite)),
                        Span::styled(
                            format!("S{} · E{}  ", entry.season_number, entry.episode_number),
                            p.style_muted(),
                        ),
                        Span::styled(entry.episode_title.clone(), p.style_default()),
                        Span::styled(
                            format!("  added {}", format_added_at(&entry.added_at)),
                            p.style_muted(),
                        ),
                    ]))
                }
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(p.style_selected(focused));
        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }
}
