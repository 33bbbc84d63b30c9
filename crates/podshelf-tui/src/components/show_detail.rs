//! ShowDetail component — one show with its seasons, episodes and
//! recommendations.
//!
//! One season is expanded at a time. Rows are rebuilt from `AppState` on
//! every key and draw, so favorites and the playing marker are always live.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use podshelf_core::audio::TrackRequest;
use podshelf_core::favorites::{EpisodeMeta, ShowMeta};
use podshelf_core::format::{format_updated, shorten, DESCRIPTION_LIMIT};
use podshelf_core::model::Show;
use podshelf_core::recommend::{recommend, tag_titles, RECOMMENDATION_LIMIT, TAG_LIMIT};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::Palette,
    widgets::fit_width,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Row {
    Season(usize),
    Episode(usize, usize),
    Heading,
    Recommendation(String),
}

impl Row {
    fn selectable(&self) -> bool {
        !matches!(self, Row::Heading)
    }
}

pub struct ShowDetail {
    expanded: Option<usize>,
    list_state: ListState,
}

impl ShowDetail {
    pub fn new() -> Self {
        Self {
            expanded: None,
            list_state: ListState::default(),
        }
    }

    fn rows(&self, state: &AppState) -> Vec<Row> {
        let mut rows = Vec::new();
        if let Some(show) = &state.detail.show.value {
            for (si, season) in show.season_list().iter().enumerate() {
                rows.push(Row::Season(si));
                if self.expanded == Some(si) {
                    rows.extend((0..season.episodes.len()).map(|ei| Row::Episode(si, ei)));
                }
            }
        }
        let current = state.detail.show_id.as_deref().unwrap_or_default();
        let recs = recommend(state.listing.catalog(), &[current], RECOMMENDATION_LIMIT);
        if !recs.is_empty() {
            rows.push(Row::Heading);
            rows.extend(recs.into_iter().map(|s| Row::Recommendation(s.id.clone())));
        }
        rows
    }

    fn move_cursor(&mut self, delta: isize, rows: &[Row]) {
        if rows.is_empty() {
            self.list_state.select(None);
            return;
        }
        let mut idx = self.list_state.selected().unwrap_or(0) as isize;
        loop {
            let next = idx + delta;
            if next < 0 || next >= rows.len() as isize {
                break;
            }
            idx = next;
            if rows[idx as usize].selectable() {
                break;
            }
        }
        if rows[idx as usize].selectable() {
            self.list_state.select(Some(idx as usize));
        }
    }

    fn selected_row(&self, rows: &[Row]) -> Option<Row> {
        self.list_state.selected().and_then(|i| rows.get(i)).cloned()
    }

    fn episode_metas(show: &Show, si: usize, ei: usize) -> Option<(ShowMeta, EpisodeMeta)> {
        let season = show.season_list().get(si)?;
        let episode = season.episodes.get(ei)?;
        Some((
            ShowMeta::from_show(show),
            EpisodeMeta::from_episode(episode, season, si),
        ))
    }
}

impl Component for ShowDetail {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let rows = self.rows(state);
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => vec![Action::Back],
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1, &rows);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1, &rows);
                vec![]
            }
            KeyCode::Enter => match (self.selected_row(&rows), &state.detail.show.value) {
                (Some(Row::Season(si)), _) => {
                    self.expanded = if self.expanded == Some(si) { None } else { Some(si) };
                    vec![]
                }
                (Some(Row::Episode(si, ei)), Some(show)) => {
                    match Self::episode_metas(show, si, ei) {
                        Some((show_meta, ep)) => vec![Action::Play(TrackRequest {
                            src: ep.src.unwrap_or_default(),
                            title: ep.title,
                            show_title: Some(show_meta.title),
                            season_number: Some(ep.season_number),
                            episode_number: Some(ep.episode_number),
                        })],
                        None => vec![],
                    }
                }
                (Some(Row::Recommendation(id)), _) => vec![Action::OpenShow(id)],
                _ => vec![],
            },
            KeyCode::Char('f') => match (self.selected_row(&rows), &state.detail.show.value) {
                (Some(Row::Episode(si, ei)), Some(show)) => Self::episode_metas(show, si, ei)
                    .map(|(s, e)| vec![Action::ToggleFavorite(s, e)])
                    .unwrap_or_default(),
                _ => vec![],
            },
            KeyCode::Char('y') => match (self.selected_row(&rows), &state.detail.show.value) {
                (Some(Row::Episode(si, ei)), Some(show)) => show
                    .season_list()
                    .get(si)
                    .and_then(|s| s.episodes.get(ei))
                    .filter(|e| !e.file_url.is_empty())
                    .map(|e| vec![Action::CopyToClipboard(e.file_url.clone())])
                    .unwrap_or_default(),
                _ => vec![],
            },
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::OpenShow(_) = action {
            self.expanded = None;
            self.list_state.select(Some(0));
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let p = state.palette();
        let detail = &state.detail;
        let show_id = detail.show_id.as_deref().unwrap_or_default();

        // While loading, fall back to the catalog entry for the header.
        let header_show = detail
            .show
            .value
            .as_ref()
            .filter(|s| s.id == show_id)
            .or_else(|| state.catalog_show(show_id));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(0)])
            .split(area);

        draw_info(frame, chunks[0], header_show, state, p);

        let list_area = chunks[1];
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(p.style_border(focused))
            .title(Span::styled(" seasons ", p.style_secondary()));

        if detail.show.loading {
            frame.render_widget(
                Paragraph::new(Span::styled("Loading show…", p.style_secondary())).block(block),
                list_area,
            );
            return;
        }
        if let Some(err) = &detail.show.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("Error loading show: {}", err),
                    Style::default().fg(p.error),
                ))
                .wrap(Wrap { trim: true })
                .block(block),
                list_area,
            );
            return;
        }

        let rows = self.rows(state);
        if self.list_state.selected().map_or(true, |i| i >= rows.len()) {
            self.list_state.select(rows.iter().position(Row::selectable));
        }

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| render_row(row, self.expanded, state, list_area.width, p))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(p.style_selected(focused));
        frame.render_stateful_widget(list, list_area, &mut self.list_state);
    }
}

fn draw_info(frame: &mut Frame, area: Rect, show: Option<&Show>, state: &AppState, p: &Palette) {
    let Some(show) = show else {
        frame.render_widget(
            Paragraph::new(Span::styled("Podcast Details", p.style_title())),
            area,
        );
        return;
    };

    let tags = if state.detail.genre_titles.is_empty() {
        Span::styled("No genres", p.style_muted())
    } else {
        Span::styled(state.detail.genre_titles.join(" · "), p.style_tag())
    };
    let seasons = show.season_count();

    let mut lines = vec![
        Line::from(vec![
            Span::styled(show.title.clone(), p.style_title()),
            Span::styled("   esc back", p.style_muted()),
        ]),
        Line::from(vec![
            Span::styled(
                format!("{} season{}", seasons, if seasons == 1 { "" } else { "s" }),
                p.style_secondary(),
            ),
            Span::styled(
                format!("  ·  Last updated {}", format_updated(&show.updated)),
                p.style_secondary(),
            ),
        ]),
        Line::from(tags),
    ];
    if state.favorites.has_favorites_for_show(&show.id) {
        lines.push(Line::from(Span::styled(
            "♥ you have favorites in this show",
            Style::default().fg(p.favorite),
        )));
    }
    lines.push(Line::from(Span::styled(
        show.description.trim().to_string(),
        p.style_default(),
    )));

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_row<'a>(
    row: &Row,
    expanded: Option<usize>,
    state: &AppState,
    width: u16,
    p: &Palette,
) -> ListItem<'a> {
    match row {
        Row::Season(si) => {
            let Some(season) = state
                .detail
                .show
                .value
                .as_ref()
                .and_then(|s| s.season_list().get(*si))
            else {
                return ListItem::new("");
            };
            let marker = if expanded == Some(*si) { "▾" } else { "▸" };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", marker), p.style_accent()),
                Span::styled(season.label(*si), p.style_title()),
                Span::styled(format!("  {}", season.episode_count_label()), p.style_muted()),
            ]))
        }
        Row::Episode(si, ei) => {
            let Some(episode) = state
                .detail
                .show
                .value
                .as_ref()
                .and_then(|s| s.season_list().get(*si))
                .and_then(|s| s.episodes.get(*ei))
            else {
                return ListItem::new("");
            };
            let favorited = state.favorites.is_episode_favorited(&episode.id);
            let playing = state
                .audio
                .current()
                .is_some_and(|t| !episode.file_url.is_empty() && t.src == episode.file_url);

            let heart = if favorited {
                Span::styled("♥ ", Style::default().fg(p.favorite))
            } else {
                Span::styled("♡ ", p.style_muted())
            };
            let play = if playing {
                Span::styled("▶ ", Style::default().fg(p.playing))
            } else {
                Span::raw("  ")
            };
            let mut lines = vec![Line::from(vec![
                Span::raw("   "),
                play,
                heart,
                Span::styled(
                    format!("#{} {}", episode.episode_number, episode.display_title()),
                    p.style_default(),
                ),
            ])];
            let desc = shorten(&episode.description, DESCRIPTION_LIMIT);
            if !desc.is_empty() {
                let desc = fit_width(&desc, (width as usize).saturating_sub(9));
                lines.push(Line::from(Span::styled(
                    format!("         {}", desc),
                    p.style_muted(),
                )));
            }
            ListItem::new(lines)
        }
        Row::Heading => ListItem::new(Line::from(Span::styled(
            "Recommended for you",
            p.style_secondary().add_modifier(Modifier::BOLD),
        ))),
        Row::Recommendation(id) => {
            let Some(show) = state.catalog_show(id) else {
                return ListItem::new("");
            };
            let tags = tag_titles(show, state.listing.genres(), TAG_LIMIT);
            let tags = if tags.is_empty() {
                Span::styled("No genres", p.style_muted())
            } else {
                Span::styled(tags.join(" · "), p.style_tag())
            };
            ListItem::new(Line::from(vec![
                Span::styled("  ↗ ", p.style_muted()),
                Span::styled(show.title.clone(), p.style_default()),
                Span::raw("  "),
                tags,
            ]))
        }
    }
}
