//! PlayerBar component — bottom bar for the current selection.
//!
//! Renders nothing while idle.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use podshelf_core::audio::PlayerState;
use podshelf_core::format::episode_suffix;

use crate::{app_state::AppState, component::Component};

pub const PLAYER_BAR_HEIGHT: u16 = 2;

pub struct PlayerBar;

impl PlayerBar {
    pub fn new() -> Self {
        Self
    }
}

impl Component for PlayerBar {
    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let (PlayerState::Selected { playing }, Some(track)) =
            (state.audio.state(), state.audio.current())
        else {
            return;
        };
        let p = state.palette();

        let title = match track.title.trim() {
            "" => "Now playing".to_string(),
            t => t.to_string(),
        };
        let subtitle = format!(
            "{}{}",
            track.show_title.as_deref().unwrap_or_default(),
            episode_suffix(track.season_number, track.episode_number)
        );
        let subtitle = subtitle.trim_start_matches(" · ").to_string();

        let status = if playing {
            Span::styled(" ▶ ", Style::default().fg(p.playing).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(" ⏸ ", p.style_muted())
        };

        let mut spans = vec![
            status,
            Span::styled(title, p.style_title()),
            Span::styled(format!("  {}", subtitle), p.style_secondary()),
        ];
        if !state.player_available {
            spans.push(Span::styled("  (no audio output)", p.style_muted()));
        }

        let hints = "space play/pause · x stop ";
        let used: usize = spans.iter().map(|s| s.width()).sum();
        let pad = (area.width as usize).saturating_sub(used + hints.chars().count());
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(hints, p.style_muted()));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(p.style_border(false)),
            ),
            area,
        );
    }
}
