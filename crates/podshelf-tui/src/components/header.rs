//! Header component — 1-row top bar.
//!
//! App name, view tabs, catalog status and the active theme. Not focusable.

use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    action::View,
    app_state::AppState,
    component::Component,
};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }
}

impl Component for Header {
    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        let p = state.palette();

        let tab = |label: String, active: bool| {
            if active {
                Span::styled(
                    format!(" {} ", label),
                    p.style_selected(true).add_modifier(Modifier::UNDERLINED),
                )
            } else {
                Span::styled(format!(" {} ", label), p.style_secondary())
            }
        };

        let mut spans = vec![
            Span::styled(" podshelf ", p.style_accent().add_modifier(Modifier::BOLD)),
            Span::styled("│", p.style_muted()),
            tab(
                "Home".to_string(),
                matches!(state.view, View::Home | View::Detail),
            ),
            tab(
                format!("Favorites ({})", state.favorites.len()),
                state.view == View::Favorites,
            ),
            Span::styled("│ ", p.style_muted()),
        ];

        if state.catalog_loading {
            spans.push(Span::styled("loading podcasts…", p.style_secondary()));
        } else if state.catalog_error.is_some() {
            spans.push(Span::styled("catalog unavailable", p.style_accent()));
        } else {
            spans.push(Span::styled(
                format!("{} shows", state.listing.catalog_len()),
                p.style_secondary(),
            ));
        }

        if !state.player_available {
            spans.push(Span::styled("  · audio off", p.style_muted()));
        }

        let right = format!("{} · ? help ", state.theme.label());
        let used: usize = spans.iter().map(|s| s.width()).sum();
        let pad = (area.width as usize).saturating_sub(used + right.chars().count());
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(right, p.style_muted()));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
