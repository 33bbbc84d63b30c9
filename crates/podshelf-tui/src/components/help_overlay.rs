//! HelpOverlay component — centered popup with keyboard shortcut reference.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::Palette,
};

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }
}

impl Component for HelpOverlay {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            // Consume all keys while overlay is open
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.visible = !self.visible;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        if !self.visible {
            return;
        }
        let p = state.palette();
        let popup = centered_rect(64, 32, area);
        let section = |title: &'static str| {
            Line::from(Span::styled(
                title,
                p.style_muted().add_modifier(Modifier::BOLD),
            ))
        };

        let help_lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                p.style_title(),
            )),
            Line::from(""),
            section(" browse"),
            help_row(p, "/", "search titles (esc closes)"),
            help_row(p, "g / G", "next / previous genre"),
            help_row(p, "s / S", "cycle sort forward / backward"),
            help_row(p, "[ / ]  or  pg up / dn", "previous / next page"),
            help_row(p, "1 … 9", "jump to page"),
            help_row(p, "arrows  or  h j k l", "move selection"),
            help_row(p, "enter", "open show / play episode"),
            Line::from(""),
            section(" show & favorites"),
            help_row(p, "enter", "expand season / play episode"),
            help_row(p, "f", "favorite / unfavorite episode"),
            help_row(p, "d", "remove favorite"),
            help_row(p, "s", "cycle favorites order"),
            help_row(p, "y", "copy episode audio url"),
            help_row(p, "esc", "back"),
            Line::from(""),
            section(" everywhere"),
            help_row(p, "tab", "switch Home ↔ Favorites"),
            help_row(p, "space", "play / pause"),
            help_row(p, "x", "stop"),
            help_row(p, "t", "toggle light / dark theme"),
            help_row(p, "r", "reload catalog"),
            help_row(p, "?", "toggle this help overlay"),
            help_row(p, "q / Ctrl+C", "quit"),
            Line::from(""),
            Line::from(Span::styled(" press ? or esc to close", p.style_muted())),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(help_lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(p.style_border(true))
                        .style(Style::default().bg(p.overlay_bg)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

fn help_row<'a>(p: &Palette, key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<24}", key),
            Style::default().fg(p.primary).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, p.style_secondary()),
    ])
}

pub fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
