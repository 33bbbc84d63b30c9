//! Color palettes and style helpers for the podshelf TUI.

use ratatui::style::{Color, Modifier, Style};

use podshelf_core::settings::Theme;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub bg: Color,
    pub primary: Color,
    pub secondary: Color,
    pub muted: Color,
    pub accent: Color,
    pub playing: Color,
    pub error: Color,
    pub border: Color,
    pub border_focused: Color,
    pub selection_bg: Color,
    pub filter_fg: Color,
    pub filter_bg: Color,
    pub tag: Color,
    pub favorite: Color,
    pub overlay_bg: Color,
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_warning: Color,
    pub toast_error: Color,
}

pub const DARK: Palette = Palette {
    bg: Color::Rgb(18, 18, 18),
    primary: Color::Rgb(210, 210, 225),
    secondary: Color::Rgb(115, 115, 138),
    muted: Color::Rgb(72, 72, 88),
    accent: Color::Rgb(255, 95, 95),
    playing: Color::Rgb(80, 200, 120),
    error: Color::Rgb(255, 80, 80),
    border: Color::Rgb(40, 40, 52),
    border_focused: Color::Rgb(120, 100, 200),
    selection_bg: Color::Rgb(28, 28, 40),
    filter_fg: Color::Rgb(255, 200, 80),
    filter_bg: Color::Rgb(20, 20, 32),
    tag: Color::Rgb(80, 140, 200),
    favorite: Color::Rgb(255, 95, 140),
    overlay_bg: Color::Rgb(18, 18, 26),
    toast_info: Color::Rgb(80, 160, 220),
    toast_success: Color::Rgb(80, 200, 120),
    toast_warning: Color::Rgb(255, 184, 80),
    toast_error: Color::Rgb(255, 95, 95),
};

pub const LIGHT: Palette = Palette {
    bg: Color::Rgb(246, 245, 240),
    primary: Color::Rgb(30, 30, 40),
    secondary: Color::Rgb(90, 90, 110),
    muted: Color::Rgb(150, 150, 165),
    accent: Color::Rgb(200, 50, 60),
    playing: Color::Rgb(30, 140, 70),
    error: Color::Rgb(190, 30, 30),
    border: Color::Rgb(205, 205, 215),
    border_focused: Color::Rgb(110, 80, 200),
    selection_bg: Color::Rgb(225, 222, 240),
    filter_fg: Color::Rgb(150, 90, 0),
    filter_bg: Color::Rgb(236, 234, 226),
    tag: Color::Rgb(30, 100, 170),
    favorite: Color::Rgb(210, 40, 100),
    overlay_bg: Color::Rgb(252, 252, 248),
    toast_info: Color::Rgb(30, 110, 180),
    toast_success: Color::Rgb(30, 140, 70),
    toast_warning: Color::Rgb(180, 110, 0),
    toast_error: Color::Rgb(200, 50, 60),
};

pub fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Dark => &DARK,
        Theme::Light => &LIGHT,
    }
}

impl Palette {
    pub fn style_default(&self) -> Style {
        Style::default().fg(self.primary)
    }

    pub fn style_secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn style_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn style_accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn style_title(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn style_selected(&self, focused: bool) -> Style {
        let style = Style::default().bg(self.selection_bg).fg(self.primary);
        if focused {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    pub fn style_border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    pub fn style_tag(&self) -> Style {
        Style::default().fg(self.tag)
    }
}
