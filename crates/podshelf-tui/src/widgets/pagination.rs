//! Pagination bar: `‹ Prev  1 2 [3] 4  Next ›`. Hidden with a single page.

use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Gap,
}

/// Page numbers to show, windowed around `current` once there are more
/// than `max_numbers` pages. First and last are always present.
pub fn page_items(current: usize, total: usize, max_numbers: usize) -> Vec<PageItem> {
    if total <= max_numbers.max(3) {
        return (1..=total).map(PageItem::Page).collect();
    }
    let side = max_numbers.saturating_sub(3) / 2;
    let start = current.saturating_sub(side).max(2);
    let end = (current + side).min(total - 1);

    let mut items = vec![PageItem::Page(1)];
    if start > 2 {
        items.push(PageItem::Gap);
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total - 1 {
        items.push(PageItem::Gap);
    }
    items.push(PageItem::Page(total));
    items
}

pub fn draw(frame: &mut Frame, area: Rect, current: usize, total: usize, palette: &Palette) {
    if total <= 1 || area.height == 0 {
        return;
    }

    let edge_style = |enabled: bool| {
        if enabled {
            palette.style_secondary()
        } else {
            palette.style_muted()
        }
    };

    let mut spans = vec![Span::styled("‹ Prev ", edge_style(current > 1))];
    for item in page_items(current, total, 9) {
        match item {
            PageItem::Page(n) if n == current => spans.push(Span::styled(
                format!("[{}]", n),
                palette.style_accent().add_modifier(Modifier::BOLD),
            )),
            PageItem::Page(n) => spans.push(Span::styled(format!(" {} ", n), palette.style_default())),
            PageItem::Gap => spans.push(Span::styled(" … ", palette.style_muted())),
        }
    }
    spans.push(Span::styled(" Next ›", edge_style(current < total)));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_totals_list_every_page() {
        assert_eq!(
            page_items(2, 3, 9),
            vec![PageItem::Page(1), PageItem::Page(2), PageItem::Page(3)]
        );
    }

    #[test]
    fn test_window_keeps_first_and_last() {
        let items = page_items(10, 20, 9);
        assert_eq!(items.first(), Some(&PageItem::Page(1)));
        assert_eq!(items.last(), Some(&PageItem::Page(20)));
        assert!(items.contains(&PageItem::Page(10)));
        assert_eq!(items.iter().filter(|i| **i == PageItem::Gap).count(), 2);
    }

    #[test]
    fn test_window_at_edges() {
        let items = page_items(1, 20, 9);
        assert_eq!(items[0], PageItem::Page(1));
        assert_eq!(items[1], PageItem::Page(2));
        assert!(items.contains(&PageItem::Gap));
    }
}
