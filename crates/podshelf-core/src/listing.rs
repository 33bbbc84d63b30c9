//! Filter → search → sort → paginate over the catalog snapshot.
//!
//! The engine owns the catalog and the listing parameters. Every parameter
//! change recomputes the ordered match list eagerly; [`ListingEngine::view`]
//! only slices out the current page.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::config::ListingConfig;
use crate::genres::GenreTable;
use crate::model::Show;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "date-desc")]
    DateDesc,
    #[serde(rename = "date-asc")]
    DateAsc,
    #[serde(rename = "title-asc")]
    TitleAsc,
    #[serde(rename = "title-desc")]
    TitleDesc,
}

impl SortKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "default" => Some(Self::Default),
            "date-desc" => Some(Self::DateDesc),
            "date-asc" => Some(Self::DateAsc),
            "title-asc" => Some(Self::TitleAsc),
            "title-desc" => Some(Self::TitleDesc),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::DateDesc => "Newest",
            Self::DateAsc => "Oldest",
            Self::TitleAsc => "Title A → Z",
            Self::TitleDesc => "Title Z → A",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Default => Self::DateDesc,
            Self::DateDesc => Self::DateAsc,
            Self::DateAsc => Self::TitleAsc,
            Self::TitleAsc => Self::TitleDesc,
            Self::TitleDesc => Self::Default,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Default => Self::TitleDesc,
            Self::DateDesc => Self::Default,
            Self::DateAsc => Self::DateDesc,
            Self::TitleAsc => Self::DateAsc,
            Self::TitleDesc => Self::TitleAsc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParameters {
    pub search_text: String,
    /// `"all"` or a genre id as text.
    pub genre_filter: String,
    pub sort_key: SortKey,
    /// Requested page, 1-based. Clamped only when a view is computed.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListingParameters {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            genre_filter: "all".to_string(),
            sort_key: SortKey::Default,
            page: 1,
            page_size: 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListingView<'a> {
    pub items: Vec<&'a Show>,
    pub total_pages: usize,
    pub current_page: usize,
    /// Number of shows matching the filters, across all pages.
    pub total_count: usize,
}

/// Title order that ignores case and accents ("Écoute" sorts with the E's),
/// with a raw tie-break so folded-equal titles still sort deterministically.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    fold_title(a).cmp(fold_title(b)).then_with(|| a.cmp(b))
}

fn fold_title(title: &str) -> impl Iterator<Item = char> + '_ {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Page size for a viewport `width_px` wide.
pub fn page_size_for_width(width_px: u32, config: &ListingConfig) -> usize {
    let max = config.max_page_size.max(1);
    if width_px <= config.narrow_breakpoint_px {
        return max;
    }
    let columns = width_px / config.card_width_px.max(1);
    let computed = (columns * config.max_rows) as usize;
    computed.clamp(1, max)
}

pub struct ListingEngine {
    catalog: Vec<Show>,
    params: ListingParameters,
    genres: GenreTable,
    config: ListingConfig,
    /// Catalog indices that pass filter and search, in sorted order.
    matches: Vec<usize>,
}

impl ListingEngine {
    pub fn new(config: ListingConfig, genres: GenreTable) -> Self {
        let params = ListingParameters {
            page_size: config.max_page_size.max(1),
            ..ListingParameters::default()
        };
        Self {
            catalog: Vec::new(),
            params,
            genres,
            config,
            matches: Vec::new(),
        }
    }

    pub fn set_catalog(&mut self, catalog: Vec<Show>) {
        debug!("listing catalog replaced: {} shows", catalog.len());
        self.catalog = catalog;
        self.recompute();
    }

    pub fn catalog(&self) -> &[Show] {
        &self.catalog
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn params(&self) -> &ListingParameters {
        &self.params
    }

    pub fn genres(&self) -> &GenreTable {
        &self.genres
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.params.search_text = text.into();
        self.params.page = 1;
        self.recompute();
    }

    pub fn set_genre_filter(&mut self, value: impl Into<String>) {
        self.params.genre_filter = value.into();
        self.params.page = 1;
        self.recompute();
    }

    /// Unknown keys behave as `default`.
    pub fn set_sort_key(&mut self, key: &str) {
        let sort = SortKey::parse(key).unwrap_or_else(|| {
            warn!("unknown sort key {:?}, using default order", key);
            SortKey::Default
        });
        self.set_sort(sort);
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.params.sort_key = sort;
        self.params.page = 1;
        self.recompute();
    }

    pub fn set_page(&mut self, page: usize) {
        self.params.page = page;
    }

    pub fn next_page(&mut self) {
        let current = self.current_page();
        self.params.page = (current + 1).min(self.total_pages());
    }

    pub fn prev_page(&mut self) {
        let current = self.current_page();
        self.params.page = current.saturating_sub(1).max(1);
    }

    /// Recompute the page size for a viewport of `width_px` logical pixels.
    /// Does not touch the requested page.
    pub fn set_viewport_width(&mut self, width_px: u32) {
        let size = page_size_for_width(width_px, &self.config);
        if size != self.params.page_size {
            debug!("page size {} -> {} (width {}px)", self.params.page_size, size, width_px);
            self.params.page_size = size;
        }
    }

    /// Same as [`set_viewport_width`](Self::set_viewport_width) for a width in
    /// terminal columns.
    pub fn set_viewport_columns(&mut self, columns: u16) {
        self.set_viewport_width(columns as u32 * self.config.column_px);
    }

    pub fn total_pages(&self) -> usize {
        let size = self.params.page_size.max(1);
        self.matches.len().div_ceil(size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.params.page.max(1).min(self.total_pages())
    }

    pub fn view(&self) -> ListingView<'_> {
        let size = self.params.page_size.max(1);
        let total_pages = self.total_pages();
        let current_page = self.current_page();
        let start = (current_page - 1) * size;
        let end = (start + size).min(self.matches.len());

        let items = self.matches[start.min(end)..end]
            .iter()
            .map(|&idx| &self.catalog[idx])
            .collect();

        ListingView {
            items,
            total_pages,
            current_page,
            total_count: self.matches.len(),
        }
    }

    fn genre_matches(&self, show: &Show) -> bool {
        let filter = self.params.genre_filter.trim();
        if filter == "all" {
            return true;
        }
        match filter.parse::<u32>() {
            Ok(id) => show.genre_ids(&self.genres).contains(&id),
            Err(_) => false,
        }
    }

    fn recompute(&mut self) {
        let query = self.params.search_text.trim().to_lowercase();

        let mut matches: Vec<usize> = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, show)| self.genre_matches(show))
            .filter(|(_, show)| query.is_empty() || show.title.to_lowercase().contains(&query))
            .map(|(idx, _)| idx)
            .collect();

        let catalog = &self.catalog;
        // sort_by is stable, so ties keep catalog order.
        match self.params.sort_key {
            SortKey::Default => {}
            SortKey::TitleAsc => {
                matches.sort_by(|&a, &b| compare_titles(&catalog[a].title, &catalog[b].title))
            }
            SortKey::TitleDesc => {
                matches.sort_by(|&a, &b| compare_titles(&catalog[b].title, &catalog[a].title))
            }
            SortKey::DateAsc => {
                let dates: Vec<_> = catalog.iter().map(Show::updated_at).collect();
                matches.sort_by(|&a, &b| dates[a].cmp(&dates[b]))
            }
            SortKey::DateDesc => {
                let dates: Vec<_> = catalog.iter().map(Show::updated_at).collect();
                matches.sort_by(|&a, &b| dates[b].cmp(&dates[a]))
            }
        }

        self.matches = matches;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GenreRef, Seasons};

    fn show(id: &str, title: &str, updated: &str, genres: Vec<GenreRef>) -> Show {
        Show {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            image: String::new(),
            updated: updated.to_string(),
            genres,
            seasons: Seasons::Count(1),
        }
    }

    fn engine_with(shows: Vec<Show>) -> ListingEngine {
        let mut engine = ListingEngine::new(ListingConfig::default(), GenreTable::builtin());
        engine.set_catalog(shows);
        engine
    }

    fn titles(view: &ListingView<'_>) -> Vec<String> {
        view.items.iter().map(|s| s.title.clone()).collect()
    }

    fn ten_shows() -> Vec<Show> {
        (1..=10)
            .map(|i| show(&i.to_string(), &format!("Show {i:02}"), "", vec![GenreRef::Id(1)]))
            .collect()
    }

    #[test]
    fn test_ten_items_page_size_eight() {
        let mut engine = engine_with(ten_shows());

        let first = engine.view();
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.current_page, 1);
        assert_eq!(first.items.len(), 8);
        assert_eq!(first.total_count, 10);

        engine.set_page(2);
        let second = engine.view();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].title, "Show 09");
    }

    #[test]
    fn test_page_is_clamped_on_view() {
        let mut engine = engine_with(ten_shows());
        engine.set_page(99);
        assert_eq!(engine.params().page, 99);
        assert_eq!(engine.view().current_page, 2);

        engine.set_page(0);
        assert_eq!(engine.view().current_page, 1);
    }

    #[test]
    fn test_page_bounds_hold_for_any_page_and_size() {
        for count in [0usize, 1, 7, 8, 9, 17] {
            let shows = (0..count)
                .map(|i| show(&i.to_string(), &format!("s{i}"), "", vec![]))
                .collect();
            let mut engine = engine_with(shows);
            for width in [800u32, 1100, 1400, 2000] {
                engine.set_viewport_width(width);
                for page in [0usize, 1, 2, 3, 50] {
                    engine.set_page(page);
                    let view = engine.view();
                    assert!(view.current_page >= 1);
                    assert!(view.current_page <= view.total_pages);
                    assert!(view.items.len() <= engine.params().page_size);
                    assert!(engine.params().page_size <= 8);
                }
            }
        }
    }

    #[test]
    fn test_empty_catalog_has_one_page() {
        let engine = engine_with(vec![]);
        let view = engine.view();
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.current_page, 1);
        assert!(view.items.is_empty());
    }

    #[test]
    fn test_title_desc_order() {
        let mut engine = engine_with(vec![
            show("1", "b", "", vec![]),
            show("2", "A", "", vec![]),
            show("3", "c", "", vec![]),
        ]);
        engine.set_sort_key("title-desc");
        assert_eq!(titles(&engine.view()), vec!["c", "b", "A"]);

        engine.set_sort_key("title-asc");
        assert_eq!(titles(&engine.view()), vec!["A", "b", "c"]);
    }

    #[test]
    fn test_title_sort_folds_accents() {
        let mut engine = engine_with(vec![
            show("1", "Zebra Talk", "", vec![]),
            show("2", "Écoute", "", vec![]),
            show("3", "Apple", "", vec![]),
        ]);
        engine.set_sort_key("title-asc");
        assert_eq!(titles(&engine.view()), vec!["Apple", "Écoute", "Zebra Talk"]);

        engine.set_sort_key("title-desc");
        assert_eq!(titles(&engine.view()), vec!["Zebra Talk", "Écoute", "Apple"]);
    }

    #[test]
    fn test_compare_titles_tie_break() {
        assert_eq!(compare_titles("ecoute", "Écoute"), "ecoute".cmp("Écoute"));
        assert_eq!(compare_titles("Café", "cafe b"), Ordering::Less);
        assert_eq!(compare_titles("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_search_is_idempotent_and_trimmed() {
        let mut engine = engine_with(vec![
            show("1", "The Daily", "", vec![]),
            show("2", "Daily Grind", "", vec![]),
            show("3", "Weekly", "", vec![]),
        ]);
        engine.set_search_text("  DAILY ");
        let once = titles(&engine.view());
        engine.set_search_text("  DAILY ");
        let twice = titles(&engine.view());
        assert_eq!(once, vec!["The Daily", "Daily Grind"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parameter_changes_reset_page() {
        let mut engine = engine_with(ten_shows());
        engine.set_page(2);
        engine.set_search_text("show");
        assert_eq!(engine.params().page, 1);

        engine.set_page(2);
        engine.set_genre_filter("1");
        assert_eq!(engine.params().page, 1);

        engine.set_page(2);
        engine.set_sort(SortKey::TitleAsc);
        assert_eq!(engine.params().page, 1);
    }

    #[test]
    fn test_resize_keeps_requested_page() {
        let mut engine = engine_with(ten_shows());
        engine.set_page(2);
        engine.set_viewport_width(1300);
        assert_eq!(engine.params().page, 2);
        assert_eq!(engine.params().page_size, 8);
    }

    #[test]
    fn test_genre_filter() {
        let mut engine = engine_with(vec![
            show("1", "Comedy Hour", "", vec![GenreRef::Id(4)]),
            show("2", "War Stories", "", vec![GenreRef::Name("History".into())]),
            show("3", "Both", "", vec![GenreRef::Id(3), GenreRef::Id(4)]),
        ]);

        engine.set_genre_filter("3");
        assert_eq!(titles(&engine.view()), vec!["War Stories", "Both"]);

        engine.set_genre_filter("comedy");
        assert_eq!(engine.view().total_count, 0);

        engine.set_genre_filter("all");
        assert_eq!(engine.view().total_count, 3);
    }

    #[test]
    fn test_date_sort_missing_dates_earliest() {
        let mut engine = engine_with(vec![
            show("1", "new", "2023-01-01T00:00:00.000Z", vec![]),
            show("2", "none", "garbage", vec![]),
            show("3", "old", "2020-05-01T00:00:00.000Z", vec![]),
        ]);
        engine.set_sort_key("date-asc");
        assert_eq!(titles(&engine.view()), vec!["none", "old", "new"]);
        engine.set_sort_key("date-desc");
        assert_eq!(titles(&engine.view()), vec!["new", "old", "none"]);
    }

    #[test]
    fn test_unknown_sort_key_is_default_order() {
        let mut engine = engine_with(vec![
            show("1", "z", "", vec![]),
            show("2", "a", "", vec![]),
        ]);
        engine.set_sort_key("title-asc");
        engine.set_sort_key("popularity");
        assert_eq!(engine.params().sort_key, SortKey::Default);
        assert_eq!(titles(&engine.view()), vec!["z", "a"]);
    }

    #[test]
    fn test_page_size_for_width() {
        let config = ListingConfig::default();
        assert_eq!(page_size_for_width(320, &config), 8);
        assert_eq!(page_size_for_width(1024, &config), 8);
        assert_eq!(page_size_for_width(1040, &config), 8);
        assert_eq!(page_size_for_width(5000, &config), 8);

        let narrow_cards = ListingConfig {
            card_width_px: 400,
            ..ListingConfig::default()
        };
        assert_eq!(page_size_for_width(1100, &narrow_cards), 4);
    }

    #[test]
    fn test_next_prev_page_stay_in_range() {
        let mut engine = engine_with(ten_shows());
        engine.prev_page();
        assert_eq!(engine.current_page(), 1);
        engine.next_page();
        engine.next_page();
        assert_eq!(engine.current_page(), 2);
        engine.prev_page();
        assert_eq!(engine.current_page(), 1);
    }

    #[test]
    fn test_sort_key_cycle() {
        let mut key = SortKey::Default;
        for _ in 0..5 {
            key = key.next();
        }
        assert_eq!(key, SortKey::Default);
        assert_eq!(SortKey::Default.prev(), SortKey::TitleDesc);
        assert_eq!(SortKey::parse(SortKey::DateAsc.key()), Some(SortKey::DateAsc));
    }
}
