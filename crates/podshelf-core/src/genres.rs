//! Known catalog genres.
//!
//! The catalog API has no "list all genres" endpoint, so the filter options
//! and recommendation tags come from this table.

use crate::model::{Genre, GenreRef, Show};

/// Genre values never shown to the user.
const HIDDEN_GENRES: &[&str] = &["all", "featured"];

const BUILTIN: &[(u32, &str)] = &[
    (1, "Personal Growth"),
    (2, "Investigative Journalism"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids and Family"),
];

pub fn is_hidden(title: &str) -> bool {
    let title = title.trim();
    HIDDEN_GENRES.iter().any(|h| h.eq_ignore_ascii_case(title))
}

#[derive(Debug, Clone)]
pub struct GenreTable {
    genres: Vec<Genre>,
}

impl Default for GenreTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl GenreTable {
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(id, title)| Genre {
                    id: *id,
                    title: (*title).to_string(),
                })
                .collect(),
        )
    }

    pub fn new(genres: Vec<Genre>) -> Self {
        Self { genres }
    }

    pub fn all(&self) -> &[Genre] {
        &self.genres
    }

    pub fn title_for(&self, id: u32) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.title.as_str())
    }

    pub fn id_for_name(&self, name: &str) -> Option<u32> {
        let name = name.trim();
        self.genres
            .iter()
            .find(|g| g.title.eq_ignore_ascii_case(name))
            .map(|g| g.id)
    }

    /// Display titles for a show's genre references, in order.
    /// Ids the table does not know are skipped; names pass through as-is.
    pub fn titles_for(&self, show: &Show) -> Vec<String> {
        show.genres
            .iter()
            .filter_map(|g| match g {
                GenreRef::Id(id) => self.title_for(*id).map(str::to_string),
                GenreRef::Name(name) => {
                    let name = name.trim();
                    (!name.is_empty()).then(|| name.to_string())
                }
            })
            .filter(|title| !is_hidden(title))
            .collect()
    }

    /// Filter option after `current` ("all" then each genre id), wrapping.
    pub fn next_filter(&self, current: &str) -> String {
        self.step_filter(current, 1)
    }

    pub fn prev_filter(&self, current: &str) -> String {
        self.step_filter(current, -1)
    }

    fn step_filter(&self, current: &str, delta: isize) -> String {
        let mut options = vec!["all".to_string()];
        options.extend(self.genres.iter().map(|g| g.id.to_string()));
        let len = options.len() as isize;
        let pos = options.iter().position(|o| o == current).unwrap_or(0) as isize;
        let next = (pos + delta).rem_euclid(len) as usize;
        options.swap_remove(next)
    }

    /// Label for a filter value: "All genres", the genre title, or the raw value.
    pub fn filter_label(&self, value: &str) -> String {
        if value == "all" {
            return "All genres".to_string();
        }
        value
            .parse::<u32>()
            .ok()
            .and_then(|id| self.title_for(id))
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Seasons;

    #[test]
    fn test_lookup_both_directions() {
        let table = GenreTable::builtin();
        assert_eq!(table.title_for(4), Some("Comedy"));
        assert_eq!(table.title_for(99), None);
        assert_eq!(table.id_for_name(" history "), Some(3));
        assert_eq!(table.id_for_name("Unknown"), None);
    }

    #[test]
    fn test_hidden_genres() {
        assert!(is_hidden("All"));
        assert!(is_hidden(" featured "));
        assert!(!is_hidden("News"));
    }

    #[test]
    fn test_filter_cycle_wraps() {
        let table = GenreTable::builtin();
        assert_eq!(table.next_filter("all"), "1");
        assert_eq!(table.next_filter("9"), "all");
        assert_eq!(table.prev_filter("all"), "9");
        assert_eq!(table.next_filter("bogus"), "1");
        assert_eq!(table.filter_label("all"), "All genres");
        assert_eq!(table.filter_label("7"), "Fiction");
    }

    #[test]
    fn test_titles_for_mixed_refs() {
        let table = GenreTable::builtin();
        let show = Show {
            id: "1".into(),
            title: "t".into(),
            description: String::new(),
            image: String::new(),
            updated: String::new(),
            genres: vec![
                GenreRef::Id(8),
                GenreRef::Id(42),
                GenreRef::Name("Featured".into()),
                GenreRef::Name(" True Crime ".into()),
            ],
            seasons: Seasons::Count(1),
        };
        assert_eq!(table.titles_for(&show), vec!["News", "True Crime"]);
    }
}
