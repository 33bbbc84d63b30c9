use std::collections::HashSet;

use crate::genres::GenreTable;
use crate::model::Show;

pub const RECOMMENDATION_LIMIT: usize = 12;
pub const TAG_LIMIT: usize = 3;

/// Shows other than `exclude_ids`, in catalog order, at most `limit`.
pub fn recommend<'a>(shows: &'a [Show], exclude_ids: &[&str], limit: usize) -> Vec<&'a Show> {
    let excluded: HashSet<&str> = exclude_ids.iter().copied().collect();
    shows
        .iter()
        .filter(|s| !excluded.contains(s.id.as_str()))
        .take(limit)
        .collect()
}

/// Up to `limit` genre titles for a recommendation card.
pub fn tag_titles(show: &Show, table: &GenreTable, limit: usize) -> Vec<String> {
    table.titles_for(show).into_iter().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GenreRef, Seasons};

    fn show(id: usize, genres: Vec<GenreRef>) -> Show {
        Show {
            id: id.to_string(),
            title: format!("Show {id}"),
            description: String::new(),
            image: String::new(),
            updated: String::new(),
            genres,
            seasons: Seasons::Count(1),
        }
    }

    #[test]
    fn test_excludes_current_and_limits() {
        let shows: Vec<Show> = (1..=20).map(|i| show(i, vec![])).collect();
        let recs = recommend(&shows, &["1"], RECOMMENDATION_LIMIT);
        assert_eq!(recs.len(), 12);
        assert_eq!(recs[0].id, "2");
        assert!(recs.iter().all(|s| s.id != "1"));
    }

    #[test]
    fn test_tag_titles_capped() {
        let table = GenreTable::builtin();
        let s = show(1, (1..=5).map(GenreRef::Id).collect());
        assert_eq!(
            tag_titles(&s, &table, TAG_LIMIT),
            vec!["Personal Growth", "Investigative Journalism", "History"]
        );
        assert!(tag_titles(&show(2, vec![]), &table, TAG_LIMIT).is_empty());
    }
}
