//! Favorite episodes, grouped by show.
//!
//! The stored JSON is a map of show id to group, in camelCase, under the
//! `app-favorites` key. A group is removed as soon as its last episode is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;
use crate::listing::compare_titles;
use crate::model::{Episode, Season, Show};
use crate::storage::Slot;

pub type FavoritesMap = BTreeMap<String, FavoriteShowGroup>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub episode_id: String,
    #[serde(default)]
    pub episode_title: String,
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub episode_number: u32,
    #[serde(default)]
    pub season_image: Option<String>,
    #[serde(default)]
    pub episode_src: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteShowGroup {
    pub show_id: String,
    #[serde(default)]
    pub show_title: String,
    #[serde(default)]
    pub show_image: Option<String>,
    #[serde(default)]
    pub episodes: Vec<FavoriteEntry>,
}

/// Show fields copied into a new group.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowMeta {
    pub id: String,
    pub title: String,
    pub image: Option<String>,
}

impl ShowMeta {
    pub fn from_show(show: &Show) -> Self {
        Self {
            id: show.id.clone(),
            title: show.title.clone(),
            image: (!show.image.is_empty()).then(|| show.image.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeMeta {
    pub id: String,
    pub title: String,
    pub season_number: u32,
    pub episode_number: u32,
    pub season_image: Option<String>,
    pub src: Option<String>,
}

impl EpisodeMeta {
    /// `season_index` is the season's 0-based position in the show.
    pub fn from_episode(episode: &Episode, season: &Season, season_index: usize) -> Self {
        Self {
            id: episode.id.clone(),
            title: episode.title.clone(),
            season_number: season.number(season_index),
            episode_number: episode.episode_number,
            season_image: season.image.clone().filter(|s| !s.is_empty()),
            src: (!episode.file_url.is_empty()).then(|| episode.file_url.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Episode order inside each group on the favorites view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FavoriteSort {
    #[default]
    AddedNewest,
    AddedOldest,
    TitleAz,
    TitleZa,
}

impl FavoriteSort {
    pub fn next(self) -> Self {
        match self {
            Self::AddedNewest => Self::AddedOldest,
            Self::AddedOldest => Self::TitleAz,
            Self::TitleAz => Self::TitleZa,
            Self::TitleZa => Self::AddedNewest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AddedNewest => "Newest added",
            Self::AddedOldest => "Oldest added",
            Self::TitleAz => "Title A → Z",
            Self::TitleZa => "Title Z → A",
        }
    }
}

pub struct FavoritesStore {
    favorites: FavoritesMap,
    slot: Option<Slot<FavoritesMap>>,
}

impl FavoritesStore {
    /// An empty store that never persists.
    pub fn in_memory() -> Self {
        Self {
            favorites: FavoritesMap::new(),
            slot: None,
        }
    }

    /// Restore from `slot`; a missing or corrupt value gives an empty store.
    pub fn load(slot: Slot<FavoritesMap>) -> Self {
        let mut favorites = slot.load();
        // Stored data from older sessions may hold empty groups.
        favorites.retain(|_, group| !group.episodes.is_empty());
        debug!("loaded {} favorite show groups", favorites.len());
        Self {
            favorites,
            slot: Some(slot),
        }
    }

    pub fn toggle_favorite(&mut self, show: ShowMeta, episode: EpisodeMeta) -> ToggleOutcome {
        self.toggle_favorite_at(show, episode, Utc::now())
    }

    fn toggle_favorite_at(
        &mut self,
        show: ShowMeta,
        episode: EpisodeMeta,
        now: DateTime<Utc>,
    ) -> ToggleOutcome {
        if let Some(group) = self.favorites.get_mut(&show.id) {
            if let Some(pos) = group.episodes.iter().position(|e| e.episode_id == episode.id) {
                group.episodes.remove(pos);
                if group.episodes.is_empty() {
                    self.favorites.remove(&show.id);
                }
                return ToggleOutcome::Removed;
            }
        }

        let group = self
            .favorites
            .entry(show.id.clone())
            .or_insert_with(|| FavoriteShowGroup {
                show_id: show.id,
                show_title: show.title,
                show_image: show.image,
                episodes: Vec::new(),
            });
        group.episodes.push(FavoriteEntry {
            episode_id: episode.id,
            episode_title: episode.title,
            season_number: episode.season_number,
            episode_number: episode.episode_number,
            season_image: episode.season_image,
            episode_src: episode.src,
            added_at: now,
        });
        ToggleOutcome::Added
    }

    /// Lookup is by episode id alone, across every show.
    pub fn is_episode_favorited(&self, episode_id: &str) -> bool {
        self.favorites
            .values()
            .any(|g| g.episodes.iter().any(|e| e.episode_id == episode_id))
    }

    pub fn has_favorites_for_show(&self, show_id: &str) -> bool {
        self.favorites
            .get(show_id)
            .is_some_and(|g| !g.episodes.is_empty())
    }

    /// Write the full mapping. A store built with [`in_memory`](Self::in_memory)
    /// has nowhere to write and succeeds trivially.
    pub fn persist(&self) -> Result<(), StorageError> {
        match &self.slot {
            Some(slot) => slot.save(&self.favorites),
            None => Ok(()),
        }
    }

    pub fn favorites(&self) -> &FavoritesMap {
        &self.favorites
    }

    /// Number of favorited episodes.
    pub fn len(&self) -> usize {
        self.favorites.values().map(|g| g.episodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// Groups ordered by show title, episodes ordered by `sort`.
    pub fn groups(&self, sort: FavoriteSort) -> Vec<FavoriteShowGroup> {
        let mut groups: Vec<FavoriteShowGroup> = self.favorites.values().cloned().collect();
        groups.sort_by(|a, b| compare_titles(&a.show_title, &b.show_title));
        for group in &mut groups {
            match sort {
                FavoriteSort::AddedNewest => {
                    group.episodes.sort_by(|a, b| b.added_at.cmp(&a.added_at))
                }
                FavoriteSort::AddedOldest => {
                    group.episodes.sort_by(|a, b| a.added_at.cmp(&b.added_at))
                }
                FavoriteSort::TitleAz => group
                    .episodes
                    .sort_by(|a, b| compare_titles(&a.episode_title, &b.episode_title)),
                FavoriteSort::TitleZa => group
                    .episodes
                    .sort_by(|a, b| compare_titles(&b.episode_title, &a.episode_title)),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, FAVORITES_KEY};
    use chrono::TimeZone;
    use std::sync::Arc;

    fn show_meta(id: &str, title: &str) -> ShowMeta {
        ShowMeta {
            id: id.to_string(),
            title: title.to_string(),
            image: None,
        }
    }

    fn episode_meta(id: &str, title: &str) -> EpisodeMeta {
        EpisodeMeta {
            id: id.to_string(),
            title: title.to_string(),
            season_number: 1,
            episode_number: 1,
            season_image: None,
            src: Some(format!("https://cdn.example.com/{id}.mp3")),
        }
    }

    #[test]
    fn test_toggle_add_then_remove() {
        let mut store = FavoritesStore::in_memory();

        let outcome = store.toggle_favorite(show_meta("s1", "Show"), episode_meta("e1", "Ep"));
        assert_eq!(outcome, ToggleOutcome::Added);
        assert!(store.favorites().contains_key("s1"));
        assert_eq!(store.favorites()["s1"].episodes.len(), 1);
        assert!(store.is_episode_favorited("e1"));
        assert!(store.has_favorites_for_show("s1"));

        let outcome = store.toggle_favorite(show_meta("s1", "Show"), episode_meta("e1", "Ep"));
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert!(!store.favorites().contains_key("s1"));
        assert!(!store.is_episode_favorited("e1"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut store = FavoritesStore::in_memory();
        store.toggle_favorite(show_meta("s1", "One"), episode_meta("a", "A"));
        store.toggle_favorite(show_meta("s2", "Two"), episode_meta("b", "B"));
        let before = store.favorites().clone();

        for (show, ep) in [("s1", "c"), ("s2", "b"), ("s3", "d")] {
            store.toggle_favorite(show_meta(show, "x"), episode_meta(ep, "x"));
            store.toggle_favorite(show_meta(show, "x"), episode_meta(ep, "x"));
            assert_eq!(store.favorites().keys().collect::<Vec<_>>(), before.keys().collect::<Vec<_>>());
            for (id, group) in store.favorites() {
                let ids: Vec<_> = group.episodes.iter().map(|e| &e.episode_id).collect();
                let prev: Vec<_> = before[id].episodes.iter().map(|e| &e.episode_id).collect();
                let mut ids_sorted = ids.clone();
                ids_sorted.sort();
                let mut prev_sorted = prev.clone();
                prev_sorted.sort();
                assert_eq!(ids_sorted, prev_sorted);
            }
        }
    }

    #[test]
    fn test_no_empty_groups_after_any_sequence() {
        let mut store = FavoritesStore::in_memory();
        let ops = [
            ("s1", "e1"),
            ("s1", "e2"),
            ("s2", "e3"),
            ("s1", "e1"),
            ("s2", "e3"),
            ("s1", "e2"),
            ("s3", "e4"),
        ];
        for (show, ep) in ops {
            store.toggle_favorite(show_meta(show, show), episode_meta(ep, ep));
            assert!(store.favorites().values().all(|g| !g.episodes.is_empty()));
        }
        assert_eq!(store.len(), 1);
        assert!(store.has_favorites_for_show("s3"));
    }

    #[test]
    fn test_group_metadata_seeded_once() {
        let mut store = FavoritesStore::in_memory();
        store.toggle_favorite(show_meta("s1", "Original"), episode_meta("e1", "a"));
        store.toggle_favorite(show_meta("s1", "Renamed"), episode_meta("e2", "b"));
        assert_eq!(store.favorites()["s1"].show_title, "Original");
        assert_eq!(store.favorites()["s1"].episodes.len(), 2);
    }

    #[test]
    fn test_groups_sorted() {
        let mut store = FavoritesStore::in_memory();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        store.toggle_favorite_at(show_meta("s2", "beta"), episode_meta("x", "Zulu"), t0);
        store.toggle_favorite_at(show_meta("s2", "beta"), episode_meta("y", "alpha"), t1);
        store.toggle_favorite_at(show_meta("s1", "Alpha"), episode_meta("z", "mid"), t0);

        let groups = store.groups(FavoriteSort::AddedNewest);
        assert_eq!(groups[0].show_title, "Alpha");
        assert_eq!(groups[1].episodes[0].episode_id, "y");

        let groups = store.groups(FavoriteSort::AddedOldest);
        assert_eq!(groups[1].episodes[0].episode_id, "x");

        let groups = store.groups(FavoriteSort::TitleAz);
        assert_eq!(groups[1].episodes[0].episode_title, "alpha");

        let groups = store.groups(FavoriteSort::TitleZa);
        assert_eq!(groups[1].episodes[0].episode_title, "Zulu");
    }

    #[test]
    fn test_groups_sort_accented_titles_with_plain_ones() {
        let mut store = FavoritesStore::in_memory();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        store.toggle_favorite_at(show_meta("s1", "Zebra Talk"), episode_meta("a", "Zéro"), t0);
        store.toggle_favorite_at(show_meta("s2", "Écoute"), episode_meta("b", "Été"), t0);
        store.toggle_favorite_at(show_meta("s2", "Écoute"), episode_meta("c", "Fin"), t0);

        let groups = store.groups(FavoriteSort::TitleAz);
        assert_eq!(groups[0].show_title, "Écoute");
        assert_eq!(groups[1].show_title, "Zebra Talk");
        assert_eq!(groups[0].episodes[0].episode_title, "Été");
    }

    #[test]
    fn test_persist_and_reload() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut store = FavoritesStore::load(Slot::new(Arc::clone(&kv), FAVORITES_KEY));
        assert!(store.is_empty());

        store.toggle_favorite(show_meta("s1", "Show"), episode_meta("e1", "Ep"));
        store.persist().unwrap();

        let raw = kv.read(FAVORITES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"showTitle\":\"Show\""));
        assert!(raw.contains("\"episodeId\":\"e1\""));
        assert!(raw.contains("\"addedAt\""));

        let reloaded = FavoritesStore::load(Slot::new(kv, FAVORITES_KEY));
        assert!(reloaded.is_episode_favorited("e1"));
        assert_eq!(reloaded.favorites()["s1"].episodes[0].episode_title, "Ep");
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.write(FAVORITES_KEY, "[1, 2, 3").unwrap();
        let store = FavoritesStore::load(Slot::new(kv, FAVORITES_KEY));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reads_camel_case_storage_shape() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.write(
            FAVORITES_KEY,
            r#"{"10716":{"showId":"10716","showTitle":"Something Was Wrong","showImage":"https://x/y.jpg",
                "episodes":[{"episodeId":"10716-s1-e1","episodeTitle":"Ep 1","seasonNumber":1,
                "episodeNumber":1,"seasonImage":null,"episodeSrc":"https://x/1.mp3",
                "addedAt":"2024-03-05T10:00:00.000Z"}]}}"#,
        )
        .unwrap();
        let store = FavoritesStore::load(Slot::new(kv, FAVORITES_KEY));
        assert!(store.is_episode_favorited("10716-s1-e1"));
        assert_eq!(store.len(), 1);
    }
}
