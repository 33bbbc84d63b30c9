use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::genres::GenreTable;

/// Accept an id sent either as a JSON number or as a string.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Num(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}

/// A genre reference on a show: the catalog sends numeric ids, the detail
/// endpoint sends titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenreRef {
    Id(u32),
    Name(String),
}

/// Season information as delivered by either endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seasons {
    /// Catalog listing: only the number of seasons.
    Count(u32),
    /// Show detail: full season records.
    List(Vec<Season>),
}

impl Default for Seasons {
    fn default() -> Self {
        Seasons::Count(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub updated: String,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
    #[serde(default)]
    pub seasons: Seasons,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    #[serde(default, deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "file", default)]
    pub file_url: String,
    #[serde(rename = "episode", default)]
    pub episode_number: u32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(deserialize_with = "de_id_u32")]
    pub id: u32,
    #[serde(default)]
    pub title: String,
}

fn de_id_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = de_id(deserializer)?;
    raw.trim().parse().map_err(serde::de::Error::custom)
}

impl Show {
    /// Parsed `updated` timestamp; `None` when missing or unparsable.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.updated.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn season_count(&self) -> usize {
        match &self.seasons {
            Seasons::Count(n) => *n as usize,
            Seasons::List(list) => list.len(),
        }
    }

    /// Season records, empty for catalog entries.
    pub fn season_list(&self) -> &[Season] {
        match &self.seasons {
            Seasons::Count(_) => &[],
            Seasons::List(list) => list,
        }
    }

    /// Numeric genre ids, resolving title references through `table`.
    /// Titles the table does not know are skipped.
    pub fn genre_ids(&self, table: &GenreTable) -> Vec<u32> {
        self.genres
            .iter()
            .filter_map(|g| match g {
                GenreRef::Id(id) => Some(*id),
                GenreRef::Name(name) => table.id_for_name(name),
            })
            .collect()
    }

    /// Fill in what the detail endpoint leaves out: episode numbers default
    /// to their 1-based position and ids become `{show}-s{season}-e{episode}`.
    /// Ids are unique within the show; a synthesized id that is already taken
    /// gets a `-{n}` suffix.
    pub fn normalize(&mut self) {
        let show_id = self.id.clone();
        let Seasons::List(seasons) = &mut self.seasons else {
            return;
        };
        let mut taken: HashSet<String> = seasons
            .iter()
            .flat_map(|s| s.episodes.iter())
            .filter(|e| !e.id.is_empty())
            .map(|e| e.id.clone())
            .collect();
        for (season_idx, season) in seasons.iter_mut().enumerate() {
            let season_number = season.number(season_idx);
            for (ep_idx, episode) in season.episodes.iter_mut().enumerate() {
                if episode.episode_number == 0 {
                    episode.episode_number = ep_idx as u32 + 1;
                }
                if episode.id.is_empty() {
                    let base = format!("{}-s{}-e{}", show_id, season_number, episode.episode_number);
                    let mut id = base.clone();
                    let mut n = 2;
                    while taken.contains(&id) {
                        id = format!("{}-{}", base, n);
                        n += 1;
                    }
                    taken.insert(id.clone());
                    episode.id = id;
                }
            }
        }
    }
}

impl Season {
    /// Season number, falling back to the 1-based position in the list.
    pub fn number(&self, index: usize) -> u32 {
        self.season.unwrap_or(index as u32 + 1)
    }

    /// Display title, "Season N" when the record has none.
    pub fn label(&self, index: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Season {}", self.number(index)),
        }
    }

    pub fn episode_count_label(&self) -> String {
        let n = self.episodes.len();
        if n == 1 {
            "1 episode".to_string()
        } else {
            format!("{} episodes", n)
        }
    }
}

impl Episode {
    /// Title, or "Episode N" when the record has none.
    pub fn display_title(&self) -> String {
        match self.title.trim() {
            "" => format!("Episode {}", self.episode_number),
            title => title.to_string(),
        }
    }
}
