//! The single now-playing selection.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StorageError;
use crate::storage::Slot;

static SELECTION_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub src: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub show_title: Option<String>,
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    /// Distinct for every select, even of the same `src`.
    pub selection_id: String,
}

/// What the caller wants played; the selection id is assigned on select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackRequest {
    pub src: String,
    pub title: String,
    pub show_title: Option<String>,
    pub season_number: Option<u32>,
    pub episode_number: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Selected { playing: bool },
}

fn next_selection_id(src: &str) -> String {
    let seq = SELECTION_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nonce: u32 = rand::thread_rng().gen();
    format!(
        "{}-{}-{}-{:08x}",
        src,
        Utc::now().timestamp_millis(),
        seq,
        nonce
    )
}

pub struct AudioSelection {
    current: Option<Track>,
    playing: bool,
    slot: Option<Slot<Option<Track>>>,
}

impl AudioSelection {
    pub fn in_memory() -> Self {
        Self {
            current: None,
            playing: false,
            slot: None,
        }
    }

    /// Restore the last selection, paused.
    pub fn load(slot: Slot<Option<Track>>) -> Self {
        let current = slot.load().filter(|t| !t.src.is_empty());
        if let Some(track) = &current {
            debug!("restored last track: {}", track.title);
        }
        Self {
            current,
            playing: false,
            slot: Some(slot),
        }
    }

    /// Replace the selection and start playing. Returns `false` and leaves
    /// everything untouched when `src` is empty.
    pub fn select(&mut self, request: TrackRequest) -> bool {
        if request.src.trim().is_empty() {
            debug!("ignoring select without a source: {:?}", request.title);
            return false;
        }
        let selection_id = next_selection_id(&request.src);
        self.current = Some(Track {
            src: request.src,
            title: request.title,
            show_title: request.show_title,
            season_number: request.season_number,
            episode_number: request.episode_number,
            selection_id,
        });
        self.playing = true;
        true
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    /// Pause output; the selection stays.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn state(&self) -> PlayerState {
        match self.current {
            None => PlayerState::Idle,
            Some(_) => PlayerState::Selected {
                playing: self.playing,
            },
        }
    }

    pub fn persist(&self) -> Result<(), StorageError> {
        match &self.slot {
            Some(slot) => slot.save(&self.current),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore, AUDIO_KEY};
    use std::collections::HashSet;
    use std::sync::Arc;

    fn request(src: &str) -> TrackRequest {
        TrackRequest {
            src: src.to_string(),
            title: "Episode".to_string(),
            show_title: Some("Show".to_string()),
            season_number: Some(1),
            episode_number: Some(2),
        }
    }

    #[test]
    fn test_repeated_select_gives_distinct_ids() {
        let mut audio = AudioSelection::in_memory();
        let mut ids = HashSet::new();
        for _ in 0..50 {
            assert!(audio.select(request("https://cdn/ep.mp3")));
            ids.insert(audio.current().unwrap().selection_id.clone());
        }
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_select_without_src_is_ignored() {
        let mut audio = AudioSelection::in_memory();
        assert!(!audio.select(request("")));
        assert_eq!(audio.state(), PlayerState::Idle);

        audio.select(request("https://cdn/a.mp3"));
        audio.stop();
        assert!(!audio.select(request("   ")));
        assert_eq!(audio.current().unwrap().src, "https://cdn/a.mp3");
        assert!(!audio.is_playing());
    }

    #[test]
    fn test_state_transitions() {
        let mut audio = AudioSelection::in_memory();
        assert_eq!(audio.state(), PlayerState::Idle);
        audio.toggle_play();
        assert_eq!(audio.state(), PlayerState::Idle);

        audio.select(request("https://cdn/a.mp3"));
        assert_eq!(audio.state(), PlayerState::Selected { playing: true });
        audio.toggle_play();
        assert_eq!(audio.state(), PlayerState::Selected { playing: false });
        audio.toggle_play();
        audio.stop();
        assert_eq!(audio.state(), PlayerState::Selected { playing: false });
    }

    #[test]
    fn test_restore_is_paused() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut audio = AudioSelection::load(Slot::new(Arc::clone(&kv), AUDIO_KEY));
        audio.select(request("https://cdn/a.mp3"));
        audio.persist().unwrap();

        let raw = kv.read(AUDIO_KEY).unwrap().unwrap();
        assert!(raw.contains("\"selectionId\""));

        let restored = AudioSelection::load(Slot::new(kv, AUDIO_KEY));
        assert_eq!(restored.current().unwrap().src, "https://cdn/a.mp3");
        assert_eq!(restored.state(), PlayerState::Selected { playing: false });
    }

    #[test]
    fn test_null_stored_track_is_idle() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        kv.write(AUDIO_KEY, "null").unwrap();
        let audio = AudioSelection::load(Slot::new(kv, AUDIO_KEY));
        assert_eq!(audio.state(), PlayerState::Idle);
    }
}
