//! Persisted favorites, listen history and playback positions.
//!
//! Records live in a [`KeyValueStore`] under the following keys:
//!
//! - `favorites-{podcastId}`: JSON list of [`FavoriteRecord`]
//! - `fullyListened-{podcastId}`: JSON list of [`ListenedRecord`]
//! - `playback-{podcastId}-{seasonIndex}-{episodeIndex}`: position in seconds
//! - `favoritePodcastIds`: JSON list of podcast ids that have favorites
//!
//! Each call performs its writes immediately, but multi-key updates are not
//! grouped: a crash between the favorites list write and the index write, or
//! halfway through a listen-history reset, leaves partial state behind.

use crate::error::{AppError, Result};
use crate::storage::KeyValueStore;
use crate::types::Show;
use chrono::Utc;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const FAVORITES_PREFIX: &str = "favorites-";
pub const LISTENED_PREFIX: &str = "fullyListened-";
pub const PLAYBACK_PREFIX: &str = "playback-";
pub const FAVORITES_INDEX_KEY: &str = "favoritePodcastIds";

pub fn favorites_key(podcast_id: &str) -> String {
    format!("{}{}", FAVORITES_PREFIX, podcast_id)
}

pub fn listened_key(podcast_id: &str) -> String {
    format!("{}{}", LISTENED_PREFIX, podcast_id)
}

pub fn playback_key(podcast_id: &str, season_index: usize, episode_index: usize) -> String {
    format!(
        "{}{}-{}-{}",
        PLAYBACK_PREFIX, podcast_id, season_index, episode_index
    )
}

/// A favorited episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    pub podcast_id: String,
    pub season_index: usize,
    pub episode_index: usize,
    /// RFC 3339 time of the first insert. Older records may lack it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl FavoriteRecord {
    pub fn matches(&self, season_index: usize, episode_index: usize) -> bool {
        self.season_index == season_index && self.episode_index == episode_index
    }
}

/// An episode that has been played to the end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListenedRecord {
    pub podcast_id: String,
    pub season_index: usize,
    pub episode_index: usize,
}

impl ListenedRecord {
    pub fn matches(&self, season_index: usize, episode_index: usize) -> bool {
        self.season_index == season_index && self.episode_index == episode_index
    }
}

/// Keeps at most one entry per (season, episode), preserving first occurrence.
fn dedupe_by_position<T>(items: Vec<T>, position: impl Fn(&T) -> (usize, usize)) -> Vec<T> {
    let mut seen = BTreeSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(position(item)))
        .collect()
}

/// Typed access to the persisted user state.
pub struct StateStore<S: KeyValueStore> {
    backend: S,
}

impl<S: KeyValueStore> StateStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Read a JSON list, failing on corrupt data so callers never overwrite it.
    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.backend.get(key) {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::Parse(format!("Stored value under '{}': {}", key, e))),
        }
    }

    /// Read a JSON list for display; corrupt data is logged and treated as empty.
    fn read_list_lenient<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.read_list(key).unwrap_or_else(|e| {
            warn!("{}", e);
            Vec::new()
        })
    }

    /// Write a list, or delete the key when the list is empty.
    fn write_list<T: Serialize>(&mut self, key: &str, items: &[T]) -> Result<()> {
        if items.is_empty() {
            self.backend.remove(key)
        } else {
            let json = serde_json::to_string(items)?;
            self.backend.set(key, &json)
        }
    }

    // ---- favorites ----

    /// Insert a favorite unless one already exists for this episode.
    ///
    /// Returns `true` when a record was inserted. `addedAt` is only set on the
    /// first insert.
    pub fn add_favorite(
        &mut self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Result<bool> {
        let key = favorites_key(podcast_id);
        let mut favorites = dedupe_by_position(self.read_list::<FavoriteRecord>(&key)?, |f| {
            (f.season_index, f.episode_index)
        });

        if favorites.iter().any(|f| f.matches(season_index, episode_index)) {
            return Ok(false);
        }

        favorites.push(FavoriteRecord {
            podcast_id: podcast_id.to_string(),
            season_index,
            episode_index,
            added_at: Some(Utc::now().to_rfc3339()),
        });
        self.write_list(&key, &favorites)?;
        self.update_index(podcast_id, true)?;

        debug!(
            "Favorited podcast {} S{}E{}",
            podcast_id, season_index, episode_index
        );
        Ok(true)
    }

    /// Delete a favorite. Removing a favorite that does not exist is a no-op.
    ///
    /// Returns `true` when a record was removed.
    pub fn remove_favorite(
        &mut self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Result<bool> {
        let key = favorites_key(podcast_id);
        if self.backend.get(&key).is_none() {
            return Ok(false);
        }

        let favorites = self.read_list::<FavoriteRecord>(&key)?;
        let before = favorites.len();
        let remaining: Vec<FavoriteRecord> = favorites
            .into_iter()
            .filter(|f| !f.matches(season_index, episode_index))
            .collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.write_list(&key, &remaining)?;
        if remaining.is_empty() {
            self.update_index(podcast_id, false)?;
        }
        Ok(true)
    }

    /// Add or remove an episode from favorites; returns the new state.
    pub fn toggle_favorite(
        &mut self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Result<bool> {
        if self.is_favorite(podcast_id, season_index, episode_index) {
            self.remove_favorite(podcast_id, season_index, episode_index)?;
            Ok(false)
        } else {
            self.add_favorite(podcast_id, season_index, episode_index)?;
            Ok(true)
        }
    }

    /// Favorites for one podcast in insertion order; empty if none are stored.
    pub fn list_favorites(&self, podcast_id: &str) -> Vec<FavoriteRecord> {
        dedupe_by_position(self.read_list_lenient::<FavoriteRecord>(&favorites_key(podcast_id)), |f| {
            (f.season_index, f.episode_index)
        })
    }

    pub fn is_favorite(&self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.list_favorites(podcast_id)
            .iter()
            .any(|f| f.matches(season_index, episode_index))
    }

    /// Ids of every podcast with at least one favorite.
    ///
    /// Served from the favorites index; when the index is missing (data
    /// written by an older version) it is rebuilt once from a key scan.
    pub fn list_all_favorite_keys(&mut self) -> Result<BTreeSet<String>> {
        if self.backend.get(FAVORITES_INDEX_KEY).is_some() {
            let ids: Vec<String> = self.read_list(FAVORITES_INDEX_KEY)?;
            return Ok(ids.into_iter().collect());
        }

        let ids: BTreeSet<String> = self
            .backend
            .keys()
            .into_iter()
            .filter_map(|key| key.strip_prefix(FAVORITES_PREFIX).map(str::to_string))
            .filter(|id| !id.is_empty())
            .collect();

        if !ids.is_empty() {
            debug!("Rebuilt favorites index with {} podcasts", ids.len());
            let list: Vec<&String> = ids.iter().collect();
            self.write_list(FAVORITES_INDEX_KEY, &list)?;
        }
        Ok(ids)
    }

    fn update_index(&mut self, podcast_id: &str, present: bool) -> Result<()> {
        // Make sure the index exists before editing it.
        let mut ids = self.list_all_favorite_keys()?;
        let changed = if present {
            ids.insert(podcast_id.to_string())
        } else {
            ids.remove(podcast_id)
        };
        if changed {
            let list: Vec<&String> = ids.iter().collect();
            self.write_list(FAVORITES_INDEX_KEY, &list)?;
        }
        Ok(())
    }

    /// Total number of favorites across all podcasts.
    pub fn favorite_count(&mut self) -> Result<usize> {
        let ids = self.list_all_favorite_keys()?;
        Ok(ids.iter().map(|id| self.list_favorites(id).len()).sum())
    }

    /// Give a timestamp to favorites stored without one.
    pub fn backfill_added_at(&mut self, podcast_id: &str) -> Result<Vec<FavoriteRecord>> {
        let key = favorites_key(podcast_id);
        let mut favorites = self.list_favorites(podcast_id);
        if favorites.iter().all(|f| f.added_at.is_some()) {
            return Ok(favorites);
        }

        let now = Utc::now().to_rfc3339();
        for favorite in favorites.iter_mut().filter(|f| f.added_at.is_none()) {
            favorite.added_at = Some(now.clone());
        }
        self.write_list(&key, &favorites)?;
        Ok(favorites)
    }

    // ---- listen history ----

    /// Record an episode as fully listened. Idempotent.
    pub fn mark_listened(
        &mut self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Result<bool> {
        let key = listened_key(podcast_id);
        let mut listened = dedupe_by_position(self.read_list::<ListenedRecord>(&key)?, |l| {
            (l.season_index, l.episode_index)
        });

        if listened.iter().any(|l| l.matches(season_index, episode_index)) {
            return Ok(false);
        }

        listened.push(ListenedRecord {
            podcast_id: podcast_id.to_string(),
            season_index,
            episode_index,
        });
        self.write_list(&key, &listened)?;
        Ok(true)
    }

    pub fn is_listened(&self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.list_listened(podcast_id)
            .iter()
            .any(|l| l.matches(season_index, episode_index))
    }

    pub fn list_listened(&self, podcast_id: &str) -> Vec<ListenedRecord> {
        dedupe_by_position(self.read_list_lenient::<ListenedRecord>(&listened_key(podcast_id)), |l| {
            (l.season_index, l.episode_index)
        })
    }

    /// Forget every listened mark and saved position for a podcast.
    ///
    /// Position keys are enumerated from the show's season/episode tree.
    pub fn reset_listen_history(&mut self, show: &Show) -> Result<()> {
        self.backend.remove(&listened_key(&show.id))?;
        for (season_index, episode_index) in show.episode_positions() {
            self.backend
                .remove(&playback_key(&show.id, season_index, episode_index))?;
        }
        debug!("Reset listen history for podcast {}", show.id);
        Ok(())
    }

    // ---- playback positions ----

    /// Overwrite the saved position. Last write wins.
    pub fn save_playback_position(
        &mut self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
        seconds: f64,
    ) -> Result<()> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "playback position must be a non-negative number, got {}",
                seconds
            )));
        }
        self.backend.set(
            &playback_key(podcast_id, season_index, episode_index),
            &seconds.to_string(),
        )
    }

    pub fn get_playback_position(
        &self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Option<f64> {
        let key = playback_key(podcast_id, season_index, episode_index);
        let raw = self.backend.get(&key)?;
        match raw.trim().parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Some(seconds),
            _ => {
                warn!("Ignoring invalid playback position '{}' under {}", raw, key);
                None
            }
        }
    }

    pub fn clear_playback_position(
        &mut self,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Result<()> {
        self.backend
            .remove(&playback_key(podcast_id, season_index, episode_index))
    }
}
