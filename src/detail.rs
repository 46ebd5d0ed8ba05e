//! Podcast detail screen: seasons, episodes and per-episode actions.

use crate::error::{AppError, Result};
use crate::playback::PlayingEpisode;
use crate::storage::KeyValueStore;
use crate::store::StateStore;
use crate::types::{Episode, Show, synthesized_title};
use log::debug;

/// Shorten `text` to `limit` words, appending "..." when anything was cut.
///
/// # Examples
///
/// ```
/// use podcast_browser::detail::truncate_words;
///
/// assert_eq!(truncate_words("one two three", 2), ("one two...".to_string(), true));
/// assert_eq!(truncate_words("one two", 2), ("one two".to_string(), false));
/// ```
pub fn truncate_words(text: &str, limit: usize) -> (String, bool) {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        return (text.to_string(), false);
    }
    (format!("{}...", words[..limit].join(" ")), true)
}

/// Label of the play action for an episode.
pub fn play_label(listened: bool) -> &'static str {
    if listened { "Re-listen" } else { "Play" }
}

/// One line of the season/episode list.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRow {
    Season {
        index: usize,
        title: String,
        episode_count: usize,
        expanded: bool,
    },
    Episode {
        season_index: usize,
        episode_index: usize,
        title: String,
        favorite: bool,
        listened: bool,
    },
}

/// View model for one podcast.
#[derive(Debug, Clone)]
pub struct DetailView {
    show: Show,
    expanded_season: Option<usize>,
    description_expanded: bool,
    word_limit: usize,
}

impl DetailView {
    pub fn new(show: Show, word_limit: usize) -> Self {
        Self {
            show,
            expanded_season: None,
            description_expanded: false,
            word_limit,
        }
    }

    pub fn show(&self) -> &Show {
        &self.show
    }

    pub fn expanded_season(&self) -> Option<usize> {
        self.expanded_season
    }

    /// Expand a season, collapsing any other; toggling the open one closes it.
    pub fn toggle_season(&mut self, season_index: usize) {
        if season_index >= self.show.seasons.len() {
            return;
        }
        self.expanded_season = if self.expanded_season == Some(season_index) {
            None
        } else {
            Some(season_index)
        };
    }

    pub fn toggle_description(&mut self) {
        self.description_expanded = !self.description_expanded;
    }

    /// The description as displayed, and whether more text is hidden.
    pub fn description(&self) -> (String, bool) {
        if self.description_expanded {
            return (self.show.description.clone(), false);
        }
        truncate_words(&self.show.description, self.word_limit)
    }

    /// Whether the description is long enough to need the toggle.
    pub fn description_is_long(&self) -> bool {
        self.show.description.split_whitespace().count() > self.word_limit
    }

    fn episode(&self, season_index: usize, episode_index: usize) -> Result<&Episode> {
        self.show.episode(season_index, episode_index).ok_or_else(|| {
            AppError::NotFound(format!(
                "Season {} episode {} of podcast {}",
                season_index + 1,
                episode_index + 1,
                self.show.id
            ))
        })
    }

    /// The episode's own title, or a synthesized label when it has none.
    pub fn episode_title(&self, season_index: usize, episode_index: usize) -> String {
        match self.show.episode(season_index, episode_index) {
            Some(episode) if !episode.title.trim().is_empty() => episode.title.clone(),
            _ => synthesized_title(season_index, episode_index),
        }
    }

    /// Build what the playback controller needs to play an episode.
    pub fn playing_episode(&self, season_index: usize, episode_index: usize) -> Result<PlayingEpisode> {
        let episode = self.episode(season_index, episode_index)?;
        Ok(PlayingEpisode {
            podcast_id: self.show.id.clone(),
            podcast_title: self.show.title.clone(),
            season_index,
            episode_index,
            title: self.episode_title(season_index, episode_index),
            audio_src: episode.audio_source().to_string(),
        })
    }

    /// Rows for the season list with the expanded season's episodes inlined.
    pub fn rows<S: KeyValueStore>(&self, store: &StateStore<S>) -> Vec<DetailRow> {
        let favorites = store.list_favorites(&self.show.id);
        let listened = store.list_listened(&self.show.id);

        let mut rows = Vec::new();
        for (si, season) in self.show.seasons.iter().enumerate() {
            let expanded = self.expanded_season == Some(si);
            let title = if season.title.trim().is_empty() {
                format!("Season {}", si + 1)
            } else {
                season.title.clone()
            };
            rows.push(DetailRow::Season {
                index: si,
                title,
                episode_count: season.episodes.len(),
                expanded,
            });

            if expanded {
                for ei in 0..season.episodes.len() {
                    rows.push(DetailRow::Episode {
                        season_index: si,
                        episode_index: ei,
                        title: self.episode_title(si, ei),
                        favorite: favorites.iter().any(|f| f.matches(si, ei)),
                        listened: listened.iter().any(|l| l.matches(si, ei)),
                    });
                }
            }
        }
        rows
    }

    /// Favorite or unfavorite an episode; returns the new state.
    pub fn toggle_favorite<S: KeyValueStore>(
        &self,
        store: &mut StateStore<S>,
        season_index: usize,
        episode_index: usize,
    ) -> Result<bool> {
        self.episode(season_index, episode_index)?;
        store.toggle_favorite(&self.show.id, season_index, episode_index)
    }

    /// Whether there is anything for "reset listened history" to clear.
    pub fn has_listen_history<S: KeyValueStore>(&self, store: &StateStore<S>) -> bool {
        !store.list_listened(&self.show.id).is_empty()
            || self
                .show
                .episode_positions()
                .any(|(si, ei)| store.get_playback_position(&self.show.id, si, ei).is_some())
    }

    pub fn reset_listened_history<S: KeyValueStore>(&self, store: &mut StateStore<S>) -> Result<()> {
        debug!("Resetting listened history for '{}'", self.show.title);
        store.reset_listen_history(&self.show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::{PLACEHOLDER_AUDIO_URL, Season};

    fn show() -> Show {
        Show {
            id: "42".to_string(),
            title: "Old Times".to_string(),
            description: "A long look at the distant past".to_string(),
            image: String::new(),
            updated: None,
            seasons: vec![
                Season {
                    title: "Season 1".to_string(),
                    image: String::new(),
                    episodes: vec![
                        Episode {
                            title: "The Beginning".to_string(),
                            description: String::new(),
                            file: Some("https://cdn.example/1.mp3".to_string()),
                        },
                        Episode {
                            title: String::new(),
                            description: String::new(),
                            file: None,
                        },
                    ],
                },
                Season {
                    title: String::new(),
                    image: String::new(),
                    episodes: vec![Episode {
                        title: "Later".to_string(),
                        description: String::new(),
                        file: None,
                    }],
                },
            ],
        }
    }

    fn store() -> StateStore<MemoryStore> {
        StateStore::new(MemoryStore::new())
    }

    #[test]
    fn test_seasons_start_collapsed() {
        let view = DetailView::new(show(), 100);
        let rows = view.rows(&store());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| matches!(r, DetailRow::Season { expanded: false, .. })));
    }

    #[test]
    fn test_only_one_season_expanded() {
        let mut view = DetailView::new(show(), 100);
        view.toggle_season(0);
        assert_eq!(view.rows(&store()).len(), 4);

        view.toggle_season(1);
        assert_eq!(view.expanded_season(), Some(1));
        let rows = view.rows(&store());
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], DetailRow::Season { expanded: false, .. }));

        view.toggle_season(1);
        assert_eq!(view.expanded_season(), None);

        view.toggle_season(9);
        assert_eq!(view.expanded_season(), None);
    }

    #[test]
    fn test_untitled_season_gets_label() {
        let view = DetailView::new(show(), 100);
        match &view.rows(&store())[1] {
            DetailRow::Season { title, .. } => assert_eq!(title, "Season 2"),
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[test]
    fn test_playing_episode_uses_real_or_synthesized_fields() {
        let view = DetailView::new(show(), 100);

        let first = view.playing_episode(0, 0).unwrap();
        assert_eq!(first.title, "The Beginning");
        assert_eq!(first.audio_src, "https://cdn.example/1.mp3");
        assert_eq!(first.podcast_title, "Old Times");

        let second = view.playing_episode(0, 1).unwrap();
        assert_eq!(second.title, "Season 1 Episode 2");
        assert_eq!(second.audio_src, PLACEHOLDER_AUDIO_URL);

        assert!(matches!(
            view.playing_episode(3, 0),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_toggle_favorite_shows_marker() {
        let mut view = DetailView::new(show(), 100);
        let mut store = store();
        assert!(view.toggle_favorite(&mut store, 0, 1).unwrap());
        view.toggle_season(0);

        let favorites: Vec<bool> = view
            .rows(&store)
            .into_iter()
            .filter_map(|r| match r {
                DetailRow::Episode { favorite, .. } => Some(favorite),
                _ => None,
            })
            .collect();
        assert_eq!(favorites, vec![false, true]);

        assert!(!view.toggle_favorite(&mut store, 0, 1).unwrap());
        assert!(store.list_favorites("42").is_empty());
        assert!(view.toggle_favorite(&mut store, 5, 5).is_err());
    }

    #[test]
    fn test_reset_listened_history() {
        let view = DetailView::new(show(), 100);
        let mut store = store();
        assert!(!view.has_listen_history(&store));

        store.mark_listened("42", 0, 0).unwrap();
        store.save_playback_position("42", 1, 0, 12.0).unwrap();
        assert!(view.has_listen_history(&store));

        view.reset_listened_history(&mut store).unwrap();
        assert!(!view.has_listen_history(&store));
        assert!(!store.is_listened("42", 0, 0));
        assert_eq!(store.get_playback_position("42", 1, 0), None);
    }

    #[test]
    fn test_description_truncation_toggle() {
        let mut view = DetailView::new(show(), 3);
        assert!(view.description_is_long());
        assert_eq!(view.description(), ("A long look...".to_string(), true));

        view.toggle_description();
        assert_eq!(view.description().0, "A long look at the distant past");
        assert!(!view.description().1);
    }

    #[test]
    fn test_play_label() {
        assert_eq!(play_label(true), "Re-listen");
        assert_eq!(play_label(false), "Play");
    }
}
