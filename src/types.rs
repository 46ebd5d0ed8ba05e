//! Type definitions for the podcast-browser application.
//!
//! This module contains the catalog data structures as returned by the
//! remote API. They are read-only: nothing here is ever written back.

use crate::genre::{GenreId, genre_names};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Audio played when the catalog does not supply a file for an episode.
pub const PLACEHOLDER_AUDIO_URL: &str = "https://podcast-api.netlify.app/placeholder-audio.mp3";

/// Accept any timestamp the API sends; unparseable values become `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok().map(|dt| dt.with_timezone(&Utc))))
}

/// A podcast as listed by `GET /shows`.
///
/// The listing carries only the number of seasons, not their content.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PodcastPreview {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Number of seasons.
    #[serde(default)]
    pub seasons: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub genres: Vec<GenreId>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

impl PodcastPreview {
    /// Format the podcast for display in selection lists.
    ///
    /// # Examples
    ///
    /// ```
    /// use podcast_browser::types::PodcastPreview;
    ///
    /// let podcast = PodcastPreview {
    ///     id: "42".to_string(),
    ///     title: "Old Times".to_string(),
    ///     description: String::new(),
    ///     seasons: 2,
    ///     image: String::new(),
    ///     genres: vec![3],
    ///     updated: None,
    /// };
    /// assert_eq!(podcast.to_display(), "Old Times (2 seasons) - History");
    /// ```
    pub fn to_display(&self) -> String {
        let seasons = if self.seasons == 1 { "season" } else { "seasons" };
        format!(
            "{} ({} {}) - {}",
            self.title,
            self.seasons,
            seasons,
            genre_names(&self.genres)
        )
    }
}

/// A podcast with its full season/episode tree, as returned by `GET /id/{id}`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Show {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

impl Show {
    /// Look up an episode by its (season, episode) position.
    pub fn episode(&self, season_index: usize, episode_index: usize) -> Option<&Episode> {
        self.seasons
            .get(season_index)
            .and_then(|season| season.episodes.get(episode_index))
    }

    /// Every (season, episode) position in the show.
    pub fn episode_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.seasons
            .iter()
            .enumerate()
            .flat_map(|(si, season)| (0..season.episodes.len()).map(move |ei| (si, ei)))
    }
}

/// A season; addressed by its position within the show.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Season {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

/// An episode; addressed by its position within the season.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Episode {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Audio file URL, when the catalog provides one.
    #[serde(default)]
    pub file: Option<String>,
}

impl Episode {
    /// The audio source to hand to the player.
    pub fn audio_source(&self) -> &str {
        match &self.file {
            Some(url) if !url.trim().is_empty() => url,
            _ => PLACEHOLDER_AUDIO_URL,
        }
    }
}

/// Label used when an episode has no usable title.
pub fn synthesized_title(season_index: usize, episode_index: usize) -> String {
    format!("Season {} Episode {}", season_index + 1, episode_index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_deserialization() {
        let json = r#"{
            "id": "10716",
            "title": "Something Was Wrong",
            "description": "An award-winning docuseries",
            "seasons": 14,
            "image": "https://example.com/img.jpg",
            "genres": [1, 2],
            "updated": "2022-11-03T07:00:00.000Z"
        }"#;
        let preview: PodcastPreview = serde_json::from_str(json).unwrap();
        assert_eq!(preview.id, "10716");
        assert_eq!(preview.seasons, 14);
        assert_eq!(preview.genres, vec![1, 2]);
        assert!(preview.updated.is_some());
    }

    #[test]
    fn test_bad_timestamp_is_none() {
        let json = r#"{"id": "1", "title": "T", "updated": "yesterday"}"#;
        let preview: PodcastPreview = serde_json::from_str(json).unwrap();
        assert!(preview.updated.is_none());
    }

    #[test]
    fn test_show_deserialization_ignores_string_genres() {
        let json = r#"{
            "id": "42",
            "title": "Old Times",
            "genres": ["All", "History"],
            "seasons": [
                {"season": 1, "title": "S1", "image": "s1.jpg",
                 "episodes": [{"title": "Pilot", "episode": 1, "file": "https://a/1.mp3"}]}
            ]
        }"#;
        let show: Show = serde_json::from_str(json).unwrap();
        assert_eq!(show.seasons.len(), 1);
        assert_eq!(show.episode(0, 0).unwrap().title, "Pilot");
        assert!(show.episode(0, 1).is_none());
        assert!(show.episode(1, 0).is_none());
    }

    #[test]
    fn test_episode_positions() {
        let ep = Episode {
            title: String::new(),
            description: String::new(),
            file: None,
        };
        let show = Show {
            id: "1".to_string(),
            title: "T".to_string(),
            description: String::new(),
            image: String::new(),
            updated: None,
            seasons: vec![
                Season { title: String::new(), image: String::new(), episodes: vec![ep.clone(), ep.clone()] },
                Season { title: String::new(), image: String::new(), episodes: vec![ep] },
            ],
        };
        let positions: Vec<_> = show.episode_positions().collect();
        assert_eq!(positions, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_audio_source_falls_back_to_placeholder() {
        let mut ep = Episode {
            title: "T".to_string(),
            description: String::new(),
            file: None,
        };
        assert_eq!(ep.audio_source(), PLACEHOLDER_AUDIO_URL);
        ep.file = Some("  ".to_string());
        assert_eq!(ep.audio_source(), PLACEHOLDER_AUDIO_URL);
        ep.file = Some("https://a/1.mp3".to_string());
        assert_eq!(ep.audio_source(), "https://a/1.mp3");
    }

    #[test]
    fn test_synthesized_title_is_one_based() {
        assert_eq!(synthesized_title(0, 1), "Season 1 Episode 2");
    }
}
