//! TUI type definitions for screens, actions and background messages.

use crate::error::Result;
use crate::favorites::FavoritesLoad;
use crate::playback::{MediaEngine, PlaybackController, PlaybackState, PlayingEpisode};
use crate::route::Route;
use crate::types::{PodcastPreview, Show};

/// The current screen/view of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Podcast directory
    Directory,
    /// One podcast with its seasons
    Detail,
    /// Favorited episodes
    Favorites,
    /// Waiting for the catalog
    Loading,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Directory => "Podcasts",
            Screen::Detail => "Podcast",
            Screen::Favorites => "Favorites",
            Screen::Loading => "Loading",
        }
    }
}

/// Actions returned from input handling that need the store, the player or
/// the network.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action, continue running
    None,
    /// Quit the application
    Quit,
    /// Switch screens and fetch what the new screen needs
    Navigate(Route),
    /// Fetch the current screen again
    Reload,
    /// View state changed; rebuild rows that depend on the store
    Refresh,
    Play {
        season_index: usize,
        episode_index: usize,
    },
    ToggleFavorite {
        season_index: usize,
        episode_index: usize,
    },
    ResetHistory,
    /// Schedule the delayed store removal of a favorite
    RemoveFavorite {
        podcast_id: String,
        season_index: usize,
        episode_index: usize,
    },
    TogglePause,
    StopPlayback,
    CycleRate,
}

/// Completions of background work, tagged with the navigation generation
/// they were started under.
#[derive(Debug)]
pub enum Message {
    Catalog {
        generation: u64,
        result: Result<Vec<PodcastPreview>>,
    },
    Podcast {
        generation: u64,
        result: Result<Show>,
    },
    Favorites {
        generation: u64,
        load: FavoritesLoad,
    },
    CommitRemove {
        generation: u64,
        podcast_id: String,
        season_index: usize,
        episode_index: usize,
    },
}

impl Message {
    pub fn generation(&self) -> u64 {
        match self {
            Message::Catalog { generation, .. }
            | Message::Podcast { generation, .. }
            | Message::Favorites { generation, .. }
            | Message::CommitRemove { generation, .. } => *generation,
        }
    }
}

/// Snapshot of the player for the status bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStatus {
    pub state: PlaybackState,
    pub episode: Option<PlayingEpisode>,
    pub position: f64,
    pub rate: f64,
}

impl PlayerStatus {
    pub fn from_controller<E: MediaEngine>(controller: &PlaybackController<E>) -> Self {
        Self {
            state: controller.state(),
            episode: controller.current().cloned(),
            position: controller.position(),
            rate: controller.rate(),
        }
    }
}
