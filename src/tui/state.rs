//! Application state management and input handling.

use crate::detail::{DetailRow, DetailView};
use crate::directory::{DirectoryRow, DirectoryView};
use crate::favorites::{FavoritesLoad, FavoritesView};
use crate::genre::{GenreId, next_genre_filter};
use crate::route::Route;
use crate::storage::KeyValueStore;
use crate::store::StateStore;
use crate::types::{PodcastPreview, Show};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, error, info, warn};
use ratatui::widgets::ListState;

use super::types::{Action, Message, PlayerStatus, Screen};

/// Number of podcasts in the featured strip.
const FEATURED_COUNT: usize = 5;

/// What the directory selection points at.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryEntry {
    Podcast(String),
    Genre(GenreId),
}

/// Application state for the TUI.
pub struct App {
    /// Current screen being displayed
    pub screen: Screen,
    /// Route of the screen being shown or loaded
    pub route: Route,
    /// Bumped on every navigation; completions from older generations are dropped
    generation: u64,
    /// Whether the app should quit
    pub should_quit: bool,
    pub directory: Option<DirectoryView>,
    pub directory_state: ListState,
    /// Show the directory as genre buckets
    pub grouped: bool,
    /// Titles picked for the featured strip
    pub featured: Vec<String>,
    /// Whether the search bar is capturing keys
    pub search_focused: bool,
    pub detail: Option<DetailView>,
    pub detail_rows: Vec<DetailRow>,
    pub detail_has_history: bool,
    pub detail_state: ListState,
    pub favorites: Option<FavoritesView>,
    pub favorites_state: ListState,
    /// Loading message
    pub loading_message: String,
    /// Fetch failure shown in place of content
    pub load_error: Option<String>,
    /// Error popup
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    /// Whether help modal is shown
    pub show_help: bool,
    pub player: PlayerStatus,
    preview_count: usize,
    word_limit: usize,
}

impl App {
    pub fn new(preview_count: usize, word_limit: usize) -> Self {
        Self {
            screen: Screen::Loading,
            route: Route::Directory,
            generation: 0,
            should_quit: false,
            directory: None,
            directory_state: ListState::default(),
            grouped: false,
            featured: Vec::new(),
            search_focused: false,
            detail: None,
            detail_rows: Vec::new(),
            detail_has_history: false,
            detail_state: ListState::default(),
            favorites: None,
            favorites_state: ListState::default(),
            loading_message: String::new(),
            load_error: None,
            error_message: None,
            status_message: None,
            show_help: false,
            player: PlayerStatus::default(),
            preview_count,
            word_limit,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a completion tagged with `generation` still belongs on screen.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Leave the current screen and start loading `route`.
    ///
    /// Returns the generation the fetch for the new screen must carry.
    pub fn navigate(&mut self, route: Route) -> u64 {
        self.generation += 1;
        self.loading_message = match &route {
            Route::Directory => "Loading podcasts...".to_string(),
            Route::Podcast(id) => format!("Loading podcast {}...", id),
            Route::Favorites => "Loading favorites...".to_string(),
        };
        self.route = route;
        self.screen = Screen::Loading;
        self.load_error = None;
        self.search_focused = false;
        self.generation
    }

    /// Show a fetch failure in place of the screen content.
    pub fn set_load_error(&mut self, message: &str) {
        self.load_error = Some(message.to_string());
        self.screen = match self.route {
            Route::Directory => Screen::Directory,
            Route::Podcast(_) => Screen::Detail,
            Route::Favorites => Screen::Favorites,
        };
    }

    /// Set the catalog and switch to the directory screen.
    ///
    /// Sort, filter and search survive a reload.
    pub fn set_catalog(&mut self, podcasts: Vec<PodcastPreview>) {
        let mut view = DirectoryView::new(podcasts, self.preview_count);
        if let Some(old) = self.directory.take() {
            view.sort = old.sort;
            view.genre = old.genre;
            view.query = old.query;
        }
        self.featured = view
            .featured(FEATURED_COUNT)
            .into_iter()
            .map(|p| p.title.clone())
            .collect();
        self.directory = Some(view);
        self.directory_state.select(Some(0));
        self.screen = Screen::Directory;
    }

    /// Set the podcast and switch to the detail screen.
    pub fn set_podcast<S: KeyValueStore>(&mut self, show: Show, store: &StateStore<S>) {
        self.detail = Some(DetailView::new(show, self.word_limit));
        self.detail_state.select(Some(0));
        self.refresh_detail(store);
        self.screen = Screen::Detail;
    }

    /// Rebuild the detail rows after a store change or season toggle.
    pub fn refresh_detail<S: KeyValueStore>(&mut self, store: &StateStore<S>) {
        if let Some(view) = &self.detail {
            self.detail_rows = view.rows(store);
            self.detail_has_history = view.has_listen_history(store);
            clamp_selection(&mut self.detail_state, self.detail_rows.len());
        }
    }

    /// Set the favorites and switch to the favorites screen.
    pub fn set_favorites(&mut self, load: FavoritesLoad) {
        let mut view = FavoritesView::new(load);
        if let Some(previous) = self.favorites.take() {
            view.carry_over(previous);
        }
        let len = view.visible().len();
        self.favorites = Some(view);
        self.favorites_state.select(Some(0));
        clamp_selection(&mut self.favorites_state, len);
        self.screen = Screen::Favorites;
    }

    /// Apply a finished background job.
    ///
    /// Results tagged with an older generation are dropped. Removal commits
    /// are the exception: the user already confirmed them, so they reach the
    /// store even after the favorites screen was left. Returns `true` when
    /// the favorites list should be aggregated again.
    pub fn apply<S: KeyValueStore>(&mut self, message: Message, store: &mut StateStore<S>) -> bool {
        let generation = message.generation();
        let current = self.is_current(generation);
        match message {
            Message::CommitRemove {
                podcast_id,
                season_index,
                episode_index,
                ..
            } => {
                let result = match self.favorites.as_mut() {
                    Some(view) => {
                        view.commit_remove(store, &podcast_id, season_index, episode_index)
                    }
                    None => store
                        .remove_favorite(&podcast_id, season_index, episode_index)
                        .map(|_| ()),
                };
                match result {
                    Ok(()) => current,
                    Err(e) => {
                        error!("Failed to remove favorite: {}", e);
                        self.set_error(&e.to_string());
                        false
                    }
                }
            }
            _ if !current => {
                debug!("Dropping stale result from generation {}", generation);
                false
            }
            Message::Catalog { result, .. } => {
                match result {
                    Ok(podcasts) => {
                        info!("Loaded {} podcasts", podcasts.len());
                        self.set_catalog(podcasts);
                    }
                    Err(e) => {
                        error!("Failed to load catalog: {}", e);
                        self.set_load_error(&e.to_string());
                    }
                }
                false
            }
            Message::Podcast { result, .. } => {
                match result {
                    Ok(show) => self.set_podcast(show, store),
                    Err(e) => {
                        error!("Failed to load podcast: {}", e);
                        self.set_load_error(&e.to_string());
                    }
                }
                false
            }
            Message::Favorites { load, .. } => {
                for e in &load.errors {
                    warn!("{}", e);
                }
                self.set_favorites(load);
                false
            }
        }
    }

    pub fn set_error(&mut self, message: &str) {
        self.error_message = Some(message.to_string());
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Number of selectable directory lines in the current mode.
    pub fn directory_len(&self) -> usize {
        match &self.directory {
            Some(view) if self.grouped => view.grouped_rows().len(),
            Some(view) => view.visible().len(),
            None => 0,
        }
    }

    pub fn selected_directory_entry(&self) -> Option<DirectoryEntry> {
        let view = self.directory.as_ref()?;
        let i = self.directory_state.selected()?;
        if self.grouped {
            match view.grouped_rows().into_iter().nth(i)? {
                DirectoryRow::Header(group) => Some(DirectoryEntry::Genre(group.genre)),
                DirectoryRow::Podcast(p) => Some(DirectoryEntry::Podcast(p.id.clone())),
            }
        } else {
            view.visible()
                .get(i)
                .map(|p| DirectoryEntry::Podcast(p.id.clone()))
        }
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Action::Quit;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.error_message.is_some() {
            self.clear_error();
            return Action::None;
        }

        if self.search_focused {
            return self.handle_search_bar_input(key);
        }

        match key.code {
            KeyCode::Char('?') => {
                self.show_help = true;
                return Action::None;
            }
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Action::Quit;
            }
            KeyCode::Char('h') => return Action::Navigate(Route::Directory),
            KeyCode::Char('F') => return Action::Navigate(Route::Favorites),
            KeyCode::Char('R') => return Action::Reload,
            KeyCode::Char(' ') => return Action::TogglePause,
            KeyCode::Char('x') => return Action::StopPlayback,
            KeyCode::Char('>') => return Action::CycleRate,
            _ => {}
        }

        match self.screen {
            Screen::Directory => self.handle_directory_input(key),
            Screen::Detail => self.handle_detail_input(key),
            Screen::Favorites => self.handle_favorites_input(key),
            Screen::Loading => Action::None,
        }
    }

    fn handle_search_bar_input(&mut self, key: KeyEvent) -> Action {
        let Some(view) = self.directory.as_mut() else {
            self.search_focused = false;
            return Action::None;
        };
        match key.code {
            KeyCode::Enter => self.search_focused = false,
            KeyCode::Esc => {
                view.query.clear();
                self.search_focused = false;
            }
            KeyCode::Char(c) => view.query.push(c),
            KeyCode::Backspace => {
                view.query.pop();
            }
            _ => return Action::None,
        }
        self.directory_state.select(Some(0));
        Action::None
    }

    fn handle_directory_input(&mut self, key: KeyEvent) -> Action {
        let len = self.directory_len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => move_selection(&mut self.directory_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => move_selection(&mut self.directory_state, len, 1),
            KeyCode::Char('/') => self.search_focused = true,
            KeyCode::Char('s') => {
                if let Some(view) = self.directory.as_mut() {
                    view.sort = view.sort.next();
                }
            }
            KeyCode::Char('g') => {
                if let Some(view) = self.directory.as_mut() {
                    view.genre = next_genre_filter(view.genre);
                    self.directory_state.select(Some(0));
                }
            }
            KeyCode::Char('v') => {
                self.grouped = !self.grouped;
                self.directory_state.select(Some(0));
            }
            KeyCode::Esc => {
                if let Some(view) = self.directory.as_mut() {
                    view.query.clear();
                    view.genre = None;
                    self.directory_state.select(Some(0));
                }
            }
            KeyCode::Enter => match self.selected_directory_entry() {
                Some(DirectoryEntry::Podcast(id)) => return Action::Navigate(Route::Podcast(id)),
                Some(DirectoryEntry::Genre(genre)) => {
                    if let Some(view) = self.directory.as_mut() {
                        view.toggle_expanded(genre);
                    }
                }
                None => {}
            },
            _ => {}
        }
        Action::None
    }

    fn selected_detail_row(&self) -> Option<&DetailRow> {
        self.detail_rows.get(self.detail_state.selected()?)
    }

    fn handle_detail_input(&mut self, key: KeyEvent) -> Action {
        let len = self.detail_rows.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                move_selection(&mut self.detail_state, len, -1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                move_selection(&mut self.detail_state, len, 1);
                Action::None
            }
            KeyCode::Enter => match self.selected_detail_row().cloned() {
                Some(DetailRow::Season { index, .. }) => {
                    if let Some(view) = self.detail.as_mut() {
                        view.toggle_season(index);
                    }
                    Action::Refresh
                }
                Some(DetailRow::Episode {
                    season_index,
                    episode_index,
                    ..
                }) => Action::Play {
                    season_index,
                    episode_index,
                },
                None => Action::None,
            },
            KeyCode::Char('f') => match self.selected_detail_row() {
                Some(DetailRow::Episode {
                    season_index,
                    episode_index,
                    ..
                }) => Action::ToggleFavorite {
                    season_index: *season_index,
                    episode_index: *episode_index,
                },
                _ => Action::None,
            },
            KeyCode::Char('r') if self.detail_has_history => Action::ResetHistory,
            KeyCode::Char('d') => {
                if let Some(view) = self.detail.as_mut() {
                    view.toggle_description();
                }
                Action::None
            }
            KeyCode::Esc | KeyCode::Backspace => Action::Navigate(Route::Directory),
            _ => Action::None,
        }
    }

    fn handle_favorites_input(&mut self, key: KeyEvent) -> Action {
        let Some(view) = self.favorites.as_mut() else {
            return match key.code {
                KeyCode::Esc | KeyCode::Backspace => Action::Navigate(Route::Directory),
                _ => Action::None,
            };
        };
        let len = view.visible().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => move_selection(&mut self.favorites_state, len, -1),
            KeyCode::Down | KeyCode::Char('j') => move_selection(&mut self.favorites_state, len, 1),
            KeyCode::Char('s') => view.sort = view.sort.next(),
            KeyCode::Enter => {
                let selected = self
                    .favorites_state
                    .selected()
                    .and_then(|i| view.visible().get(i).map(|item| item.podcast_id.clone()));
                if let Some(id) = selected {
                    return Action::Navigate(Route::Podcast(id));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let selected = self.favorites_state.selected().and_then(|i| {
                    view.visible()
                        .get(i)
                        .map(|item| (item.podcast_id.clone(), item.season_index, item.episode_index))
                });
                if let Some((podcast_id, season_index, episode_index)) = selected {
                    if view.begin_remove(&podcast_id, season_index, episode_index) {
                        clamp_selection(&mut self.favorites_state, len - 1);
                        return Action::RemoveFavorite {
                            podcast_id,
                            season_index,
                            episode_index,
                        };
                    }
                }
            }
            KeyCode::Esc | KeyCode::Backspace => return Action::Navigate(Route::Directory),
            _ => {}
        }
        Action::None
    }
}

fn move_selection(state: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = state.selected().unwrap_or(0);
    let next = if delta < 0 {
        i.saturating_sub(delta.unsigned_abs())
    } else {
        (i + delta as usize).min(len - 1)
    };
    state.select(Some(next));
}

fn clamp_selection(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::FavoriteItem;
    use crate::storage::MemoryStore;
    use crate::types::{Episode, Season};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn preview(id: &str, title: &str, genres: Vec<GenreId>) -> PodcastPreview {
        PodcastPreview {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            seasons: 1,
            image: String::new(),
            genres,
            updated: None,
        }
    }

    fn show() -> Show {
        Show {
            id: "42".to_string(),
            title: "Old Times".to_string(),
            description: String::new(),
            image: String::new(),
            updated: None,
            seasons: vec![Season {
                title: "Season 1".to_string(),
                image: String::new(),
                episodes: vec![Episode {
                    title: "Pilot".to_string(),
                    description: String::new(),
                    file: None,
                }],
            }],
        }
    }

    #[test]
    fn test_navigate_bumps_generation() {
        let mut app = App::new(5, 100);
        let first = app.navigate(Route::Directory);
        let second = app.navigate(Route::Podcast("42".into()));
        assert!(second > first);
        assert!(!app.is_current(first));
        assert!(app.is_current(second));
        assert_eq!(app.screen, Screen::Loading);
    }

    #[test]
    fn test_directory_enter_opens_podcast() {
        let mut app = App::new(5, 100);
        app.set_catalog(vec![preview("2", "Beta", vec![1]), preview("1", "Alpha", vec![1])]);
        assert_eq!(
            app.handle_input(key(KeyCode::Enter)),
            Action::Navigate(Route::Podcast("1".into()))
        );
    }

    #[test]
    fn test_search_bar_edits_query() {
        let mut app = App::new(5, 100);
        app.set_catalog(vec![preview("1", "Alpha", vec![1])]);
        app.handle_input(key(KeyCode::Char('/')));
        assert!(app.search_focused);
        for c in "alp".chars() {
            app.handle_input(key(KeyCode::Char(c)));
        }
        assert_eq!(app.directory.as_ref().unwrap().query, "alp");
        // 'q' while typing is text, not quit
        app.handle_input(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        app.handle_input(key(KeyCode::Esc));
        assert!(app.directory.as_ref().unwrap().query.is_empty());
    }

    #[test]
    fn test_grouped_enter_on_header_expands() {
        let mut app = App::new(1, 100);
        app.set_catalog(vec![preview("1", "Alpha", vec![3]), preview("2", "Beta", vec![3])]);
        app.handle_input(key(KeyCode::Char('v')));
        assert_eq!(app.selected_directory_entry(), Some(DirectoryEntry::Genre(3)));
        assert_eq!(app.handle_input(key(KeyCode::Enter)), Action::None);
        assert!(app.directory.as_ref().unwrap().is_expanded(3));
    }

    #[test]
    fn test_detail_season_then_episode() {
        let mut app = App::new(5, 100);
        let store = StateStore::new(MemoryStore::new());
        app.set_podcast(show(), &store);

        assert_eq!(app.handle_input(key(KeyCode::Enter)), Action::Refresh);
        app.refresh_detail(&store);
        assert_eq!(app.detail_rows.len(), 2);

        app.handle_input(key(KeyCode::Down));
        assert_eq!(
            app.handle_input(key(KeyCode::Char('f'))),
            Action::ToggleFavorite {
                season_index: 0,
                episode_index: 0
            }
        );
        assert_eq!(
            app.handle_input(key(KeyCode::Enter)),
            Action::Play {
                season_index: 0,
                episode_index: 0
            }
        );
        // nothing to reset yet
        assert_eq!(app.handle_input(key(KeyCode::Char('r'))), Action::None);
    }

    #[test]
    fn test_favorites_remove_hides_item() {
        let mut app = App::new(5, 100);
        app.set_favorites(FavoritesLoad {
            items: vec![FavoriteItem {
                podcast_id: "42".into(),
                podcast_title: "Old Times".into(),
                season_index: 0,
                episode_index: 1,
                episode_title: "Pilot".into(),
                added_at: None,
                updated: None,
            }],
            errors: Vec::new(),
        });

        let action = app.handle_input(key(KeyCode::Char('d')));
        assert_eq!(
            action,
            Action::RemoveFavorite {
                podcast_id: "42".into(),
                season_index: 0,
                episode_index: 1
            }
        );
        assert!(app.favorites.as_ref().unwrap().visible().is_empty());
        assert_eq!(app.favorites_state.selected(), None);
    }

    #[test]
    fn test_error_popup_swallows_next_key() {
        let mut app = App::new(5, 100);
        app.set_error("boom");
        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), Action::None);
        assert!(app.error_message.is_none());
        assert_eq!(app.handle_input(key(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_move_selection_bounds() {
        let mut state = ListState::default();
        move_selection(&mut state, 3, -1);
        assert_eq!(state.selected(), Some(0));
        move_selection(&mut state, 3, 5);
        assert_eq!(state.selected(), Some(2));
        move_selection(&mut state, 0, 1);
        assert_eq!(state.selected(), None);
    }

    fn favorite_item(episode_index: usize) -> FavoriteItem {
        FavoriteItem {
            podcast_id: "42".into(),
            podcast_title: "Old Times".into(),
            season_index: 0,
            episode_index,
            episode_title: format!("Episode {}", episode_index + 1),
            added_at: None,
            updated: None,
        }
    }

    fn load(episodes: &[usize]) -> FavoritesLoad {
        FavoritesLoad {
            items: episodes.iter().map(|&e| favorite_item(e)).collect(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_reload_keeps_pending_removals_hidden() {
        let mut app = App::new(5, 100);
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("42", 0, 0).unwrap();
        store.add_favorite("42", 0, 1).unwrap();
        let generation = app.navigate(Route::Favorites);
        app.set_favorites(load(&[0, 1]));

        app.handle_input(key(KeyCode::Char('d')));
        app.handle_input(key(KeyCode::Char('d')));
        assert!(app.favorites.as_ref().unwrap().visible().is_empty());

        // the first removal lands and asks for a reload
        let reload = app.apply(
            Message::CommitRemove {
                generation,
                podcast_id: "42".into(),
                season_index: 0,
                episode_index: 0,
            },
            &mut store,
        );
        assert!(reload);
        assert!(!store.is_favorite("42", 0, 0));

        // the reload still sees episode 1, whose commit is pending
        app.set_favorites(load(&[1]));
        let view = app.favorites.as_ref().unwrap();
        assert!(view.visible().is_empty());
        assert!(view.is_removing("42", 0, 1));
    }

    #[test]
    fn test_stale_podcast_result_is_dropped() {
        let mut app = App::new(5, 100);
        let mut store = StateStore::new(MemoryStore::new());
        let old = app.navigate(Route::Podcast("42".into()));
        app.navigate(Route::Favorites);

        let reload = app.apply(
            Message::Podcast {
                generation: old,
                result: Ok(show()),
            },
            &mut store,
        );
        assert!(!reload);
        assert!(app.detail.is_none());
        assert_eq!(app.screen, Screen::Loading);
        assert_eq!(app.route, Route::Favorites);
    }

    #[test]
    fn test_current_podcast_result_is_shown() {
        let mut app = App::new(5, 100);
        let mut store = StateStore::new(MemoryStore::new());
        let generation = app.navigate(Route::Podcast("42".into()));

        app.apply(
            Message::Podcast {
                generation,
                result: Ok(show()),
            },
            &mut store,
        );
        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(app.detail.as_ref().unwrap().show().id, "42");
    }

    #[test]
    fn test_stale_commit_remove_still_reaches_store() {
        let mut app = App::new(5, 100);
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("42", 0, 1).unwrap();
        let generation = app.navigate(Route::Favorites);
        app.set_favorites(load(&[1]));
        app.handle_input(key(KeyCode::Char('d')));
        app.navigate(Route::Directory);

        let reload = app.apply(
            Message::CommitRemove {
                generation,
                podcast_id: "42".into(),
                season_index: 0,
                episode_index: 1,
            },
            &mut store,
        );
        assert!(!reload);
        assert!(!store.is_favorite("42", 0, 1));
        assert_eq!(app.favorites.as_ref().unwrap().removing_count(), 0);
    }

    #[test]
    fn test_stale_catalog_error_does_not_replace_screen() {
        let mut app = App::new(5, 100);
        let mut store = StateStore::new(MemoryStore::new());
        let old = app.navigate(Route::Directory);
        app.navigate(Route::Favorites);

        app.apply(
            Message::Catalog {
                generation: old,
                result: Err(crate::error::AppError::Network("offline".into())),
            },
            &mut store,
        );
        assert!(app.load_error.is_none());
        assert!(app.directory.is_none());
    }
}
