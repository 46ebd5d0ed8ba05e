//! Main entry point for the podcast-browser application.

use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, error, info, warn};
use podcast_browser::api::{CatalogClient, CatalogSource};
use podcast_browser::config::Config;
use podcast_browser::favorites::{collect_records, resolve};
use podcast_browser::playback::{
    ExternalPlayer, PlaybackController, default_player, find_in_path, validate_rate,
};
use podcast_browser::route::Route;
use podcast_browser::storage::FileStore;
use podcast_browser::store::StateStore;
use podcast_browser::tui::{Action, App, Message, PlayerStatus, Screen, draw, poll_event};
use ratatui::prelude::*;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

/// Command-line arguments for the podcast-browser application.
#[derive(Parser, Debug)]
#[command(
    name = "podcast-browser",
    version,
    about = "A terminal podcast browser",
    long_about = "Browse, search and play podcasts from a remote catalog, with favorites and resumable playback."
)]
struct Args {
    /// Audio player to use (overrides config and platform default)
    #[arg(short, long)]
    player: Option<String>,

    /// Initial playback rate: 0.5, 1, 1.5 or 2
    #[arg(short, long)]
    rate: Option<f64>,

    /// Log verbosity level: 0=error, 1=warn, 2=info, 3=debug, 4=trace
    #[arg(short, long, default_value_t = 1)]
    log: u8,

    /// Screen to open: "/", "/podcast/{id}" or "/favorite"
    #[arg(long, default_value = "/")]
    route: String,

    /// Directory holding the persisted state file
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Write a default config file if none exists, print its path and exit
    #[arg(long)]
    init_config: bool,
}

/// Initialize the terminal for TUI rendering.
fn init_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    debug!("Log level set to {:?}", log_level);

    if args.init_config {
        let path = Config::create_default_if_missing()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Load config
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        Config::new()
    });

    // Merge config with CLI args
    if let Some(rate) = args.rate {
        match validate_rate(rate) {
            Ok(rate) => config.playback_rate = rate,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir.clone();
    }

    let route: Route = match args.route.parse() {
        Ok(route) => route,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Get player
    let player: String = if let Some(cli_player) = &args.player {
        cli_player.clone()
    } else if let Some(config_player) = &config.player {
        config_player.clone()
    } else {
        match default_player() {
            Ok(p) => p.to_string(),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    };

    if find_in_path(&player).is_none() {
        warn!("{} not found in PATH; playback will fail until it is installed", player);
    }

    let storage_dir = config.storage_dir()?;
    let mut store = StateStore::new(FileStore::open_or_recover(&storage_dir)?);
    info!("Persisted state in {}", store.backend().path().display());
    match store.favorite_count() {
        Ok(count) => info!("{} favorite episodes stored", count),
        Err(e) => warn!("Failed to count favorites: {}", e),
    }

    let client = CatalogClient::from_config(&config)?;
    let mut controller = PlaybackController::new(
        ExternalPlayer::new(&player, config.player_args.clone()),
        config.playback_rate,
        config.listened_policy(),
    )?;
    info!("Using audio player: {}", controller.engine().program());

    // Initialize terminal
    let mut terminal = init_terminal()?;

    let mut app = App::new(config.genre_preview_count, config.description_word_limit);

    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = Session {
        store: &mut store,
        controller: &mut controller,
        client,
        tx,
        remove_delay: config.remove_delay(),
    };

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &mut session, rx, route).await;

    // Keep the reached position for next time
    if let Err(e) = session.controller.stop(session.store) {
        warn!("Failed to save playback position: {}", e);
    }

    // Restore terminal
    restore_terminal()?;

    result
}

/// Everything the event loop drives besides the view state.
struct Session<'a> {
    store: &'a mut StateStore<FileStore>,
    controller: &'a mut PlaybackController<ExternalPlayer>,
    client: CatalogClient,
    tx: UnboundedSender<Message>,
    remove_delay: Duration,
}

impl Session<'_> {
    /// Navigate to `route` and start fetching its data in the background.
    fn start_route(&mut self, app: &mut App, route: Route) {
        let generation = app.navigate(route.clone());
        debug!("Navigating to {} (generation {})", route, generation);

        match route {
            Route::Directory => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.fetch_shows().await;
                    if tx.send(Message::Catalog { generation, result }).is_err() {
                        debug!("Catalog arrived after shutdown");
                    }
                });
            }
            Route::Podcast(id) => {
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = client.fetch_show(&id).await;
                    if tx.send(Message::Podcast { generation, result }).is_err() {
                        debug!("Podcast {} arrived after shutdown", id);
                    }
                });
            }
            Route::Favorites => {
                if let Err(e) = self.spawn_favorites(generation) {
                    error!("Failed to read favorites: {}", e);
                    app.set_load_error(&e.to_string());
                }
            }
        }
    }

    /// Snapshot the stored favorites and resolve them on a background task.
    fn spawn_favorites(&mut self, generation: u64) -> podcast_browser::error::Result<()> {
        let records = collect_records(self.store)?;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let load = resolve(&client, records).await;
            if tx.send(Message::Favorites { generation, load }).is_err() {
                debug!("Favorites arrived after shutdown");
            }
        });
        Ok(())
    }

    fn handle_message(&mut self, app: &mut App, message: Message) {
        if app.apply(message, self.store) {
            if let Err(e) = self.spawn_favorites(app.generation()) {
                app.set_error(&e.to_string());
            }
        }
    }

    /// Apply an action; returns `false` when the app should exit.
    fn dispatch(&mut self, app: &mut App, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::None => {}
            Action::Navigate(route) => self.start_route(app, route),
            Action::Reload => {
                let route = app.route.clone();
                self.start_route(app, route);
            }
            Action::Refresh => app.refresh_detail(self.store),
            Action::Play {
                season_index,
                episode_index,
            } => {
                let episode = match &app.detail {
                    Some(view) => view.playing_episode(season_index, episode_index),
                    None => return true,
                };
                let result = episode.and_then(|episode| self.controller.play(episode, self.store));
                if let Err(e) = result {
                    app.set_error(&format!("Playback failed: {}", e));
                }
                app.refresh_detail(self.store);
            }
            Action::ToggleFavorite {
                season_index,
                episode_index,
            } => {
                let result = match &app.detail {
                    Some(view) => view.toggle_favorite(self.store, season_index, episode_index),
                    None => return true,
                };
                match result {
                    Ok(true) => app.set_status("Added to favorites"),
                    Ok(false) => app.set_status("Removed from favorites"),
                    Err(e) => app.set_error(&e.to_string()),
                }
                app.refresh_detail(self.store);
            }
            Action::ResetHistory => {
                let result = match &app.detail {
                    Some(view) => {
                        if self.controller.release_podcast(&view.show().id) {
                            info!("Stopped playback to reset {}", view.show().title);
                        }
                        view.reset_listened_history(self.store)
                    }
                    None => return true,
                };
                match result {
                    Ok(()) => app.set_status("Listened history reset"),
                    Err(e) => app.set_error(&e.to_string()),
                }
                app.refresh_detail(self.store);
            }
            Action::RemoveFavorite {
                podcast_id,
                season_index,
                episode_index,
            } => {
                let generation = app.generation();
                let delay = self.remove_delay;
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let message = Message::CommitRemove {
                        generation,
                        podcast_id,
                        season_index,
                        episode_index,
                    };
                    if tx.send(message).is_err() {
                        debug!("Favorite removal arrived after shutdown");
                    }
                });
            }
            Action::TogglePause => {
                if let Err(e) = self.controller.toggle_pause(self.store) {
                    app.set_error(&e.to_string());
                }
            }
            Action::StopPlayback => {
                if let Err(e) = self.controller.stop(self.store) {
                    app.set_error(&e.to_string());
                }
            }
            Action::CycleRate => match self.controller.cycle_rate() {
                Ok(rate) => app.set_status(&format!("Playback rate {}x", rate)),
                Err(e) => app.set_error(&e.to_string()),
            },
        }
        true
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session<'_>,
    mut rx: mpsc::UnboundedReceiver<Message>,
    initial: Route,
) -> Result<(), Box<dyn std::error::Error>> {
    session.start_route(app, initial);

    loop {
        // Advance playback and persist its position
        if let Err(e) = session.controller.tick(session.store) {
            warn!("Failed to record playback progress: {}", e);
        }
        if let Some(message) = session.controller.take_error() {
            app.set_error(&format!("Playback failed: {}", message));
        }
        let before = app.player.state;
        app.player = PlayerStatus::from_controller(session.controller);
        if app.screen == Screen::Detail && before != app.player.state {
            app.refresh_detail(session.store);
        }

        // Draw UI
        terminal.draw(|f| draw(f, app))?;

        // Apply finished background work
        while let Ok(message) = rx.try_recv() {
            session.handle_message(app, message);
        }

        // Poll for events
        if let Some(Event::Key(key)) = poll_event(Duration::from_millis(100))? {
            let action = app.handle_input(key);
            if !session.dispatch(app, action) {
                break;
            }
        }

        if app.should_quit {
            break;
        }

        // Let spawned fetches make progress between frames
        tokio::task::yield_now().await;
    }

    Ok(())
}
