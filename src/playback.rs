//! The global playback controller and the media engines behind it.
//!
//! Exactly one episode may be active at a time. All changes go through the
//! transition methods on [`PlaybackController`], which persist positions and
//! listen history through the [`StateStore`].

use crate::error::{AppError, Result};
use crate::storage::KeyValueStore;
use crate::store::StateStore;
use log::{debug, error, info};
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// The selectable playback rate multipliers.
pub const PLAYBACK_RATES: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

pub const DEFAULT_RATE: f64 = 1.0;

/// When an episode is recorded as fully listened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListenedPolicy {
    /// On natural end of media.
    OnEnd,
    /// A fixed delay after playback starts, whatever was actually heard.
    AfterDelay(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
}

/// The episode occupying the player slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayingEpisode {
    pub podcast_id: String,
    pub podcast_title: String,
    pub season_index: usize,
    pub episode_index: usize,
    pub title: String,
    pub audio_src: String,
}

impl PlayingEpisode {
    pub fn is_same(&self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.podcast_id == podcast_id
            && self.season_index == season_index
            && self.episode_index == episode_index
    }
}

/// Something the engine reports when polled.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Current play position in seconds.
    Position(f64),
    Ended,
    Failed(String),
}

/// A media backend able to play one audio source at a time.
pub trait MediaEngine {
    /// Begin playing `source` from `start_at` seconds at `rate`.
    fn start(&mut self, source: &str, start_at: f64, rate: f64) -> Result<()>;
    fn pause(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn set_rate(&mut self, rate: f64) -> Result<()>;
    /// Report progress. `None` when nothing is playing.
    fn poll(&mut self) -> Option<EngineEvent>;
}

/// Reject rates outside [`PLAYBACK_RATES`].
pub fn validate_rate(rate: f64) -> Result<f64> {
    if PLAYBACK_RATES.contains(&rate) {
        Ok(rate)
    } else {
        Err(AppError::InvalidInput(format!(
            "Unsupported playback rate {} (expected one of {:?})",
            rate, PLAYBACK_RATES
        )))
    }
}

/// The rate following `rate` in the selector, wrapping around.
pub fn next_rate(rate: f64) -> f64 {
    let pos = PLAYBACK_RATES
        .iter()
        .position(|r| *r == rate)
        .unwrap_or(1);
    PLAYBACK_RATES[(pos + 1) % PLAYBACK_RATES.len()]
}

/// Get the appropriate audio player for the current operating system.
pub fn default_player() -> Result<&'static str> {
    match std::env::consts::OS {
        "linux" | "macos" | "freebsd" => Ok("mpv"),
        "windows" => Ok("mpv.exe"),
        other => Err(AppError::Config(format!("OS '{}' is not supported", other))),
    }
}

/// Search for an executable in the system PATH.
///
/// Absolute paths and paths with separators are checked directly.
pub fn find_in_path<P: AsRef<Path>>(exe_name: P) -> Option<PathBuf> {
    let exe_path = exe_name.as_ref();

    if exe_path.is_absolute()
        || exe_path
            .to_string_lossy()
            .contains(std::path::MAIN_SEPARATOR)
    {
        return exe_path.is_file().then(|| exe_path.to_path_buf());
    }

    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(exe_path))
            .find(|full_path| full_path.is_file())
    })
}

/// Plays audio through an external command-line player.
///
/// The player is expected to take mpv-style `--start=` and `--speed=` flags.
/// Pausing stops the process and remembers the position; resuming or
/// changing the rate restarts it from there. The position is estimated from
/// wall time and rate since the process was launched.
#[derive(Debug)]
pub struct ExternalPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    source: Option<String>,
    launched: Option<Instant>,
    /// Position at the last launch.
    offset: f64,
    rate: f64,
}

impl ExternalPlayer {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            child: None,
            source: None,
            launched: None,
            offset: 0.0,
            rate: DEFAULT_RATE,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn position(&self) -> f64 {
        match self.launched {
            Some(at) => self.offset + at.elapsed().as_secs_f64() * self.rate,
            None => self.offset,
        }
    }

    fn launch(&mut self) -> Result<()> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| AppError::Playback("No audio source loaded".to_string()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(format!("--start={:.1}", self.offset))
            .arg(format!("--speed={}", self.rate))
            .arg(source);

        debug!("Playing: {} from {:.1}s at {}x", source, self.offset, self.rate);

        let child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::Playback(format!("Failed to start {}: {}", self.program, e)))?;

        self.child = Some(child);
        self.launched = Some(Instant::now());
        Ok(())
    }

    /// Kill the running process, keeping the position it reached.
    fn halt(&mut self) {
        self.offset = self.position();
        self.launched = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("Player already exited: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl MediaEngine for ExternalPlayer {
    fn start(&mut self, source: &str, start_at: f64, rate: f64) -> Result<()> {
        self.stop();
        self.source = Some(source.to_string());
        self.offset = start_at;
        self.rate = rate;
        self.launch()
    }

    fn pause(&mut self) -> Result<()> {
        self.halt();
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }
        self.launch()
    }

    fn stop(&mut self) {
        self.halt();
        self.source = None;
        self.offset = 0.0;
    }

    fn set_rate(&mut self, rate: f64) -> Result<()> {
        if self.child.is_some() {
            self.halt();
            self.rate = rate;
            self.launch()
        } else {
            self.rate = rate;
            Ok(())
        }
    }

    fn poll(&mut self) -> Option<EngineEvent> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(None) => Some(EngineEvent::Position(self.position())),
            Ok(Some(status)) => {
                self.child = None;
                self.launched = None;
                if status.success() {
                    Some(EngineEvent::Ended)
                } else {
                    Some(EngineEvent::Failed(format!(
                        "{} exited with {}",
                        self.program, status
                    )))
                }
            }
            Err(e) => {
                self.child = None;
                self.launched = None;
                Some(EngineEvent::Failed(e.to_string()))
            }
        }
    }
}

impl Drop for ExternalPlayer {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Owner of the single player slot.
///
/// State machine: `Idle -> Loading -> Playing <-> Paused`, with
/// `Playing`/`Paused -> Idle` on end of media, stop, or a new episode.
pub struct PlaybackController<E: MediaEngine> {
    engine: E,
    state: PlaybackState,
    current: Option<PlayingEpisode>,
    position: f64,
    rate: f64,
    policy: ListenedPolicy,
    started_at: Option<Instant>,
    listened_marked: bool,
    last_error: Option<String>,
}

impl<E: MediaEngine> PlaybackController<E> {
    pub fn new(engine: E, rate: f64, policy: ListenedPolicy) -> Result<Self> {
        Ok(Self {
            engine,
            state: PlaybackState::Idle,
            current: None,
            position: 0.0,
            rate: validate_rate(rate)?,
            policy,
            started_at: None,
            listened_marked: false,
            last_error: None,
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current(&self) -> Option<&PlayingEpisode> {
        self.current.as_ref()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The last media error, cleared on read.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// Whether this episode occupies the slot.
    pub fn is_current(&self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| c.is_same(podcast_id, season_index, episode_index))
    }

    /// Load and start an episode, replacing whatever was playing.
    ///
    /// Playback resumes from the saved position. A media failure returns the
    /// slot to `Idle` and is returned to the caller.
    pub fn play<S: KeyValueStore>(
        &mut self,
        episode: PlayingEpisode,
        store: &mut StateStore<S>,
    ) -> Result<()> {
        if self.current.is_some() {
            self.stop(store)?;
        }

        self.state = PlaybackState::Loading;
        let start_at = store
            .get_playback_position(&episode.podcast_id, episode.season_index, episode.episode_index)
            .unwrap_or(0.0);

        if let Err(e) = self.engine.start(&episode.audio_src, start_at, self.rate) {
            error!("Could not play '{}': {}", episode.title, e);
            self.state = PlaybackState::Idle;
            self.current = None;
            self.position = 0.0;
            return Err(e);
        }

        info!(
            "Playing '{}' from {} at {:.1}s",
            episode.title, episode.podcast_title, start_at
        );
        self.position = start_at;
        self.started_at = Some(Instant::now());
        self.listened_marked = false;
        self.current = Some(episode);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// Persist a reported play position. Safe to call at any frequency.
    pub fn on_time_update<S: KeyValueStore>(
        &mut self,
        seconds: f64,
        store: &mut StateStore<S>,
    ) -> Result<()> {
        let Some(episode) = &self.current else {
            return Ok(());
        };
        if !matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            return Ok(());
        }

        self.position = seconds;
        store.save_playback_position(
            &episode.podcast_id,
            episode.season_index,
            episode.episode_index,
            seconds,
        )
    }

    pub fn pause<S: KeyValueStore>(&mut self, store: &mut StateStore<S>) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        self.engine.pause()?;
        self.state = PlaybackState::Paused;
        self.on_time_update(self.position, store)
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != PlaybackState::Paused {
            return Ok(());
        }
        self.engine.resume()?;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn toggle_pause<S: KeyValueStore>(&mut self, store: &mut StateStore<S>) -> Result<()> {
        match self.state {
            PlaybackState::Playing => self.pause(store),
            PlaybackState::Paused => self.resume(),
            _ => Ok(()),
        }
    }

    /// Select a rate; applied immediately to an active episode.
    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        let rate = validate_rate(rate)?;
        if matches!(self.state, PlaybackState::Playing | PlaybackState::Paused) {
            self.engine.set_rate(rate)?;
        }
        self.rate = rate;
        debug!("Playback rate set to {}x", rate);
        Ok(())
    }

    pub fn cycle_rate(&mut self) -> Result<f64> {
        self.set_rate(next_rate(self.rate))?;
        Ok(self.rate)
    }

    /// Natural end of media: mark listened and forget the position.
    pub fn on_ended<S: KeyValueStore>(&mut self, store: &mut StateStore<S>) -> Result<()> {
        let Some(episode) = self.current.take() else {
            return Ok(());
        };
        self.engine.stop();
        self.state = PlaybackState::Idle;
        self.position = 0.0;
        self.started_at = None;

        info!("Finished '{}'", episode.title);
        store.mark_listened(&episode.podcast_id, episode.season_index, episode.episode_index)?;
        store.clear_playback_position(
            &episode.podcast_id,
            episode.season_index,
            episode.episode_index,
        )
    }

    /// Clear the slot, keeping the reached position for next time.
    pub fn stop<S: KeyValueStore>(&mut self, store: &mut StateStore<S>) -> Result<()> {
        let Some(episode) = self.current.take() else {
            return Ok(());
        };
        self.engine.stop();
        self.state = PlaybackState::Idle;
        self.started_at = None;

        let position = std::mem::take(&mut self.position);
        debug!("Stopped '{}' at {:.1}s", episode.title, position);
        if position > 0.0 {
            store.save_playback_position(
                &episode.podcast_id,
                episode.season_index,
                episode.episode_index,
                position,
            )?;
        }
        Ok(())
    }

    /// Drop the active episode if it belongs to `podcast_id`, without saving
    /// its position. Returns whether anything was playing.
    ///
    /// Must run before that podcast's listen history is reset; otherwise the
    /// next tick writes the position straight back.
    pub fn release_podcast(&mut self, podcast_id: &str) -> bool {
        if !self.current.as_ref().is_some_and(|e| e.podcast_id == podcast_id) {
            return false;
        }
        self.engine.stop();
        if let Some(episode) = self.current.take() {
            debug!("Released '{}' for a history reset", episode.title);
        }
        self.state = PlaybackState::Idle;
        self.position = 0.0;
        self.started_at = None;
        true
    }

    /// The engine reported a failure: return to `Idle` and keep the message.
    pub fn on_media_error(&mut self, message: &str) {
        self.engine.stop();
        if let Some(episode) = self.current.take() {
            error!("Playback of '{}' failed: {}", episode.title, message);
        }
        self.state = PlaybackState::Idle;
        self.position = 0.0;
        self.started_at = None;
        self.last_error = Some(message.to_string());
    }

    /// Poll the engine and apply what it reports.
    pub fn tick<S: KeyValueStore>(&mut self, store: &mut StateStore<S>) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }

        match self.engine.poll() {
            Some(EngineEvent::Position(seconds)) => self.on_time_update(seconds, store)?,
            Some(EngineEvent::Ended) => return self.on_ended(store),
            Some(EngineEvent::Failed(message)) => {
                self.on_media_error(&message);
                return Ok(());
            }
            None => {}
        }

        if let ListenedPolicy::AfterDelay(delay) = self.policy {
            let due = self.started_at.is_some_and(|at| at.elapsed() >= delay);
            if due && !self.listened_marked {
                if let Some(episode) = &self.current {
                    store.mark_listened(
                        &episode.podcast_id,
                        episode.season_index,
                        episode.episode_index,
                    )?;
                    self.listened_marked = true;
                    debug!("Marked '{}' listened after {:?}", episode.title, delay);
                }
            }
        }
        Ok(())
    }
}
