//! Terminal user interface for podcast-browser using ratatui.
//!
//! Three screens mirror the routes: the directory, one podcast's detail and
//! the favorites list. A player bar at the bottom shows the active episode.

mod render;
mod state;
mod types;

pub use render::{draw, format_time};
pub use state::{App, DirectoryEntry};
pub use types::{Action, Message, PlayerStatus, Screen};

use crossterm::event::{self, Event};
use std::io;
use std::time::Duration;

/// Poll for keyboard events with a timeout.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
