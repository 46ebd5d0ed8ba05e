//! A terminal podcast browser written in Rust.
//!
//! podcast-browser lists the podcasts of a remote catalog, shows their
//! seasons and episodes, plays episodes through an external audio player and
//! remembers favorites, listened episodes and playback positions between
//! runs.
//!
//! # Features
//!
//! - Sort, filter by genre and fuzzy-search the catalog
//! - Browse the directory grouped by genre
//! - Resume every episode where it was left
//! - Favorite episodes and review them across podcasts
//!
//! # Usage
//!
//! ```bash
//! # Start on the directory
//! cargo run
//!
//! # Open a podcast directly at 1.5x
//! cargo run -- --route /podcast/10716 --rate 1.5
//! ```

pub mod api;
pub mod config;
pub mod detail;
pub mod directory;
pub mod error;
pub mod favorites;
pub mod genre;
pub mod playback;
pub mod route;
pub mod search;
pub mod sort;
pub mod storage;
pub mod store;
pub mod tui;
pub mod types;
