//! Podcast directory: the full catalog, sorted, filtered, searched and
//! grouped by genre.

use crate::genre::{GENRES, GenreId, genre_name};
use crate::search::{DEFAULT_THRESHOLD, fuzzy_filter};
use crate::sort::SortOrder;
use crate::types::PodcastPreview;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, BTreeSet};

/// One genre bucket of the grouped directory.
#[derive(Debug, Clone, PartialEq)]
pub struct GenreGroup<'a> {
    pub genre: GenreId,
    pub name: &'static str,
    /// Podcasts to display (the capped preview unless expanded).
    pub shown: Vec<&'a PodcastPreview>,
    /// Podcasts in the bucket overall.
    pub total: usize,
    pub expanded: bool,
}

impl GenreGroup<'_> {
    /// Number of podcasts hidden behind the expand toggle.
    pub fn hidden(&self) -> usize {
        self.total - self.shown.len()
    }
}

/// A selectable line of the grouped directory.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryRow<'a> {
    Header(GenreGroup<'a>),
    Podcast(&'a PodcastPreview),
}

/// View model for the directory screen.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    podcasts: Vec<PodcastPreview>,
    pub sort: SortOrder,
    pub genre: Option<GenreId>,
    pub query: String,
    expanded: BTreeSet<GenreId>,
    preview_count: usize,
}

impl DirectoryView {
    pub fn new(podcasts: Vec<PodcastPreview>, preview_count: usize) -> Self {
        Self {
            podcasts,
            sort: SortOrder::default(),
            genre: None,
            query: String::new(),
            expanded: BTreeSet::new(),
            preview_count,
        }
    }

    pub fn all(&self) -> &[PodcastPreview] {
        &self.podcasts
    }

    pub fn is_empty(&self) -> bool {
        self.podcasts.is_empty()
    }

    /// Sorted list restricted to the selected genre, without search applied.
    pub fn sorted_filtered(&self) -> Vec<&PodcastPreview> {
        let mut list: Vec<&PodcastPreview> = self
            .podcasts
            .iter()
            .filter(|p| self.genre.is_none_or(|g| p.genres.contains(&g)))
            .collect();
        self.sort
            .sort_by_keys(&mut list, |p| p.title.as_str(), |p| p.updated);
        list
    }

    /// The list as displayed: sort and genre filter first, then fuzzy search
    /// restricts and re-ranks.
    pub fn visible(&self) -> Vec<&PodcastPreview> {
        fuzzy_filter(self.sorted_filtered(), &self.query, DEFAULT_THRESHOLD, |p| {
            vec![p.title.as_str(), p.description.as_str()]
        })
    }

    /// Genre buckets over the visible list. A podcast appears once per genre
    /// it carries; buckets follow the taxonomy order, unknown ids last.
    pub fn groups(&self) -> Vec<GenreGroup<'_>> {
        let mut buckets: BTreeMap<(usize, GenreId), Vec<&PodcastPreview>> = BTreeMap::new();
        for podcast in self.visible() {
            for genre in &podcast.genres {
                let rank = GENRES
                    .iter()
                    .position(|(id, _)| id == genre)
                    .unwrap_or(GENRES.len());
                buckets.entry((rank, *genre)).or_default().push(podcast);
            }
        }

        buckets
            .into_iter()
            .map(|((_, genre), podcasts)| {
                let expanded = self.expanded.contains(&genre);
                let total = podcasts.len();
                let shown = if expanded {
                    podcasts
                } else {
                    podcasts.into_iter().take(self.preview_count).collect()
                };
                GenreGroup {
                    genre,
                    name: genre_name(genre),
                    shown,
                    total,
                    expanded,
                }
            })
            .collect()
    }

    /// Flattened grouped view: each header followed by its shown podcasts.
    pub fn grouped_rows(&self) -> Vec<DirectoryRow<'_>> {
        let mut rows = Vec::new();
        for group in self.groups() {
            let shown = group.shown.clone();
            rows.push(DirectoryRow::Header(group));
            rows.extend(shown.into_iter().map(DirectoryRow::Podcast));
        }
        rows
    }

    pub fn toggle_expanded(&mut self, genre: GenreId) {
        if !self.expanded.remove(&genre) {
            self.expanded.insert(genre);
        }
    }

    pub fn is_expanded(&self, genre: GenreId) -> bool {
        self.expanded.contains(&genre)
    }

    /// A random sample of up to `count` podcasts for the featured strip.
    pub fn featured(&self, count: usize) -> Vec<&PodcastPreview> {
        let mut rng = rand::thread_rng();
        self.podcasts.choose_multiple(&mut rng, count).collect()
    }
}
