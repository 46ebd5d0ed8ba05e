//! Favorites screen: every favorited episode across all podcasts, resolved
//! against the catalog.
//!
//! Loading is split in two: [`collect_records`] reads the store
//! synchronously, then [`resolve`] fetches each referenced podcast once and
//! can run on a background task.

use crate::api::CatalogSource;
use crate::error::Result;
use crate::sort::SortOrder;
use crate::storage::KeyValueStore;
use crate::store::{FavoriteRecord, StateStore};
use crate::types::synthesized_title;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};

/// A favorite with its podcast and episode resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteItem {
    pub podcast_id: String,
    pub podcast_title: String,
    pub season_index: usize,
    pub episode_index: usize,
    pub episode_title: String,
    pub added_at: Option<DateTime<Utc>>,
    /// The podcast's last update, used for date sorting.
    pub updated: Option<DateTime<Utc>>,
}

impl FavoriteItem {
    /// "Season X, Episode Y", one-based.
    pub fn position_label(&self) -> String {
        format!(
            "Season {}, Episode {}",
            self.season_index + 1,
            self.episode_index + 1
        )
    }

    pub fn matches(&self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.podcast_id == podcast_id
            && self.season_index == season_index
            && self.episode_index == episode_index
    }
}

/// Result of resolving favorites: the items that could be shown plus one
/// message per podcast that failed to load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesLoad {
    pub items: Vec<FavoriteItem>,
    pub errors: Vec<String>,
}

/// Every stored favorite, with missing `addedAt` timestamps back-filled.
pub fn collect_records<S: KeyValueStore>(store: &mut StateStore<S>) -> Result<Vec<FavoriteRecord>> {
    let mut records = Vec::new();
    for podcast_id in store.list_all_favorite_keys()? {
        records.extend(store.backfill_added_at(&podcast_id)?);
    }
    debug!("Collected {} favorite records", records.len());
    Ok(records)
}

fn parse_added_at(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fetch each referenced podcast once and turn records into display items.
///
/// A podcast that fails to load is reported in `errors`; records pointing at
/// a season or episode that no longer exists are skipped.
pub async fn resolve<C: CatalogSource>(catalog: &C, records: Vec<FavoriteRecord>) -> FavoritesLoad {
    let mut by_podcast: BTreeMap<String, Vec<FavoriteRecord>> = BTreeMap::new();
    for record in records {
        by_podcast
            .entry(record.podcast_id.clone())
            .or_default()
            .push(record);
    }

    let mut load = FavoritesLoad::default();
    for (podcast_id, records) in by_podcast {
        let show = match catalog.fetch_show(&podcast_id).await {
            Ok(show) => show,
            Err(e) => {
                warn!("Could not load favorited podcast {}: {}", podcast_id, e);
                load.errors.push(format!("Podcast {}: {}", podcast_id, e));
                continue;
            }
        };

        for record in records {
            let Some(episode) = show.episode(record.season_index, record.episode_index) else {
                warn!(
                    "Skipping favorite {} S{}E{}: episode no longer exists",
                    podcast_id, record.season_index, record.episode_index
                );
                continue;
            };

            let episode_title = if episode.title.trim().is_empty() {
                synthesized_title(record.season_index, record.episode_index)
            } else {
                episode.title.clone()
            };

            load.items.push(FavoriteItem {
                podcast_id: podcast_id.clone(),
                podcast_title: show.title.clone(),
                season_index: record.season_index,
                episode_index: record.episode_index,
                episode_title,
                added_at: parse_added_at(record.added_at.as_deref()),
                updated: show.updated,
            });
        }
    }
    load
}

/// View model for the favorites screen.
#[derive(Debug, Clone, Default)]
pub struct FavoritesView {
    items: Vec<FavoriteItem>,
    pub errors: Vec<String>,
    pub sort: SortOrder,
    removing: BTreeSet<(String, usize, usize)>,
}

impl FavoritesView {
    pub fn new(load: FavoritesLoad) -> Self {
        Self {
            items: load.items,
            errors: load.errors,
            sort: SortOrder::default(),
            removing: BTreeSet::new(),
        }
    }

    /// Items to display, sorted by podcast title or podcast update time.
    /// Items pending removal are already hidden.
    pub fn visible(&self) -> Vec<&FavoriteItem> {
        let mut list: Vec<&FavoriteItem> = self
            .items
            .iter()
            .filter(|item| {
                !self.removing.contains(&(
                    item.podcast_id.clone(),
                    item.season_index,
                    item.episode_index,
                ))
            })
            .collect();
        self.sort
            .sort_by_keys(&mut list, |i| i.podcast_title.as_str(), |i| i.updated);
        list
    }

    pub fn is_empty(&self) -> bool {
        self.visible().is_empty()
    }

    /// Take over the sort and the pending removals of the view this one
    /// replaces, so a reload does not bring back items still being removed.
    pub fn carry_over(&mut self, previous: FavoritesView) {
        self.sort = previous.sort;
        self.removing = previous.removing;
    }

    pub fn removing_count(&self) -> usize {
        self.removing.len()
    }

    /// Hide an item immediately; the store is untouched until
    /// [`FavoritesView::commit_remove`]. Returns `false` if already pending.
    pub fn begin_remove(&mut self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.removing
            .insert((podcast_id.to_string(), season_index, episode_index))
    }

    pub fn is_removing(&self, podcast_id: &str, season_index: usize, episode_index: usize) -> bool {
        self.removing
            .contains(&(podcast_id.to_string(), season_index, episode_index))
    }

    /// Delete the favorite from the store and drop it from the list.
    pub fn commit_remove<S: KeyValueStore>(
        &mut self,
        store: &mut StateStore<S>,
        podcast_id: &str,
        season_index: usize,
        episode_index: usize,
    ) -> Result<()> {
        self.removing
            .remove(&(podcast_id.to_string(), season_index, episode_index));
        store.remove_favorite(podcast_id, season_index, episode_index)?;
        self.items
            .retain(|item| !item.matches(podcast_id, season_index, episode_index));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::MemoryStore;
    use crate::types::{Episode, PodcastPreview, Season, Show};
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeCatalog {
        shows: HashMap<String, Show>,
        calls: AtomicUsize,
    }

    impl CatalogSource for FakeCatalog {
        async fn fetch_shows(&self) -> Result<Vec<PodcastPreview>> {
            Ok(Vec::new())
        }

        async fn fetch_show(&self, podcast_id: &str) -> Result<Show> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.shows.get(podcast_id).cloned().ok_or_else(|| {
                AppError::Network(
                    "Network response was not ok: Not Found (status code: 404)".to_string(),
                )
            })
        }
    }

    fn show(id: &str, title: &str, episodes: usize, year: i32) -> Show {
        Show {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            image: String::new(),
            updated: Some(Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()),
            seasons: vec![Season {
                title: "Season 1".to_string(),
                image: String::new(),
                episodes: (0..episodes)
                    .map(|i| Episode {
                        title: format!("{} #{}", title, i + 1),
                        description: String::new(),
                        file: None,
                    })
                    .collect(),
            }],
        }
    }

    fn catalog(shows: Vec<Show>) -> FakeCatalog {
        FakeCatalog {
            shows: shows.into_iter().map(|s| (s.id.clone(), s)).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_single_favorite_resolves_to_one_item() {
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("42", 0, 1).unwrap();
        let catalog = catalog(vec![show("42", "Old Times", 2, 2022)]);

        let records = collect_records(&mut store).unwrap();
        let load = resolve(&catalog, records).await;

        assert!(load.errors.is_empty());
        assert_eq!(load.items.len(), 1);
        let item = &load.items[0];
        assert_eq!(item.podcast_title, "Old Times");
        assert_eq!(item.episode_title, "Old Times #2");
        assert_eq!(item.position_label(), "Season 1, Episode 2");
        assert!(item.added_at.is_some());
    }

    #[tokio::test]
    async fn test_one_fetch_per_podcast() {
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("1", 0, 0).unwrap();
        store.add_favorite("1", 0, 1).unwrap();
        store.add_favorite("2", 0, 0).unwrap();
        let catalog = catalog(vec![show("1", "A", 2, 2020), show("2", "B", 1, 2021)]);

        let load = resolve(&catalog, collect_records(&mut store).unwrap()).await;
        assert_eq!(load.items.len(), 3);
        assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_and_missing_episodes_are_skipped() {
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("1", 0, 0).unwrap();
        store.add_favorite("1", 4, 0).unwrap();
        store.add_favorite("gone", 0, 0).unwrap();
        let catalog = catalog(vec![show("1", "A", 1, 2020)]);

        let load = resolve(&catalog, collect_records(&mut store).unwrap()).await;
        assert_eq!(load.items.len(), 1);
        assert_eq!(load.errors.len(), 1);
        assert!(load.errors[0].contains("gone"));
    }

    #[tokio::test]
    async fn test_sort_by_podcast_updated() {
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("1", 0, 0).unwrap();
        store.add_favorite("2", 0, 0).unwrap();
        let catalog = catalog(vec![show("1", "Zed", 1, 2019), show("2", "Alpha", 1, 2023)]);
        let mut view = FavoritesView::new(resolve(&catalog, collect_records(&mut store).unwrap()).await);

        let titles = |v: &FavoritesView| -> Vec<String> {
            v.visible().iter().map(|i| i.podcast_title.clone()).collect()
        };
        assert_eq!(titles(&view), vec!["Alpha", "Zed"]);
        view.sort = SortOrder::TitleDesc;
        assert_eq!(titles(&view), vec!["Zed", "Alpha"]);
        view.sort = SortOrder::UpdatedOldest;
        assert_eq!(titles(&view), vec!["Zed", "Alpha"]);
        view.sort = SortOrder::UpdatedRecent;
        assert_eq!(titles(&view), vec!["Alpha", "Zed"]);
    }

    #[tokio::test]
    async fn test_optimistic_remove_then_commit() {
        let mut store = StateStore::new(MemoryStore::new());
        store.add_favorite("42", 0, 0).unwrap();
        store.add_favorite("42", 0, 1).unwrap();
        let catalog = catalog(vec![show("42", "Old Times", 2, 2022)]);
        let mut view = FavoritesView::new(resolve(&catalog, collect_records(&mut store).unwrap()).await);

        assert!(view.begin_remove("42", 0, 0));
        assert!(!view.begin_remove("42", 0, 0));
        assert!(view.is_removing("42", 0, 0));
        assert_eq!(view.visible().len(), 1);
        // not yet committed
        assert!(store.is_favorite("42", 0, 0));

        view.commit_remove(&mut store, "42", 0, 0).unwrap();
        assert!(!store.is_favorite("42", 0, 0));
        assert_eq!(view.removing_count(), 0);
        assert_eq!(view.visible().len(), 1);

        let reloaded = resolve(&catalog, collect_records(&mut store).unwrap()).await;
        assert_eq!(reloaded.items.len(), 1);
    }
}
