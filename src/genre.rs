//! Fixed genre taxonomy used by the catalog.

/// Integer genre identifier as returned by the catalog.
pub type GenreId = u32;

/// All known genres, in display order.
pub const GENRES: [(GenreId, &str); 9] = [
    (1, "Personal Growth"),
    (2, "Investigative Journalism"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids and Family"),
];

pub const UNKNOWN_GENRE: &str = "Unknown Genre";

/// Display name for a genre id.
///
/// # Examples
///
/// ```
/// use podcast_browser::genre::genre_name;
///
/// assert_eq!(genre_name(3), "History");
/// assert_eq!(genre_name(42), "Unknown Genre");
/// ```
pub fn genre_name(id: GenreId) -> &'static str {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_GENRE)
}

/// Comma-separated genre names, in the order given.
pub fn genre_names(ids: &[GenreId]) -> String {
    ids.iter()
        .map(|id| genre_name(*id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The genre after `current` when cycling a filter (`None` means all genres).
pub fn next_genre_filter(current: Option<GenreId>) -> Option<GenreId> {
    match current {
        None => Some(GENRES[0].0),
        Some(id) => {
            let pos = GENRES.iter().position(|(genre_id, _)| *genre_id == id);
            match pos {
                Some(i) if i + 1 < GENRES.len() => Some(GENRES[i + 1].0),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_known_genres_resolve() {
        for (id, name) in GENRES {
            assert_eq!(genre_name(id), name);
        }
    }

    #[test]
    fn test_unknown_genre() {
        assert_eq!(genre_name(0), "Unknown Genre");
        assert_eq!(genre_name(10), "Unknown Genre");
    }

    #[test]
    fn test_genre_names_joined() {
        assert_eq!(genre_names(&[1, 4]), "Personal Growth, Comedy");
        assert_eq!(genre_names(&[]), "");
    }

    #[test]
    fn test_filter_cycle_wraps_to_all() {
        assert_eq!(next_genre_filter(None), Some(1));
        assert_eq!(next_genre_filter(Some(3)), Some(4));
        assert_eq!(next_genre_filter(Some(9)), None);
    }
}
