//! Fuzzy text search over podcast titles and descriptions.
//!
//! A key's score is the smallest edit distance between the query and any
//! substring of the key, divided by the query length: 0.0 is an exact
//! substring hit, 1.0 means nothing in common. An item's score is the best
//! score over its keys.

/// Items scoring above this are not considered matches.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Approximate-substring edit distance of `pattern` within `text`.
///
/// Insertions, deletions and substitutions all cost 1; the match may start
/// and end anywhere in `text`.
pub fn substring_distance(pattern: &[char], text: &[char]) -> usize {
    if pattern.is_empty() {
        return 0;
    }

    // prev[j]: best distance of pattern[..i] ending at text[..j]
    let mut prev = vec![0usize; text.len() + 1];
    let mut curr = vec![0usize; text.len() + 1];

    for (i, pc) in pattern.iter().enumerate() {
        curr[0] = i + 1;
        for (j, tc) in text.iter().enumerate() {
            let substitute = prev[j] + usize::from(pc != tc);
            let delete = prev[j + 1] + 1;
            let insert = curr[j] + 1;
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev.into_iter().min().unwrap_or(pattern.len())
}

/// Score `query` against one text; lower is better.
pub fn score(query: &str, text: &str) -> f64 {
    let pattern: Vec<char> = query.to_lowercase().chars().collect();
    if pattern.is_empty() {
        return 0.0;
    }
    let text: Vec<char> = text.to_lowercase().chars().collect();
    substring_distance(&pattern, &text) as f64 / pattern.len() as f64
}

/// Best score of `query` over several keys of one item.
pub fn best_score(query: &str, keys: &[&str]) -> f64 {
    keys.iter()
        .map(|key| score(query, key))
        .fold(1.0_f64, f64::min)
}

/// Filter and re-rank `items` by fuzzy match.
///
/// An empty (or blank) query returns the items unchanged. Otherwise only items
/// whose best key score is within `threshold` are kept, ordered by score;
/// equal scores keep their incoming order.
pub fn fuzzy_filter<'a, T>(
    items: Vec<&'a T>,
    query: &str,
    threshold: f64,
    keys: impl Fn(&T) -> Vec<&str>,
) -> Vec<&'a T> {
    let query = query.trim();
    if query.is_empty() {
        return items;
    }

    let mut scored: Vec<(f64, &'a T)> = items
        .into_iter()
        .map(|item| (best_score(query, &keys(item)), item))
        .filter(|(s, _)| *s <= threshold)
        .collect();

    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_exact_substring_distance_is_zero() {
        assert_eq!(substring_distance(&chars("story"), &chars("a history show")), 0);
    }

    #[test]
    fn test_single_typo() {
        assert_eq!(substring_distance(&chars("histroy"), &chars("history")), 2);
        assert_eq!(substring_distance(&chars("histary"), &chars("history")), 1);
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(substring_distance(&chars("xyz"), &chars("abc")), 3);
        assert_eq!(substring_distance(&chars("abc"), &chars("")), 3);
    }

    #[test]
    fn test_score_is_case_insensitive() {
        assert_eq!(score("HISTORY", "History Hour"), 0.0);
        assert!(score("zzzz", "History Hour") > DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_fuzzy_filter_ranks_best_first() {
        let items = vec![
            ("Comedy Bang", "jokes"),
            ("Histary Hour", "tales"),
            ("History Hour", "tales"),
        ];
        let refs: Vec<_> = items.iter().collect();
        let result = fuzzy_filter(refs, "history", DEFAULT_THRESHOLD, |i| vec![i.0, i.1]);
        let titles: Vec<_> = result.iter().map(|i| i.0).collect();
        assert_eq!(titles, vec!["History Hour", "Histary Hour"]);
    }

    #[test]
    fn test_empty_query_is_identity() {
        let items = vec![("b", ""), ("a", "")];
        let refs: Vec<_> = items.iter().collect();
        let result = fuzzy_filter(refs.clone(), "   ", DEFAULT_THRESHOLD, |i| vec![i.0]);
        assert_eq!(result, refs);
    }

    #[test]
    fn test_description_key_matches() {
        let items = vec![("Untitled", "a weekly look at world news")];
        let refs: Vec<_> = items.iter().collect();
        let result = fuzzy_filter(refs, "world", DEFAULT_THRESHOLD, |i| vec![i.0, i.1]);
        assert_eq!(result.len(), 1);
    }
}
