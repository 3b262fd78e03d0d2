//! Suggestion ranking for paths, command names, variable names and jump leaves.
//!
//! Ranking is a pure function of the query and the candidate source. Every
//! candidate that starts with the query comes first, then every candidate that
//! merely contains it. Truncation to the display limit happens in the
//! renderer so Tab can always take position 0 of the full list.

use std::collections::HashSet;

/// How a candidate source is enumerated before ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankOrder {
    /// Keep the source's own order (directory listing or declaration order).
    #[default]
    Natural,
    /// Sort the source alphabetically before partitioning.
    Alphabetical,
}

/// Rank `candidates` against `query`.
///
/// An empty query returns every candidate in source order. Duplicates are
/// dropped, keeping the first occurrence.
pub fn rank<I, S>(query: &str, candidates: I, order: RankOrder) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut source: Vec<String> = candidates
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .collect();
    if order == RankOrder::Alphabetical {
        source.sort();
    }

    let mut seen = HashSet::with_capacity(source.len());
    let mut prefix = Vec::new();
    let mut contains = Vec::new();

    for candidate in source {
        if !seen.insert(candidate.clone()) {
            continue;
        }
        if candidate.starts_with(query) {
            prefix.push(candidate);
        } else if candidate.contains(query) {
            contains.push(candidate);
        }
    }

    prefix.extend(contains);
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches_come_first() {
        let candidates = ["notes.txt", "a.txt", "annotations", "node_modules"];
        let ranked = rank("no", candidates, RankOrder::Natural);
        assert_eq!(ranked, vec!["notes.txt", "node_modules", "annotations"]);
    }

    #[test]
    fn test_empty_query_returns_all_in_source_order() {
        let candidates = ["zeta", "alpha", "mid"];
        let ranked = rank("", candidates, RankOrder::Natural);
        assert_eq!(ranked, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_alphabetical_sort_is_applied_before_partition() {
        let candidates = ["rename", "remove", "runcmd", "purge"];
        let ranked = rank("r", candidates, RankOrder::Alphabetical);
        assert_eq!(ranked, vec!["remove", "rename", "runcmd", "purge"]);
    }

    #[test]
    fn test_every_result_contains_query() {
        let candidates = ["copyto", "moveto", "list", "info", "editor", "newdir"];
        for query in ["o", "to", "e", "dir", "x"] {
            let ranked = rank(query, candidates, RankOrder::Natural);
            assert!(ranked.iter().all(|c| c.contains(query)));
            let first_contains = ranked.iter().position(|c| !c.starts_with(query));
            if let Some(pos) = first_contains {
                assert!(ranked[pos..].iter().all(|c| !c.starts_with(query)));
            }
        }
    }

    #[test]
    fn test_duplicates_are_removed() {
        let candidates = ["logs", "logs", "blogs"];
        let ranked = rank("logs", candidates, RankOrder::Natural);
        assert_eq!(ranked, vec!["logs", "blogs"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let ranked = rank("zzz", ["a", "b"], RankOrder::Natural);
        assert!(ranked.is_empty());
    }
}
