use std::collections::HashMap;

use itertools::Itertools;

use crate::model::Catalog;

/// Per-catalog usage counters, promoting frequently chosen glyphs on an empty query.
///
/// Names are kept in the order they were first recorded, which breaks ties between equal counts.
#[derive(Clone, Debug, Default)]
pub struct UsageRanker {
    counters: HashMap<Catalog, Vec<(String, u64)>>,
}

impl UsageRanker {
    /// Replaces the counters of a catalog with the given ones, in their persisted order
    pub fn load(&mut self, catalog: Catalog, counters: impl IntoIterator<Item = (String, u64)>) {
        self.counters.insert(catalog, counters.into_iter().collect());
    }

    /// Returns the usage count of a name
    pub fn count(&self, catalog: Catalog, name: &str) -> u64 {
        self.counters
            .get(&catalog)
            .and_then(|c| c.iter().find(|(n, _)| n == name))
            .map(|(_, count)| *count)
            .unwrap_or_default()
    }

    /// Records one usage of a name, returning its new count
    pub fn record(&mut self, catalog: Catalog, name: &str) -> u64 {
        let counters = self.counters.entry(catalog).or_default();
        match counters.iter_mut().find(|(n, _)| n == name) {
            Some((_, count)) => {
                *count += 1;
                *count
            }
            None => {
                counters.push((name.to_owned(), 1));
                1
            }
        }
    }

    /// Returns every used name of a catalog, most used first
    pub fn ranked(&self, catalog: Catalog) -> Vec<(&str, u64)> {
        self.counters
            .get(&catalog)
            .into_iter()
            .flatten()
            .filter(|(_, count)| *count > 0)
            .map(|(name, count)| (name.as_str(), *count))
            .sorted_by(|a, b| b.1.cmp(&a.1))
            .collect()
    }

    /// Returns up to `n` of the most used names of a catalog
    pub fn top(&self, catalog: Catalog, n: usize) -> Vec<&str> {
        self.ranked(catalog).into_iter().take(n).map(|(name, _)| name).collect()
    }

    /// Lists every entry of the catalog for an empty query: the `n` most used entries still present in the catalog
    /// first, followed by the rest in catalog order
    pub fn promoted_entries(&self, catalog: Catalog, n: usize) -> Vec<(&'static str, &'static str)> {
        let entries = catalog.entries();
        let promoted = self
            .top(catalog, n)
            .into_iter()
            .filter_map(|name| entries.iter().find(|(entry, _)| *entry == name).copied())
            .collect::<Vec<_>>();
        let rest = entries
            .iter()
            .filter(|(name, _)| !promoted.iter().any(|(p, _)| p == name))
            .copied();
        promoted.iter().copied().chain(rest).collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ranker(counters: &[(&str, u64)]) -> UsageRanker {
        let mut ranker = UsageRanker::default();
        ranker.load(
            Catalog::Emoji,
            counters.iter().map(|(name, count)| (name.to_string(), *count)),
        );
        ranker
    }

    #[test]
    fn test_record() {
        let mut ranker = UsageRanker::default();
        assert_eq!(ranker.record(Catalog::Emoji, "fire"), 1);
        assert_eq!(ranker.record(Catalog::Emoji, "fire"), 2);
        assert_eq!(ranker.record(Catalog::Special, "fire"), 1);
        assert_eq!(ranker.count(Catalog::Emoji, "fire"), 2);
        assert_eq!(ranker.count(Catalog::Emoji, "star"), 0);
    }

    #[test]
    fn test_top_is_stable_on_ties() {
        let ranker = ranker(&[("wave", 1), ("star", 2), ("fire", 5), ("tada", 2), ("zzz", 0)]);
        assert_eq!(ranker.top(Catalog::Emoji, 4), vec!["fire", "star", "tada", "wave"]);
        assert_eq!(ranker.top(Catalog::Emoji, 2), vec!["fire", "star"]);
        assert!(ranker.top(Catalog::Special, 4).is_empty());
    }

    #[test]
    fn test_promoted_entries() {
        let ranker = ranker(&[("star", 2), ("fire", 5)]);
        let listed = ranker.promoted_entries(Catalog::Emoji, 4);

        assert_eq!(listed.len(), Catalog::Emoji.entries().len());
        assert_eq!(listed[0], ("fire", "🔥"));
        assert_eq!(listed[1], ("star", "⭐"));
        assert_eq!(listed[2], Catalog::Emoji.entries()[0]);
        assert_eq!(listed.iter().filter(|(name, _)| *name == "fire").count(), 1);
    }

    #[test]
    fn test_promoted_entries_skips_unknown_names() {
        let ranker = ranker(&[("not_an_emoji", 9), ("fire", 1)]);
        let listed = ranker.promoted_entries(Catalog::Emoji, 4);
        assert_eq!(listed[0], ("fire", "🔥"));
        assert_eq!(listed.len(), Catalog::Emoji.entries().len());
    }

    #[test]
    fn test_promoted_entries_is_idempotent() {
        let ranker = ranker(&[("star", 2), ("fire", 5)]);
        assert_eq!(
            ranker.promoted_entries(Catalog::Emoji, 4),
            ranker.promoted_entries(Catalog::Emoji, 4)
        );
    }
}
