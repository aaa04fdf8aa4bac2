//! Term matching against entry labels.
//!
//! Every term must occur in the display text (case-insensitive substring).
//! Results keep store order; there is no ranking.

use std::collections::HashSet;

use crate::storage::EntryStore;
use crate::types::{Entry, EntryId};

/// Lower-cased, non-blank terms.
fn normalize_terms<S: AsRef<str>>(terms: &[S]) -> Vec<String> {
    terms
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn matches_all(entry: &Entry, terms: &[String]) -> bool {
    let label = entry.display_text.to_lowercase();
    terms.iter().all(|term| label.contains(term.as_str()))
}

/// Ids of all entries whose label contains every term.
pub fn search<S: AsRef<str>>(store: &EntryStore, terms: &[S]) -> Vec<EntryId> {
    let terms = normalize_terms(terms);
    store
        .iter()
        .filter(|entry| matches_all(entry, &terms))
        .map(|entry| entry.id.clone())
        .collect()
}

/// Narrow a previous result list with the full current term set.
///
/// Ids that left the store are dropped and store order is restored, so the
/// outcome equals `search(store, terms)` whenever `previous` came from a
/// search with a subset of `terms`.
pub fn refine<S: AsRef<str>>(store: &EntryStore, previous: &[EntryId], terms: &[S]) -> Vec<EntryId> {
    let terms = normalize_terms(terms);
    let previous: HashSet<&EntryId> = previous.iter().collect();
    store
        .iter()
        .filter(|entry| previous.contains(&entry.id))
        .filter(|entry| matches_all(entry, &terms))
        .map(|entry| entry.id.clone())
        .collect()
}

/// Cap a result list at `max` ids.
pub fn limit(mut ids: Vec<EntryId>, max: usize) -> Vec<EntryId> {
    ids.truncate(max);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentType;
    use std::path::{Path, PathBuf};

    fn store_with(labels: &[&str]) -> EntryStore {
        let path = Path::new("/data/fruit.txt");
        let entries = labels
            .iter()
            .enumerate()
            .map(|(i, label)| Entry {
                id: EntryId::new(path, i),
                display_text: label.to_string(),
                payload: "x".to_string(),
                source_file: PathBuf::from(path),
                content_type: ContentType::PlainText,
                icon_hint: None,
            })
            .collect();
        let mut store = EntryStore::new();
        store.replace_file(path, entries);
        store
    }

    fn labels(store: &EntryStore, ids: &[EntryId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| store.get(id))
            .map(|e| e.display_text.clone())
            .collect()
    }

    #[test]
    fn test_and_semantics() {
        let store = store_with(&["Apple Pie", "Apple Tart", "Banana"]);
        let ids = search(&store, &["apple", "tart"]);
        assert_eq!(labels(&store, &ids), vec!["Apple Tart"]);
    }

    #[test]
    fn test_store_order_and_case() {
        let store = store_with(&["Banana Split", "apple", "BANANA bread"]);
        let ids = search(&store, &["Banana"]);
        assert_eq!(labels(&store, &ids), vec!["Banana Split", "BANANA bread"]);
    }

    #[test]
    fn test_blank_terms_match_everything() {
        let store = store_with(&["a", "b"]);
        assert_eq!(search(&store, &["  "]).len(), 2);
        assert_eq!(search::<&str>(&store, &[]).len(), 2);
    }

    #[test]
    fn test_refine_equals_full_search() {
        let store = store_with(&["Apple Pie", "Apple Tart", "Pineapple Tart", "Banana"]);
        let cases: &[(&[&str], &[&str])] = &[
            (&["apple"], &["apple", "tart"]),
            (&["tart"], &["tart", "pine"]),
            (&["a"], &["a", "pie"]),
            (&["zzz"], &["zzz", "apple"]),
        ];

        for &(first, full) in cases {
            let previous = search(&store, first);
            assert_eq!(refine(&store, &previous, full), search(&store, full));
        }
    }

    #[test]
    fn test_refine_drops_vanished_ids() {
        let store = store_with(&["Apple"]);
        let stale = vec![EntryId::from("/gone.txt:0"), EntryId::new(Path::new("/data/fruit.txt"), 0)];
        assert_eq!(refine(&store, &stale, &["app"]).len(), 1);
    }

    #[test]
    fn test_limit() {
        let store = store_with(&["a1", "a2", "a3"]);
        assert_eq!(limit(search(&store, &["a"]), 2).len(), 2);
    }
}
