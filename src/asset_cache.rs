//! Memoized artwork and text for the selected game.
//!
//! One entry at most. Every fetched entry is installed under the selection it was
//! requested for, even when the selection has moved on; readers go through
//! [`AssetCache::visible`], which only hands out an entry whose key matches the
//! selection being drawn. A slow fetch for an old game therefore never shows up
//! under a newer selection, whatever order the fetches land in.

use std::path::PathBuf;

use crate::types::TextType;

/// Text fields fetched next to the description and shown as detail rows.
pub const FACT_TYPES: [TextType; 5] = [
    TextType::Developer,
    TextType::Publisher,
    TextType::ReleaseDate,
    TextType::Genre,
    TextType::Players,
];

/// The game a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub system_index: usize,
    pub gamelist_index: usize,
}

impl SelectionKey {
    pub fn new(system_index: usize, gamelist_index: usize) -> Self {
        SelectionKey {
            system_index,
            gamelist_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub key: SelectionKey,
    pub image: Option<PathBuf>,
    pub description: Option<String>,
    pub facts: Vec<(TextType, String)>,
}

impl AssetEntry {
    /// An entry with nothing in it; renders as placeholders.
    pub fn empty(key: SelectionKey) -> Self {
        AssetEntry {
            key,
            image: None,
            description: None,
            facts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.description.is_none() && self.facts.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetCache {
    entry: Option<AssetEntry>,
    pending: Option<SelectionKey>,
}

impl AssetCache {
    /// Returns `true` when the caller should start a fetch for `key`.
    ///
    /// No fetch is needed when the entry already belongs to `key` or a fetch for
    /// `key` is outstanding. A newer `key` replaces the outstanding request; the
    /// older fetch still lands, under its own key.
    pub fn ensure(&mut self, key: SelectionKey) -> bool {
        if self.entry.as_ref().is_some_and(|entry| entry.key == key) {
            return false;
        }
        if self.pending == Some(key) {
            return false;
        }
        if let Some(previous) = self.pending.replace(key) {
            tracing::trace!(?previous, ?key, "asset request superseded");
        }
        true
    }

    /// Installs a completed fetch. Returns `true` if it answered the latest request.
    pub fn install(&mut self, entry: AssetEntry) -> bool {
        let current = self.pending == Some(entry.key);
        if current {
            self.pending = None;
        } else {
            tracing::trace!(key = ?entry.key, "installing assets for a superseded selection");
        }
        self.entry = Some(entry);
        current
    }

    /// Gives up on the outstanding fetch for `key` so the next `ensure` retries it.
    pub fn abandon(&mut self, key: SelectionKey) {
        if self.pending == Some(key) {
            self.pending = None;
        }
    }

    /// The entry for `key`, if the cached one belongs to it.
    pub fn visible(&self, key: SelectionKey) -> Option<&AssetEntry> {
        self.entry.as_ref().filter(|entry| entry.key == key)
    }

    pub fn entry(&self) -> Option<&AssetEntry> {
        self.entry.as_ref()
    }

    pub fn pending(&self) -> Option<SelectionKey> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.entry = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(game: usize) -> SelectionKey {
        SelectionKey::new(0, game)
    }

    fn entry(game: usize, description: &str) -> AssetEntry {
        AssetEntry {
            description: Some(description.to_string()),
            ..AssetEntry::empty(key(game))
        }
    }

    #[test]
    fn ensure_fetches_once_per_selection() {
        let mut cache = AssetCache::default();
        assert!(cache.ensure(key(1)));
        assert!(!cache.ensure(key(1)));

        assert!(cache.install(entry(1, "Balloon Fight")));
        assert!(!cache.ensure(key(1)));
        assert_eq!(cache.pending(), None);
    }

    #[test]
    fn a_new_selection_invalidates_the_entry() {
        let mut cache = AssetCache::default();
        cache.ensure(key(1));
        cache.install(entry(1, "one"));

        assert!(cache.ensure(key(2)));
        assert!(cache.visible(key(2)).is_none());
        assert!(cache.visible(key(1)).is_some());
    }

    #[test]
    fn a_late_result_is_installed_but_not_shown_for_the_new_selection() {
        let mut cache = AssetCache::default();
        cache.ensure(key(1));
        cache.ensure(key(2));

        // the fetch for game 2 lands first, then the slow one for game 1
        assert!(cache.install(entry(2, "two")));
        assert!(!cache.install(entry(1, "one")));

        assert_eq!(cache.entry().unwrap().key, key(1));
        assert!(cache.visible(key(2)).is_none());
        // the next tick asks again and heals the cache
        assert!(cache.ensure(key(2)));
    }

    #[test]
    fn a_stale_result_does_not_clear_the_newer_request() {
        let mut cache = AssetCache::default();
        cache.ensure(key(1));
        cache.ensure(key(2));

        assert!(!cache.install(entry(1, "one")));
        assert_eq!(cache.pending(), Some(key(2)));
        assert!(!cache.ensure(key(2)));

        assert!(cache.install(entry(2, "two")));
        assert_eq!(cache.visible(key(2)).unwrap().description.as_deref(), Some("two"));
    }

    #[test]
    fn keys_include_the_system() {
        let mut cache = AssetCache::default();
        cache.ensure(SelectionKey::new(0, 0));
        cache.install(AssetEntry::empty(SelectionKey::new(0, 0)));
        assert!(cache.ensure(SelectionKey::new(1, 0)));
    }

    #[test]
    fn abandoned_requests_are_retried() {
        let mut cache = AssetCache::default();
        assert!(cache.ensure(key(3)));
        cache.abandon(key(3));
        assert!(cache.ensure(key(3)));
    }
}
