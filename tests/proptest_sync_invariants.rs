//! Property-based invariant tests for the pieces of the sync layer that take
//! arbitrary input orders:
//!
//! 1. Exactly one row is selected; neighbours of an interior selection are tagged once each.
//! 2. Truncation keeps short text and caps long text at 100 characters.
//! 3. Asset fetches landing in any order never show under the wrong selection, and
//!    the last selection always ends up cached.
//! 4. The menu stack is empty whenever the menu is inactive.

use marquee::asset_cache::{AssetCache, AssetEntry, SelectionKey};
use marquee::highlight::{classify_all, Highlight};
use marquee::mirror::Mirror;
use marquee::render::truncate_text;
use marquee::types::{Orientation, System};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum CacheOp {
    Select(SelectionKey),
    Land(prop::sample::Index),
}

fn key_strategy() -> impl Strategy<Value = SelectionKey> {
    (0usize..3, 0usize..4).prop_map(|(s, g)| SelectionKey::new(s, g))
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        key_strategy().prop_map(CacheOp::Select),
        any::<prop::sample::Index>().prop_map(CacheOp::Land),
    ]
}

fn orientation_strategy() -> impl Strategy<Value = Orientation> {
    (
        any::<bool>(),
        prop::option::of(0usize..3),
        prop::option::of(0usize..4),
    )
        .prop_map(|(menu_active, menu_index, menu_item_index)| Orientation {
            system_index: 0,
            gamelist_index: 0,
            menu_active,
            menu_index,
            menu_item_index,
        })
}

fn fetched(key: SelectionKey) -> AssetEntry {
    AssetEntry {
        description: Some(format!("{}/{}", key.system_index, key.gamelist_index)),
        ..AssetEntry::empty(key)
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Highlight classes
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn exactly_one_row_is_selected(len in 1usize..40, pick in any::<prop::sample::Index>()) {
        let current = pick.index(len);
        let rows = classify_all(len, Some(current));
        prop_assert_eq!(rows.iter().filter(|h| h.is_selected()).count(), 1);
        prop_assert_eq!(rows[current], Highlight::Selected);
    }

    #[test]
    fn interior_selection_has_one_previous_and_one_next(len in 3usize..40, pick in any::<prop::sample::Index>()) {
        let current = 1 + pick.index(len - 2);
        let rows = classify_all(len, Some(current));
        prop_assert_eq!(rows.iter().filter(|h| h.is_previous()).count(), 1);
        prop_assert_eq!(rows.iter().filter(|h| h.is_next()).count(), 1);
        prop_assert!(rows[current - 1].is_previous());
        prop_assert!(rows[current + 1].is_next());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Truncation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn short_text_is_unchanged(text in "\\PC{0,100}") {
        prop_assert_eq!(truncate_text(&text), text);
    }

    #[test]
    fn long_text_is_capped(text in "\\PC{101,300}") {
        let out = truncate_text(&text);
        prop_assert_eq!(out.chars().count(), 100);
        prop_assert!(out.ends_with("..."));
        let kept: String = text.chars().take(97).collect();
        prop_assert!(out.starts_with(&kept));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Asset cache coherence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn late_fetches_never_leak_and_the_last_selection_wins(
        first in key_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 0..40),
    ) {
        let mut cache = AssetCache::default();
        let mut in_flight = Vec::new();
        let mut selected = first;
        if cache.ensure(selected) {
            in_flight.push(selected);
        }

        for op in ops {
            match op {
                CacheOp::Select(key) => selected = key,
                CacheOp::Land(pick) if !in_flight.is_empty() => {
                    let key = in_flight.remove(pick.index(in_flight.len()));
                    cache.install(fetched(key));
                }
                CacheOp::Land(_) => {}
            }
            // every tick re-ensures the current selection
            if cache.ensure(selected) {
                in_flight.push(selected);
            }
            if let Some(entry) = cache.visible(selected) {
                prop_assert_eq!(entry.key, selected);
            }
        }

        // drain whatever is still outstanding, then let the ticks settle
        while let Some(key) = in_flight.pop() {
            cache.install(fetched(key));
        }
        for _ in 0..2 {
            if cache.ensure(selected) {
                cache.install(fetched(selected));
            }
        }
        let visible = cache.visible(selected);
        prop_assert!(visible.is_some());
        prop_assert_eq!(visible.map(|e| e.key), Some(selected));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Menu stack follows the menu flag
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn inactive_menu_means_empty_stack(orientations in prop::collection::vec(orientation_strategy(), 1..30)) {
        let mut mirror = Mirror::new();
        mirror.update_catalogue(vec![System::new("Arcade", "arcade", &["Star Lancer"])]);

        for (seq, orientation) in orientations.into_iter().enumerate() {
            let active = orientation.menu_active;
            let submenu = active && orientation.menu_index == Some(0) && orientation.menu_item_index.is_some();
            mirror.update_orientation(seq as u64 + 1, orientation);

            if active {
                prop_assert!(mirror.nav().is_menu());
                prop_assert_eq!(mirror.menus.depth(), if submenu { 2 } else { 1 });
            } else {
                prop_assert!(!mirror.nav().is_menu());
                prop_assert!(mirror.menus.is_empty());
            }
        }
    }
}
