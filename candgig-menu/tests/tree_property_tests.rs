//! Property-Based Tests for Menu Tree Construction
//!
//! Properties checked for any flat menu:
//! - every placed item's depth is its marker count clamped at two
//! - every child sits exactly one level below its parent
//! - every entry is either placed or counted as an orphan
//! - a nested entry's parent is the nearest preceding entry one level up
//! - top-level entries are never dropped and keep their order
//! - rebuilding from the same input yields the same tree

use candgig_core::ThemeConfig;
use candgig_menu::{build_from_raw, build_menu, Depth, MenuEntry, MenuLink};
use candgig_test_utils::generators::{arb_flat_menu, arb_raw_menu, arb_well_formed_menu};
use proptest::prelude::*;
use std::collections::HashMap;

/// Where an entry ends up: `Some(None)` at the top level, `Some(Some(p))`
/// under the entry labelled `p`, `None` when dropped.
type Placement = Option<Option<String>>;

fn with_unique_labels(entries: Vec<MenuEntry>) -> Vec<MenuEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, mut entry)| {
            entry.label = format!("e{}", index);
            entry
        })
        .collect()
}

/// Independent model of parent selection: scan backwards for the nearest
/// entry one level up, giving up at anything shallower or at a dropped entry.
fn expected_placements(entries: &[MenuEntry]) -> Vec<Placement> {
    let mut placements: Vec<Placement> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let depth = entry.depth.level();
        if depth == 0 {
            placements.push(Some(None));
            continue;
        }
        let mut placement = None;
        for previous in (0..index).rev() {
            let level = entries[previous].depth.level();
            if level < depth - 1 {
                break;
            }
            if level == depth - 1 {
                placement = placements[previous]
                    .as_ref()
                    .map(|_| Some(entries[previous].label.clone()));
                break;
            }
        }
        placements.push(placement);
    }
    placements
}

fn record_placements(link: &MenuLink, parent: Option<&str>, out: &mut HashMap<String, Option<String>>) {
    out.insert(link.label.clone(), parent.map(str::to_string));
    for child in &link.children {
        record_placements(child, Some(&link.label), out);
    }
}

fn assert_children_one_level_down(link: &MenuLink) -> Result<(), TestCaseError> {
    for child in &link.children {
        prop_assert_eq!(child.depth.level(), link.depth.level() + 1);
        assert_children_one_level_down(child)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_depth_is_clamped_marker_count(entries in arb_flat_menu(24)) {
        let tree = build_menu(entries, &ThemeConfig::default());
        for link in tree.walk() {
            prop_assert_eq!(link.depth, Depth::from_marker_count(link.marker_count));
            prop_assert!(link.depth.level() <= 2);
        }
    }

    #[test]
    fn prop_children_sit_one_level_below_parent(entries in arb_flat_menu(24)) {
        let tree = build_menu(entries, &ThemeConfig::default());
        for item in &tree.items {
            prop_assert_eq!(item.depth, Depth::Top);
            assert_children_one_level_down(item)?;
        }
    }

    #[test]
    fn prop_every_entry_is_placed_or_orphaned(entries in arb_flat_menu(24)) {
        let total = entries.len();
        let tree = build_menu(entries, &ThemeConfig::default());
        prop_assert_eq!(tree.len() + tree.orphans, total);
    }

    #[test]
    fn prop_top_level_entries_keep_order(entries in arb_flat_menu(24)) {
        let expected: Vec<String> = entries
            .iter()
            .filter(|e| e.depth == Depth::Top)
            .map(|e| e.label.clone())
            .collect();
        let tree = build_menu(entries, &ThemeConfig::default());
        let actual: Vec<String> = tree.items.iter().map(|l| l.label.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_walk_preserves_input_order(entries in arb_well_formed_menu(24)) {
        // Without orphans the pre-order walk replays the input.
        let tree = build_menu(entries.clone(), &ThemeConfig::default());
        prop_assert_eq!(tree.orphans, 0);
        let walked: Vec<&str> = tree.walk().map(|l| l.raw_label.as_str()).collect();
        let input: Vec<&str> = entries.iter().map(|e| e.raw_label.as_str()).collect();
        prop_assert_eq!(walked, input);
    }

    #[test]
    fn prop_parent_is_nearest_preceding_shallower_entry(entries in arb_flat_menu(24)) {
        let entries = with_unique_labels(entries);
        let expected = expected_placements(&entries);
        let tree = build_menu(entries.clone(), &ThemeConfig::default());

        let mut actual = HashMap::new();
        for item in &tree.items {
            record_placements(item, None, &mut actual);
        }

        for (index, entry) in entries.iter().enumerate() {
            prop_assert_eq!(
                actual.get(&entry.label).cloned(),
                expected[index].clone(),
                "placement of {}",
                entry.raw_label
            );
        }
        let orphans = expected.iter().filter(|p| p.is_none()).count();
        prop_assert_eq!(tree.orphans, orphans);
    }

    #[test]
    fn prop_rebuild_is_idempotent(raw in arb_raw_menu(24)) {
        let config = ThemeConfig::default();
        let first = build_from_raw(&raw, &config);
        let second = build_from_raw(&raw, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_raw_links_are_accounted_for(raw in arb_raw_menu(24)) {
        let tree = build_from_raw(&raw, &ThemeConfig::default());
        prop_assert_eq!(tree.len() + tree.orphans + tree.skipped, raw.len());
    }
}
