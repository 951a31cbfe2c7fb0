//! Menu tree construction.
//!
//! Converts a flat, ordered sequence of [`MenuEntry`] values into nested
//! [`MenuLink`] trees of at most three levels. Single pass, no I/O.

use candgig_core::ThemeConfig;
use serde::{Deserialize, Serialize};

use crate::entry::{parse_entries, Depth, MenuEntry, RawLink};
use crate::mega::{self, MegaMenu, MegaMenuSlot};

// ============================================================================
// MENU LINK
// ============================================================================

/// A navigation entry and the children it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLink {
    pub raw_label: String,
    pub marker_count: usize,
    pub depth: Depth,
    pub label: String,
    /// Destination, already rewritten for mega menu items.
    pub href: String,
    pub mega: Option<MegaMenu>,
    pub children: Vec<MenuLink>,
}

impl MenuLink {
    fn from_entry(entry: MenuEntry, config: &ThemeConfig) -> Self {
        let (mega, href) = match mega::rewrite(&entry.href, config) {
            Some((mega, rewritten)) => (Some(mega), rewritten),
            None => (None, entry.href),
        };
        Self {
            raw_label: entry.raw_label,
            marker_count: entry.marker_count,
            depth: entry.depth,
            label: entry.label,
            href,
            mega,
            children: Vec::new(),
        }
    }

    /// Whether this item renders a submenu.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

// ============================================================================
// MENU TREE
// ============================================================================

/// Output of a menu build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTree {
    /// Top-level items in authored order.
    pub items: Vec<MenuLink>,
    /// Rewritten category-hub links awaiting asynchronous population.
    pub mega_menus: Vec<MegaMenuSlot>,
    /// Entries skipped because they were malformed.
    pub skipped: usize,
    /// Entries dropped because no parent existed at their depth.
    pub orphans: usize,
}

impl MenuTree {
    /// Depth-first, pre-order walk over every link in the tree.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: self.items.iter().rev().collect(),
        }
    }

    /// Total number of links in the tree.
    pub fn len(&self) -> usize {
        self.walk().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pre-order iterator returned by [`MenuTree::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a MenuLink>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a MenuLink;

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.stack.pop()?;
        self.stack.extend(link.children.iter().rev());
        Some(link)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Build a menu tree from typed entries.
///
/// The ancestor stack holds the index path to the most recent item at each
/// depth. An item at depth `d` truncates the stack to `d` and attaches to the
/// item at `d - 1`; if that slot is empty the item is dropped.
pub fn build_menu<I>(entries: I, config: &ThemeConfig) -> MenuTree
where
    I: IntoIterator<Item = MenuEntry>,
{
    let mut items: Vec<MenuLink> = Vec::new();
    let mut path: Vec<usize> = Vec::new();
    let mut orphans = 0;

    for entry in entries {
        let depth = entry.depth.level();
        let link = MenuLink::from_entry(entry, config);

        if depth == 0 {
            path.clear();
            items.push(link);
            path.push(items.len() - 1);
            continue;
        }

        path.truncate(depth);
        let parent = if path.len() == depth {
            node_at_mut(&mut items, &path)
        } else {
            None
        };

        match parent {
            Some(parent) => {
                parent.children.push(link);
                path.push(parent.children.len() - 1);
            }
            None => {
                tracing::debug!(label = %link.label, depth, "Dropping orphan menu item");
                orphans += 1;
            }
        }
    }

    let mut tree = MenuTree {
        items,
        mega_menus: Vec::new(),
        skipped: 0,
        orphans,
    };
    tree.mega_menus = collect_mega_menus(&tree);
    tree
}

/// Parse authored links and build the tree, skipping malformed entries.
pub fn build_from_raw(raw: &[RawLink], config: &ThemeConfig) -> MenuTree {
    let (entries, skipped) = parse_entries(raw, config.marker);
    let mut tree = build_menu(entries, config);
    tree.skipped = skipped;
    tracing::debug!(
        items = tree.items.len(),
        skipped = tree.skipped,
        orphans = tree.orphans,
        mega_menus = tree.mega_menus.len(),
        "Menu built"
    );
    tree
}

fn node_at_mut<'a>(items: &'a mut [MenuLink], path: &[usize]) -> Option<&'a mut MenuLink> {
    let (&first, rest) = path.split_first()?;
    let mut node = items.get_mut(first)?;
    for &index in rest {
        node = node.children.get_mut(index)?;
    }
    Some(node)
}

fn collect_mega_menus(tree: &MenuTree) -> Vec<MegaMenuSlot> {
    tree.walk()
        .filter_map(|link| {
            let mega = link.mega.as_ref()?;
            Some(MegaMenuSlot {
                label: mega.label.clone(),
                original_href: mega.source_href.clone(),
                href: link.href.clone(),
                count: mega.count,
            })
        })
        .collect()
}
