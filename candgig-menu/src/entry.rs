//! Flat menu input and the marker parsing step.
//!
//! Link-list widgets author nesting as leading marker characters
//! (`_About`, `__Team`). This module turns that convention into typed
//! [`MenuEntry`] values so the tree builder never scans label prefixes.

use candgig_core::{CandgigResult, MenuError};
use serde::{Deserialize, Serialize};

/// Nesting depth of a menu item. Anything deeper than two levels below the
/// top collapses into [`Depth::Nested`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Depth {
    /// Top-level item, no markers.
    Top,
    /// First submenu level, one marker.
    Sub,
    /// Second submenu level, two or more markers.
    Nested,
}

impl Depth {
    /// Map a raw marker count to a depth, clamping at two.
    pub fn from_marker_count(count: usize) -> Self {
        match count {
            0 => Depth::Top,
            1 => Depth::Sub,
            _ => Depth::Nested,
        }
    }

    /// Numeric level: 0, 1 or 2.
    pub fn level(self) -> usize {
        match self {
            Depth::Top => 0,
            Depth::Sub => 1,
            Depth::Nested => 2,
        }
    }
}

/// A link exactly as authored in the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
}

impl RawLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: Some(href.into()),
        }
    }
}

/// A parsed, typed menu entry ready for tree building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Label as authored, markers included.
    pub raw_label: String,
    /// Number of leading markers before clamping.
    pub marker_count: usize,
    pub depth: Depth,
    /// Label with every leading marker stripped.
    pub label: String,
    pub href: String,
}

impl MenuEntry {
    /// Build an entry directly from a typed depth, bypassing marker syntax.
    pub fn new(depth: Depth, label: impl Into<String>, href: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            raw_label: label.clone(),
            marker_count: depth.level(),
            depth,
            label,
            href: href.into(),
        }
    }
}

/// Count the leading `marker` characters of a label.
pub fn count_markers(label: &str, marker: char) -> usize {
    label.chars().take_while(|c| *c == marker).count()
}

/// Parse one authored link into a [`MenuEntry`].
///
/// `position` is the index in the source list and only feeds error messages.
pub fn parse_entry(position: usize, raw: &RawLink, marker: char) -> CandgigResult<MenuEntry> {
    let raw_label = raw.label.trim();
    let marker_count = count_markers(raw_label, marker);
    let label = raw_label.trim_start_matches(marker).trim();

    if label.is_empty() {
        return Err(MenuError::EmptyLabel { position }.into());
    }

    let href = raw
        .href
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| MenuError::MissingHref {
            label: label.to_string(),
        })?;

    Ok(MenuEntry {
        raw_label: raw_label.to_string(),
        marker_count,
        depth: Depth::from_marker_count(marker_count),
        label: label.to_string(),
        href: href.to_string(),
    })
}

/// Parse a whole list, skipping malformed entries.
pub fn parse_entries(raw: &[RawLink], marker: char) -> (Vec<MenuEntry>, usize) {
    let mut skipped = 0;
    let entries = raw
        .iter()
        .enumerate()
        .filter_map(|(position, link)| match parse_entry(position, link, marker) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(position, error = %e, "Skipping malformed menu entry");
                skipped += 1;
                None
            }
        })
        .collect();
    (entries, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candgig_core::CandgigError;

    #[test]
    fn test_depth_clamps_at_two() {
        assert_eq!(Depth::from_marker_count(0), Depth::Top);
        assert_eq!(Depth::from_marker_count(1), Depth::Sub);
        assert_eq!(Depth::from_marker_count(2), Depth::Nested);
        assert_eq!(Depth::from_marker_count(7), Depth::Nested);
        assert_eq!(Depth::from_marker_count(7).level(), 2);
    }

    #[test]
    fn test_parse_strips_all_markers() {
        let entry = parse_entry(0, &RawLink::new("___Deep", "/deep"), '_').unwrap();
        assert_eq!(entry.marker_count, 3);
        assert_eq!(entry.depth, Depth::Nested);
        assert_eq!(entry.label, "Deep");
        assert_eq!(entry.raw_label, "___Deep");
    }

    #[test]
    fn test_parse_keeps_inner_markers() {
        let entry = parse_entry(0, &RawLink::new("_snake_case", "/s"), '_').unwrap();
        assert_eq!(entry.depth, Depth::Sub);
        assert_eq!(entry.label, "snake_case");
    }

    #[test]
    fn test_parse_custom_marker() {
        let entry = parse_entry(0, &RawLink::new("--Team", "/team"), '-').unwrap();
        assert_eq!(entry.depth, Depth::Nested);
        assert_eq!(entry.label, "Team");
    }

    #[test]
    fn test_parse_rejects_marker_only_label() {
        let err = parse_entry(4, &RawLink::new("__", "/x"), '_').unwrap_err();
        assert!(matches!(
            err,
            CandgigError::Menu(MenuError::EmptyLabel { position: 4 })
        ));
    }

    #[test]
    fn test_parse_rejects_missing_href() {
        let raw = RawLink {
            label: "About".to_string(),
            href: None,
        };
        assert!(matches!(
            parse_entry(0, &raw, '_'),
            Err(CandgigError::Menu(MenuError::MissingHref { .. }))
        ));

        let blank = RawLink::new("About", "   ");
        assert!(parse_entry(0, &blank, '_').is_err());
    }

    #[test]
    fn test_parse_entries_skips_bad_ones() {
        let raw = vec![
            RawLink::new("Home", "/"),
            RawLink::new("", "/empty"),
            RawLink::new("_About", "/about"),
        ];
        let (entries, skipped) = parse_entries(&raw, '_');
        assert_eq!(skipped, 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].label, "About");
    }
}
