//! CandGig Menu - Navigation Tree Builder
//!
//! Turns the flat link list of the main-menu widget into nested menu trees,
//! rewrites mega menu links to category listings, and fetches the preview
//! posts those mega menus display.
//!
//! # Example
//!
//! ```ignore
//! let raw = vec![
//!     RawLink::new("Home", "/"),
//!     RawLink::new("_About", "/p/about.html"),
//!     RawLink::new("Tech", "Technology/mega-menu"),
//! ];
//! let tree = build_from_raw(&raw, &ThemeConfig::default());
//! let html = render_html(&tree);
//! let panels = populate_mega_menus(&tree, &BloggerFeed::new(base_url)).await;
//! ```

pub mod entry;
pub mod feed;
pub mod mega;
pub mod render;
pub mod tree;

pub use entry::{count_markers, parse_entries, parse_entry, Depth, MenuEntry, RawLink};
pub use feed::{populate_mega_menus, BloggerFeed, FeedQuery, MegaMenuPanel, PostFeed, PostSummary};
pub use mega::{category_href, detect_mega_menu, MegaMenu, MegaMenuSlot};
pub use render::render_html;
pub use tree::{build_from_raw, build_menu, MenuLink, MenuTree, Walk};
