//! Nested-list HTML rendering for a built menu.

use std::fmt::Write;

use crate::tree::{MenuLink, MenuTree};

/// Render the tree as nested `<ul>` lists.
///
/// Items with children carry `has-sub`; their child list carries
/// `sub-menu m-sub`. Mega menu items carry `mega-menu` and a `data-label`.
pub fn render_html(tree: &MenuTree) -> String {
    let mut out = String::new();
    out.push_str("<ul class=\"menu\">");
    for link in &tree.items {
        render_link(&mut out, link);
    }
    out.push_str("</ul>");
    out
}

fn render_link(out: &mut String, link: &MenuLink) {
    let mut classes = Vec::new();
    if link.has_children() {
        classes.push("has-sub");
    }
    if link.mega.is_some() {
        classes.push("mega-menu");
    }

    out.push_str("<li");
    if !classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", classes.join(" "));
    }
    if let Some(mega) = &link.mega {
        let _ = write!(out, " data-label=\"{}\"", escape(&mega.label));
    }
    let _ = write!(
        out,
        "><a href=\"{}\">{}</a>",
        escape(&link.href),
        escape(&link.label)
    );

    if link.has_children() {
        out.push_str("<ul class=\"sub-menu m-sub\">");
        for child in &link.children {
            render_link(out, child);
        }
        out.push_str("</ul>");
    }
    out.push_str("</li>");
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
