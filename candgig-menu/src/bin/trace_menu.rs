/// Menu Tracer - Shows how a flat link list becomes the rendered menu
///
/// Usage: cargo run --bin trace_menu <links.json>
///
/// The input is a JSON array of `{"label": "...", "href": "..."}` objects.
use candgig_core::{init_tracing, TelemetryConfig, ThemeConfig};
use candgig_menu::{build_from_raw, render_html, MenuLink, RawLink};
use std::fs;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin trace_menu <links.json>");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin trace_menu menu.json");
        std::process::exit(1);
    }

    if let Err(e) = init_tracing(&TelemetryConfig::default()) {
        eprintln!("Failed to initialize tracing: {}", e);
    }

    let config = ThemeConfig::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Invalid theme configuration: {}", e);
        std::process::exit(1);
    }

    let path = &args[1];
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let raw: Vec<RawLink> = match serde_json::from_str(&content) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("Failed to parse {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let tree = build_from_raw(&raw, &config);

    println!("TREE ({} links, {} skipped, {} orphans):", tree.len(), tree.skipped, tree.orphans);
    for link in &tree.items {
        print_link(link, 0);
    }
    println!();

    if !tree.mega_menus.is_empty() {
        println!("MEGA MENUS:");
        for slot in &tree.mega_menus {
            println!("  {} ({} posts): {} -> {}", slot.label, slot.count, slot.original_href, slot.href);
        }
        println!();
    }

    println!("HTML:");
    println!("{}", render_html(&tree));
}

fn print_link(link: &MenuLink, indent: usize) {
    println!("{}- {} [{}]", "  ".repeat(indent + 1), link.label, link.href);
    for child in &link.children {
        print_link(child, indent + 1);
    }
}
