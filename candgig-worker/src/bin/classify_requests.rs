/// Request Classifier - Shows which strategy the worker applies to each URL
///
/// Usage: cargo run --bin classify_requests [--method METHOD] <url>...
use candgig_core::{init_tracing, TelemetryConfig};
use candgig_worker::{classify, Method, Request, Route};
use url::Url;

fn main() {
    let mut args = std::env::args().skip(1).peekable();
    let mut method = Method::GET;

    if args.peek().map(String::as_str) == Some("--method") {
        args.next();
        match args.next().map(|m| m.to_uppercase().parse::<Method>()) {
            Some(Ok(m)) => method = m,
            _ => {
                eprintln!("--method needs a valid HTTP method");
                std::process::exit(1);
            }
        }
    }

    let urls: Vec<String> = args.collect();
    if urls.is_empty() {
        eprintln!("Usage: cargo run --bin classify_requests [--method METHOD] <url>...");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin classify_requests https://example.com/main.css https://example.com/api/posts");
        std::process::exit(1);
    }

    if let Err(e) = init_tracing(&TelemetryConfig::default()) {
        eprintln!("Failed to initialize tracing: {}", e);
    }

    for raw in &urls {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                eprintln!("{}: invalid URL ({})", raw, e);
                continue;
            }
        };
        let request = Request::new(method.clone(), url);
        match classify(&request) {
            Route::Handle(strategy) => println!("{:<24} {} {}", strategy.as_str(), method, raw),
            Route::Passthrough(reason) => {
                println!("{:<24} {} {}", format!("passthrough ({:?})", reason), method, raw)
            }
        }
    }
}
