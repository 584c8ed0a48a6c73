//! Startup banner printed once the broker and HTTP surface are ready.

use super::config::is_all_interfaces;
use super::constants::APP_NAME;

/// Print the startup banner with the HTTP and WebSocket URLs.
pub fn print_banner(host: &str, port: u16) {
    let display_host = if is_all_interfaces(host) { "localhost" } else { host };

    println!();
    println!("  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m", APP_NAME, env!("CARGO_PKG_VERSION"));
    println!();
    println!("  \x1b[32m➜\x1b[0m  \x1b[1mHTTP:\x1b[0m      http://{display_host}:{port}");
    println!("  \x1b[33m➜\x1b[0m  \x1b[1mWebSocket:\x1b[0m ws://{display_host}:{port}/ws");

    if host == "127.0.0.1" || host == "localhost" {
        println!("  \x1b[90m➜  use --host 0.0.0.0 to expose\x1b[0m");
    } else if !is_all_interfaces(host) {
        println!("  \x1b[32m➜\x1b[0m  \x1b[1mNetwork:\x1b[0m   http://{host}:{port}");
    }

    println!();
}
