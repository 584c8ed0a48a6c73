#[tokio::main]
async fn main() {
    if let Err(e) = relaybus::App::run().await {
        eprintln!("\nError: {e}\n");
        std::process::exit(1);
    }
}
