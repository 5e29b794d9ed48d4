#[tokio::main]
async fn main() {
    if let Err(e) = nav_panel::start_server().await {
        let _ = rolling_logger::error(&format!("Server failed: {}", e));
        eprintln!("nav-panel: {}", e);
        std::process::exit(1);
    }
}
