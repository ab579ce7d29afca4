use price_sniper::config::load_config;
use price_sniper::runner::{run, write_report};
use price_sniper::source::SourceImpl;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let config = match load_config(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let source = match SourceImpl::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize dataset source: {}", e);
            return;
        }
    };

    let report = run(&config, &source).await;

    if let Some(path) = &config.report_path {
        if let Err(e) = write_report(path, &report) {
            warn!("Report {} not saved: {}", path, e);
        }
    }
    info!("Done.");
}
