//! kvgrid - A live editable dashboard over a key-value store
//!
//! This is the binary entry point. All logic lives in the library crates.

use clap::Parser;
use kvgrid_core::prelude::*;

/// kvgrid - A live editable dashboard over a key-value store
#[derive(Parser, Debug)]
#[command(name = "kvgrid")]
#[command(about = "A live editable TUI dashboard over a key-value store", long_about = None)]
struct Args {
    /// WebSocket URL of the store bridge (overrides config file)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Terminal poll interval in milliseconds (overrides config file)
    #[arg(long, value_name = "MS")]
    tick_rate: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize error handling
    color_eyre::install().map_err(|e| Error::terminal(e.to_string()))?;

    // Initialize logging (to file, since the TUI owns stdout)
    kvgrid_core::logging::init()?;

    let mut settings = kvgrid_app::config::load_settings()?;
    if let Some(url) = args.url {
        settings.store_url = url;
    }
    if let Some(tick_rate) = args.tick_rate {
        settings.tick_rate_ms = tick_rate;
    }

    info!("kvgrid starting, store at {}", settings.store_url);

    let result = kvgrid_tui::run(settings).await;

    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
    }

    info!("kvgrid exiting");
    result
}
