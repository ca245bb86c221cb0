use anyhow::{Context, Result};
use clap::Parser;
use ivs_studio::{
    create_router, page, AppState, Config, LoopbackMediaDevices, LoopbackVendor, Page, PageVariant,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "ivs-studio", version, about = "Live-streaming page controller")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/ivs-studio")]
    config: String,

    /// Page to run: broadcast, watch, stage-broadcast or stage-watch
    #[arg(long, default_value = "broadcast")]
    variant: PageVariant,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("IVS Studio v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Page variant: {}", args.variant);

    // Demo mode: in-memory vendor and capture devices
    let vendor = LoopbackVendor::new();
    let devices = Arc::new(LoopbackMediaDevices::with_default_devices());

    let (mut page, events) = Page::new(args.variant, &cfg, vendor.sdk(), devices);
    if let Err(e) = page.initialize().await {
        error!("Page initialization failed: {}", e);
    }
    let (handle, task) = page::spawn(page, events);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    let app = create_router(AppState::new(handle));
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    // Dropping the router released the last page handle
    task.await.context("Page task panicked")?;
    info!("Stopped");
    Ok(())
}
