use promptdeck::application::bootstrap::bootstrap;
use promptdeck::config::AppConfig;
use promptdeck::infrastructure::server;
use std::error::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    dotenvy::dotenv().ok();
    info!("Starting promptdeck");

    let config = AppConfig::from_env()?;
    let service = bootstrap(&config).await?;

    info!(addr = %config.bind_addr, "Starting REST server");
    server::serve(service, config.bind_addr).await?;
    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
