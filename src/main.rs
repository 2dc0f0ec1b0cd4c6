use httpfromtcp::config::Config;
use httpfromtcp::routes::DemoHandler;
use httpfromtcp::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = server::serve(&cfg, DemoHandler::default()).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    server.shutdown().await
}
