use clap::Parser;
use tracing_subscriber::EnvFilter;

use redmock::{Config, Dispatcher, Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::parse();

    let dispatcher = Dispatcher::new(config.password.clone());
    tracing::info!("{} commands registered", dispatcher.registry().len());

    let server = Server::new(dispatcher).with_max_frame_bytes(config.max_frame_bytes);
    server.run(&config.addr).await?;

    Ok(())
}
