use std::sync::Arc;

mod archive;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod music;
mod server;
mod tls;
mod view;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::current_dir()?;

    // All shared resources (view template, pre-rendered 404 page, archive
    // index) must be ready before the first connection is accepted.
    let state = Arc::new(config::AppState::init(cfg, root).await?);

    server::run(state).await
}
