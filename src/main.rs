use anyhow::Result;
use autobid::{
    api,
    clock::{self, Clock},
    config, demo, engine, persistence,
};
use clap::Parser;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let config = config::Config::parse();
    init_logging(&config.log_filter);

    let stores = persistence::open(config.database_url.as_deref(), config.pool_size)?;
    let clock: clock::SharedClock = Arc::new(clock::SystemClock);
    let engine = Arc::new(engine::BiddingEngine::new(&stores, clock.clone()));

    if config.seed_demo_data {
        demo::seed(&stores.directory, &engine, clock.now())?;
    }

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let stop_tx = Mutex::new(Some(stop_tx));
    ctrlc::set_handler(move || {
        eprintln!("Stopping...");
        if let Some(stop_tx) = stop_tx.lock().take() {
            let _ = stop_tx.send(());
        }
    })?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(config.listen, engine, async {
        let _ = stop_rx.await;
    }))
}
