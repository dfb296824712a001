use std::sync::Arc;

use tokio::sync::Notify;

use bucket_gateway::config::{AppState, Config};
use bucket_gateway::fetch::ReqwestFetcher;
use bucket_gateway::{logger, server, storage};

const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_config_path(std::env::args().skip(1))?;
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker count comes from config; default is one per CPU core
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

/// `-c <path>` / `--config <path>`, file name without extension
fn parse_config_path(
    mut args: impl Iterator<Item = String>,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut path = DEFAULT_CONFIG_PATH.to_string();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                path = args
                    .next()
                    .ok_or_else(|| format!("{arg} requires a path argument"))?;
            }
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }
    Ok(path)
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let store = storage::from_config(&cfg.storage);
    let state = Arc::new(AppState::new(cfg, store, Arc::new(ReqwestFetcher::new())));
    logger::log_server_start(&addr, &state);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state, shutdown))
        .await?;
    Ok(())
}
