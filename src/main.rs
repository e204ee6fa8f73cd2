use std::{env, sync::Arc};

use bitcoind_notify::{
    chains::BitcoindClient,
    config::NotifierConfig,
    notifier::{ListenerRegistry, LoggingListener},
    start_notification_listener,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bitcoind_notify=info,tower_http=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args: Vec<String> = env::args().collect();

    let local_config = if args.contains(&"--local".to_string()) {
        "local_config.toml"
    } else {
        "config.toml"
    };

    let config = NotifierConfig::from_toml(local_config);
    info!(rpc_url = %config.rpc.url, address = %config.server.address, "Loaded configuration");

    let client = Arc::new(BitcoindClient::from_config(&config.rpc));
    let listeners = ListenerRegistry::new().with_listener(LoggingListener);

    start_notification_listener(&config, client, listeners).await
}
