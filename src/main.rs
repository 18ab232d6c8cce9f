//! storefront-mock: mock product and cart API over a JSON file
//!
//! ```text
//! storefront-mock [config.yaml]
//! ```
//!
//! Without an argument the config path is read from `STOREFRONT_CONFIG`;
//! without either, defaults apply (port 5000, `db.json`, `public/`).
//! `STOREFRONT_PORT` and `STOREFRONT_DB` override the loaded values.

use anyhow::Result;
use storefront::config::ServerConfig;
use storefront::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = ServerConfig::load(std::env::args().nth(1))?;
    let addr = config.listen_addr()?;

    tracing::info!(
        addr = %addr,
        db = %config.store.path.display(),
        static_dir = ?config.static_dir,
        "starting storefront-mock"
    );

    ServerBuilder::from_config(&config)?.serve(addr).await
}
