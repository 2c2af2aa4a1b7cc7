use anyhow::Context;
use bizscan_core::AppConfig;
use std::path::PathBuf;

/// Usage: `bizscan [CONFIG_PATH]`
///
/// Without a path the XDG config file is used, falling back to defaults.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bizscan_app::init_tracing();
    tracing::info!("Starting bizscan v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let mut config = AppConfig::load_from(&path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            config.apply_env();
            config
        }
        None => AppConfig::load_with_env().context("failed to load configuration")?,
    };

    if let Err(e) = bizscan_app::run(config).await {
        tracing::error!("Fatal error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
