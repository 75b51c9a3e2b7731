//! loadscene entry point.
//!
//! Switches OBS to a loading scene while VRChat is between worlds, and back
//! once the new world has loaded, by tailing VRChat's output log.

mod app;
mod config;
mod reload;

use loadscene_obs::ObsActuator;
use loadscene_presence::SysinfoProbe;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::Config;

fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting loadscene");

    let path = config::config_path()?;
    let config = Config::load(&path)?;
    tracing::info!(path = %path.display(), "configuration loaded");

    // Timer callbacks are serialized on one thread.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(&path, config));

    tracing::info!("loadscene shut down cleanly");
    Ok(())
}

async fn run(path: &std::path::Path, config: Config) {
    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    let _config_watcher = match reload::watch_config(path, reload_tx) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!(error = %e, "config hot reload unavailable");
            None
        }
    };

    let actuator = ObsActuator::new(config.obs.url.clone(), config.obs.password.clone());
    let probe = SysinfoProbe::new(config.process_name.clone());
    let mut app = App::new(config, actuator, probe);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("SIGINT received, shutting down");
                    cancel.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
            }
        });
    }

    app.start().await;
    app.run(cancel, reload_rx).await;
    app.stop().await;
}
