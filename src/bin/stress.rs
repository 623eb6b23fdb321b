use anyhow::{Context, Result};
use msqueue::stress::{self, StressConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = StressConfig::from_env().context("failed to load stress config")?;
    info!(workers = config.workers, total = config.total, "config loaded");

    match stress::run(&config) {
        Ok(report) => {
            info!("{}", report);
            Ok(())
        }
        Err(err) => {
            error!(%err, "stress run failed");
            Err(err).context("queue verification failed")
        }
    }
}
