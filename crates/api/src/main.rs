use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    teamcal_shared::init_env();

    // The guard must be kept alive for the duration of the program to ensure logs are flushed
    let _guard = teamcal_shared::init_tracing("teamcal-api");

    tracing::info!("Starting teamcal API server");

    let config = teamcal_api::config::Config::from_env()?;
    tracing::info!(
        "Server configuration loaded: {} (timezone: {}, max occurrences: {})",
        config.addr(),
        config.core.display_timezone.name(),
        config.core.max_occurrences
    );

    teamcal_api::run_api(&config).await?;

    tracing::info!("Server stopped");
    Ok(())
}
