use ai_llm_service::telemetry;
use api::AppConfig;
use tracing_subscriber::{
    EnvFilter, Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment may carry everything.
    let dotenv = dotenvy::dotenv();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| !telemetry::is_own_target(meta.target()))),
        )
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => tracing::debug!("no .env file; using process environment"),
        Err(e) => anyhow::bail!("failed to read .env: {e}"),
    }

    let config = AppConfig::from_env()?;
    api::start(config).await?;

    Ok(())
}
