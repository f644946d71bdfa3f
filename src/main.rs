use ai_llm_service::telemetry;
use tracing::{Level, info, warn};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file when present; the process
    // environment still wins for anything already set.
    let dotenv = dotenvy::dotenv();

    let env_filter = telemetry::env_filter_with_level("info", Level::INFO);

    // The LLM client renders its own lines through `telemetry::layer`.
    let app_layer = fmt::layer()
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| {
            !meta.target().starts_with(telemetry::TARGET_PREFIX)
        }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(app_layer)
        .with(telemetry::layer())
        .try_init()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => info!("no .env file, using process environment"),
        Err(err) => warn!(error = %err, "failed to parse .env"),
    }

    api::start().await?;

    Ok(())
}
