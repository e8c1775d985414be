use anyhow::Result;
use covid_dashboard::domain::config_types::{LogFormat, LogLevel};
use covid_dashboard::{Application, Settings};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    init_tracing(
        settings.log_level().unwrap_or_default(),
        settings.log_format().unwrap_or_default(),
    );

    info!("Starting COVID dashboard orchestrator");

    let app = Application::from_settings(settings)?;
    app.run().await?;

    Ok(())
}
