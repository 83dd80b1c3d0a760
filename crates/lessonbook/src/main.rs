use tracing_subscriber::{fmt, EnvFilter};

use lessonbook::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    lessonbook::start_server(config).await
}
