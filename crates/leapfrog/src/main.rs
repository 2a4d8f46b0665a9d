use leapfrog::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), LeapfrogError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("LEAPFROG_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

    let server = LeapfrogServer::builder().bind(&bind).build().await?;
    server.run().await
}
