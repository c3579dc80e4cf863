use mock_server::{ListShape, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::default();
    if let Ok(key) = std::env::var("MOCK_API_KEY") {
        settings.api_key = key;
    }
    if let Ok(shape) = std::env::var("MOCK_ENVELOPE") {
        settings.shape = shape
            .parse::<ListShape>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, shape = ?settings.shape, "listening");
    mock_server::run_with(listener, settings).await
}
