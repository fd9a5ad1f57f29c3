use std::net::SocketAddr;

use atelier_client::proxy::{ProxyConfig, proxy_routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ProxyConfig::from_env()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port()));
    let app = proxy_routes(config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "atelier-proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}
