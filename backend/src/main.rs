use anyhow::Result;
use axum::serve;
use log::info;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use washplan_backend::backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins when set; default to info otherwise
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app_state = initialize_backend().await?;
    let router = create_router(app_state);

    let addr: SocketAddr = "0.0.0.0:3000".parse()?;
    info!("🌐 Starting REST API server at {}", addr);
    let listener = TcpListener::bind(addr).await?;
    serve(listener, router).await?;

    Ok(())
}
