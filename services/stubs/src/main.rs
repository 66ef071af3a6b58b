use std::future::IntoFuture;

use tracing::info;

use mockwire_core::tracing::init_tracing;
use mockwire_stubs::config::StubsConfig;
use mockwire_stubs::router::{build_grpc_router, build_router};
use mockwire_stubs::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StubsConfig::from_env();
    init_tracing(&config.log_filter);

    let state = AppState::default();

    // gRPC endpoint (h2c)
    let grpc_addr = config.grpc_addr();
    let grpc_listener = tokio::net::TcpListener::bind(&grpc_addr).await?;
    let grpc_router = build_grpc_router(state.clone());
    info!("stub gRPC endpoint listening on {grpc_addr}");
    let grpc_server = tokio::spawn(async move { axum::serve(grpc_listener, grpc_router).await });

    // HTTP admin API
    let http_addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    info!("stub admin API listening on {http_addr}");

    let http_server = axum::serve(listener, build_router(state));

    tokio::select! {
        result = http_server.into_future() => result?,
        result = grpc_server => result??,
    }
    Ok(())
}
