use std::net::SocketAddr;

use axum_test::TestServer;
use serde_json::Value;

use mockwire_stubs::router::{build_grpc_router, build_router};
use mockwire_stubs::state::AppState;
use mockwire_testing::fixture::{MethodDescriptionFixture, StubFixture};

// ── Servers ──────────────────────────────────────────────────────────────────

/// Admin API served in-process over a mock transport.
pub fn admin_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).unwrap()
}

/// gRPC endpoint bound to an ephemeral localhost port.
pub async fn spawn_grpc(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_grpc_router(state)).await.unwrap();
    });
    addr
}

// ── Seeding ──────────────────────────────────────────────────────────────────

pub async fn register_countdown(server: &TestServer, times: u32) -> String {
    server
        .post("/v4/grpcMethodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();

    let created: Value = server
        .post("/v4/grpcStub")
        .json(&StubFixture::countdown(times))
        .await
        .json();
    created["id"].as_str().unwrap().to_owned()
}
