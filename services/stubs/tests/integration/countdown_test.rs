use futures::future::join_all;
use serde_json::json;
use tonic::Code;

use mockwire_stubs::state::AppState;
use mockwire_testing::fixture::{COUNTDOWN_ID, COUNTDOWN_METHOD, MethodDescriptionFixture};
use mockwire_testing::grpc::{connect, prices_request};

use crate::helpers::{admin_server, register_countdown, spawn_grpc};

// ── Countdown scenario ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_serve_stub_until_budget_is_exhausted() {
    let state = AppState::default();
    let admin = admin_server(state.clone());
    let addr = spawn_grpc(state).await;
    register_countdown(&admin, 3).await;

    let mut client = connect(addr).await;

    for _ in 0..3 {
        let reply = client
            .countdown(prices_request("instrument_1", "ID_1"))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(reply.instrument_id, "instrument_1");
        assert_eq!(reply.tracking_id, "ID_1");
    }

    let status = client
        .countdown(prices_request("instrument_1", "ID_1"))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Internal);
    assert_eq!(
        status.message(),
        format!("Can't find any stub for {COUNTDOWN_METHOD}")
    );
}

#[tokio::test]
async fn should_report_remaining_budget_through_admin_api() {
    let state = AppState::default();
    let admin = admin_server(state.clone());
    let addr = spawn_grpc(state).await;
    let stub_id = register_countdown(&admin, 3).await;

    let mut client = connect(addr).await;
    client
        .countdown(prices_request("instrument_1", "ID_1"))
        .await
        .unwrap();

    let stub: serde_json::Value = admin.get(&format!("/stub/{stub_id}")).await.json();
    assert_eq!(stub["times"], json!(2));
}

#[tokio::test]
async fn should_never_exceed_budget_under_concurrent_calls() {
    let state = AppState::default();
    let admin = admin_server(state.clone());
    let addr = spawn_grpc(state).await;
    register_countdown(&admin, 5).await;

    let client = connect(addr).await;
    let calls = (0..20).map(|i| {
        let mut client = client.clone();
        async move {
            client
                .countdown(prices_request(&format!("instrument_{i}"), "ID_1"))
                .await
        }
    });
    let results = join_all(calls).await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, 5);
    for status in results.into_iter().filter_map(Result::err) {
        assert_eq!(status.code(), Code::Internal);
    }
}

#[tokio::test]
async fn should_serve_fresh_stub_after_scope_cleanup() {
    let state = AppState::default();
    let admin = admin_server(state.clone());
    let addr = spawn_grpc(state).await;
    register_countdown(&admin, 1).await;

    let mut client = connect(addr).await;
    client
        .countdown(prices_request("instrument_1", "ID_1"))
        .await
        .unwrap();

    let removed: serde_json::Value = admin
        .delete("/stub")
        .add_query_param("scope", "countdown")
        .await
        .json();
    assert_eq!(removed["removed"], json!(1));

    admin
        .post("/stub")
        .json(&json!({
            "methodDescriptionId": COUNTDOWN_ID,
            "name": "literal stub",
            "response": {
                "data": { "instrument_id": "fixed", "price": 101.5 },
                "mode": "literal",
            },
        }))
        .await
        .assert_status_ok();

    let reply = client
        .countdown(prices_request("instrument_2", "ID_2"))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(reply.instrument_id, "fixed");
    assert_eq!(reply.price, 101.5);
    assert_eq!(reply.tracking_id, "");
}

// ── Routing failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_unimplemented_for_unregistered_method() {
    let state = AppState::default();
    let addr = spawn_grpc(state).await;

    let mut client = connect(addr).await;
    let status = client
        .countdown(prices_request("instrument_1", "ID_1"))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);
    assert_eq!(status.message(), format!("Unknown method {COUNTDOWN_METHOD}"));
}

#[tokio::test]
async fn should_return_unimplemented_for_streaming_method() {
    let state = AppState::default();
    let admin = admin_server(state.clone());
    let addr = spawn_grpc(state).await;

    let mut body = MethodDescriptionFixture::unary(
        "stream-subscribe",
        "market_data.OTCMarketDataService/Subscribe",
    );
    body["connectionType"] = json!("SERVER_STREAM");
    admin
        .post("/methodDescription")
        .json(&body)
        .await
        .assert_status_ok();

    let mut client = connect(addr).await;
    let status = client
        .subscribe(prices_request("instrument_1", "ID_1"))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);
}
