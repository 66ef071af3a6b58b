use axum::http::StatusCode;
use serde_json::{Value, json};

use mockwire_stubs::state::AppState;
use mockwire_testing::fixture::{
    COUNTDOWN_ID, COUNTDOWN_METHOD, MethodDescriptionFixture, StubFixture,
};

use crate::helpers::{admin_server, register_countdown};

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_checks() {
    let server = admin_server(AppState::default());

    let health: Value = server.get("/healthz").await.json();
    assert_eq!(health["status"], "ok");

    let ready: Value = server.get("/readyz").await.json();
    assert_eq!(ready["status"], "ready");
}

// ── Method descriptions ──────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_method_description_and_return_id() {
    let server = admin_server(AppState::default());

    let resp = server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["id"], COUNTDOWN_ID);

    let fetched: Value = server
        .get(&format!("/methodDescription/{COUNTDOWN_ID}"))
        .await
        .json();
    assert_eq!(fetched["route"], COUNTDOWN_METHOD);
    assert_eq!(fetched["connectionType"], "UNARY");
    assert_eq!(fetched["requestClass"], "market_data.PricesRequest");
    assert_eq!(fetched["responseClass"], "market_data.PricesResponse");
}

#[tokio::test]
async fn should_reject_duplicate_method_description_id() {
    let server = admin_server(AppState::default());
    server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();

    let resp = server
        .post("/v4/grpcMethodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "DUPLICATE_ID");
}

#[tokio::test]
async fn should_reject_second_description_of_same_route() {
    let server = admin_server(AppState::default());
    server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();

    let resp = server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::unary("other-countdown", COUNTDOWN_METHOD))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "DUPLICATE_ROUTE");
}

#[tokio::test]
async fn should_reject_codecs_that_are_not_a_descriptor_set() {
    let server = admin_server(AppState::default());
    let mut body = MethodDescriptionFixture::countdown();
    body["requestCodecs"] = json!("not base64!");

    let resp = server.post("/methodDescription").json(&body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_CODECS");
}

#[tokio::test]
async fn should_reject_unknown_message_class() {
    let server = admin_server(AppState::default());
    let mut body = MethodDescriptionFixture::countdown();
    body["responseClass"] = json!("QuotesResponse");

    let resp = server.post("/methodDescription").json(&body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_CODECS");
}

#[tokio::test]
async fn should_return_not_found_for_missing_method_description() {
    let server = admin_server(AppState::default());

    let resp = server.get("/methodDescription/missing").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "METHOD_DESCRIPTION_NOT_FOUND");
}

#[tokio::test]
async fn should_refuse_to_delete_method_description_with_stubs() {
    let server = admin_server(AppState::default());
    let stub_id = register_countdown(&server, 3).await;

    let resp = server
        .delete(&format!("/methodDescription/{COUNTDOWN_ID}"))
        .await;
    resp.assert_status(StatusCode::CONFLICT);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "METHOD_DESCRIPTION_IN_USE");

    server
        .delete(&format!("/stub/{stub_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&format!("/methodDescription/{COUNTDOWN_ID}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let listed: Vec<Value> = server.get("/methodDescription").await.json();
    assert!(listed.is_empty());
}

// ── Stubs ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_stub_with_defaults() {
    let server = admin_server(AppState::default());
    server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();

    let created: Value = server
        .post("/stub")
        .json(&json!({
            "methodDescriptionId": COUNTDOWN_ID,
            "name": "minimal",
            "response": { "data": { "instrument_id": "${req.instrument_id}" } },
        }))
        .await
        .json();
    let id = created["id"].as_str().unwrap();

    let stub: Value = server.get(&format!("/stub/{id}")).await.json();
    assert_eq!(stub["scope"], "countdown");
    assert_eq!(stub["times"], 1);
    assert_eq!(stub["response"]["mode"], "fill");
    assert_eq!(stub["labels"], json!([]));
}

#[tokio::test]
async fn should_reject_stub_for_unknown_method_description() {
    let server = admin_server(AppState::default());

    let resp = server.post("/v4/grpcStub").json(&StubFixture::countdown(3)).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "UNKNOWN_METHOD_DESCRIPTOR");

    let listed: Vec<Value> = server.get("/stub").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn should_reject_stub_with_unknown_predicate_operator() {
    let server = admin_server(AppState::default());
    server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();

    let mut body = StubFixture::countdown(1);
    body["requestPredicates"] = json!({ "instrument_id": { "startsWith": "inst" } });

    let resp = server.post("/stub").json(&body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_PREDICATE");
}

#[tokio::test]
async fn should_reject_stub_with_unknown_template_root() {
    let server = admin_server(AppState::default());
    server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();

    let mut body = StubFixture::countdown(1);
    body["response"]["data"] = json!({ "instrument_id": "${resp.instrument_id}" });

    let resp = server.post("/stub").json(&body).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "INVALID_TEMPLATE");
}

#[tokio::test]
async fn should_filter_stubs_by_scope_and_label() {
    let server = admin_server(AppState::default());
    register_countdown(&server, 3).await;

    let mut tagged = StubFixture::countdown(1);
    tagged["scope"] = json!("smoke");
    tagged["labels"] = json!(["fast"]);
    server.post("/stub").json(&tagged).await.assert_status_ok();

    let all: Vec<Value> = server.get("/stub").await.json();
    assert_eq!(all.len(), 2);

    let smoke: Vec<Value> = server
        .get("/stub")
        .add_query_param("scope", "smoke")
        .await
        .json();
    assert_eq!(smoke.len(), 1);
    assert_eq!(smoke[0]["labels"], json!(["fast"]));

    let by_method: Vec<Value> = server
        .get("/stub")
        .add_query_param("methodDescriptionId", COUNTDOWN_ID)
        .await
        .json();
    assert_eq!(by_method.len(), 2);
}

#[tokio::test]
async fn should_remove_only_stubs_of_given_scope() {
    let server = admin_server(AppState::default());
    register_countdown(&server, 3).await;

    let mut other = StubFixture::countdown(1);
    other["scope"] = json!("smoke");
    server.post("/stub").json(&other).await.assert_status_ok();

    let removed: Value = server
        .delete("/stub")
        .add_query_param("scope", "countdown")
        .await
        .json();
    assert_eq!(removed["removed"], 1);

    let remaining: Vec<Value> = server.get("/stub").await.json();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["scope"], "smoke");
}

#[tokio::test]
async fn should_return_not_found_for_missing_stub() {
    let server = admin_server(AppState::default());

    let resp = server
        .get("/stub/0190b6a4-0000-7000-8000-000000000000")
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "STUB_NOT_FOUND");
}

// ── State and reset ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_clear_everything_on_reset() {
    let server = admin_server(AppState::default());
    register_countdown(&server, 3).await;

    server
        .post("/reset")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let stubs: Vec<Value> = server.get("/stub").await.json();
    assert!(stubs.is_empty());
    let methods: Vec<Value> = server.get("/methodDescription").await.json();
    assert!(methods.is_empty());
    let states: Vec<Value> = server.get("/state").await.json();
    assert!(states.is_empty());

    // Descriptor id is free again.
    server
        .post("/methodDescription")
        .json(&MethodDescriptionFixture::countdown())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn should_clear_state_records() {
    let server = admin_server(AppState::default());

    server
        .delete("/state")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let states: Vec<Value> = server.get("/state").await.json();
    assert!(states.is_empty());
}
