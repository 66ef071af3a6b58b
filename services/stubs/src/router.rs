use axum::{
    Router,
    routing::{delete, get, post},
};

use mockwire_core::health::{healthz, readyz};
use mockwire_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::grpc_server::StubGrpcServer;
use crate::handlers::{
    method_description::{
        create_method_description, delete_method_description, get_method_description,
        list_method_descriptions,
    },
    state::{clear_states, list_states, reset},
    stub::{create_stub, delete_stub, delete_stubs_by_scope, get_stub, list_stubs},
};
use crate::state::AppState;

/// HTTP admin API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Method descriptions
        .route("/methodDescription", post(create_method_description))
        .route("/methodDescription", get(list_method_descriptions))
        .route("/methodDescription/{id}", get(get_method_description))
        .route("/methodDescription/{id}", delete(delete_method_description))
        .route("/v4/grpcMethodDescription", post(create_method_description))
        // Stubs
        .route("/stub", post(create_stub))
        .route("/stub", get(list_stubs))
        .route("/stub", delete(delete_stubs_by_scope))
        .route("/stub/{id}", get(get_stub))
        .route("/stub/{id}", delete(delete_stub))
        .route("/v4/grpcStub", post(create_stub))
        // State
        .route("/state", get(list_states))
        .route("/state", delete(clear_states))
        // Teardown
        .route("/reset", post(reset))
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}

/// gRPC endpoint: every path is a call to dispatch.
pub fn build_grpc_router(state: AppState) -> Router {
    Router::new().fallback_service(StubGrpcServer { state })
}
