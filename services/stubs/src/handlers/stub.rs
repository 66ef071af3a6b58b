use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::types::{
    DEFAULT_SCOPE, DEFAULT_TIMES, ResponseMode, Stub, StubFilter, StubResponse,
};
use crate::error::StubsServiceError;
use crate::handlers::CreatedResponse;
use crate::state::AppState;
use crate::usecase::stub::{
    CreateStubInput, CreateStubUseCase, DeleteScopeUseCase, DeleteStubUseCase, GetStubUseCase,
    ListStubsUseCase,
};

// ── Shared body types ────────────────────────────────────────────────────────

#[derive(Deserialize, Serialize)]
pub struct StubResponseBody {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub mode: ResponseMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StubView {
    pub id: Uuid,
    pub method_description_id: String,
    pub scope: String,
    pub name: String,
    pub times: u32,
    pub response: StubResponseBody,
    pub request_predicates: Value,
    pub state: Option<Value>,
    pub seed: Option<Value>,
    pub persist: Option<Value>,
    pub labels: Vec<String>,
    #[serde(serialize_with = "mockwire_core::serde::to_rfc3339_ms")]
    pub created: DateTime<Utc>,
}

impl From<Stub> for StubView {
    fn from(stub: Stub) -> Self {
        Self {
            id: stub.id,
            method_description_id: stub.method_description_id,
            scope: stub.scope,
            name: stub.name,
            times: stub.times,
            response: StubResponseBody {
                data: stub.response.data,
                mode: stub.response.mode,
            },
            request_predicates: stub.request_predicates.raw().clone(),
            state: stub.state.map(|predicates| predicates.raw().clone()),
            seed: stub.seed,
            persist: stub.persist,
            labels: stub.labels,
            created: stub.created_at,
        }
    }
}

// ── POST /stub ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStubRequest {
    pub method_description_id: String,
    #[serde(default)]
    pub scope: Option<String>,
    pub name: String,
    #[serde(default)]
    pub times: Option<u32>,
    pub response: StubResponseBody,
    #[serde(default)]
    pub request_predicates: Value,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub seed: Option<Value>,
    #[serde(default)]
    pub persist: Option<Value>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

pub async fn create_stub(
    State(state): State<AppState>,
    Json(body): Json<CreateStubRequest>,
) -> Result<Json<CreatedResponse>, StubsServiceError> {
    let uc = CreateStubUseCase {
        methods: state.method_repo(),
        stubs: state.stub_repo(),
        admin: state.admin_lock(),
    };
    let id = uc
        .execute(CreateStubInput {
            method_description_id: body.method_description_id,
            scope: body.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_owned()),
            name: body.name,
            times: body.times.unwrap_or(DEFAULT_TIMES),
            response: StubResponse {
                data: body.response.data,
                mode: body.response.mode,
            },
            request_predicates: body.request_predicates,
            state: body.state,
            seed: body.seed,
            persist: body.persist,
            labels: body.labels.unwrap_or_default(),
        })
        .await?;
    Ok(Json(CreatedResponse { id: id.to_string() }))
}

// ── GET /stub ────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StubListQuery {
    pub method_description_id: Option<String>,
    pub scope: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

pub async fn list_stubs(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Vec<StubView>>, StubsServiceError> {
    let query: StubListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| StubsServiceError::InvalidQuery(e.to_string()))?
        .unwrap_or_default();

    let uc = ListStubsUseCase {
        stubs: state.stub_repo(),
    };
    let stubs = uc
        .execute(StubFilter {
            method_description_id: query.method_description_id,
            scope: query.scope,
            labels: query.labels,
        })
        .await?;
    Ok(Json(stubs.into_iter().map(StubView::from).collect()))
}

// ── GET /stub/{id} ───────────────────────────────────────────────────────────

pub async fn get_stub(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StubView>, StubsServiceError> {
    let uc = GetStubUseCase {
        stubs: state.stub_repo(),
    };
    Ok(Json(StubView::from(uc.execute(id).await?)))
}

// ── DELETE /stub/{id} ────────────────────────────────────────────────────────

pub async fn delete_stub(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StubsServiceError> {
    let uc = DeleteStubUseCase {
        stubs: state.stub_repo(),
    };
    uc.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /stub?scope= ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DeleteScopeQuery {
    pub scope: String,
}

#[derive(Serialize)]
pub struct DeleteScopeResponse {
    pub removed: usize,
}

pub async fn delete_stubs_by_scope(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<DeleteScopeResponse>, StubsServiceError> {
    let query: DeleteScopeQuery = serde_qs::from_str(raw_query.as_deref().unwrap_or_default())
        .map_err(|e| StubsServiceError::InvalidQuery(e.to_string()))?;

    let uc = DeleteScopeUseCase {
        stubs: state.stub_repo(),
    };
    let removed = uc.execute(&query.scope).await?;
    Ok(Json(DeleteScopeResponse { removed }))
}
