use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::types::StateRecord;
use crate::error::StubsServiceError;
use crate::state::AppState;
use crate::usecase::state::{ClearStatesUseCase, ListStatesUseCase, ResetUseCase};

#[derive(Serialize)]
pub struct StateView {
    pub id: Uuid,
    pub data: Value,
    #[serde(serialize_with = "mockwire_core::serde::to_rfc3339_ms")]
    pub created: DateTime<Utc>,
    #[serde(serialize_with = "mockwire_core::serde::to_rfc3339_ms")]
    pub updated: DateTime<Utc>,
}

impl From<StateRecord> for StateView {
    fn from(record: StateRecord) -> Self {
        Self {
            id: record.id,
            data: record.data,
            created: record.created_at,
            updated: record.updated_at,
        }
    }
}

// ── GET /state ───────────────────────────────────────────────────────────────

pub async fn list_states(
    State(state): State<AppState>,
) -> Result<Json<Vec<StateView>>, StubsServiceError> {
    let uc = ListStatesUseCase {
        states: state.state_repo(),
    };
    let records = uc.execute().await?;
    Ok(Json(records.into_iter().map(StateView::from).collect()))
}

// ── DELETE /state ────────────────────────────────────────────────────────────

pub async fn clear_states(State(state): State<AppState>) -> Result<StatusCode, StubsServiceError> {
    let uc = ClearStatesUseCase {
        states: state.state_repo(),
    };
    uc.execute().await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /reset ──────────────────────────────────────────────────────────────

pub async fn reset(State(state): State<AppState>) -> Result<StatusCode, StubsServiceError> {
    let uc = ResetUseCase {
        methods: state.method_repo(),
        stubs: state.stub_repo(),
        states: state.state_repo(),
        admin: state.admin_lock(),
    };
    uc.execute().await?;
    Ok(StatusCode::NO_CONTENT)
}
