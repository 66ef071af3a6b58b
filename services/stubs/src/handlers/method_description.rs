use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::{ConnectionType, MethodDescription};
use crate::error::StubsServiceError;
use crate::handlers::CreatedResponse;
use crate::state::AppState;
use crate::usecase::method_description::{
    CreateMethodDescriptionInput, CreateMethodDescriptionUseCase, DeleteMethodDescriptionUseCase,
    GetMethodDescriptionUseCase, ListMethodDescriptionsUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptionResponse {
    pub id: String,
    pub description: String,
    pub service: String,
    pub method_name: String,
    /// Resolved `package.Service/Method` dispatch key.
    pub route: String,
    pub connection_type: ConnectionType,
    pub proxy_url: Option<String>,
    pub request_class: String,
    pub response_class: String,
    #[serde(serialize_with = "mockwire_core::serde::to_rfc3339_ms")]
    pub created: DateTime<Utc>,
}

impl From<&MethodDescription> for MethodDescriptionResponse {
    fn from(method: &MethodDescription) -> Self {
        Self {
            id: method.id.clone(),
            description: method.description.clone(),
            service: method.service.clone(),
            method_name: method.method_name.clone(),
            route: method.route.to_string(),
            connection_type: method.connection_type,
            proxy_url: method.proxy_url.clone(),
            request_class: method.request_message.full_name().to_owned(),
            response_class: method.response_message.full_name().to_owned(),
            created: method.created_at,
        }
    }
}

// ── POST /methodDescription ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMethodDescriptionRequest {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub service: String,
    pub method_name: String,
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub proxy_url: Option<String>,
    pub request_class: String,
    pub response_class: String,
    pub request_codecs: String,
    pub response_codecs: String,
}

pub async fn create_method_description(
    State(state): State<AppState>,
    Json(body): Json<CreateMethodDescriptionRequest>,
) -> Result<Json<CreatedResponse>, StubsServiceError> {
    let uc = CreateMethodDescriptionUseCase {
        methods: state.method_repo(),
    };
    let id = uc
        .execute(CreateMethodDescriptionInput {
            id: body.id,
            description: body.description.unwrap_or_default(),
            service: body.service,
            method_name: body.method_name,
            connection_type: body.connection_type,
            proxy_url: body.proxy_url,
            request_class: body.request_class,
            response_class: body.response_class,
            request_codecs: body.request_codecs,
            response_codecs: body.response_codecs,
        })
        .await?;
    Ok(Json(CreatedResponse { id }))
}

// ── GET /methodDescription ───────────────────────────────────────────────────

pub async fn list_method_descriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<MethodDescriptionResponse>>, StubsServiceError> {
    let uc = ListMethodDescriptionsUseCase {
        methods: state.method_repo(),
    };
    let methods = uc.execute().await?;
    Ok(Json(
        methods
            .iter()
            .map(|m| MethodDescriptionResponse::from(m.as_ref()))
            .collect(),
    ))
}

// ── GET /methodDescription/{id} ──────────────────────────────────────────────

pub async fn get_method_description(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MethodDescriptionResponse>, StubsServiceError> {
    let uc = GetMethodDescriptionUseCase {
        methods: state.method_repo(),
    };
    let method = uc.execute(&id).await?;
    Ok(Json(MethodDescriptionResponse::from(method.as_ref())))
}

// ── DELETE /methodDescription/{id} ───────────────────────────────────────────

pub async fn delete_method_description(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, StubsServiceError> {
    let uc = DeleteMethodDescriptionUseCase {
        methods: state.method_repo(),
        stubs: state.stub_repo(),
        admin: state.admin_lock(),
    };
    uc.execute(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
