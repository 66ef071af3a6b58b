use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::domain::predicate::Predicates;
use crate::domain::repository::{MethodRepository, StubRepository};
use crate::domain::template;
use crate::domain::types::{ResponseMode, Stub, StubFilter, StubResponse};
use crate::error::StubsServiceError;
use crate::infra::codec;
use crate::usecase::AdminLock;

// ── CreateStub ───────────────────────────────────────────────────────────────

pub struct CreateStubInput {
    pub method_description_id: String,
    pub scope: String,
    pub name: String,
    pub times: u32,
    pub response: StubResponse,
    pub request_predicates: Value,
    pub state: Option<Value>,
    pub seed: Option<Value>,
    pub persist: Option<Value>,
    pub labels: Vec<String>,
}

pub struct CreateStubUseCase<M: MethodRepository, S: StubRepository> {
    pub methods: M,
    pub stubs: S,
    pub admin: AdminLock,
}

impl<M: MethodRepository, S: StubRepository> CreateStubUseCase<M, S> {
    /// Validates everything before storing; a rejected stub leaves no trace.
    pub async fn execute(&self, input: CreateStubInput) -> Result<Uuid, StubsServiceError> {
        // Held until the insert so the descriptor cannot be removed in between.
        let _admin = self.admin.acquire().await;
        let method = self
            .methods
            .find_by_id(&input.method_description_id)
            .await?
            .ok_or_else(|| {
                StubsServiceError::UnknownMethodDescriptor(input.method_description_id.clone())
            })?;

        let request_predicates = Predicates::parse(&input.request_predicates)
            .map_err(|e| StubsServiceError::InvalidPredicate(format!("requestPredicates: {e}")))?;
        let state = input
            .state
            .as_ref()
            .map(|raw| {
                Predicates::parse(raw)
                    .map_err(|e| StubsServiceError::InvalidPredicate(format!("state: {e}")))
            })
            .transpose()?;

        match input.response.mode {
            ResponseMode::Fill => template::validate(&input.response.data)
                .map_err(|e| StubsServiceError::InvalidTemplate(format!("response: {e}")))?,
            // Nothing left to substitute, so the data must already fit the response message.
            ResponseMode::Literal => {
                codec::encode_message(&method.response_message, &input.response.data).map_err(
                    |e| {
                        StubsServiceError::InvalidTemplate(format!(
                            "response does not fit {}: {e}",
                            method.response_class
                        ))
                    },
                )?;
            }
            ResponseMode::NoBody => {}
        }
        if let Some(seed) = &input.seed {
            if !seed.is_object() {
                return Err(StubsServiceError::InvalidTemplate(
                    "seed must be a JSON object".to_owned(),
                ));
            }
        }
        if let Some(persist) = &input.persist {
            if !persist.is_object() {
                return Err(StubsServiceError::InvalidTemplate(
                    "persist must be a JSON object".to_owned(),
                ));
            }
            template::validate(persist)
                .map_err(|e| StubsServiceError::InvalidTemplate(format!("persist: {e}")))?;
        }

        let stub = Stub {
            id: Uuid::new_v4(),
            method_description_id: input.method_description_id,
            scope: input.scope,
            name: input.name,
            times: input.times,
            response: input.response,
            request_predicates,
            state,
            seed: input.seed,
            persist: input.persist,
            labels: input.labels,
            created_at: Utc::now(),
        };
        let id = stub.id;
        info!(
            stub_id = %id,
            route = %method.route,
            scope = %stub.scope,
            times = stub.times,
            "stub registered"
        );
        self.stubs.insert(stub).await?;
        Ok(id)
    }
}

// ── GetStub ──────────────────────────────────────────────────────────────────

pub struct GetStubUseCase<S: StubRepository> {
    pub stubs: S,
}

impl<S: StubRepository> GetStubUseCase<S> {
    pub async fn execute(&self, id: Uuid) -> Result<Stub, StubsServiceError> {
        self.stubs
            .find_by_id(id)
            .await?
            .ok_or_else(|| StubsServiceError::StubNotFound(id.to_string()))
    }
}

// ── ListStubs ────────────────────────────────────────────────────────────────

pub struct ListStubsUseCase<S: StubRepository> {
    pub stubs: S,
}

impl<S: StubRepository> ListStubsUseCase<S> {
    pub async fn execute(&self, filter: StubFilter) -> Result<Vec<Stub>, StubsServiceError> {
        self.stubs.list(&filter).await
    }
}

// ── DeleteStub ───────────────────────────────────────────────────────────────

pub struct DeleteStubUseCase<S: StubRepository> {
    pub stubs: S,
}

impl<S: StubRepository> DeleteStubUseCase<S> {
    pub async fn execute(&self, id: Uuid) -> Result<(), StubsServiceError> {
        if !self.stubs.remove(id).await? {
            return Err(StubsServiceError::StubNotFound(id.to_string()));
        }
        info!(stub_id = %id, "stub removed");
        Ok(())
    }
}

// ── DeleteScope ──────────────────────────────────────────────────────────────

pub struct DeleteScopeUseCase<S: StubRepository> {
    pub stubs: S,
}

impl<S: StubRepository> DeleteScopeUseCase<S> {
    pub async fn execute(&self, scope: &str) -> Result<usize, StubsServiceError> {
        let removed = self.stubs.remove_scope(scope).await?;
        info!(scope, removed, "scope cleared");
        Ok(removed)
    }
}
