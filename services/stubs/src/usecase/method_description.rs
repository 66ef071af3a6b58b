use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::repository::{MethodRepository, StubRepository};
use crate::domain::types::{ConnectionType, MethodDescription, MethodRoute, StubFilter};
use crate::error::StubsServiceError;
use crate::infra::codec;
use crate::usecase::AdminLock;

// ── CreateMethodDescription ──────────────────────────────────────────────────

pub struct CreateMethodDescriptionInput {
    pub id: String,
    pub description: String,
    pub service: String,
    pub method_name: String,
    pub connection_type: ConnectionType,
    pub proxy_url: Option<String>,
    pub request_class: String,
    pub response_class: String,
    pub request_codecs: String,
    pub response_codecs: String,
}

pub struct CreateMethodDescriptionUseCase<M: MethodRepository> {
    pub methods: M,
}

impl<M: MethodRepository> CreateMethodDescriptionUseCase<M> {
    pub async fn execute(
        &self,
        input: CreateMethodDescriptionInput,
    ) -> Result<String, StubsServiceError> {
        if input.id.trim().is_empty() {
            return Err(StubsServiceError::InvalidMethodDescription(
                "id must not be empty".to_owned(),
            ));
        }
        let route = MethodRoute::from_registration(&input.service, &input.method_name)
            .ok_or_else(|| {
                StubsServiceError::InvalidMethodDescription(format!(
                    "cannot derive a gRPC route from service {:?} and methodName {:?}",
                    input.service, input.method_name
                ))
            })?;

        let request_message = codec::load_message(&input.request_codecs, &input.request_class)
            .map_err(|e| StubsServiceError::InvalidCodecs(format!("requestCodecs: {e}")))?;
        let response_message = codec::load_message(&input.response_codecs, &input.response_class)
            .map_err(|e| StubsServiceError::InvalidCodecs(format!("responseCodecs: {e}")))?;

        let method = MethodDescription {
            id: input.id,
            description: input.description,
            service: input.service,
            method_name: input.method_name,
            route,
            connection_type: input.connection_type,
            proxy_url: input.proxy_url,
            request_class: input.request_class,
            response_class: input.response_class,
            request_message,
            response_message,
            created_at: Utc::now(),
        };

        let stored = self.methods.insert(method).await?;
        info!(
            id = %stored.id,
            route = %stored.route,
            connection = %stored.connection_type,
            "method description registered"
        );
        Ok(stored.id.clone())
    }
}

// ── GetMethodDescription ─────────────────────────────────────────────────────

pub struct GetMethodDescriptionUseCase<M: MethodRepository> {
    pub methods: M,
}

impl<M: MethodRepository> GetMethodDescriptionUseCase<M> {
    pub async fn execute(&self, id: &str) -> Result<Arc<MethodDescription>, StubsServiceError> {
        self.methods
            .find_by_id(id)
            .await?
            .ok_or_else(|| StubsServiceError::MethodDescriptionNotFound(id.to_owned()))
    }
}

// ── ListMethodDescriptions ───────────────────────────────────────────────────

pub struct ListMethodDescriptionsUseCase<M: MethodRepository> {
    pub methods: M,
}

impl<M: MethodRepository> ListMethodDescriptionsUseCase<M> {
    pub async fn execute(&self) -> Result<Vec<Arc<MethodDescription>>, StubsServiceError> {
        self.methods.list().await
    }
}

// ── DeleteMethodDescription ──────────────────────────────────────────────────

pub struct DeleteMethodDescriptionUseCase<M: MethodRepository, S: StubRepository> {
    pub methods: M,
    pub stubs: S,
    pub admin: AdminLock,
}

impl<M: MethodRepository, S: StubRepository> DeleteMethodDescriptionUseCase<M, S> {
    /// Refuses while stubs still point at the descriptor.
    pub async fn execute(&self, id: &str) -> Result<(), StubsServiceError> {
        let _admin = self.admin.acquire().await;
        let filter = StubFilter {
            method_description_id: Some(id.to_owned()),
            ..Default::default()
        };
        let referencing = self.stubs.list(&filter).await?.len();
        if referencing > 0 {
            return Err(StubsServiceError::MethodDescriptionInUse {
                id: id.to_owned(),
                stubs: referencing,
            });
        }
        if !self.methods.remove(id).await? {
            return Err(StubsServiceError::MethodDescriptionNotFound(id.to_owned()));
        }
        info!(id, "method description removed");
        Ok(())
    }
}
