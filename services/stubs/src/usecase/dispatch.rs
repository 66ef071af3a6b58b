//! Per-call dispatch:
//! `ReceivedCall → MethodResolved → StubSelected → ResponseRendered → Replied`.
//! Any failure ends the call with the matching `StubsServiceError`.

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::repository::{MethodRepository, StateRepository, StubRepository};
use crate::domain::template::{self, TemplateContext};
use crate::domain::types::{ConnectionType, MethodDescription, MethodRoute, StateRecord, Stub};
use crate::error::StubsServiceError;
use crate::infra::codec;

/// A stub chosen for a call, plus the state record its `state` predicates bound.
#[derive(Debug, Clone)]
pub struct Selected {
    pub stub: Stub,
    pub state: Option<StateRecord>,
}

/// Picks the first active stub (registration order) whose predicates accept the request.
pub struct RequestMatcher<'a, S: StubRepository, T: StateRepository> {
    pub stubs: &'a S,
    pub states: &'a T,
}

impl<S: StubRepository, T: StateRepository> RequestMatcher<'_, S, T> {
    pub async fn find(
        &self,
        method: &MethodDescription,
        request: &Value,
    ) -> Result<Option<Selected>, StubsServiceError> {
        for stub in self.stubs.list_active(&method.id).await? {
            if !stub.request_predicates.matches(request) {
                continue;
            }
            let state = match &stub.state {
                None => None,
                Some(predicates) => match self.states.find_first(predicates).await? {
                    Some(record) => Some(record),
                    None => continue,
                },
            };
            return Ok(Some(Selected { stub, state }));
        }
        Ok(None)
    }
}

pub struct DispatchInput {
    pub route: MethodRoute,
    pub payload: Vec<u8>,
}

pub struct DispatchUseCase<M, S, T>
where
    M: MethodRepository,
    S: StubRepository,
    T: StateRepository,
{
    pub methods: M,
    pub stubs: S,
    pub states: T,
}

impl<M, S, T> DispatchUseCase<M, S, T>
where
    M: MethodRepository,
    S: StubRepository,
    T: StateRepository,
{
    /// Serve one unary call; returns the encoded response message.
    pub async fn execute(&self, input: DispatchInput) -> Result<Vec<u8>, StubsServiceError> {
        let route = input.route;

        // ReceivedCall → MethodResolved
        let method = self
            .methods
            .resolve(&route)
            .await?
            .ok_or_else(|| StubsServiceError::UnknownMethod(route.clone()))?;
        if method.connection_type != ConnectionType::Unary {
            return Err(StubsServiceError::UnsupportedConnection {
                route,
                connection: method.connection_type.to_string(),
            });
        }
        let request = codec::decode_message(&method.request_message, &input.payload).map_err(
            |e| StubsServiceError::InvalidRequest {
                class: method.request_message.full_name().to_owned(),
                reason: e.to_string(),
            },
        )?;

        // MethodResolved → StubSelected. Matching runs under read locks only, so
        // another call may drain the chosen stub first; then match again.
        let matcher = RequestMatcher {
            stubs: &self.stubs,
            states: &self.states,
        };
        let (selected, remaining) = loop {
            let Some(selected) = matcher.find(&method, &request).await? else {
                debug!(route = %route, "no active stub matched");
                return Err(StubsServiceError::NoStubFound(route));
            };
            if let Some(remaining) = self.stubs.deplete(selected.stub.id).await? {
                break (selected, remaining);
            }
            debug!(stub_id = %selected.stub.id, "stub drained concurrently, matching again");
        };
        let Selected { stub, state } = selected;

        // StubSelected → ResponseRendered
        let ctx = TemplateContext {
            req: &request,
            seed: stub.seed.as_ref(),
            state: state.as_ref().map(|record| &record.data),
        };
        let data = stub.response.render(&ctx)?;
        let patch = match &stub.persist {
            Some(persist) => match template::render(persist, &ctx)? {
                Value::Object(patch) => Some(patch),
                _ => None,
            },
            None => None,
        };
        let payload = codec::encode_message(&method.response_message, &data).map_err(|e| {
            StubsServiceError::InvalidResponse {
                class: method.response_message.full_name().to_owned(),
                reason: e.to_string(),
            }
        })?;
        // State changes only for calls that are answered.
        if let Some(patch) = patch {
            self.states
                .upsert(state.as_ref().map(|record| record.id), patch)
                .await?;
        }

        // ResponseRendered → Replied
        info!(
            route = %route,
            stub_id = %stub.id,
            remaining,
            "stub served"
        );
        Ok(payload)
    }
}
