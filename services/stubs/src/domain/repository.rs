#![allow(async_fn_in_trait)]

use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::predicate::Predicates;
use crate::domain::types::{MethodDescription, MethodRoute, StateRecord, Stub, StubFilter};
use crate::error::StubsServiceError;

/// Registered method descriptors, indexed by id and by route.
pub trait MethodRepository: Send + Sync {
    /// Store a descriptor. Fails with `DuplicateId` or `DuplicateRoute`.
    async fn insert(
        &self,
        method: MethodDescription,
    ) -> Result<Arc<MethodDescription>, StubsServiceError>;

    async fn find_by_id(&self, id: &str)
    -> Result<Option<Arc<MethodDescription>>, StubsServiceError>;

    async fn resolve(
        &self,
        route: &MethodRoute,
    ) -> Result<Option<Arc<MethodDescription>>, StubsServiceError>;

    async fn list(&self) -> Result<Vec<Arc<MethodDescription>>, StubsServiceError>;

    /// Returns `true` if removed, `false` if not found.
    async fn remove(&self, id: &str) -> Result<bool, StubsServiceError>;

    async fn clear(&self) -> Result<(), StubsServiceError>;
}

/// Stub definitions in registration order.
pub trait StubRepository: Send + Sync {
    async fn insert(&self, stub: Stub) -> Result<(), StubsServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Stub>, StubsServiceError>;

    async fn list(&self, filter: &StubFilter) -> Result<Vec<Stub>, StubsServiceError>;

    /// Stubs of one method with budget left, in registration order.
    async fn list_active(&self, method_description_id: &str)
    -> Result<Vec<Stub>, StubsServiceError>;

    /// Consume one call from the stub's budget in a single critical section.
    /// Returns the remaining budget, or `None` if the stub is gone or already exhausted.
    async fn deplete(&self, id: Uuid) -> Result<Option<u32>, StubsServiceError>;

    /// Returns `true` if removed, `false` if not found.
    async fn remove(&self, id: Uuid) -> Result<bool, StubsServiceError>;

    /// Remove every stub of `scope`; returns how many were removed.
    async fn remove_scope(&self, scope: &str) -> Result<usize, StubsServiceError>;

    async fn clear(&self) -> Result<(), StubsServiceError>;
}

/// State objects written by `persist` and read by `state` predicates.
pub trait StateRepository: Send + Sync {
    /// First record (insertion order) whose data satisfies `predicates`.
    async fn find_first(
        &self,
        predicates: &Predicates,
    ) -> Result<Option<StateRecord>, StubsServiceError>;

    /// Merge `patch` into record `id`, or create a new record when `id` is `None`
    /// or no longer present.
    async fn upsert(
        &self,
        id: Option<Uuid>,
        patch: Map<String, Value>,
    ) -> Result<StateRecord, StubsServiceError>;

    async fn list(&self) -> Result<Vec<StateRecord>, StubsServiceError>;

    async fn clear(&self) -> Result<(), StubsServiceError>;
}
