use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::predicate::Predicates;
use crate::domain::repository::{MethodRepository, StateRepository, StubRepository};
use crate::domain::types::{MethodDescription, MethodRoute, StateRecord, Stub, StubFilter};
use crate::error::StubsServiceError;

// ── Method registry ──────────────────────────────────────────────────────────

#[derive(Default)]
struct MethodIndex {
    by_id: BTreeMap<String, Arc<MethodDescription>>,
    by_route: HashMap<MethodRoute, String>,
}

#[derive(Clone, Default)]
pub struct InMemoryMethodRegistry {
    inner: Arc<RwLock<MethodIndex>>,
}

impl MethodRepository for InMemoryMethodRegistry {
    async fn insert(
        &self,
        method: MethodDescription,
    ) -> Result<Arc<MethodDescription>, StubsServiceError> {
        let mut index = self.inner.write().await;
        if index.by_id.contains_key(&method.id) {
            return Err(StubsServiceError::DuplicateId(method.id));
        }
        if let Some(existing) = index.by_route.get(&method.route) {
            return Err(StubsServiceError::DuplicateRoute {
                route: method.route.to_string(),
                existing: existing.clone(),
            });
        }
        let method = Arc::new(method);
        index
            .by_route
            .insert(method.route.clone(), method.id.clone());
        index.by_id.insert(method.id.clone(), Arc::clone(&method));
        Ok(method)
    }

    async fn find_by_id(
        &self,
        id: &str,
    ) -> Result<Option<Arc<MethodDescription>>, StubsServiceError> {
        Ok(self.inner.read().await.by_id.get(id).cloned())
    }

    async fn resolve(
        &self,
        route: &MethodRoute,
    ) -> Result<Option<Arc<MethodDescription>>, StubsServiceError> {
        let index = self.inner.read().await;
        Ok(index
            .by_route
            .get(route)
            .and_then(|id| index.by_id.get(id))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Arc<MethodDescription>>, StubsServiceError> {
        Ok(self.inner.read().await.by_id.values().cloned().collect())
    }

    async fn remove(&self, id: &str) -> Result<bool, StubsServiceError> {
        let mut index = self.inner.write().await;
        let Some(method) = index.by_id.remove(id) else {
            return Ok(false);
        };
        index.by_route.remove(&method.route);
        Ok(true)
    }

    async fn clear(&self) -> Result<(), StubsServiceError> {
        let mut index = self.inner.write().await;
        index.by_id.clear();
        index.by_route.clear();
        Ok(())
    }
}

// ── Stub store ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryStubStore {
    /// Registration order is the match order.
    inner: Arc<RwLock<Vec<Stub>>>,
}

impl StubRepository for InMemoryStubStore {
    async fn insert(&self, stub: Stub) -> Result<(), StubsServiceError> {
        self.inner.write().await.push(stub);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Stub>, StubsServiceError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .find(|stub| stub.id == id)
            .cloned())
    }

    async fn list(&self, filter: &StubFilter) -> Result<Vec<Stub>, StubsServiceError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|stub| filter.accepts(stub))
            .cloned()
            .collect())
    }

    async fn list_active(
        &self,
        method_description_id: &str,
    ) -> Result<Vec<Stub>, StubsServiceError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|stub| stub.method_description_id == method_description_id && stub.is_active())
            .cloned()
            .collect())
    }

    async fn deplete(&self, id: Uuid) -> Result<Option<u32>, StubsServiceError> {
        let mut stubs = self.inner.write().await;
        let Some(stub) = stubs.iter_mut().find(|stub| stub.id == id) else {
            return Ok(None);
        };
        if !stub.is_active() {
            return Ok(None);
        }
        stub.times -= 1;
        Ok(Some(stub.times))
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StubsServiceError> {
        let mut stubs = self.inner.write().await;
        let before = stubs.len();
        stubs.retain(|stub| stub.id != id);
        Ok(stubs.len() != before)
    }

    async fn remove_scope(&self, scope: &str) -> Result<usize, StubsServiceError> {
        let mut stubs = self.inner.write().await;
        let before = stubs.len();
        stubs.retain(|stub| stub.scope != scope);
        Ok(before - stubs.len())
    }

    async fn clear(&self) -> Result<(), StubsServiceError> {
        self.inner.write().await.clear();
        Ok(())
    }
}

// ── State store ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryStateStore {
    inner: Arc<RwLock<Vec<StateRecord>>>,
}

impl StateRepository for InMemoryStateStore {
    async fn find_first(
        &self,
        predicates: &Predicates,
    ) -> Result<Option<StateRecord>, StubsServiceError> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .find(|record| predicates.matches(&record.data))
            .cloned())
    }

    async fn upsert(
        &self,
        id: Option<Uuid>,
        patch: Map<String, Value>,
    ) -> Result<StateRecord, StubsServiceError> {
        let mut records = self.inner.write().await;
        let now = Utc::now();
        if let Some(record) = id.and_then(|id| records.iter_mut().find(|r| r.id == id)) {
            if let Value::Object(data) = &mut record.data {
                data.extend(patch);
            }
            record.updated_at = now;
            return Ok(record.clone());
        }
        let record = StateRecord {
            id: Uuid::new_v4(),
            data: Value::Object(patch),
            created_at: now,
            updated_at: now,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<StateRecord>, StubsServiceError> {
        Ok(self.inner.read().await.clone())
    }

    async fn clear(&self) -> Result<(), StubsServiceError> {
        self.inner.write().await.clear();
        Ok(())
    }
}
