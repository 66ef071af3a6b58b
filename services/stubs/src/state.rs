use crate::infra::memory::{InMemoryMethodRegistry, InMemoryStateStore, InMemoryStubStore};
use crate::usecase::AdminLock;

/// Process-wide stores shared by the admin API and the gRPC endpoint.
///
/// Cloning is cheap; every clone sees the same data.
#[derive(Clone, Default)]
pub struct AppState {
    pub methods: InMemoryMethodRegistry,
    pub stubs: InMemoryStubStore,
    pub states: InMemoryStateStore,
    pub admin: AdminLock,
}

impl AppState {
    pub fn method_repo(&self) -> InMemoryMethodRegistry {
        self.methods.clone()
    }

    pub fn stub_repo(&self) -> InMemoryStubStore {
        self.stubs.clone()
    }

    pub fn state_repo(&self) -> InMemoryStateStore {
        self.states.clone()
    }

    pub fn admin_lock(&self) -> AdminLock {
        self.admin.clone()
    }
}
