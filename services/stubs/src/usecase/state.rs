use tracing::info;

use crate::domain::repository::{MethodRepository, StateRepository, StubRepository};
use crate::domain::types::StateRecord;
use crate::error::StubsServiceError;
use crate::usecase::AdminLock;

// ── ListStates ───────────────────────────────────────────────────────────────

pub struct ListStatesUseCase<T: StateRepository> {
    pub states: T,
}

impl<T: StateRepository> ListStatesUseCase<T> {
    pub async fn execute(&self) -> Result<Vec<StateRecord>, StubsServiceError> {
        self.states.list().await
    }
}

// ── ClearStates ──────────────────────────────────────────────────────────────

pub struct ClearStatesUseCase<T: StateRepository> {
    pub states: T,
}

impl<T: StateRepository> ClearStatesUseCase<T> {
    pub async fn execute(&self) -> Result<(), StubsServiceError> {
        self.states.clear().await?;
        info!("state records cleared");
        Ok(())
    }
}

// ── Reset ────────────────────────────────────────────────────────────────────

/// Harness teardown: drops every stub, state record and method description.
pub struct ResetUseCase<M, S, T>
where
    M: MethodRepository,
    S: StubRepository,
    T: StateRepository,
{
    pub methods: M,
    pub stubs: S,
    pub states: T,
    pub admin: AdminLock,
}

impl<M, S, T> ResetUseCase<M, S, T>
where
    M: MethodRepository,
    S: StubRepository,
    T: StateRepository,
{
    pub async fn execute(&self) -> Result<(), StubsServiceError> {
        let _admin = self.admin.acquire().await;
        // Stubs first so no call can match a stub whose method is already gone.
        self.stubs.clear().await?;
        self.states.clear().await?;
        self.methods.clear().await?;
        info!("stub server reset");
        Ok(())
    }
}
