use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

pub mod dispatch;
pub mod method_description;
pub mod state;
pub mod stub;

/// Serializes admin writes that check one store and then write another
/// (stub creation against descriptor removal and reset).
#[derive(Clone, Default)]
pub struct AdminLock(Arc<Mutex<()>>);

impl AdminLock {
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}
