use crate::context::StoreContext;
use crate::health::PersistenceStatus;
use crate::listener::{ChangeEvent, ListenerId};
use std::future::Future;
use std::sync::Arc;

/// The surface every domain store exposes on top of its collections.
pub trait StoreFacade: Send + Sync {
    fn context(&self) -> &Arc<StoreContext>;

    /// Loads (and seeds) every collection. Idempotent.
    fn init(&self) -> impl Future<Output = ()> + Send;

    /// Rewrites every collection and clears degraded persistence if all
    /// writes landed.
    fn flush(&self) -> impl Future<Output = bool> + Send;

    /// Cancels background work. Safe to call more than once.
    fn destroy(&self) {}

    fn add_listener(&self, callback: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> ListenerId
    where
        Self: Sized,
    {
        self.context().add_listener(callback)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.context().remove_listener(id)
    }

    fn persistence_status(&self) -> PersistenceStatus {
        self.context().status()
    }
}
