//! A single write-through collection of records.

use crate::context::StoreContext;
use crate::error::{StoreError, StoreResult};
use crate::listener::{ChangeEvent, ChangeKind};
use std::sync::Arc;
use syncscript_model::{CollectionSchema, Patch, Record, apply_patch};
use syncscript_storage::envelope;
use syncscript_types::{RecordId, StorageKey, Timestamp};
use tokio::sync::{Mutex, MutexGuard, OnceCell};
use tracing::{debug, info, warn};

/// An ordered, lazily-loaded list of records of one type.
///
/// All operations on one collection are serialized by its mutex, and every
/// mutation is persisted while the lock is held, so the stored blob always
/// reflects the order in which mutations returned.
pub struct Collection<T: Record> {
    schema: CollectionSchema,
    key: StorageKey,
    ctx: Arc<StoreContext>,
    seed: Option<fn() -> Vec<T>>,
    items: OnceCell<Mutex<Vec<T>>>,
}

impl<T: Record> Collection<T> {
    /// Registers a collection in `ctx`. Fails if the name is not a valid
    /// key segment or is already taken in this context.
    pub fn new(ctx: Arc<StoreContext>, schema: CollectionSchema) -> StoreResult<Self> {
        let key = ctx.claim(&schema.name)?;
        Ok(Self {
            schema,
            key,
            ctx,
            seed: None,
            items: OnceCell::new(),
        })
    }

    /// Default records written when the collection loads empty.
    #[must_use]
    pub fn with_seed(mut self, seed: fn() -> Vec<T>) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }

    pub fn is_initialized(&self) -> bool {
        self.items.initialized()
    }

    /// Loads (and seeds) the collection if that has not happened yet.
    pub async fn init(&self) {
        drop(self.lock().await);
    }

    // ── Reads ────────────────────────────────────────────────────

    /// A copy of every record in stored order.
    pub async fn list(&self) -> Vec<T> {
        self.lock().await.clone()
    }

    pub async fn get(&self, id: &RecordId) -> Option<T> {
        self.lock().await.iter().find(|r| r.id() == id).cloned()
    }

    pub async fn find(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.lock()
            .await
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    pub async fn count(&self) -> usize {
        self.lock().await.len()
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Assigns an id and timestamps, inserts per the insertion policy,
    /// applies the retention cap and persists.
    pub async fn create(&self, draft: T::Draft) -> StoreResult<T> {
        self.create_checked(draft, |_| Ok(())).await
    }

    /// Like [`create`](Self::create), but `check` sees the current records
    /// under the same lock as the insert and can refuse it.
    pub async fn create_checked(
        &self,
        draft: T::Draft,
        check: impl FnOnce(&[T]) -> StoreResult<()>,
    ) -> StoreResult<T> {
        let record = T::from_draft(RecordId::generate(), Timestamp::now(), draft);
        record.validate()?;

        {
            let mut items = self.lock().await;
            check(items.as_slice())?;
            debug_assert!(items.iter().all(|r| r.id() != record.id()));
            self.schema.insert(&mut *items, record.clone());
            let evicted = self.schema.enforce_retention(&mut *items);
            if evicted > 0 {
                debug!(collection = %self.schema.name, evicted, "retention cap applied");
            }
            self.ctx.persist(&self.key, &self.schema.name, items.as_slice()).await;
        }

        debug!(collection = %self.schema.name, id = %record.id(), kind = T::KIND, "created");
        self.ctx.notify(&ChangeEvent::new(
            &self.schema.name,
            ChangeKind::Created,
            Some(record.id().clone()),
        ));
        Ok(record)
    }

    /// Shallow-merges `patch` into the record with `id`.
    ///
    /// Returns `Ok(None)` when no such record exists.
    pub async fn update(&self, id: &RecordId, patch: &Patch) -> StoreResult<Option<T>> {
        self.modify(id, |current| apply_patch(current, patch, Timestamp::now()).map_err(StoreError::from))
            .await
    }

    /// Applies a typed in-place change to the record with `id`.
    ///
    /// The changed copy goes through the same validation, transition check
    /// and `touch` as a patch. Returns `Ok(None)` when no such record exists.
    pub async fn update_with(
        &self,
        id: &RecordId,
        change: impl FnOnce(&mut T),
    ) -> StoreResult<Option<T>> {
        self.modify(id, |current| {
            let mut next = current.clone();
            change(&mut next);
            next.validate()?;
            current.check_transition(&next)?;
            next.touch(Timestamp::now());
            Ok(next)
        })
        .await
    }

    /// Applies `change` to every record; records for which it returns
    /// `true` are validated, touched and persisted in a single write.
    ///
    /// Records whose change fails validation are left as they were.
    /// Returns the updated records.
    pub async fn update_each(&self, mut change: impl FnMut(&mut T) -> bool) -> Vec<T> {
        let updated = {
            let mut items = self.lock().await;
            let now = Timestamp::now();
            let mut updated = Vec::new();
            for slot in items.iter_mut() {
                let mut next = slot.clone();
                if !change(&mut next) {
                    continue;
                }
                if let Err(e) = next.validate() {
                    warn!(collection = %self.schema.name, id = %slot.id(), error = %e, "skipping invalid bulk update");
                    continue;
                }
                if let Err(e) = slot.check_transition(&next) {
                    warn!(collection = %self.schema.name, id = %slot.id(), error = %e, "skipping bulk update");
                    continue;
                }
                next.touch(now);
                *slot = next.clone();
                updated.push(next);
            }
            if !updated.is_empty() {
                self.ctx.persist(&self.key, &self.schema.name, items.as_slice()).await;
            }
            updated
        };

        for record in &updated {
            self.ctx.notify(&ChangeEvent::new(
                &self.schema.name,
                ChangeKind::Updated,
                Some(record.id().clone()),
            ));
        }
        updated
    }

    /// Removes the record with `id`. Returns whether one was removed.
    pub async fn remove(&self, id: &RecordId) -> StoreResult<bool> {
        if self.schema.append_only {
            return Err(StoreError::AppendOnly(self.schema.name.clone()));
        }

        {
            let mut items = self.lock().await;
            let Some(pos) = items.iter().position(|r| r.id() == id) else {
                debug!(collection = %self.schema.name, id = %id, "remove: not found");
                return Ok(false);
            };
            items.remove(pos);
            self.ctx.persist(&self.key, &self.schema.name, items.as_slice()).await;
        }

        debug!(collection = %self.schema.name, id = %id, "removed");
        self.ctx.notify(&ChangeEvent::new(
            &self.schema.name,
            ChangeKind::Removed,
            Some(id.clone()),
        ));
        Ok(true)
    }

    /// Writes the current contents even if persistence is degraded.
    /// Returns whether the write landed.
    pub async fn flush(&self) -> bool {
        let items = self.lock().await;
        self.ctx.write(&self.key, &self.schema.name, items.as_slice()).await
    }

    // ── Internals ────────────────────────────────────────────────

    async fn modify(
        &self,
        id: &RecordId,
        change: impl FnOnce(&T) -> StoreResult<T>,
    ) -> StoreResult<Option<T>> {
        let updated = {
            let mut items = self.lock().await;
            let Some(slot) = items.iter_mut().find(|r| r.id() == id) else {
                debug!(collection = %self.schema.name, id = %id, "update: not found");
                return Ok(None);
            };
            let next = change(slot)?;
            *slot = next.clone();
            self.ctx.persist(&self.key, &self.schema.name, items.as_slice()).await;
            next
        };

        self.ctx.notify(&ChangeEvent::new(
            &self.schema.name,
            ChangeKind::Updated,
            Some(id.clone()),
        ));
        Ok(Some(updated))
    }

    async fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items
            .get_or_init(|| async { Mutex::new(self.load_or_seed().await) })
            .await
            .lock()
            .await
    }

    async fn load_or_seed(&self) -> Vec<T> {
        let mut items = self.load();
        if !items.is_empty() || !self.ctx.config().seed_defaults {
            return items;
        }
        let Some(seed) = self.seed else {
            return items;
        };

        items = seed();
        self.schema.enforce_retention(&mut items);
        info!(collection = %self.schema.name, count = items.len(), "seeding defaults");
        self.ctx.persist(&self.key, &self.schema.name, items.as_slice()).await;
        self.ctx
            .notify(&ChangeEvent::new(&self.schema.name, ChangeKind::Seeded, None));
        items
    }

    fn load(&self) -> Vec<T> {
        let blob = match self.ctx.adapter().load(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "load failed, starting empty");
                return Vec::new();
            }
        };

        match envelope::decode::<T>(&blob) {
            Ok(mut items) => {
                for item in &mut items {
                    item.on_after_load();
                }
                debug!(key = %self.key, count = items.len(), "loaded");
                items
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored collection unreadable, starting empty");
                Vec::new()
            }
        }
    }
}

impl<T: Record> std::fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("key", &self.key)
            .field("kind", &T::KIND)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
