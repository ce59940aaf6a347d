use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::compress::CompressionLevel;
use crate::resource::EncodingResource;

/// How concurrent writers share encoding resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolStrategy {
    /// Each writer checks out its own resource; resources are created on
    /// demand and kept for reuse. Writers compress in parallel.
    #[default]
    Checkout,
    /// One resource behind a lock held for a whole write. Minimal memory,
    /// writers are serialized.
    Shared,
}

enum Inner {
    Checkout(Mutex<Vec<EncodingResource>>),
    Shared(Mutex<EncodingResource>),
}

/// Hands out [`EncodingResource`]s and takes them back after a reset.
///
/// No two live [`PooledResource`] guards ever refer to the same resource.
pub struct ResourcePool {
    level: CompressionLevel,
    inner: Inner,
}

impl ResourcePool {
    pub fn new(level: CompressionLevel, strategy: PoolStrategy) -> Self {
        let inner = match strategy {
            PoolStrategy::Checkout => Inner::Checkout(Mutex::new(Vec::new())),
            PoolStrategy::Shared => Inner::Shared(Mutex::new(EncodingResource::new(level))),
        };
        Self { level, inner }
    }

    /// Take a resource for one message.
    ///
    /// Under [`PoolStrategy::Shared`] this blocks while another writer holds
    /// the resource. The guard resets and returns the resource when dropped.
    pub fn acquire(&self) -> PooledResource<'_> {
        let slot = match &self.inner {
            Inner::Checkout(free) => {
                let parked = lock(free).pop();
                Slot::Owned(Some(
                    parked.unwrap_or_else(|| EncodingResource::new(self.level)),
                ))
            }
            Inner::Shared(shared) => Slot::Locked(lock(shared)),
        };
        PooledResource { pool: self, slot }
    }

    /// Resources currently available without allocating or waiting.
    pub fn idle(&self) -> usize {
        match &self.inner {
            Inner::Checkout(free) => lock(free).len(),
            Inner::Shared(shared) => usize::from(shared.try_lock().is_ok()),
        }
    }

    pub fn strategy(&self) -> PoolStrategy {
        match self.inner {
            Inner::Checkout(_) => PoolStrategy::Checkout,
            Inner::Shared(_) => PoolStrategy::Shared,
        }
    }

    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    fn park(&self, resource: EncodingResource) {
        if let Inner::Checkout(free) = &self.inner {
            lock(free).push(resource);
        }
    }
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("level", &self.level)
            .field("strategy", &self.strategy())
            .finish()
    }
}

// Release always resets first, so a poisoned lock guards a usable resource.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Slot<'a> {
    Owned(Option<EncodingResource>),
    Locked(MutexGuard<'a, EncodingResource>),
}

/// Exclusive access to one encoding resource, released on drop.
pub struct PooledResource<'a> {
    pool: &'a ResourcePool,
    slot: Slot<'a>,
}

impl Deref for PooledResource<'_> {
    type Target = EncodingResource;

    fn deref(&self) -> &EncodingResource {
        match &self.slot {
            Slot::Owned(resource) => resource.as_ref().expect("resource is taken only on drop"),
            Slot::Locked(guard) => guard,
        }
    }
}

impl DerefMut for PooledResource<'_> {
    fn deref_mut(&mut self) -> &mut EncodingResource {
        match &mut self.slot {
            Slot::Owned(resource) => resource.as_mut().expect("resource is taken only on drop"),
            Slot::Locked(guard) => guard,
        }
    }
}

impl Drop for PooledResource<'_> {
    fn drop(&mut self) {
        match &mut self.slot {
            Slot::Owned(resource) => {
                if let Some(mut resource) = resource.take() {
                    match resource.reset() {
                        Ok(()) => self.pool.park(resource),
                        Err(err) => warn!(%err, "discarding encoding resource that failed to reset"),
                    }
                }
            }
            Slot::Locked(guard) => {
                if let Err(err) = guard.reset() {
                    warn!(%err, "replacing shared encoding resource that failed to reset");
                    **guard = EncodingResource::new(self.pool.level);
                }
            }
        }
    }
}

impl std::fmt::Debug for PooledResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledResource")
            .field("strategy", &self.pool.strategy())
            .field("resource", &**self)
            .finish()
    }
}
