//! In-flight admissions for strict rate limiting.
//!
//! In strict mode the gate check and the reservation happen under the user's admission
//! lock, and a reservation counts against the user until its `InFlightPermit` is
//! dropped. This only coordinates requests inside one process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type Counts = Arc<Mutex<HashMap<Uuid, u32>>>;
type Locks = Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>;

#[derive(Default)]
pub struct InFlight {
    locks: Locks,
    counts: Counts,
}

impl InFlight {
    /// Serializes check-and-reserve for one user. Other users are not blocked.
    pub async fn admission_lock(&self, user_id: Uuid) -> AdmissionGuard {
        let user_lock = lock(&self.locks).entry(user_id).or_default().clone();
        let guard = user_lock.lock_owned().await;
        AdmissionGuard {
            user_id,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    pub fn count(&self, user_id: Uuid) -> u32 {
        lock(&self.counts).get(&user_id).copied().unwrap_or(0)
    }

    pub fn reserve(&self, user_id: Uuid) -> InFlightPermit {
        *lock(&self.counts).entry(user_id).or_insert(0) += 1;
        InFlightPermit {
            user_id,
            counts: Arc::clone(&self.counts),
        }
    }
}

/// Held while one admission for a user is decided. The user's lock entry is removed
/// once nobody holds or waits on it.
pub struct AdmissionGuard {
    user_id: Uuid,
    locks: Locks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = lock(&self.locks);
        let idle = locks
            .get(&self.user_id)
            .is_some_and(|l| Arc::strong_count(l) == 1);
        if idle {
            locks.remove(&self.user_id);
        }
    }
}

/// Holds one in-flight slot for a user. Releases it on drop.
#[derive(Debug)]
pub struct InFlightPermit {
    user_id: Uuid,
    counts: Counts,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        let mut counts = lock(&self.counts);
        if let Some(n) = counts.get_mut(&self.user_id) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                counts.remove(&self.user_id);
            }
        }
    }
}

// A poisoned map still holds valid entries.
fn lock<T>(map: &Mutex<T>) -> MutexGuard<'_, T> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
