use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{Result, StorageError};

/// Allows at most one live [`super::DatabaseManager`] at a time
///
/// Managers claim the registry when they are created and release it when
/// dropped. Clones share the same claim.
#[derive(Debug, Clone, Default)]
pub struct DatabaseRegistry {
    claimed: Arc<AtomicBool>,
}

impl DatabaseRegistry {
    /// Create an unclaimed registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a manager currently holds the registry
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub(super) fn claim(&self) -> Result<RegistryClaim> {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                StorageError::State("a database manager already exists for this registry".into())
            })?;
        Ok(RegistryClaim {
            claimed: Arc::clone(&self.claimed),
        })
    }
}

/// Held by a live manager; releases the registry on drop
#[derive(Debug)]
pub(super) struct RegistryClaim {
    claimed: Arc<AtomicBool>,
}

impl Drop for RegistryClaim {
    fn drop(&mut self) {
        self.claimed.store(false, Ordering::Release);
    }
}
