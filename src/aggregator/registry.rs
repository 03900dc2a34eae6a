//! Sharded registry of per-user locks
//!
//! User ids hash onto a fixed number of shards. A shard's `RwLock` only
//! protects its map of users and is held just long enough to find or insert
//! an entry. Each user's totals sit behind their own `Mutex`, held only for
//! the in-memory addition and never across an `.await` or a database call.
//! Entries are never removed for the life of the process.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::core::sync::{handle_mutex_poison, handle_rwlock_read, handle_rwlock_write};

use super::analytics::UserAnalytics;
use super::delta::BatchDelta;
use super::error::{AggregateError, AggregateResult};

/// Number of shards used by [`UserLockRegistry::new`]
pub const DEFAULT_SHARDS: usize = 64;

type UserEntry = Arc<Mutex<UserAnalytics>>;
type Shard = RwLock<HashMap<String, UserEntry>>;

pub struct UserLockRegistry {
    shards: Box<[Shard]>,
}

impl UserLockRegistry {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a registry with `shards` shards (at least one)
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, user_id: &str) -> &Shard {
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Find the user's entry, inserting a zero aggregate on first reference
    fn entry(&self, user_id: &str) -> AggregateResult<UserEntry> {
        let shard = self.shard_for(user_id);
        let poisoned = |message| AggregateError::Poisoned {
            user_id: user_id.to_string(),
            message,
        };

        {
            let users = handle_rwlock_read(shard.read(), poisoned)?;
            if let Some(entry) = users.get(user_id) {
                return Ok(Arc::clone(entry));
            }
        }

        // Another worker may have inserted the user between the two locks
        let mut users = handle_rwlock_write(shard.write(), poisoned)?;
        let entry = users
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(UserAnalytics::zero(user_id))));
        Ok(Arc::clone(entry))
    }

    /// Add every user's delta to the running totals
    ///
    /// Each user is locked on its own, one at a time. A failure leaves users
    /// merged before it in place.
    pub fn merge(&self, delta: &BatchDelta) -> AggregateResult<()> {
        for (user_id, user_delta) in delta {
            let entry = self.entry(user_id)?;
            let mut totals = handle_mutex_poison(entry.lock(), |message| {
                AggregateError::Poisoned {
                    user_id: user_id.clone(),
                    message,
                }
            })?;
            totals.apply(user_delta)?;
        }
        Ok(())
    }

    /// A copy of the user's current running totals, if the user has been seen
    pub fn snapshot(&self, user_id: &str) -> AggregateResult<Option<UserAnalytics>> {
        let poisoned = |message| AggregateError::Poisoned {
            user_id: user_id.to_string(),
            message,
        };

        let entry = {
            let users = handle_rwlock_read(self.shard_for(user_id).read(), poisoned)?;
            match users.get(user_id) {
                Some(entry) => Arc::clone(entry),
                None => return Ok(None),
            }
        };
        let totals = handle_mutex_poison(entry.lock(), poisoned)?;
        Ok(Some(totals.clone()))
    }

    /// Number of distinct users seen so far
    pub fn unique_users(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }
}

impl Default for UserLockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
