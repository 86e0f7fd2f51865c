//! Process-wide cache of rating visibility decisions.
//!
//! Keyed by (entity, principal, role snapshot) so a decision made for one caller is never
//! served to another. Entries expire after `ttl`; the map is bounded by `max_entries`.
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::services::rating::ratable::EntityKind;
use crate::services::security::Principal;

#[derive(Debug, Clone, Copy)]
pub struct RatingCacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for RatingCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_entries: 10_000,
        }
    }
}

/// Outcome of the role check for one (entity, caller) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Revealed,
    Masked,
}

impl Visibility {
    pub fn apply(self, raw: Decimal) -> Decimal {
        match self {
            Visibility::Revealed => raw,
            Visibility::Masked => Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RatingCacheKey {
    kind: EntityKind,
    entity: String,
    principal: Option<String>,
    // sorted (comes from a BTreeSet)
    roles: Vec<String>,
}

impl RatingCacheKey {
    pub fn new(kind: EntityKind, entity: String, principal: Option<&Principal>) -> Self {
        Self {
            kind,
            entity,
            principal: principal.map(|p| p.name().to_string()),
            roles: principal
                .map(|p| p.roles().iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    visibility: Visibility,
    // None: the ttl does not fit in an Instant, the entry never expires
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }

    // Earliest expiry first; never-expiring entries last.
    fn eviction_order(&self) -> (bool, Option<Instant>) {
        (self.expires_at.is_none(), self.expires_at)
    }
}

#[derive(Debug)]
pub struct RatingCache {
    entries: DashMap<RatingCacheKey, CacheEntry>,
    config: RatingCacheConfig,
}

impl RatingCache {
    pub fn new(config: RatingCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
        }
    }

    pub fn get(&self, key: &RatingCacheKey) -> Option<Visibility> {
        let now = Instant::now();

        // The shard guard must be released before `remove_if` touches the same shard.
        let hit = {
            let entry = self.entries.get(key)?;
            entry.is_live(now).then_some(entry.visibility)
        };

        if hit.is_none() {
            self.entries.remove_if(key, |_, e| !e.is_live(now));
            tracing::trace!(?key, "rating cache entry expired");
        }

        hit
    }

    /// Store (or replace) the decision for `key`.
    pub fn insert(&self, key: RatingCacheKey, visibility: Visibility) {
        let now = Instant::now();

        let entry = CacheEntry {
            visibility,
            expires_at: now.checked_add(self.config.ttl),
        };
        self.entries.insert(key.clone(), entry);

        if self.entries.len() > self.config.max_entries {
            self.evict(now, &key);
        }
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Shrink the map to `low_water_mark()`, sparing `fresh`.
    ///
    /// Expired entries go first, then the earliest-expiring ones. Frees `max_entries / 8`
    /// slots at once, so a full cache is not rescanned on every insert.
    fn evict(&self, now: Instant, fresh: &RatingCacheKey) {
        self.entries.retain(|k, e| k == fresh || e.is_live(now));

        let target = self.low_water_mark();
        let excess = self.entries.len().saturating_sub(target);
        if excess == 0 {
            return;
        }

        let mut candidates: Vec<(RatingCacheKey, (bool, Option<Instant>))> = self
            .entries
            .iter()
            .filter(|e| e.key() != fresh)
            .map(|e| (e.key().clone(), e.value().eviction_order()))
            .collect();

        if excess < candidates.len() {
            candidates.select_nth_unstable_by_key(excess, |(_, order)| *order);
            candidates.truncate(excess);
        }

        for (key, _) in &candidates {
            self.entries.remove(key);
        }

        tracing::debug!(
            max_entries = self.config.max_entries,
            evicted = candidates.len(),
            "rating cache full, evicted earliest-expiring entries"
        );
    }

    fn low_water_mark(&self) -> usize {
        let max = self.config.max_entries;
        max - max / 8
    }
}
