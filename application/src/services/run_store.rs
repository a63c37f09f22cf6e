//! Run Store
//!
//! In-memory cache of run states with optional durable mirroring. The cache
//! lock is held only for map operations, never across repository I/O, so
//! stages of different runs never wait on each other's storage.

use crate::ports::run_repository::RunRepository;
use chrono::{DateTime, Utc};
use council_domain::{Query, RequestState, RunSummary};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RunStore {
    cache: RwLock<HashMap<String, RequestState>>,
    repository: Option<Arc<dyn RunRepository>>,
}

impl RunStore {
    /// Store without durable persistence
    pub fn in_memory() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            repository: None,
        }
    }

    /// Store that mirrors every write to `repository`
    pub fn with_repository(repository: Arc<dyn RunRepository>) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            repository: Some(repository),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.repository.is_some()
    }

    /// Load the most recent `limit` runs into the cache.
    ///
    /// Returns how many runs were loaded. Failures are logged and skipped.
    pub fn bootstrap(&self, limit: usize) -> usize {
        let Some(repository) = &self.repository else {
            return 0;
        };

        let summaries = match repository.list(limit) {
            Ok(summaries) => summaries,
            Err(e) => {
                warn!("Failed to bootstrap runs: {}", e);
                return 0;
            }
        };

        let mut loaded = Vec::with_capacity(summaries.len());
        for summary in summaries {
            match repository.load(&summary.request_id) {
                Ok(Some(state)) => loaded.push(state),
                Ok(None) => {}
                Err(e) => warn!("Failed to load run {}: {}", summary.request_id, e),
            }
        }

        let count = loaded.len();
        let mut cache = self.cache.write();
        for state in loaded {
            cache.insert(state.request_id.clone(), state);
        }
        info!("Bootstrapped {} runs from durable storage", count);
        count
    }

    /// Create, cache and persist a fresh run
    pub fn create(
        &self,
        request_id: impl Into<String>,
        query: Query,
        created_at: DateTime<Utc>,
    ) -> RequestState {
        let state = RequestState::new(request_id, query, created_at);
        self.replace(state.clone());
        state
    }

    /// Look up a run, falling back to durable storage on a cache miss.
    ///
    /// A run found only in durable storage is cached.
    pub fn get(&self, request_id: &str) -> Option<RequestState> {
        if let Some(state) = self.get_cached(request_id) {
            return Some(state);
        }

        let repository = self.repository.as_ref()?;
        match repository.load(request_id) {
            Ok(Some(state)) => {
                debug!("Loaded run {} from durable storage", request_id);
                // a replace that landed since the miss is newer; keep it
                let mut cache = self.cache.write();
                let cached = cache
                    .entry(state.request_id.clone())
                    .or_insert(state);
                Some(cached.clone())
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load run {}: {}", request_id, e);
                None
            }
        }
    }

    /// Look up a run in the cache only
    pub fn get_cached(&self, request_id: &str) -> Option<RequestState> {
        self.cache.read().get(request_id).cloned()
    }

    /// Overwrite a run in the cache and mirror it to durable storage.
    ///
    /// A persistence failure is logged; the cached state stays updated.
    pub fn replace(&self, state: RequestState) {
        if let Some(repository) = &self.repository
            && let Err(e) = repository.save(&state)
        {
            warn!("Failed to persist run {}: {}", state.request_id, e);
        }
        self.cache.write().insert(state.request_id.clone(), state);
    }

    /// Remove a run from the cache and durable storage. Unknown ids are ignored.
    pub fn delete(&self, request_id: &str) {
        self.cache.write().remove(request_id);
        if let Some(repository) = &self.repository
            && let Err(e) = repository.delete(request_id)
        {
            warn!("Failed to delete run {}: {}", request_id, e);
        }
    }

    /// Most recent runs first
    pub fn list(&self, limit: usize) -> Vec<RunSummary> {
        if let Some(repository) = &self.repository {
            match repository.list(limit) {
                Ok(runs) => return runs,
                Err(e) => warn!("Failed to list runs, using cache: {}", e),
            }
        }

        let mut runs: Vec<RunSummary> = self.cache.read().values().map(|s| s.summary()).collect();
        runs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.request_id.cmp(&b.request_id))
        });
        runs.truncate(limit);
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::run_repository::RepositoryError;
    use crate::testing::MemoryRepository;
    use chrono::{Duration, TimeZone};
    use parking_lot::Mutex;

    /// Reads the stored run, then lets a writer replace it before returning
    /// the now-stale copy.
    struct InterleavedRepository {
        inner: MemoryRepository,
        store: Mutex<Option<Arc<RunStore>>>,
        newer: RequestState,
    }

    impl RunRepository for InterleavedRepository {
        fn save(&self, state: &RequestState) -> Result<(), RepositoryError> {
            self.inner.save(state)
        }

        fn load(&self, request_id: &str) -> Result<Option<RequestState>, RepositoryError> {
            let stale = self.inner.load(request_id)?;
            let store = self.store.lock().take();
            if let Some(store) = store {
                store.replace(self.newer.clone());
            }
            Ok(stale)
        }

        fn list(&self, limit: usize) -> Result<Vec<RunSummary>, RepositoryError> {
            self.inner.list(limit)
        }

        fn delete(&self, request_id: &str) -> Result<(), RepositoryError> {
            self.inner.delete(request_id)
        }
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0).unwrap()
    }

    fn query(text: &str) -> Query {
        Query::new(text).unwrap()
    }

    #[test]
    fn test_create_persists_and_caches() {
        let repository = Arc::new(MemoryRepository::default());
        let store = RunStore::with_repository(repository.clone());

        let state = store.create("r1", query("q"), at(0));
        assert_eq!(store.get_cached("r1"), Some(state.clone()));
        assert_eq!(repository.stored("r1"), Some(state));
    }

    #[test]
    fn test_get_falls_back_to_durable_and_caches() {
        let repository = Arc::new(MemoryRepository::default());
        let first = RunStore::with_repository(repository.clone());
        let state = first.create("r1", query("q"), at(0));

        let restarted = RunStore::with_repository(repository);
        assert!(restarted.get_cached("r1").is_none());
        assert_eq!(restarted.get("r1"), Some(state.clone()));
        assert_eq!(restarted.get_cached("r1"), Some(state));
    }

    #[test]
    fn test_durable_fallback_keeps_concurrent_replace() {
        let stale = RequestState::new("r1", query("old"), at(0));
        let newer = RequestState::new("r1", query("new"), at(1));
        let inner = MemoryRepository::default();
        inner.save(&stale).unwrap();

        let repository = Arc::new(InterleavedRepository {
            inner,
            store: Mutex::new(None),
            newer: newer.clone(),
        });
        let store = Arc::new(RunStore::with_repository(repository.clone()));
        *repository.store.lock() = Some(store.clone());

        assert_eq!(store.get("r1"), Some(newer.clone()));
        assert_eq!(store.get_cached("r1"), Some(newer));
    }

    #[test]
    fn test_bootstrap_loads_most_recent() {
        let repository = Arc::new(MemoryRepository::default());
        let first = RunStore::with_repository(repository.clone());
        for minute in 0..5 {
            first.create(format!("r{}", minute), query("q"), at(minute));
        }

        let restarted = RunStore::with_repository(repository);
        assert_eq!(restarted.bootstrap(2), 2);
        assert!(restarted.get_cached("r4").is_some());
        assert!(restarted.get_cached("r3").is_some());
        assert!(restarted.get_cached("r2").is_none());
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let repository = Arc::new(MemoryRepository::failing());
        let store = RunStore::with_repository(repository);

        let state = store.create("r1", query("q"), at(0));
        assert_eq!(store.get("r1"), Some(state));
    }

    #[test]
    fn test_delete_removes_everywhere() {
        let repository = Arc::new(MemoryRepository::default());
        let store = RunStore::with_repository(repository.clone());
        store.create("r1", query("q"), at(0));

        store.delete("r1");
        assert!(store.get("r1").is_none());
        assert!(repository.stored("r1").is_none());

        // idempotent
        store.delete("r1");
    }

    #[test]
    fn test_in_memory_list_orders_newest_first() {
        let store = RunStore::in_memory();
        let base = at(0);
        store.create("old", query("first"), base);
        store.create("new", query("second"), base + Duration::minutes(5));
        store.create("mid", query("third"), base + Duration::minutes(2));

        let ids: Vec<String> = store.list(10).into_iter().map(|r| r.request_id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(store.list(1).len(), 1);
        assert!(!store.is_durable());
    }
}
