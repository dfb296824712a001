// Application state module
// Immutable per-process state shared by every request

use std::sync::Arc;

use super::allowlist::Allowlist;
use super::types::Config;
use crate::fetch::HttpFetcher;
use crate::storage::BlobStore;

/// Application state
///
/// Built once at startup and never mutated while serving requests.
pub struct AppState {
    pub config: Config,
    pub allowlist: Allowlist,
    pub store: Arc<dyn BlobStore>,
    pub fetcher: Arc<dyn HttpFetcher>,
}

impl AppState {
    /// Create `AppState` from loaded config and its collaborators.
    /// The allowlist is parsed here, exactly once.
    pub fn new(config: Config, store: Arc<dyn BlobStore>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        let allowlist = Allowlist::parse(&config.cors.allowed_origins);
        Self {
            config,
            allowlist,
            store,
            fetcher,
        }
    }

    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }

    pub fn fetcher(&self) -> &dyn HttpFetcher {
        self.fetcher.as_ref()
    }
}
