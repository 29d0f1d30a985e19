use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rdv_store::{DataRepository, RepositoryCache};
use tracing::warn;

use crate::error::{ServerError, ServerResult};

/// Shared handler state: the seed path and the mtime-keyed repository cache.
#[derive(Clone, Debug)]
pub struct AppState {
    seed_path: Arc<PathBuf>,
    cache: Arc<Mutex<RepositoryCache>>,
}

impl AppState {
    pub fn new(seed_path: impl Into<PathBuf>) -> Self {
        Self {
            seed_path: Arc::new(seed_path.into()),
            cache: Arc::new(Mutex::new(RepositoryCache::new())),
        }
    }

    pub fn seed_path(&self) -> &Path {
        &self.seed_path
    }

    /// Run `f` against the current repository, reloading it first if the
    /// seed file changed on disk.
    ///
    /// Repository calls do synchronous file I/O and rewrite the whole seed,
    /// so `f` runs on the blocking pool. The mutex makes this process the
    /// single writer; other processes writing the same file are not excluded.
    pub async fn with_repository<T, F>(&self, f: F) -> ServerResult<T>
    where
        F: FnOnce(&mut DataRepository) -> ServerResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.with_repository_blocking(f))
            .await
            .map_err(|e| ServerError::Internal(format!("repository task failed: {e}")))?
    }

    fn with_repository_blocking<T>(
        &self,
        f: impl FnOnce(&mut DataRepository) -> ServerResult<T>,
    ) -> ServerResult<T> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("repository cache lock poisoned; reloading from disk");
            let mut cache = poisoned.into_inner();
            cache.invalidate();
            cache
        });
        let repository = cache.get_or_reload(&self.seed_path)?;
        f(repository)
    }
}
