use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::RepositoryResult;
use crate::repository::DataRepository;

/// Holds one [`DataRepository`] and rebuilds it when the seed file changes.
///
/// The cache is keyed by path and modification time. It is an ordinary value
/// owned by whoever serves requests; there is no process-wide instance.
#[derive(Debug, Default)]
pub struct RepositoryCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    modified: Option<SystemTime>,
    repository: DataRepository,
}

impl RepositoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The repository for `path`, reloaded if the path or mtime changed.
    ///
    /// An unreadable mtime counts as `None`; two `None`s compare equal, as
    /// they would for a file system without timestamps.
    pub fn get_or_reload(&mut self, path: &Path) -> RepositoryResult<&mut DataRepository> {
        let modified = modified_time(path);
        let entry = match self.entry.take() {
            Some(entry) if entry.path == path && entry.modified == modified => entry,
            _ => {
                debug!(path = %path.display(), "loading repository");
                CacheEntry {
                    path: path.to_path_buf(),
                    modified,
                    repository: DataRepository::open(path)?,
                }
            }
        };
        Ok(&mut self.entry.insert(entry).repository)
    }

    /// Drop the cached repository.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entry.is_some()
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fixtures;
    use crate::input::ProductInput;

    #[test]
    fn reuses_instance_while_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_seed(dir.path(), &fixtures::valid_value());
        let mut cache = RepositoryCache::new();
        assert!(!cache.is_loaded());

        let first = cache.get_or_reload(&path).unwrap() as *const DataRepository;
        let second = cache.get_or_reload(&path).unwrap() as *const DataRepository;
        assert_eq!(first, second);
        assert!(cache.is_loaded());
    }

    #[test]
    fn reloads_after_external_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_seed(dir.path(), &fixtures::valid_value());
        let mut cache = RepositoryCache::new();
        assert_eq!(cache.get_or_reload(&path).unwrap().list_stores().len(), 4);

        let mut value = fixtures::valid_value();
        value["stores"][0]["name"] = serde_json::json!("Changed outside");
        fixtures::write_seed(dir.path(), &value);
        let file = fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();

        let repo = cache.get_or_reload(&path).unwrap();
        assert_eq!(
            repo.get_store(&fixtures::store_id(1)).unwrap().name,
            "Changed outside"
        );
    }

    #[test]
    fn mutations_through_the_cache_are_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_seed(dir.path(), &fixtures::valid_value());
        let mut cache = RepositoryCache::new();
        let id = cache
            .get_or_reload(&path)
            .unwrap()
            .create_product(ProductInput {
                name: "Cached".into(),
                size: "S".into(),
                price: 10,
                image: "https://images.example.com/cached.jpg".into(),
            })
            .unwrap();
        assert!(cache.get_or_reload(&path).unwrap().get_product(&id).is_some());
    }

    #[test]
    fn switching_paths_loads_the_other_seed() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let path_a = fixtures::write_seed(a.path(), &fixtures::valid_value());
        let mut value = fixtures::valid_value();
        value["products"].as_array_mut().unwrap().truncate(3);
        let path_b = fixtures::write_seed(b.path(), &value);

        let mut cache = RepositoryCache::new();
        assert_eq!(cache.get_or_reload(&path_a).unwrap().list_products().len(), 10);
        assert_eq!(cache.get_or_reload(&path_b).unwrap().list_products().len(), 3);
    }

    #[test]
    fn failed_load_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, "[]").unwrap();
        let mut cache = RepositoryCache::new();
        assert!(cache.get_or_reload(&path).is_err());
        cache.invalidate();
        assert!(!cache.is_loaded());
    }
}
