pub mod disk;
pub mod memory;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::currency::{HISTORICAL_EXCHANGE_CACHE, HistoricalKey};
use anyhow::{Context, Result};
use disk::DiskCache;
use memory::MemoryCache;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

pub type HistoricalCache = Arc<dyn Cache<HistoricalKey, Decimal>>;

/// Opens the persistent historical rate cache under `<dir>/cache`.
pub fn open_disk_cache(dir: &Path) -> Result<DiskCache<HistoricalKey, Decimal>> {
    let cache_dir = dir.join("cache");
    let keyspace = fjall::Config::new(&cache_dir)
        .open()
        .with_context(|| format!("Failed to open cache at {}", cache_dir.display()))?;
    DiskCache::new(keyspace, HISTORICAL_EXCHANGE_CACHE)
}

/// Returns the cache for historical rates.
///
/// With `persist`, entries are kept on disk under the configured data path.
/// Falls back to an in-memory cache when the disk cache can't be opened.
pub fn open_historical_cache(config: &AppConfig, persist: bool) -> HistoricalCache {
    if persist {
        let disk = config
            .default_data_path()
            .and_then(|path| open_disk_cache(&path));
        match disk {
            Ok(cache) => {
                debug!("Using disk cache for historical rates");
                return Arc::new(cache);
            }
            Err(e) => warn!(error = %e, "Falling back to in-memory historical cache"),
        }
    }
    debug!("Using in-memory cache for historical rates");
    Arc::new(MemoryCache::<HistoricalKey, Decimal>::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn key() -> HistoricalKey {
        HistoricalKey::new("EUR", NaiveDate::from_ymd_opt(2021, 6, 1).unwrap())
    }

    #[tokio::test]
    async fn test_open_persistent_cache_in_data_path() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_path: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };

        let cache = open_historical_cache(&config, true);
        cache.put(key(), dec!(0.82)).await;
        assert_eq!(cache.get(&key()).await, Some(dec!(0.82)));
        assert!(dir.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_open_memory_cache_without_persist() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_path: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        };

        let cache = open_historical_cache(&config, false);
        cache.put(key(), dec!(0.82)).await;
        assert_eq!(cache.get(&key()).await, Some(dec!(0.82)));
        assert!(!dir.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_fallback_to_memory_when_disk_unavailable() {
        let dir = tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("data");
        std::fs::write(&blocker, "").unwrap();
        let config = AppConfig {
            data_path: Some(blocker.to_string_lossy().to_string()),
            ..Default::default()
        };

        let cache = open_historical_cache(&config, true);
        cache.put(key(), dec!(1.1)).await;
        assert_eq!(cache.get(&key()).await, Some(dec!(1.1)));
    }
}
