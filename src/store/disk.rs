use crate::core::cache::Cache;
use anyhow::Result;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::debug;

/// Persistent cache stored in a fjall partition. Keys and values are JSON encoded.
pub struct DiskCache<K, V> {
    // Held so the keyspace outlives the partition handle.
    _keyspace: Keyspace,
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + DeserializeOwned + Debug,
    V: Serialize + DeserializeOwned,
{
    pub fn new(keyspace: Keyspace, name: &str) -> Result<Self> {
        let partition = keyspace.open_partition(name, PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
            _marker: PhantomData,
        })
    }

    fn read(&self, key: &K) -> Result<Option<V>> {
        match self.partition.get(serde_json::to_vec(key)?)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, key: &K, value: &V) -> Result<()> {
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(value)?)?;
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<()> {
        self.partition.remove(serde_json::to_vec(key)?)?;
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let keys = self
            .partition
            .keys()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for key in keys {
            self.partition.remove(key)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + DeserializeOwned + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        match self.read(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(value)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
            Err(e) => {
                debug!("DiskCache get error for key {:?}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V) {
        match self.write(&key, &value) {
            Ok(()) => debug!("Cache PUT for key: {:?}", key),
            Err(e) => debug!("DiskCache put error for key {:?}: {}", key, e),
        }
    }

    async fn remove(&self, key: &K) {
        if let Err(e) = self.delete(key) {
            debug!("DiskCache remove error for key {:?}: {}", key, e);
        }
    }

    async fn clear(&self) {
        if let Err(e) = self.delete_all() {
            debug!("DiskCache clear error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::HistoricalKey;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn open(path: &std::path::Path) -> DiskCache<HistoricalKey, Decimal> {
        let keyspace = fjall::Config::new(path).open().unwrap();
        DiskCache::new(keyspace, "historicalExchangeCache").unwrap()
    }

    fn key(currency: &str, day: u32) -> HistoricalKey {
        HistoricalKey::new(currency, NaiveDate::from_ymd_opt(2020, 3, day).unwrap())
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = open(dir.path());

        assert!(cache.get(&key("EUR", 1)).await.is_none());

        cache.put(key("EUR", 1), dec!(0.9071)).await;
        assert_eq!(cache.get(&key("EUR", 1)).await, Some(dec!(0.9071)));

        // Same currency, different date
        assert!(cache.get(&key("EUR", 2)).await.is_none());
        // Same date, different currency
        assert!(cache.get(&key("GBP", 1)).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_keeps_decimal_precision() {
        let dir = tempdir().unwrap();
        let cache = open(dir.path());

        cache.put(key("JPY", 4), dec!(107.96850123)).await;
        assert_eq!(cache.get(&key("JPY", 4)).await, Some(dec!(107.96850123)));
    }

    #[tokio::test]
    async fn test_disk_cache_remove() {
        let dir = tempdir().unwrap();
        let cache = open(dir.path());

        cache.put(key("EUR", 1), dec!(0.9)).await;
        cache.remove(&key("EUR", 1)).await;
        assert!(cache.get(&key("EUR", 1)).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_clear() {
        let dir = tempdir().unwrap();
        let cache = open(dir.path());

        cache.put(key("EUR", 1), dec!(0.9)).await;
        cache.put(key("GBP", 1), dec!(0.8)).await;

        cache.clear().await;

        assert!(cache.get(&key("EUR", 1)).await.is_none());
        assert!(cache.get(&key("GBP", 1)).await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_corrupt_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = open(dir.path());

        let raw_key = serde_json::to_vec(&key("EUR", 1)).unwrap();
        cache.partition.insert(raw_key, &b"not json"[..]).unwrap();

        assert!(cache.get(&key("EUR", 1)).await.is_none());
    }
}
