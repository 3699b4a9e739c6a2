//! Cache abstractions shared by rate providers

use async_trait::async_trait;

/// Keyed storage for looked up values.
///
/// Implementations must be safe to share across tasks. Storage failures are
/// reported as a miss on `get` and ignored on writes; a cache never fails the
/// lookup it sits in front of.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn put(&self, key: K, value: V);
    async fn remove(&self, key: &K);
    async fn clear(&self);
}
