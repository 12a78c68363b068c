use std::time::Duration;

use async_trait::async_trait;

/// Keyed store whose entries expire after a caller-chosen time to live.
///
/// No single-flight guarantee: concurrent writers for the same key race and
/// the last `put` wins.
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;

    async fn put(&self, key: &str, value: V, ttl: Duration);

    async fn invalidate(&self, key: &str);
}
