use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::DispatchResult;
use crate::record::Priority;

/// Time-scored sorted-set abstraction over a priority's ready index
/// (governing design document §4.1). `range_due` and `remove` are
/// deliberately separate calls rather than one atomic pop — see the
/// duplicate-delivery hazard documented alongside `crate::poller`.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ReadyIndex: Send + Sync {
    /// Insert `blob` scored by `score` (epoch seconds). Idempotent for an
    /// identical (priority, blob, score) triple.
    async fn add(&self, priority: Priority, blob: &str, score: f64) -> DispatchResult<()>;

    /// Return up to `max_count` members scored `<= now`, ascending by score.
    async fn range_due(
        &self,
        priority: Priority,
        now: f64,
        max_count: usize,
    ) -> DispatchResult<Vec<String>>;

    /// Remove the exact member blob. Returns whether anything was removed;
    /// the return value is diagnostic only, never load-bearing for control
    /// flow (a failed removal is logged but non-fatal).
    async fn remove(&self, priority: Priority, blob: &str) -> DispatchResult<bool>;

    /// Total member count for a priority's set, regardless of score. Used
    /// only for the best-effort `dispatch_ready_index_depth` gauge sampled
    /// on each poll; never load-bearing for dispatch control flow.
    async fn depth(&self, priority: Priority) -> DispatchResult<usize>;
}

/// Redis-backed `ReadyIndex` using one ZSET key per priority.
#[derive(Clone)]
pub struct RedisReadyIndex {
    conn: ConnectionManager,
}

impl RedisReadyIndex {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ReadyIndex for RedisReadyIndex {
    async fn add(&self, priority: Priority, blob: &str, score: f64) -> DispatchResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.zadd(priority.index_key(), blob, score).await?;
        Ok(())
    }

    async fn range_due(
        &self,
        priority: Priority,
        now: f64,
        max_count: usize,
    ) -> DispatchResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn
            .zrangebyscore_limit(priority.index_key(), f64::NEG_INFINITY, now, 0, max_count as isize)
            .await?;
        Ok(members)
    }

    async fn remove(&self, priority: Priority, blob: &str) -> DispatchResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.zrem(priority.index_key(), blob).await?;
        Ok(removed > 0)
    }

    async fn depth(&self, priority: Priority) -> DispatchResult<usize> {
        let mut conn = self.conn.clone();
        let count: i64 = conn.zcard(priority.index_key()).await?;
        Ok(count.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_add_range_remove_round_trip() {
        let mut mock = MockReadyIndex::new();
        mock.expect_add()
            .withf(|p, blob, score| matches!(p, Priority::High) && blob == "rec" && *score == 100.0)
            .returning(|_, _, _| Ok(()));
        mock.expect_range_due()
            .returning(|_, _, _| Ok(vec!["rec".to_string()]));
        mock.expect_remove().returning(|_, _| Ok(true));

        mock.add(Priority::High, "rec", 100.0).await.unwrap();
        let due = mock.range_due(Priority::High, 200.0, 10).await.unwrap();
        assert_eq!(due, vec!["rec".to_string()]);
        assert!(mock.remove(Priority::High, "rec").await.unwrap());
    }
}
