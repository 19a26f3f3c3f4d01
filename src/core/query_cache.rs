use crate::utils::error::{AdminError, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// 查詢 key，由資源名稱開頭，例如 `["diseases"]`、`["diseases", "<id>"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self(vec![resource.into()])
    }

    pub fn with(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Success,
    Error,
}

/// 一個查詢目前的狀態；重新抓取失敗時保留舊資料與錯誤
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub status: QueryStatus,
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            error: None,
            status: QueryStatus::Idle,
            is_stale: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    fetched_at: Instant,
    invalidated: bool,
    last_error: Option<String>,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

#[derive(Debug, Default)]
struct CacheStats {
    hits: u64,
    misses: u64,
}

/// 以資源名稱為 key 的請求快取，mutation 成功後以前綴失效
///
/// 預設 `stale_time` 為 0，也就是每次讀取都重新驗證；
/// 失效後的舊資料仍然保留，重新抓取失敗時可以回傳。
#[derive(Clone)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, CacheEntry>>>,
    stats: Arc<Mutex<CacheStats>>,
    stale_time: Duration,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
            stale_time,
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    fn lock_entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<QueryKey, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| AdminError::validation("query cache lock poisoned"))
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.lock() {
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
    }

    /// (hits, misses)
    pub fn hit_ratio(&self) -> (u64, u64) {
        self.stats
            .lock()
            .map(|s| (s.hits, s.misses))
            .unwrap_or((0, 0))
    }

    /// 新鮮的快取直接回傳，否則呼叫 fetcher 並寫回
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value>>,
    {
        let value = self.fetch_value(key, fetcher).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// 同 `fetch`，但回傳的 JSON 交給呼叫端自行解碼
    pub async fn fetch_value<F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<serde_json::Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value>>,
    {
        if let Some(value) = self.fresh_value(key)? {
            tracing::debug!("💾 cache hit {}", key);
            self.record(true);
            return Ok(value);
        }

        tracing::debug!("🌐 cache miss {}, fetching", key);
        self.record(false);

        match fetcher().await {
            Ok(value) => {
                self.set(key.clone(), value.clone())?;
                Ok(value)
            }
            Err(e) => {
                if let Some(entry) = self.lock_entries()?.get_mut(key) {
                    entry.last_error = Some(e.to_string());
                }
                Err(e)
            }
        }
    }

    /// stale-while-revalidate：抓取失敗時回傳舊資料並附上錯誤
    pub async fn query<T, F, Fut>(&self, key: &QueryKey, fetcher: F) -> QueryState<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value>>,
    {
        match self.fetch::<T, _, _>(key, fetcher).await {
            Ok(data) => QueryState {
                data: Some(data),
                error: None,
                status: QueryStatus::Success,
                is_stale: false,
            },
            Err(e) => {
                let stale = self
                    .peek(key)
                    .and_then(|value| serde_json::from_value::<T>(value).ok());
                if stale.is_some() {
                    tracing::warn!("⚠️ refetch of {} failed, serving stale data: {}", key, e);
                }
                QueryState {
                    is_stale: stale.is_some(),
                    data: stale,
                    error: Some(e.user_friendly_message()),
                    status: QueryStatus::Error,
                }
            }
        }
    }

    fn fresh_value(&self, key: &QueryKey) -> Result<Option<serde_json::Value>> {
        let entries = self.lock_entries()?;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.stale_time))
            .map(|entry| entry.value.clone()))
    }

    /// 不論新舊都回傳快取中的資料
    pub fn peek(&self, key: &QueryKey) -> Option<serde_json::Value> {
        self.lock_entries()
            .ok()?
            .get(key)
            .map(|entry| entry.value.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock_entries()
            .ok()
            .and_then(|entries| entries.get(key).map(|e| !e.is_fresh(self.stale_time)))
            .unwrap_or(true)
    }

    pub fn last_error(&self, key: &QueryKey) -> Option<String> {
        self.lock_entries()
            .ok()?
            .get(key)
            .and_then(|entry| entry.last_error.clone())
    }

    pub fn set(&self, key: QueryKey, value: serde_json::Value) -> Result<()> {
        self.lock_entries()?.insert(
            key,
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
                last_error: None,
            },
        );
        Ok(())
    }

    /// 把所有以 `prefix` 開頭的 key 標為過期，回傳受影響的數量
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let Ok(mut entries) = self.lock_entries() else {
            return 0;
        };

        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        tracing::debug!("♻️ invalidated {} entries under {}", count, prefix);
        count
    }

    pub fn invalidate_all(&self) -> usize {
        let Ok(mut entries) = self.lock_entries() else {
            return 0;
        };
        entries.values_mut().for_each(|entry| entry.invalidated = true);
        entries.len()
    }

    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let Ok(mut entries) = self.lock_entries() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.lock_entries() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lock_entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("stale_time", &self.stale_time())
            .finish()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetcher(
        calls: &Arc<AtomicUsize>,
        value: serde_json::Value,
    ) -> impl FnOnce() -> std::future::Ready<Result<serde_json::Value>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(value))
        }
    }

    #[test]
    fn test_key_prefix() {
        let list = QueryKey::new("diseases");
        let item = QueryKey::new("diseases").with("d1");
        assert!(item.starts_with(&list));
        assert!(!list.starts_with(&item));
        assert!(!QueryKey::new("diseases-archive").starts_with(&list));
        assert_eq!(item.to_string(), "[diseases, d1]");
    }

    #[tokio::test]
    async fn test_fresh_entry_is_served_from_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("diseases");
        let calls = Arc::new(AtomicUsize::new(0));

        let first: Vec<String> = cache
            .fetch(&key, counting_fetcher(&calls, json!(["a"])))
            .await
            .unwrap();
        let second: Vec<String> = cache
            .fetch(&key, counting_fetcher(&calls, json!(["b"])))
            .await
            .unwrap();

        assert_eq!(first, vec!["a"]);
        assert_eq!(second, vec!["a"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.hit_ratio(), (1, 1));
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let cache = QueryCache::default();
        let key = QueryKey::new("medecines");
        let calls = Arc::new(AtomicUsize::new(0));

        let _: serde_json::Value = cache.fetch(&key, counting_fetcher(&calls, json!(1))).await.unwrap();
        let v: serde_json::Value = cache.fetch(&key, counting_fetcher(&calls, json!(2))).await.unwrap();

        assert_eq!(v, json!(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.set(QueryKey::new("diseases"), json!([])).unwrap();
        cache.set(QueryKey::new("diseases").with("d1"), json!({})).unwrap();
        cache.set(QueryKey::new("medecines"), json!([])).unwrap();

        assert_eq!(cache.invalidate(&QueryKey::new("diseases")), 2);
        assert!(cache.is_stale(&QueryKey::new("diseases")));
        assert!(cache.is_stale(&QueryKey::new("diseases").with("d1")));
        assert!(!cache.is_stale(&QueryKey::new("medecines")));

        // stale data is still readable until refetched
        assert_eq!(cache.peek(&QueryKey::new("diseases")), Some(json!([])));

        let calls = Arc::new(AtomicUsize::new(0));
        let _: serde_json::Value = cache
            .fetch(&QueryKey::new("diseases"), counting_fetcher(&calls, json!(["x"])))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_stale(&QueryKey::new("diseases")));
    }

    #[tokio::test]
    async fn test_query_serves_stale_data_on_error() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let key = QueryKey::new("notifications");
        cache.set(key.clone(), json!([1, 2, 3])).unwrap();
        cache.invalidate(&key);

        let state: QueryState<Vec<u32>> = cache
            .query(&key, || async {
                Err(AdminError::ApiError {
                    status: 502,
                    message: "bad gateway".to_string(),
                })
            })
            .await;

        assert!(state.is_error());
        assert!(state.is_stale);
        assert_eq!(state.data, Some(vec![1, 2, 3]));
        assert_eq!(state.error.as_deref(), Some("bad gateway"));
        assert_eq!(cache.last_error(&key).as_deref(), Some("API returned 502: bad gateway"));
    }

    #[tokio::test]
    async fn test_query_error_without_data() {
        let cache = QueryCache::default();
        let state: QueryState<Vec<u32>> = cache
            .query(&QueryKey::new("advice"), || async { Err(AdminError::Unauthorized) })
            .await;
        assert!(state.is_error());
        assert!(state.data.is_none());
        assert!(!state.is_stale);
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = QueryCache::default();
        cache.set(QueryKey::new("users"), json!([])).unwrap();
        cache.set(QueryKey::new("users").with("u1"), json!({})).unwrap();
        cache.set(QueryKey::new("advice"), json!([])).unwrap();

        assert_eq!(cache.remove(&QueryKey::new("users")), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.invalidate_all(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
