use crate::core::api_client::ApiClient;
use crate::core::query_cache::{QueryCache, QueryKey, QueryState};
use crate::domain::model::{decode_item, decode_list, Paginated};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_resource_id;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// HTTP 客戶端與查詢快取的組合，所有資源共用一份
#[derive(Clone, Debug)]
pub struct DataLayer {
    pub client: ApiClient,
    pub cache: QueryCache,
}

impl DataLayer {
    pub fn new(client: ApiClient, cache: QueryCache) -> Self {
        Self { client, cache }
    }

    /// 經過快取的 GET；`path` 與 `key` 分開，讓不同路徑共用同一個資源 key
    pub async fn cached_get(&self, key: &QueryKey, path: &str) -> Result<serde_json::Value> {
        self.cache
            .fetch_value(key, || self.client.get(path))
            .await
    }

    pub async fn cached_get_with_query(
        &self,
        key: &QueryKey,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        self.cache
            .fetch_value(key, || self.client.get_with_query(path, query))
            .await
    }

    pub async fn query<T: DeserializeOwned>(&self, key: &QueryKey, path: &str) -> QueryState<T> {
        self.cache.query(key, || self.client.get(path)).await
    }

    /// 重新抓取：先失效再查詢
    pub async fn refetch<T: DeserializeOwned>(&self, key: &QueryKey, path: &str) -> QueryState<T> {
        self.cache.invalidate(key);
        self.query(key, path).await
    }
}

/// 泛用 CRUD：list / page / get 走快取，create / update / remove 成功後失效對應的 key
#[derive(Debug, Clone)]
pub struct Crud<T> {
    layer: DataLayer,
    resource_key: String,
    resource_path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Crud<T> {
    pub fn new(layer: DataLayer, resource_key: &str, resource_path: &str) -> Self {
        Self {
            layer,
            resource_key: resource_key.to_string(),
            resource_path: resource_path.trim_matches('/').to_string(),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(&self.resource_key)
    }

    pub fn item_key(&self, id: &str) -> QueryKey {
        self.key().with(id)
    }

    pub fn path(&self) -> &str {
        &self.resource_path
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.resource_path, id)
    }

    pub fn layer(&self) -> &DataLayer {
        &self.layer
    }

    pub async fn get_all(&self) -> Result<Vec<T>> {
        let value = self.layer.cached_get(&self.key(), &self.resource_path).await?;
        Ok(decode_list(value)?.data)
    }

    pub async fn get_page(&self, page: u32, limit: u32) -> Result<Paginated<T>> {
        let key = self.key().with("page").with(page).with(limit);
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let value = self
            .layer
            .cached_get_with_query(&key, &self.resource_path, &query)
            .await?;
        decode_list(value)
    }

    /// 空 id 等同停用的查詢，不發送請求
    pub async fn get_by_id(&self, id: &str) -> Result<T> {
        validate_resource_id(&self.resource_key, id)?;
        let value = self
            .layer
            .cached_get(&self.item_key(id), &self.item_path(id))
            .await
            .map_err(|e| match e {
                AdminError::ApiError { status: 404, .. } => AdminError::NotFound {
                    resource: self.resource_key.clone(),
                    id: id.to_string(),
                },
                other => other,
            })?;
        decode_item(value)
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T> {
        let value = self.layer.client.post(&self.resource_path, body).await?;
        self.layer.cache.invalidate(&self.key());
        tracing::info!("✅ created {}", self.resource_key);
        decode_item(value)
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<T> {
        validate_resource_id(&self.resource_key, id)?;
        let value = self.layer.client.put(&self.item_path(id), body).await?;
        self.invalidate_item(id);
        tracing::info!("✅ updated {} {}", self.resource_key, id);
        decode_item(value)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        validate_resource_id(&self.resource_key, id)?;
        self.layer.client.delete(&self.item_path(id)).await?;
        self.invalidate_item(id);
        tracing::info!("🗑️ deleted {} {}", self.resource_key, id);
        Ok(())
    }

    /// 非標準路徑的動作端點（例如 `advice/on-detection`），成功後失效整個資源
    pub async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let value = self.layer.client.send_json(method, path, body).await?;
        self.layer.cache.invalidate(&self.key());
        Ok(value)
    }

    /// 沒有 body 的動作端點（PATCH mark-all-read、DELETE .../delete）
    pub async fn mutate_empty(&self, method: Method, path: &str) -> Result<serde_json::Value> {
        let value = if method == Method::DELETE {
            self.layer.client.delete(path).await?
        } else {
            self.layer.client.patch_empty(path).await?
        };
        self.layer.cache.invalidate(&self.key());
        Ok(value)
    }

    fn invalidate_item(&self, id: &str) {
        self.layer.cache.invalidate(&self.key());
        self.layer.cache.invalidate(&self.item_key(id));
    }
}
