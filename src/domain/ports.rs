use crate::domain::model::User;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// 登入後保存在本機的 token 與使用者資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub user: User,
}

/// Session 的持久化位置。每次送出請求都會重新讀取 token，
/// 所以登出或 401 清除後，下一個請求就不會再帶舊 token。
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;

    fn access_token(&self) -> Result<Option<String>> {
        Ok(self.load()?.map(|s| s.access_token))
    }
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn session_path(&self) -> &str;
    fn stale_time_seconds(&self) -> u64;
    fn page_limit(&self) -> u32;
}
