use crate::domain::ports::SessionStore;
use crate::utils::error::{AdminError, Result};
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// 帶 Bearer token 的 REST 客戶端
///
/// token 每次請求都從 `SessionStore` 取，收到 401 時清掉本機 session。
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Arc<dyn SessionStore>) -> Result<Self> {
        // Url::join 只有在 base 以 '/' 結尾時才會保留最後一段 path
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tomato-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: Url::parse(&normalized)?,
            client,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> Result<Outgoing> {
        let mut outgoing = self.public_request(method, path)?;
        if let Some(token) = self.session.access_token()? {
            outgoing.builder = outgoing.builder.bearer_auth(token);
            outgoing.authenticated = true;
        }
        Ok(outgoing)
    }

    /// 不帶 token 的請求（登入、註冊）
    fn public_request(&self, method: Method, path: &str) -> Result<Outgoing> {
        let url = self.endpoint(path)?;
        tracing::debug!("📡 {} {}", method, url);

        Ok(Outgoing {
            builder: self.client.request(method, url),
            authenticated: false,
        })
    }

    async fn execute(&self, outgoing: Outgoing) -> Result<serde_json::Value> {
        let response = outgoing.builder.send().await?;
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        // 只有帶了 token 的 401 才代表 session 過期
        if status == StatusCode::UNAUTHORIZED && outgoing.authenticated {
            tracing::warn!("🔒 Server rejected the access token, clearing local session");
            self.session.clear()?;
            return Err(AdminError::Unauthorized);
        }

        if !status.is_success() {
            let message = error_message(response).await;
            return Err(AdminError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get(&self, path: &str) -> Result<serde_json::Value> {
        let request = self.request(Method::GET, path)?;
        self.execute(request).await
    }

    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        let request = self.request(Method::GET, path)?.map(|b| b.query(query));
        self.execute(request).await
    }

    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let request = self.request(method, path)?.map(|b| b.json(body));
        self.execute(request).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<serde_json::Value> {
        self.send_json(Method::POST, path, body).await
    }

    /// 登入失敗的 401 回傳後端訊息，不會動到既有的 session
    pub async fn post_public<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let request = self.public_request(Method::POST, path)?.map(|b| b.json(body));
        self.execute(request).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<serde_json::Value> {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<serde_json::Value> {
        self.send_json(Method::PATCH, path, body).await
    }

    /// 無 body 的 PATCH（例如 mark-all-read）
    pub async fn patch_empty(&self, path: &str) -> Result<serde_json::Value> {
        let request = self.request(Method::PATCH, path)?;
        self.execute(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<serde_json::Value> {
        let request = self.request(Method::DELETE, path)?;
        self.execute(request).await
    }

    pub async fn post_multipart(&self, path: &str, form: multipart::Form) -> Result<serde_json::Value> {
        let request = self.request(Method::POST, path)?.map(|b| b.multipart(form));
        self.execute(request).await
    }
}

struct Outgoing {
    builder: RequestBuilder,
    authenticated: bool,
}

impl Outgoing {
    fn map(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            builder: f(self.builder),
            authenticated: self.authenticated,
        }
    }
}

/// 後端錯誤格式是 `{ "message": "..." }`，有些情況 message 是陣列
async fn error_message(response: Response) -> String {
    let status = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();

    let Ok(text) = response.text().await else {
        return fallback;
    };

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(body) => match body.get("message") {
            Some(serde_json::Value::String(message)) => message.clone(),
            Some(serde_json::Value::Array(messages)) => messages
                .iter()
                .filter_map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            _ => fallback,
        },
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => fallback,
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
