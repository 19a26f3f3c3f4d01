use crate::core::crud::DataLayer;
use crate::domain::access;
use crate::domain::model::{AuthResponse, LoginCredentials, Role, SignupCredentials, User};
use crate::domain::ports::StoredSession;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_required;

/// 本機登入狀態
///
/// token 與 user 存在 `SessionStore`，
/// 所有請求透過 `ApiClient` 自動帶上 token。
#[derive(Debug, Clone)]
pub struct AuthSession {
    layer: DataLayer,
    current: Option<StoredSession>,
}

impl AuthSession {
    /// 從 session store 還原先前的登入狀態
    pub fn restore(layer: DataLayer) -> Result<Self> {
        let current = layer.client.session().load()?;
        if let Some(session) = &current {
            tracing::debug!("🔑 restored session for {}", session.user.display_name());
        }
        Ok(Self { layer, current })
    }

    pub async fn login(&mut self, credentials: &LoginCredentials) -> Result<&User> {
        validate_required("Email", &credentials.email)?;
        validate_required("Password", &credentials.password)?;
        let value = self.layer.client.post_public("auth/login", credentials).await?;
        self.accept(value)
    }

    pub async fn signup(&mut self, credentials: &SignupCredentials) -> Result<&User> {
        validate_required("Email", &credentials.email)?;
        validate_required("Password", &credentials.password)?;
        let value = self.layer.client.post_public("auth/signup", credentials).await?;
        self.accept(value)
    }

    fn accept(&mut self, value: serde_json::Value) -> Result<&User> {
        let response: AuthResponse = serde_json::from_value(value)?;
        let session = StoredSession {
            access_token: response.data.access_token,
            user: response.data.user,
        };

        self.layer.client.session().save(&session)?;
        // 換了身分，之前的查詢結果不能再用
        self.layer.cache.clear();
        tracing::info!("🔓 logged in as {}", session.user.display_name());

        Ok(&self.current.insert(session).user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.layer.client.session().clear()?;
        self.layer.cache.clear();
        self.current = None;
        tracing::info!("👋 logged out");
        Ok(())
    }

    /// 401 之後 ApiClient 已清掉 store，這裡同步記憶體中的狀態
    pub fn sync(&mut self) -> Result<()> {
        self.current = self.layer.client.session().load()?;
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.access_token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .as_ref()
            .map(|s| !s.access_token.is_empty())
            .unwrap_or(false)
    }

    pub fn has_role(&self, roles: &[Role]) -> bool {
        access::has_role(self.user(), roles)
    }

    pub fn require_user(&self) -> Result<&User> {
        match self.user() {
            Some(user) if self.is_authenticated() => Ok(user),
            _ => Err(AdminError::NotAuthenticated),
        }
    }
}
