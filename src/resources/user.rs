use crate::core::crud::DataLayer;
use crate::core::query_cache::QueryKey;
use crate::domain::model::{decode_item, decode_list, Paginated, Role, UpdateUserRoleRequest, User};
use crate::utils::error::Result;
use crate::utils::validation::validate_resource_id;

pub const USERS: &str = "users";

/// 使用者端點都掛在 `auth/` 底下，路徑不符合標準 CRUD，直接使用 DataLayer
#[derive(Debug, Clone)]
pub struct UserApi {
    layer: DataLayer,
}

impl UserApi {
    pub fn new(layer: DataLayer) -> Self {
        Self { layer }
    }

    fn key(&self) -> QueryKey {
        QueryKey::new(USERS)
    }

    pub async fn list(&self, page: u32, limit: u32) -> Result<Paginated<User>> {
        let key = self.key().with("page").with(page).with(limit);
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let value = self
            .layer
            .cached_get_with_query(&key, "auth/getAllUsers", &query)
            .await?;
        decode_list(value)
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        validate_resource_id("user", id)?;
        let value = self
            .layer
            .cached_get(&self.key().with(id), &format!("auth/user/{}", id))
            .await?;
        decode_item(value)
    }

    pub async fn change_role(&self, id: &str, role: Role) -> Result<User> {
        validate_resource_id("user", id)?;
        let value = self
            .layer
            .client
            .patch(
                &format!("auth/changeUserRole/{}", id),
                &UpdateUserRoleRequest { role },
            )
            .await?;
        self.layer.cache.invalidate(&self.key());
        tracing::info!("✅ user {} is now {}", id, role);
        decode_item(value)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        validate_resource_id("user", id)?;
        self.layer
            .client
            .delete(&format!("auth/deleteUserById/{}", id))
            .await?;
        self.layer.cache.invalidate(&self.key());
        tracing::info!("🗑️ deleted user {}", id);
        Ok(())
    }
}
