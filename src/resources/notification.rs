use crate::core::crud::{Crud, DataLayer};
use crate::domain::model::{decode_list, Notification, Paginated};
use crate::utils::error::Result;
use crate::utils::validation::validate_resource_id;
use reqwest::Method;

pub const NOTIFICATIONS: &str = "notifications";

#[derive(Debug, Clone)]
pub struct NotificationApi {
    crud: Crud<Notification>,
}

impl NotificationApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, NOTIFICATIONS, NOTIFICATIONS),
        }
    }

    /// 目前登入者的通知
    pub async fn mine(&self, page: u32, limit: u32) -> Result<Paginated<Notification>> {
        self.crud.get_page(page, limit).await
    }

    pub async fn for_user(&self, user_id: &str, page: u32, limit: u32) -> Result<Paginated<Notification>> {
        validate_resource_id("user", user_id)?;
        let key = self
            .crud
            .key()
            .with("user")
            .with(user_id)
            .with(page)
            .with(limit);
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let value = self
            .crud
            .layer()
            .cached_get_with_query(&key, &format!("notifications/user/{}", user_id), &query)
            .await?;
        decode_list(value)
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.crud
            .mutate_empty(Method::PATCH, "notifications/mark-all-read")
            .await?;
        tracing::info!("✅ all notifications marked as read");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        validate_resource_id("notification", id)?;
        self.crud
            .mutate_empty(Method::DELETE, &format!("notifications/{}/delete", id))
            .await?;
        Ok(())
    }
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}
