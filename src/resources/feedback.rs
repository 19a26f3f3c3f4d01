use crate::core::crud::{Crud, DataLayer};
use crate::core::query_cache::QueryKey;
use crate::domain::model::{
    decode_item, Feedback, FeedbackRequest, FeedbackResponse, FeedbackResponseRequest, Paginated,
};
use crate::utils::error::Result;
use crate::utils::validation::validate_required;
use reqwest::Method;

pub const FEEDBACK: &str = "feedback";
pub const FEEDBACK_RESPONSES: &str = "feedback-responses";

#[derive(Debug, Clone)]
pub struct FeedbackApi {
    crud: Crud<Feedback>,
}

impl FeedbackApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, FEEDBACK, FEEDBACK),
        }
    }

    pub async fn list(&self) -> Result<Vec<Feedback>> {
        self.crud.get_all().await
    }

    pub async fn page(&self, page: u32, limit: u32) -> Result<Paginated<Feedback>> {
        self.crud.get_page(page, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Feedback> {
        self.crud.get_by_id(id).await
    }

    /// 有 adviceId 時送到 on-advice，否則送到 on-detection
    pub async fn submit(&self, request: &FeedbackRequest) -> Result<Feedback> {
        validate_required("Feedback comment", &request.comment)?;
        validate_required("detectionId", &request.detection_id)?;

        let path = if request.advice_id.is_some() {
            "feedback/on-advice"
        } else {
            "feedback/on-detection"
        };
        let value = self.crud.mutate(Method::POST, path, request).await?;
        decode_item(value)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.crud.remove(id).await
    }
}

#[derive(Debug, Clone)]
pub struct FeedbackResponseApi {
    crud: Crud<FeedbackResponse>,
}

impl FeedbackResponseApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, FEEDBACK_RESPONSES, FEEDBACK_RESPONSES),
        }
    }

    pub async fn list(&self) -> Result<Vec<FeedbackResponse>> {
        self.crud.get_all().await
    }

    pub async fn page(&self, page: u32, limit: u32) -> Result<Paginated<FeedbackResponse>> {
        self.crud.get_page(page, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<FeedbackResponse> {
        self.crud.get_by_id(id).await
    }

    pub async fn create(&self, request: &FeedbackResponseRequest) -> Result<FeedbackResponse> {
        validate_required("Response message", &request.message)?;
        let created = self.crud.create(request).await?;
        // 回覆會改變 feedback 的狀態與 response 列表
        self.crud.layer().cache.invalidate(&QueryKey::new(FEEDBACK));
        Ok(created)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.crud.remove(id).await?;
        self.crud.layer().cache.invalidate(&QueryKey::new(FEEDBACK));
        Ok(())
    }
}
