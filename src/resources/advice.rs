use crate::core::crud::{Crud, DataLayer};
use crate::domain::model::{decode_item, Advice, AdviceRequest, Paginated};
use crate::utils::error::{AdminError, Result};
use reqwest::Method;

pub const ADVICE: &str = "advice";

#[derive(Debug, Clone)]
pub struct AdviceApi {
    crud: Crud<Advice>,
}

impl AdviceApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, ADVICE, ADVICE),
        }
    }

    pub async fn list(&self) -> Result<Vec<Advice>> {
        self.crud.get_all().await
    }

    pub async fn page(&self, page: u32, limit: u32) -> Result<Paginated<Advice>> {
        self.crud.get_page(page, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Advice> {
        self.crud.get_by_id(id).await
    }

    /// 針對某次偵測給建議
    pub async fn create_on_detection(&self, request: &AdviceRequest) -> Result<Advice> {
        require_prescription(request)?;
        if request.detection_id.is_none() {
            return Err(AdminError::validation("detectionId is required for advice on a detection"));
        }
        let value = self
            .crud
            .mutate(Method::POST, "advice/on-detection", request)
            .await?;
        decode_item(value)
    }

    /// 針對某個藥物給建議
    pub async fn create_on_medicine(&self, request: &AdviceRequest) -> Result<Advice> {
        require_prescription(request)?;
        if request.medicine_id.is_none() {
            return Err(AdminError::validation("medicineId is required for advice on a medicine"));
        }
        let value = self
            .crud
            .mutate(Method::POST, "advice/on-medicine", request)
            .await?;
        decode_item(value)
    }

    pub async fn update(&self, id: &str, request: &AdviceRequest) -> Result<Advice> {
        if *request == AdviceRequest::default() {
            return Err(AdminError::validation("Nothing to update"));
        }
        self.crud.update(id, request).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.crud.remove(id).await
    }
}

fn require_prescription(request: &AdviceRequest) -> Result<()> {
    match request.prescription.as_deref() {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(AdminError::validation("Prescription cannot be empty")),
    }
}
