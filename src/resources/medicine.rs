use crate::core::crud::{Crud, DataLayer};
use crate::domain::model::{Medicine, MedicineRequest, Paginated};
use crate::utils::error::{AdminError, Result};

pub const MEDICINES: &str = "medecines";

/// 後端路徑拼成 `medecines`，查詢 key 也沿用同一個名稱
#[derive(Debug, Clone)]
pub struct MedicineApi {
    crud: Crud<Medicine>,
}

impl MedicineApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, MEDICINES, MEDICINES),
        }
    }

    pub async fn list(&self) -> Result<Vec<Medicine>> {
        self.crud.get_all().await
    }

    pub async fn page(&self, page: u32, limit: u32) -> Result<Paginated<Medicine>> {
        self.crud.get_page(page, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Medicine> {
        self.crud.get_by_id(id).await
    }

    pub async fn create(&self, request: &MedicineRequest) -> Result<Medicine> {
        if request.name.as_deref().map(str::trim).unwrap_or_default().is_empty() {
            return Err(AdminError::validation("Medicine name is required"));
        }
        let mut body = request.clone();
        // usageInstructions 在後端是必填陣列
        body.usage_instructions.get_or_insert_with(Vec::new);
        self.crud.create(&body).await
    }

    pub async fn update(&self, id: &str, request: &MedicineRequest) -> Result<Medicine> {
        if *request == MedicineRequest::default() {
            return Err(AdminError::validation("Nothing to update"));
        }
        self.crud.update(id, request).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.crud.remove(id).await
    }
}
