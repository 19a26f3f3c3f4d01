use crate::core::crud::{Crud, DataLayer};
use crate::domain::model::{Disease, DiseaseRequest, Paginated};
use crate::utils::error::{AdminError, Result};

pub const DISEASES: &str = "diseases";

#[derive(Debug, Clone)]
pub struct DiseaseApi {
    crud: Crud<Disease>,
}

impl DiseaseApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, DISEASES, DISEASES),
        }
    }

    pub async fn list(&self) -> Result<Vec<Disease>> {
        self.crud.get_all().await
    }

    pub async fn page(&self, page: u32, limit: u32) -> Result<Paginated<Disease>> {
        self.crud.get_page(page, limit).await
    }

    pub async fn get(&self, id: &str) -> Result<Disease> {
        self.crud.get_by_id(id).await
    }

    pub async fn create(&self, request: &DiseaseRequest) -> Result<Disease> {
        match request.name.as_deref() {
            Some(name) if !name.trim().is_empty() => self.crud.create(request).await,
            _ => Err(AdminError::validation("Disease name is required")),
        }
    }

    pub async fn update(&self, id: &str, request: &DiseaseRequest) -> Result<Disease> {
        if *request == DiseaseRequest::default() {
            return Err(AdminError::validation("Nothing to update"));
        }
        self.crud.update(id, request).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.crud.remove(id).await
    }
}
