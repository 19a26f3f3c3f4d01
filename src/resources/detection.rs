use crate::core::crud::{Crud, DataLayer};
use crate::domain::access::DetectionScope;
use crate::domain::model::{
    decode_item, decode_list, Detection, DetectionUpload, ManualDetectionRequest, Paginated,
};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_required;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;

pub const DETECTIONS: &str = "detect";

#[derive(Debug, Clone)]
pub struct DetectionApi {
    crud: Crud<Detection>,
}

impl DetectionApi {
    pub fn new(layer: DataLayer) -> Self {
        Self {
            crud: Crud::new(layer, DETECTIONS, DETECTIONS),
        }
    }

    pub async fn list(&self, scope: DetectionScope, page: u32, limit: u32) -> Result<Paginated<Detection>> {
        match scope {
            DetectionScope::All => self.crud.get_page(page, limit).await,
            DetectionScope::Mine => {
                let key = self.crud.key().with("my").with(page).with(limit);
                let query = [("page", page.to_string()), ("limit", limit.to_string())];
                let value = self
                    .crud
                    .layer()
                    .cached_get_with_query(&key, "detect/my", &query)
                    .await?;
                decode_list(value)
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<Detection> {
        self.crud.get_by_id(id).await
    }

    /// 上傳圖片（或圖片網址）交給後端偵測
    pub async fn detect(&self, upload: &DetectionUpload) -> Result<Detection> {
        if upload.image_path.is_none() && upload.image_url.is_none() {
            return Err(AdminError::validation("Provide an image file or an image URL"));
        }

        let mut form = Form::new();
        if let Some(path) = &upload.image_path {
            form = form.part("image", image_part(path).await?);
        }
        if let Some(url) = &upload.image_url {
            form = form.text("imageUrl", url.clone());
        }
        if let Some(farmer_id) = &upload.farmer_id {
            form = form.text("farmerId", farmer_id.clone());
        }

        let layer = self.crud.layer();
        let value = layer.client.post_multipart(DETECTIONS, form).await?;
        layer.cache.invalidate(&self.crud.key());
        tracing::info!("✅ detection submitted");
        decode_item(value)
    }

    pub async fn detect_manual(&self, image_url: &str) -> Result<Detection> {
        validate_required("Image URL", image_url)?;
        let request = ManualDetectionRequest {
            image_url: image_url.to_string(),
        };
        let value = self
            .crud
            .mutate(Method::POST, "detect/manual", &request)
            .await?;
        decode_item(value)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.crud.remove(id).await
    }
}

async fn image_part(path: &Path) -> Result<Part> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    let part = Part::bytes(data).file_name(file_name);
    match image_mime(path) {
        Some(mime) => Ok(part.mime_str(mime)?),
        None => Ok(part),
    }
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
