//! Typed endpoints per backend resource, all sharing one `DataLayer`.

pub mod advice;
pub mod detection;
pub mod disease;
pub mod feedback;
pub mod medicine;
pub mod notification;
pub mod user;

pub use advice::AdviceApi;
pub use detection::DetectionApi;
pub use disease::DiseaseApi;
pub use feedback::{FeedbackApi, FeedbackResponseApi};
pub use medicine::MedicineApi;
pub use notification::NotificationApi;
pub use user::UserApi;

use crate::core::crud::DataLayer;

/// 所有資源 API 的集合
#[derive(Debug, Clone)]
pub struct Resources {
    pub diseases: DiseaseApi,
    pub medicines: MedicineApi,
    pub advice: AdviceApi,
    pub feedback: FeedbackApi,
    pub feedback_responses: FeedbackResponseApi,
    pub detections: DetectionApi,
    pub users: UserApi,
    pub notifications: NotificationApi,
}

impl Resources {
    pub fn new(layer: &DataLayer) -> Self {
        Self {
            diseases: DiseaseApi::new(layer.clone()),
            medicines: MedicineApi::new(layer.clone()),
            advice: AdviceApi::new(layer.clone()),
            feedback: FeedbackApi::new(layer.clone()),
            feedback_responses: FeedbackResponseApi::new(layer.clone()),
            detections: DetectionApi::new(layer.clone()),
            users: UserApi::new(layer.clone()),
            notifications: NotificationApi::new(layer.clone()),
        }
    }
}
