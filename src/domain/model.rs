use crate::utils::error::{AdminError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Farmer,
    Agronomist,
    Admin,
    Developer,
    UiUx,
    Moderator,
    Support,
    Researcher,
    DataAnalyst,
    Tester,
    ContentManager,
}

impl Role {
    pub const ALL: [Role; 11] = [
        Role::Farmer,
        Role::Agronomist,
        Role::Admin,
        Role::Developer,
        Role::UiUx,
        Role::Moderator,
        Role::Support,
        Role::Researcher,
        Role::DataAnalyst,
        Role::Tester,
        Role::ContentManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Farmer => "FARMER",
            Role::Agronomist => "AGRONOMIST",
            Role::Admin => "ADMIN",
            Role::Developer => "DEVELOPER",
            Role::UiUx => "UI_UX",
            Role::Moderator => "MODERATOR",
            Role::Support => "SUPPORT",
            Role::Researcher => "RESEARCHER",
            Role::DataAnalyst => "DATA_ANALYST",
            Role::Tester => "TESTER",
            Role::ContentManager => "CONTENT_MANAGER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| AdminError::validation(format!("Unknown role: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Accuracy,
    Usability,
    Feature,
    Bug,
    Other,
}

impl FromStr for FeedbackCategory {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accuracy" => Ok(FeedbackCategory::Accuracy),
            "usability" => Ok(FeedbackCategory::Usability),
            "feature" => Ok(FeedbackCategory::Feature),
            "bug" => Ok(FeedbackCategory::Bug),
            "other" => Ok(FeedbackCategory::Other),
            _ => Err(AdminError::validation(format!(
                "Unknown feedback category: {} (accuracy, usability, feature, bug, other)",
                s
            ))),
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedbackCategory::Accuracy => "accuracy",
            FeedbackCategory::Usability => "usability",
            FeedbackCategory::Feature => "feature",
            FeedbackCategory::Bug => "bug",
            FeedbackCategory::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Pending,
    Addressed,
    Resolved,
    Rejected,
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedbackStatus::Pending => "pending",
            FeedbackStatus::Addressed => "addressed",
            FeedbackStatus::Resolved => "resolved",
            FeedbackStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

// ---- entities ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub username: Option<String>,
    pub profile_picture: Option<String>,
    pub role: Option<Role>,
    pub farmer: Option<Box<Farmer>>,
    pub agronomist: Option<Box<Agronomist>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// 顯示名稱：有 username 用 username，否則退回 email
    pub fn display_name(&self) -> &str {
        match self.username.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.email,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Farmer {
    pub id: String,
    pub user_id: Option<String>,
    pub region_id: Option<String>,
    pub user: Option<Box<User>>,
    pub region: Option<Region>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agronomist {
    pub id: Option<String>,
    pub user_id: Option<String>,
    pub user: Option<Box<User>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub region_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub scientific_name: Option<String>,
    pub symptoms: Option<String>,
    pub severity: Option<String>,
    pub prevention: Option<String>,
    pub treatment: Option<String>,
    #[serde(default)]
    pub medicines: Vec<Medicine>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub usage_instructions: Vec<String>,
    #[serde(default)]
    pub diseases: Vec<Disease>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub id: String,
    pub farmer_id: Option<String>,
    pub farmer: Option<Farmer>,
    pub image: Option<String>,
    pub disease_id: Option<String>,
    pub disease: Option<Disease>,
    pub confidence: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub detected_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advice {
    pub id: String,
    pub detection_id: Option<String>,
    pub detection: Option<Box<Detection>>,
    pub agronomist_id: Option<String>,
    pub agronomist: Option<Agronomist>,
    #[serde(default)]
    pub prescription: String,
    pub medicine_id: Option<String>,
    pub medicine: Option<Medicine>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub detection_id: Option<String>,
    pub farmer_id: Option<String>,
    pub farmer: Option<Farmer>,
    pub category: Option<FeedbackCategory>,
    pub status: Option<FeedbackStatus>,
    #[serde(default)]
    pub comment: String,
    pub advice_id: Option<String>,
    #[serde(default)]
    pub response: Vec<FeedbackResponse>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    #[serde(default)]
    pub message: String,
    pub author_id: Option<String>,
    pub author: Option<User>,
    pub feedback_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

// ---- request bodies ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupCredentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// 建立時 name 必填；更新時只送出有值的欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prevention: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicines: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_instructions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diseases: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medicine_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub detection_id: String,
    pub category: FeedbackCategory,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponseRequest {
    pub feedback_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualDetectionRequest {
    pub image_url: String,
}

/// multipart 上傳：image 檔案與 imageUrl 至少要有一個
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionUpload {
    pub image_path: Option<PathBuf>,
    pub image_url: Option<String>,
    pub farmer_id: Option<String>,
}

// ---- response wrappers ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// 後端沒給分頁資訊時，把整個陣列視為唯一的一頁
    fn single_page(data: Vec<T>) -> Self {
        let len = data.len();
        Self {
            data,
            total: len as u64,
            page: 1,
            limit: len as u32,
            total_pages: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub data: AuthPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthPayload {
    pub access_token: String,
    pub user: User,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Page(Paginated<T>),
    Bare(Vec<T>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemPayload<T> {
    Wrapped(ApiEnvelope<T>),
    Bare(T),
}

/// 列表端點可能回傳分頁物件、`{success, data: [...]}` 或直接陣列，統一成 `Paginated`
pub fn decode_list<T: DeserializeOwned>(value: serde_json::Value) -> Result<Paginated<T>> {
    match serde_json::from_value::<ListPayload<T>>(value)? {
        ListPayload::Page(page) if page.total == 0 && !page.data.is_empty() => {
            Ok(Paginated::single_page(page.data))
        }
        ListPayload::Page(page) => Ok(page),
        ListPayload::Bare(items) => Ok(Paginated::single_page(items)),
    }
}

/// 單筆端點可能包在 `{success, message, data}` 裡
pub fn decode_item<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    match serde_json::from_value::<ItemPayload<T>>(value)? {
        ItemPayload::Wrapped(envelope) => Ok(envelope.data),
        ItemPayload::Bare(item) => Ok(item),
    }
}

// ---- statistics ----

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counted<T> {
    pub count: u64,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FarmerStatistics {
    pub total_diseases: u64,
    pub total_medicines: u64,
    pub total_detections: u64,
    pub disease_distribution: Counted<DiseaseCount>,
    pub health_status: HealthStatus,
    pub recent_detections: Counted<RecentDetection>,
    pub advice_stats: AdviceStats,
    pub feedback_status: FeedbackTally,
    pub unread_notifications: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseCount {
    pub disease: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub healthy: u64,
    pub diseased: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecentDetection {
    pub id: String,
    pub image: Option<String>,
    pub disease: String,
    pub farmer: Option<String>,
    pub confidence: Option<f64>,
    pub detected_at: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdviceStats {
    pub total: u64,
    pub with_medicine: u64,
    pub percentage_with_medicine: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTally {
    pub pending: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgronomistStatistics {
    pub total_diseases: u64,
    pub total_medicines: u64,
    pub farmer_stats: FarmerStats,
    pub disease_trends: Counted<DiseaseTrend>,
    pub advice_performance: AdvicePerformance,
    pub recent_detections: Counted<RecentDetection>,
    pub pending_actions: PendingActions,
    pub top_medicines: Counted<TopMedicine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FarmerStats {
    pub total_farmers: u64,
    pub active_farmers: ActiveFarmers,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveFarmers {
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiseaseTrend {
    pub name: String,
    pub detection_count: u64,
    pub last_detection: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvicePerformance {
    pub total: u64,
    pub with_feedback: u64,
    pub feedback_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PendingActions {
    pub unread_notifications: u64,
    pub pending_feedback: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopMedicine {
    pub name: String,
    pub usage_count: u64,
    pub diseases: Counted<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("data-analyst".parse::<Role>().unwrap(), Role::DataAnalyst);
        assert_eq!("UI_UX".parse::<Role>().unwrap(), Role::UiUx);
        assert!("gardener".parse::<Role>().is_err());
        assert_eq!(serde_json::to_value(Role::ContentManager).unwrap(), "CONTENT_MANAGER");
    }

    #[test]
    fn test_decode_list_shapes() {
        let page: Paginated<Disease> = decode_list(json!({
            "data": [{"id": "d1", "name": "Late blight"}],
            "total": 31, "page": 2, "limit": 10, "totalPages": 4
        }))
        .unwrap();
        assert_eq!(page.total, 31);
        assert_eq!(page.total_pages, 4);

        let page: Paginated<Disease> = decode_list(json!({
            "success": true,
            "message": "ok",
            "data": [{"id": "d1", "name": "Late blight"}, {"id": "d2", "name": "Leaf mold"}]
        }))
        .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.page, 1);

        let page: Paginated<Disease> =
            decode_list(json!([{"id": "d1", "name": "Late blight"}])).unwrap();
        assert_eq!(page.data[0].name, "Late blight");
    }

    #[test]
    fn test_decode_item_shapes() {
        let disease: Disease = decode_item(json!({
            "success": true,
            "data": {"id": "d1", "name": "Septoria", "severity": "High"}
        }))
        .unwrap();
        assert_eq!(disease.severity.as_deref(), Some("High"));

        let disease: Disease = decode_item(json!({"id": "d1", "name": "Septoria"})).unwrap();
        assert_eq!(disease.id, "d1");
    }

    #[test]
    fn test_partial_request_skips_missing_fields() {
        let body = serde_json::to_value(DiseaseRequest {
            scientific_name: Some("Alternaria solani".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"scientificName": "Alternaria solani"}));
    }

    #[test]
    fn test_statistics_tolerate_missing_sections() {
        let stats: FarmerStatistics = serde_json::from_value(json!({
            "totalDetections": 12,
            "adviceStats": {"total": 4}
        }))
        .unwrap();
        assert_eq!(stats.total_detections, 12);
        assert_eq!(stats.advice_stats.total, 4);
        assert_eq!(stats.feedback_status.total, 0);
    }
}
