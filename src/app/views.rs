use crate::core::dashboard::StatCard;
use crate::domain::access::Screen;
use crate::domain::model::{
    Advice, Detection, Disease, Feedback, FeedbackResponse, Medicine, Notification, User,
};
use crate::utils::render::{or_dash, truncate, Tabular};
use chrono::{DateTime, Utc};
use serde::Serialize;

const TEXT_WIDTH: usize = 48;

fn date(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn text(value: Option<&str>) -> String {
    truncate(&or_dash(value), TEXT_WIDTH)
}

impl Tabular for User {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "EMAIL", "USERNAME", "ROLE", "CREATED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.email.clone(),
            or_dash(self.username.as_deref()),
            self.role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            date(self.created_at),
        ]
    }
}

impl Tabular for Disease {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "SCIENTIFIC NAME", "SEVERITY", "MEDICINES", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(self.scientific_name.as_deref()),
            or_dash(self.severity.as_deref()),
            self.medicines.len().to_string(),
            text(self.description.as_deref()),
        ]
    }
}

impl Tabular for Medicine {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "DISEASES", "USAGE", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        let diseases: Vec<&str> = self.diseases.iter().map(|d| d.name.as_str()).collect();
        vec![
            self.id.clone(),
            self.name.clone(),
            or_dash(Some(&diseases.join(", "))),
            text(Some(&self.usage_instructions.join("; "))),
            text(self.description.as_deref()),
        ]
    }
}

impl Tabular for Advice {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "DETECTION", "MEDICINE", "PRESCRIPTION", "CREATED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(self.detection_id.as_deref()),
            or_dash(
                self.medicine
                    .as_ref()
                    .map(|m| m.name.as_str())
                    .or(self.medicine_id.as_deref()),
            ),
            text(Some(&self.prescription)),
            date(self.created_at),
        ]
    }
}

impl Tabular for Detection {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "DISEASE", "CONFIDENCE", "FARMER", "IMAGE", "DETECTED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(self.disease.as_ref().map(|d| d.name.as_str())),
            self.confidence
                .map(|c| format!("{:.1}%", c * 100.0))
                .unwrap_or_else(|| "-".to_string()),
            or_dash(self.farmer_id.as_deref()),
            text(self.image.as_deref()),
            date(self.detected_at.or(self.created_at)),
        ]
    }
}

impl Tabular for Feedback {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "CATEGORY", "STATUS", "DETECTION", "RESPONSES", "COMMENT"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(self.category.map(|c| c.to_string()).as_deref()),
            or_dash(self.status.map(|s| s.to_string()).as_deref()),
            or_dash(self.detection_id.as_deref()),
            self.response.len().to_string(),
            text(Some(&self.comment)),
        ]
    }
}

impl Tabular for FeedbackResponse {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "FEEDBACK", "AUTHOR", "MESSAGE", "CREATED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            or_dash(self.feedback_id.as_deref()),
            or_dash(
                self.author
                    .as_ref()
                    .map(User::display_name)
                    .or(self.author_id.as_deref()),
            ),
            text(Some(&self.message)),
            date(self.created_at),
        ]
    }
}

impl Tabular for Notification {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "READ", "TITLE", "MESSAGE", "CREATED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            if self.is_read { "yes" } else { "no" }.to_string(),
            or_dash(Some(&self.title)),
            text(Some(&self.message)),
            date(self.created_at),
        ]
    }
}

impl Tabular for StatCard {
    fn headers() -> Vec<&'static str> {
        vec!["METRIC", "VALUE", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.title.to_string(),
            self.value.clone(),
            self.description.to_string(),
        ]
    }
}

/// 側邊欄的一個項目
#[derive(Debug, Clone, Serialize)]
pub struct NavEntry {
    pub title: &'static str,
    pub command: &'static str,
}

impl From<Screen> for NavEntry {
    fn from(screen: Screen) -> Self {
        Self {
            title: screen.title(),
            command: screen.command(),
        }
    }
}

impl Tabular for NavEntry {
    fn headers() -> Vec<&'static str> {
        vec!["SCREEN", "COMMAND"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.title.to_string(), self.command.to_string()]
    }
}
