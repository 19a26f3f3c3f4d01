use crate::core::app_context::AppContext;
use crate::domain::access::has_role;
use crate::domain::model::{Role, User};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub description: &'static str,
}

impl StatCard {
    fn new(title: &'static str, value: impl ToString, description: &'static str) -> Self {
        Self {
            title,
            value: value.to_string(),
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Welcome {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub greeting: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub welcome: Welcome,
    pub role: Option<Role>,
    pub cards: Vec<StatCard>,
    /// 統計資料抓取失敗時的訊息
    pub warnings: Vec<String>,
}

pub fn welcome(user: Option<&User>) -> Welcome {
    let greeting = format!(
        "Welcome back, {}",
        user.map(User::display_name).unwrap_or("guest")
    );

    if has_role(user, &[Role::Farmer]) {
        Welcome {
            title: "Farmer Dashboard",
            subtitle: "Upload images and get expert advice on tomato diseases",
            greeting,
        }
    } else if has_role(user, &[Role::Agronomist]) {
        Welcome {
            title: "Agronomist Dashboard",
            subtitle: "Review detections and provide expert guidance to farmers",
            greeting,
        }
    } else {
        Welcome {
            title: "Admin Dashboard",
            subtitle: "Manage the entire tomato disease detection system",
            greeting,
        }
    }
}

/// 依角色挑選統計卡片；沒有資料的值一律顯示 0
pub fn build(user: Option<&User>, context: &AppContext) -> DashboardView {
    let mut warnings = Vec::new();

    let cards = if has_role(user, &[Role::Farmer]) {
        let stats = context.farmer_statistics.data.clone().unwrap_or_default();
        if let Some(e) = &context.farmer_statistics.error {
            warnings.push(format!("farmer statistics: {}", e));
        }
        vec![
            StatCard::new("My Detections", stats.total_detections, "Disease detections uploaded"),
            StatCard::new("Advice Received", stats.advice_stats.total, "Expert recommendations"),
            StatCard::new(
                "Feedback Submitted",
                stats.feedback_status.total,
                "Feedback on advice",
            ),
            StatCard::new(
                "Notifications",
                context.unread_notifications(),
                "Unread notifications",
            ),
        ]
    } else {
        let stats = context
            .agronomist_statistics
            .data
            .clone()
            .unwrap_or_default();
        if let Some(e) = &context.agronomist_statistics.error {
            warnings.push(format!("agronomist statistics: {}", e));
        }

        if has_role(user, &[Role::Agronomist]) {
            vec![
                StatCard::new(
                    "Detections to Review",
                    stats.recent_detections.count,
                    "Pending farmer detections",
                ),
                StatCard::new(
                    "Total diseases",
                    stats.total_diseases,
                    "Diseases tracked in the system",
                ),
                StatCard::new(
                    "Medicines Managed",
                    stats.total_medicines,
                    "Treatment options available",
                ),
            ]
        } else {
            vec![
                StatCard::new(
                    "Total Farmers",
                    stats.farmer_stats.total_farmers,
                    "Registered farmers",
                ),
                StatCard::new(
                    "Diseases Tracked",
                    stats.total_diseases,
                    "Different disease types",
                ),
                StatCard::new(
                    "Medicines",
                    stats.total_medicines,
                    "Treatment options available",
                ),
                StatCard::new(
                    "Pending Feedback",
                    stats.pending_actions.pending_feedback,
                    "Feedback awaiting a response",
                ),
            ]
        }
    };

    DashboardView {
        welcome: welcome(user),
        role: user.and_then(|u| u.role),
        cards,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query_cache::{QueryState, QueryStatus};
    use crate::domain::model::{
        AgronomistStatistics, Counted, FarmerStatistics, Notification, RecentDetection,
    };

    fn user(role: Role) -> User {
        User {
            id: "u1".to_string(),
            email: "grower@example.com".to_string(),
            username: Some("grower".to_string()),
            role: Some(role),
            ..Default::default()
        }
    }

    fn ok<T>(data: T) -> QueryState<T> {
        QueryState {
            data: Some(data),
            error: None,
            status: QueryStatus::Success,
            is_stale: false,
        }
    }

    #[test]
    fn test_farmer_cards() {
        let mut context = AppContext::default();
        let mut stats = FarmerStatistics {
            total_detections: 9,
            ..Default::default()
        };
        stats.advice_stats.total = 3;
        context.farmer_statistics = ok(stats);
        context.notifications = ok(vec![
            Notification {
                id: "n1".to_string(),
                is_read: false,
                ..Default::default()
            },
            Notification {
                id: "n2".to_string(),
                is_read: true,
                ..Default::default()
            },
        ]);

        let view = build(Some(&user(Role::Farmer)), &context);
        assert_eq!(view.welcome.title, "Farmer Dashboard");
        assert_eq!(view.welcome.greeting, "Welcome back, grower");
        let values: Vec<&str> = view.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["9", "3", "0", "1"]);
        assert!(view.warnings.is_empty());
    }

    #[test]
    fn test_agronomist_cards() {
        let mut context = AppContext::default();
        let stats = AgronomistStatistics {
            total_diseases: 10,
            total_medicines: 7,
            recent_detections: Counted {
                count: 2,
                items: vec![RecentDetection::default(), RecentDetection::default()],
            },
            ..Default::default()
        };
        context.agronomist_statistics = ok(stats);

        let view = build(Some(&user(Role::Agronomist)), &context);
        assert_eq!(view.cards.len(), 3);
        assert_eq!(view.cards[0].title, "Detections to Review");
        assert_eq!(view.cards[0].value, "2");
    }

    #[test]
    fn test_admin_missing_statistics_render_zero() {
        let mut context = AppContext::default();
        context.agronomist_statistics = QueryState {
            data: None,
            error: Some("Could not reach the server".to_string()),
            status: QueryStatus::Error,
            is_stale: false,
        };

        let view = build(Some(&user(Role::Admin)), &context);
        assert_eq!(view.welcome.title, "Admin Dashboard");
        assert!(view.cards.iter().all(|c| c.value == "0"));
        assert_eq!(view.warnings.len(), 1);
    }
}
