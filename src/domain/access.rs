//! Client-side role gating.
//!
//! Decides which screens an operator sees and which actions are offered.
//! The backend still enforces its own rules; a 401/403 from the server wins.

use crate::domain::model::{Role, User};
use crate::utils::error::{AdminError, Result};
use std::fmt;

pub fn has_role(user: Option<&User>, roles: &[Role]) -> bool {
    match user.and_then(|u| u.role) {
        Some(role) => roles.contains(&role),
        None => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageUsers,
    ManageDiseases,
    ManageMedicines,
    CreateAdvice,
    ManageAdvice,
    SubmitFeedback,
    DeleteFeedback,
    RespondToFeedback,
    DeleteFeedbackResponse,
    UploadDetection,
    DeleteDetection,
    ViewUserNotifications,
}

impl Permission {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Permission::ManageUsers => &[Role::Admin],
            Permission::ManageDiseases => &[Role::Admin],
            Permission::ManageMedicines => &[Role::Agronomist, Role::Admin],
            Permission::CreateAdvice => &[Role::Agronomist, Role::Admin],
            Permission::ManageAdvice => &[Role::Agronomist, Role::Admin],
            Permission::SubmitFeedback => &[Role::Farmer, Role::Agronomist, Role::Admin],
            Permission::DeleteFeedback => &[Role::Admin],
            Permission::RespondToFeedback => &[Role::Agronomist, Role::Admin],
            Permission::DeleteFeedbackResponse => &[Role::Admin],
            Permission::UploadDetection => &[Role::Farmer],
            Permission::DeleteDetection => &[Role::Agronomist, Role::Admin],
            Permission::ViewUserNotifications => &[Role::Admin],
        }
    }

    fn action(&self) -> &'static str {
        match self {
            Permission::ManageUsers => "manage users",
            Permission::ManageDiseases => "manage diseases",
            Permission::ManageMedicines => "manage medicines",
            Permission::CreateAdvice => "create advice",
            Permission::ManageAdvice => "edit or delete advice",
            Permission::SubmitFeedback => "submit feedback",
            Permission::DeleteFeedback => "delete feedback",
            Permission::RespondToFeedback => "respond to feedback",
            Permission::DeleteFeedbackResponse => "delete feedback responses",
            Permission::UploadDetection => "upload detections",
            Permission::DeleteDetection => "delete detections",
            Permission::ViewUserNotifications => "view other users' notifications",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

pub fn can(user: Option<&User>, permission: Permission) -> bool {
    if !has_role(user, permission.allowed_roles()) {
        return false;
    }

    // agronomist 必須有自己的 agronomist profile 才能改 advice
    if permission == Permission::ManageAdvice && has_role(user, &[Role::Agronomist]) {
        return user.map(|u| u.agronomist.is_some()).unwrap_or(false);
    }

    true
}

pub fn require(user: Option<&User>, permission: Permission) -> Result<()> {
    let Some(current) = user else {
        return Err(AdminError::NotAuthenticated);
    };

    if can(user, permission) {
        return Ok(());
    }

    tracing::debug!(
        "🚫 {} denied for {}",
        permission,
        current.display_name()
    );
    Err(AdminError::Forbidden {
        role: current
            .role
            .map(|r| r.to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
        action: permission.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Everyone,
    Roles(&'static [Role]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Detections,
    Diseases,
    Medicines,
    Advices,
    Feedback,
    FeedbackResponses,
    Notifications,
    Users,
}

const MAIN_ROLES: &[Role] = &[Role::Farmer, Role::Agronomist, Role::Admin];
const STAFF_ROLES: &[Role] = &[Role::Agronomist, Role::Admin];

impl Screen {
    pub const ALL: [Screen; 9] = [
        Screen::Dashboard,
        Screen::Detections,
        Screen::Diseases,
        Screen::Medicines,
        Screen::Advices,
        Screen::Feedback,
        Screen::FeedbackResponses,
        Screen::Notifications,
        Screen::Users,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Detections => "Detections",
            Screen::Diseases => "Diseases",
            Screen::Medicines => "Medicines",
            Screen::Advices => "Advices",
            Screen::Feedback => "Feedback",
            Screen::FeedbackResponses => "Feedback Responses",
            Screen::Notifications => "Notifications",
            Screen::Users => "Users",
        }
    }

    /// CLI 子命令名稱
    pub fn command(&self) -> &'static str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Detections => "detections",
            Screen::Diseases => "diseases",
            Screen::Medicines => "medicines",
            Screen::Advices => "advice",
            Screen::Feedback => "feedback",
            Screen::FeedbackResponses => "responses",
            Screen::Notifications => "notifications",
            Screen::Users => "users",
        }
    }

    pub fn audience(&self) -> Audience {
        match self {
            Screen::Dashboard | Screen::Notifications => Audience::Everyone,
            Screen::Detections | Screen::Advices | Screen::Feedback => Audience::Roles(MAIN_ROLES),
            Screen::Medicines | Screen::FeedbackResponses => Audience::Roles(STAFF_ROLES),
            Screen::Diseases | Screen::Users => Audience::Roles(&[Role::Admin]),
        }
    }

    pub fn is_visible_to(&self, user: Option<&User>) -> bool {
        match self.audience() {
            Audience::Everyone => true,
            Audience::Roles(roles) => has_role(user, roles),
        }
    }

    pub fn require_visible(&self, user: Option<&User>) -> Result<()> {
        let Some(current) = user else {
            return Err(AdminError::NotAuthenticated);
        };
        if self.is_visible_to(user) {
            return Ok(());
        }
        Err(AdminError::Forbidden {
            role: current
                .role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            action: format!("open the {} screen", self.title()),
        })
    }
}

pub fn visible_screens(user: Option<&User>) -> Vec<Screen> {
    Screen::ALL
        .into_iter()
        .filter(|screen| screen.is_visible_to(user))
        .collect()
}

/// 農民只看得到自己的偵測紀錄
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionScope {
    Mine,
    All,
}

pub fn detection_scope(user: Option<&User>) -> DetectionScope {
    if has_role(user, &[Role::Farmer]) {
        DetectionScope::Mine
    } else {
        DetectionScope::All
    }
}
