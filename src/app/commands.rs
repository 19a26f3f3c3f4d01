use crate::app::views::NavEntry;
use crate::config::cli::FileSessionStore;
use crate::config::{
    AdviceCommand, Command, DetectionCommand, DiseaseCommand, DiseaseFields, FeedbackCommand,
    MedicineCommand, MedicineFields, NotificationCommand, PageArgs, ResponseCommand, Settings,
    UserCommand,
};
use crate::core::app_context::AppContext;
use crate::core::auth::AuthSession;
use crate::core::dashboard::{self, DashboardView};
use crate::core::pagination::{Pagination, DEFAULT_PAGE};
use crate::core::{ApiClient, DataLayer, QueryCache, SessionStore};
use crate::domain::access::{self, detection_scope, visible_screens, Permission, Screen};
use crate::domain::model::{
    AdviceRequest, DetectionUpload, DiseaseRequest, FeedbackRequest, FeedbackResponseRequest,
    LoginCredentials, MedicineRequest, Paginated, SignupCredentials, User,
};
use crate::resources::Resources;
use crate::utils::error::{AdminError, Result};
use crate::utils::render::{render_record, render_rows, OutputFormat, Tabular};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// 執行命令需要的所有狀態
#[derive(Debug)]
pub struct App {
    pub settings: Settings,
    pub layer: DataLayer,
    pub resources: Resources,
    pub auth: AuthSession,
}

impl App {
    pub fn new(settings: Settings, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = ApiClient::new(
            &settings.api_base_url,
            Duration::from_secs(settings.timeout_seconds),
            session,
        )?;
        let cache = QueryCache::new(Duration::from_secs(settings.stale_time_seconds));
        let layer = DataLayer::new(client, cache);
        let resources = Resources::new(&layer);
        let auth = AuthSession::restore(layer.clone())?;

        Ok(Self {
            settings,
            layer,
            resources,
            auth,
        })
    }

    /// 使用檔案保存 session
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let store = Arc::new(FileSessionStore::new(&settings.session_path));
        tracing::debug!("🔑 session file: {}", store.path().display());
        Self::new(settings, store)
    }

    pub async fn execute(&mut self, command: &Command) -> Result<String> {
        let result = command.run(self).await;
        if matches!(result, Err(AdminError::Unauthorized)) || self.session_revoked()? {
            // ApiClient 已清掉 store
            self.auth.sync()?;
        }
        result
    }

    /// 記憶體中仍是登入狀態，但 store 裡的 token 已被清掉
    fn session_revoked(&self) -> Result<bool> {
        Ok(self.auth.is_authenticated() && self.layer.client.session().access_token()?.is_none())
    }

    fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    fn format(&self) -> OutputFormat {
        self.settings.format
    }

    fn pagination(&self, args: &PageArgs) -> Pagination {
        Pagination::new(
            args.page.unwrap_or(DEFAULT_PAGE),
            args.limit.unwrap_or(self.settings.page_limit),
        )
    }

    fn require(&self, permission: Permission) -> Result<()> {
        access::require(self.user(), permission)
    }

    fn open(&self, screen: Screen) -> Result<()> {
        screen.require_visible(self.user())
    }
}

#[async_trait]
pub trait CommandHandler {
    async fn run(&self, app: &mut App) -> Result<String>;
}

fn render_page<T: Tabular + Serialize>(page: &Paginated<T>, format: OutputFormat) -> Result<String> {
    let body = render_rows(&page.data, format)?;
    if format != OutputFormat::Table {
        return Ok(body);
    }
    Ok(format!(
        "{}\n\nPage {} of {} ({} total)",
        body,
        page.page.max(1),
        page.total_pages.max(1),
        page.total
    ))
}

fn render_dashboard(view: &DashboardView, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(view)?);
    }
    if format != OutputFormat::Table {
        return render_rows(&view.cards, format);
    }

    let mut out = vec![
        view.welcome.title.to_string(),
        view.welcome.subtitle.to_string(),
        view.welcome.greeting.clone(),
        String::new(),
        render_rows(&view.cards, format)?,
    ];
    for warning in &view.warnings {
        out.push(format!("⚠️ {}", warning));
    }
    Ok(out.join("\n"))
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

impl From<&DiseaseFields> for DiseaseRequest {
    fn from(fields: &DiseaseFields) -> Self {
        Self {
            name: fields.name.clone(),
            description: fields.description.clone(),
            scientific_name: fields.scientific_name.clone(),
            symptoms: fields.symptoms.clone(),
            severity: fields.severity.clone(),
            prevention: fields.prevention.clone(),
            treatment: fields.treatment.clone(),
            medicines: non_empty(&fields.medicines),
        }
    }
}

impl From<&MedicineFields> for MedicineRequest {
    fn from(fields: &MedicineFields) -> Self {
        Self {
            name: fields.name.clone(),
            description: fields.description.clone(),
            usage_instructions: non_empty(&fields.usage_instructions),
            diseases: non_empty(&fields.diseases),
        }
    }
}

#[async_trait]
impl CommandHandler for Command {
    async fn run(&self, app: &mut App) -> Result<String> {
        match self {
            Command::Login { email, password } => {
                let credentials = LoginCredentials {
                    email: email.clone(),
                    password: password.clone(),
                };
                let user = app.auth.login(&credentials).await?;
                Ok(format!(
                    "✅ Logged in as {} ({})",
                    user.display_name(),
                    user.role.map(|r| r.to_string()).unwrap_or_default()
                ))
            }
            Command::Signup {
                email,
                password,
                username,
                role,
            } => {
                let credentials = SignupCredentials {
                    email: email.clone(),
                    password: password.clone(),
                    username: username.clone(),
                    role: *role,
                };
                let user = app.auth.signup(&credentials).await?;
                Ok(format!("✅ Account created for {}", user.display_name()))
            }
            Command::Logout => {
                app.auth.logout()?;
                Ok("👋 Logged out".to_string())
            }
            Command::Whoami => {
                let user = app.auth.require_user()?;
                render_record(user, app.format())
            }
            Command::Nav => {
                app.auth.require_user()?;
                let entries: Vec<NavEntry> = visible_screens(app.user())
                    .into_iter()
                    .map(NavEntry::from)
                    .collect();
                render_rows(&entries, app.format())
            }
            Command::Dashboard => {
                app.open(Screen::Dashboard)?;
                let context = AppContext::prefetch(&app.layer).await;
                if app.session_revoked()? {
                    app.auth.sync()?;
                    return Err(AdminError::Unauthorized);
                }
                let user = context.profile.data.as_ref().or(app.user());
                let view = dashboard::build(user, &context);
                render_dashboard(&view, app.format())
            }
            Command::Diseases(command) => command.run(app).await,
            Command::Medicines(command) => command.run(app).await,
            Command::Advice(command) => command.run(app).await,
            Command::Feedback(command) => command.run(app).await,
            Command::Responses(command) => command.run(app).await,
            Command::Detections(command) => command.run(app).await,
            Command::Users(command) => command.run(app).await,
            Command::Notifications(command) => command.run(app).await,
        }
    }
}

#[async_trait]
impl CommandHandler for DiseaseCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Diseases)?;
        let diseases = &app.resources.diseases;

        match self {
            DiseaseCommand::List(args) => {
                let p = app.pagination(args);
                render_page(&diseases.page(p.page(), p.limit()).await?, app.format())
            }
            DiseaseCommand::Show { id } => render_record(&diseases.get(id).await?, app.format()),
            DiseaseCommand::Create(fields) => {
                app.require(Permission::ManageDiseases)?;
                let created = diseases.create(&fields.into()).await?;
                render_record(&created, app.format())
            }
            DiseaseCommand::Update { id, fields } => {
                app.require(Permission::ManageDiseases)?;
                let updated = diseases.update(id, &fields.into()).await?;
                render_record(&updated, app.format())
            }
            DiseaseCommand::Delete { id } => {
                app.require(Permission::ManageDiseases)?;
                diseases.delete(id).await?;
                Ok(format!("🗑️ Deleted disease {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for MedicineCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Medicines)?;
        let medicines = &app.resources.medicines;

        match self {
            MedicineCommand::List(args) => {
                let p = app.pagination(args);
                render_page(&medicines.page(p.page(), p.limit()).await?, app.format())
            }
            MedicineCommand::Show { id } => render_record(&medicines.get(id).await?, app.format()),
            MedicineCommand::Create(fields) => {
                app.require(Permission::ManageMedicines)?;
                let created = medicines.create(&fields.into()).await?;
                render_record(&created, app.format())
            }
            MedicineCommand::Update { id, fields } => {
                app.require(Permission::ManageMedicines)?;
                let updated = medicines.update(id, &fields.into()).await?;
                render_record(&updated, app.format())
            }
            MedicineCommand::Delete { id } => {
                app.require(Permission::ManageMedicines)?;
                medicines.delete(id).await?;
                Ok(format!("🗑️ Deleted medicine {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for AdviceCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Advices)?;
        let advice = &app.resources.advice;

        match self {
            AdviceCommand::List(args) => {
                let p = app.pagination(args);
                render_page(&advice.page(p.page(), p.limit()).await?, app.format())
            }
            AdviceCommand::Show { id } => render_record(&advice.get(id).await?, app.format()),
            AdviceCommand::Create {
                detection,
                medicine,
                prescription,
            } => {
                app.require(Permission::CreateAdvice)?;
                let request = AdviceRequest {
                    detection_id: detection.clone(),
                    prescription: Some(prescription.clone()),
                    medicine_id: medicine.clone(),
                };
                let created = if detection.is_some() {
                    advice.create_on_detection(&request).await?
                } else if medicine.is_some() {
                    advice.create_on_medicine(&request).await?
                } else {
                    return Err(AdminError::validation(
                        "Provide --detection or --medicine for the advice",
                    ));
                };
                render_record(&created, app.format())
            }
            AdviceCommand::Update {
                id,
                prescription,
                medicine,
            } => {
                app.require(Permission::ManageAdvice)?;
                let request = AdviceRequest {
                    detection_id: None,
                    prescription: prescription.clone(),
                    medicine_id: medicine.clone(),
                };
                render_record(&advice.update(id, &request).await?, app.format())
            }
            AdviceCommand::Delete { id } => {
                app.require(Permission::ManageAdvice)?;
                advice.delete(id).await?;
                Ok(format!("🗑️ Deleted advice {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for FeedbackCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Feedback)?;
        let feedback = &app.resources.feedback;

        match self {
            FeedbackCommand::List(args) => {
                let p = app.pagination(args);
                render_page(&feedback.page(p.page(), p.limit()).await?, app.format())
            }
            FeedbackCommand::Show { id } => render_record(&feedback.get(id).await?, app.format()),
            FeedbackCommand::Submit {
                detection,
                category,
                comment,
                advice,
            } => {
                app.require(Permission::SubmitFeedback)?;
                let request = FeedbackRequest {
                    detection_id: detection.clone(),
                    category: *category,
                    comment: comment.clone(),
                    advice_id: advice.clone(),
                };
                render_record(&feedback.submit(&request).await?, app.format())
            }
            FeedbackCommand::Delete { id } => {
                app.require(Permission::DeleteFeedback)?;
                feedback.delete(id).await?;
                Ok(format!("🗑️ Deleted feedback {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for ResponseCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::FeedbackResponses)?;
        let responses = &app.resources.feedback_responses;

        match self {
            ResponseCommand::List(args) => {
                let p = app.pagination(args);
                render_page(&responses.page(p.page(), p.limit()).await?, app.format())
            }
            ResponseCommand::Show { id } => render_record(&responses.get(id).await?, app.format()),
            ResponseCommand::Create { feedback, message } => {
                app.require(Permission::RespondToFeedback)?;
                let request = FeedbackResponseRequest {
                    feedback_id: feedback.clone(),
                    message: message.clone(),
                };
                render_record(&responses.create(&request).await?, app.format())
            }
            ResponseCommand::Delete { id } => {
                app.require(Permission::DeleteFeedbackResponse)?;
                responses.delete(id).await?;
                Ok(format!("🗑️ Deleted feedback response {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for DetectionCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Detections)?;
        let detections = &app.resources.detections;

        match self {
            DetectionCommand::List(args) => {
                let p = app.pagination(args);
                let scope = detection_scope(app.user());
                render_page(
                    &detections.list(scope, p.page(), p.limit()).await?,
                    app.format(),
                )
            }
            DetectionCommand::Show { id } => {
                render_record(&detections.get(id).await?, app.format())
            }
            DetectionCommand::Upload { image, url, farmer } => {
                app.require(Permission::UploadDetection)?;
                // 沒指定 farmer 時用自己的 farmer profile
                let farmer_id = farmer.clone().or_else(|| {
                    app.user()
                        .and_then(|u| u.farmer.as_ref())
                        .map(|f| f.id.clone())
                });
                let upload = DetectionUpload {
                    image_path: image.clone(),
                    image_url: url.clone(),
                    farmer_id,
                };
                render_record(&detections.detect(&upload).await?, app.format())
            }
            DetectionCommand::Manual { url } => {
                app.require(Permission::UploadDetection)?;
                render_record(&detections.detect_manual(url).await?, app.format())
            }
            DetectionCommand::Delete { id } => {
                app.require(Permission::DeleteDetection)?;
                detections.delete(id).await?;
                Ok(format!("🗑️ Deleted detection {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for UserCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Users)?;
        let users = &app.resources.users;

        match self {
            UserCommand::List(args) => {
                let p = app.pagination(args);
                render_page(&users.list(p.page(), p.limit()).await?, app.format())
            }
            UserCommand::Show { id } => render_record(&users.get(id).await?, app.format()),
            UserCommand::Role { id, role } => {
                app.require(Permission::ManageUsers)?;
                let updated = users.change_role(id, *role).await?;
                render_record(&updated, app.format())
            }
            UserCommand::Delete { id } => {
                app.require(Permission::ManageUsers)?;
                users.delete(id).await?;
                Ok(format!("🗑️ Deleted user {}", id))
            }
        }
    }
}

#[async_trait]
impl CommandHandler for NotificationCommand {
    async fn run(&self, app: &mut App) -> Result<String> {
        app.open(Screen::Notifications)?;
        let notifications = &app.resources.notifications;

        match self {
            NotificationCommand::List { page, user } => {
                let p = app.pagination(page);
                let result = match user {
                    Some(user_id) => {
                        app.require(Permission::ViewUserNotifications)?;
                        notifications.for_user(user_id, p.page(), p.limit()).await?
                    }
                    None => notifications.mine(p.page(), p.limit()).await?,
                };
                render_page(&result, app.format())
            }
            NotificationCommand::ReadAll => {
                notifications.mark_all_read().await?;
                Ok("✅ All notifications marked as read".to_string())
            }
            NotificationCommand::Delete { id } => {
                notifications.delete(id).await?;
                Ok(format!("🗑️ Deleted notification {}", id))
            }
        }
    }
}
