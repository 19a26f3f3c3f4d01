pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::{AdminError, Result};
use crate::utils::render::OutputFormat;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use toml_config::{
    TomlConfig, DEFAULT_PAGE_LIMIT, DEFAULT_SESSION_PATH, DEFAULT_STALE_TIME_SECONDS,
    DEFAULT_TIMEOUT_SECONDS,
};

#[cfg(feature = "cli")]
use crate::domain::model::{FeedbackCategory, Role};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// 合併 CLI 參數與設定檔之後的最終設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub timeout_seconds: u64,
    pub session_path: String,
    pub stale_time_seconds: u64,
    pub page_limit: u32,
    pub format: OutputFormat,
}

impl Settings {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            session_path: DEFAULT_SESSION_PATH.to_string(),
            stale_time_seconds: DEFAULT_STALE_TIME_SECONDS,
            page_limit: DEFAULT_PAGE_LIMIT,
            format: OutputFormat::default(),
        }
    }

    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            api_base_url: config.api_base_url().to_string(),
            timeout_seconds: config.timeout_seconds(),
            session_path: config.session_path().to_string(),
            stale_time_seconds: config.stale_time_seconds(),
            page_limit: config.page_limit(),
            format: config.output_format(),
        }
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    fn session_path(&self) -> &str {
        &self.session_path
    }

    fn stale_time_seconds(&self) -> u64 {
        self.stale_time_seconds
    }

    fn page_limit(&self) -> u32 {
        self.page_limit
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        validate_path("session_path", &self.session_path)?;
        validate_range("page_limit", self.page_limit, 1, 100)?;
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "tomato-admin")]
#[command(about = "Admin console for the tomato disease detection platform")]
pub struct CliConfig {
    /// 後端 API 根網址，例如 https://api.example.com/api
    #[arg(long, env = "TOMATO_API_URL", global = true)]
    pub api_url: Option<String>,

    /// TOML 設定檔
    #[arg(long, env = "TOMATO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "TOMATO_SESSION_PATH", global = true)]
    pub session_path: Option<String>,

    #[arg(long, global = true, help = "Output format: table, json, csv, tsv")]
    pub format: Option<OutputFormat>,

    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(long, global = true, help = "Seconds a cached query stays fresh")]
    pub stale_time: Option<u64>,

    #[arg(long, global = true, help = "Default page size for list screens")]
    pub page_limit: Option<u32>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 設定檔先載入，再由 CLI 參數覆蓋
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                tracing::debug!("📄 loading config from {}", path.display());
                let file_config = TomlConfig::from_file(path)?;
                file_config.validate()?;
                Settings::from_toml(&file_config)
            }
            None => {
                let api_url = self.api_url.clone().ok_or_else(|| AdminError::MissingConfigError {
                    field: "api_url".to_string(),
                })?;
                Settings::new(api_url)
            }
        };

        if let Some(url) = &self.api_url {
            settings.api_base_url = url.clone();
        }
        if let Some(path) = &self.session_path {
            settings.session_path = path.clone();
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_seconds = timeout;
        }
        if let Some(stale_time) = self.stale_time {
            settings.stale_time_seconds = stale_time;
        }
        if let Some(limit) = self.page_limit {
            settings.page_limit = limit;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 登入並保存 session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TOMATO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TOMATO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        role: Option<Role>,
    },
    Logout,
    /// 顯示目前登入的使用者
    Whoami,
    /// 列出目前角色可以使用的畫面
    Nav,
    Dashboard,
    #[command(subcommand)]
    Diseases(DiseaseCommand),
    #[command(subcommand)]
    Medicines(MedicineCommand),
    #[command(subcommand)]
    Advice(AdviceCommand),
    #[command(subcommand)]
    Feedback(FeedbackCommand),
    #[command(subcommand)]
    Responses(ResponseCommand),
    #[command(subcommand)]
    Detections(DetectionCommand),
    #[command(subcommand)]
    Users(UserCommand),
    #[command(subcommand)]
    Notifications(NotificationCommand),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct DiseaseFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub scientific_name: Option<String>,
    #[arg(long)]
    pub symptoms: Option<String>,
    #[arg(long)]
    pub severity: Option<String>,
    #[arg(long)]
    pub prevention: Option<String>,
    #[arg(long)]
    pub treatment: Option<String>,
    /// 關聯的藥品 id，可重複
    #[arg(long = "medicine")]
    pub medicines: Vec<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum DiseaseCommand {
    List(PageArgs),
    Show { id: String },
    Create(DiseaseFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: DiseaseFields,
    },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Args)]
pub struct MedicineFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// 使用說明，每個 --usage 一行
    #[arg(long = "usage")]
    pub usage_instructions: Vec<String>,
    #[arg(long = "disease")]
    pub diseases: Vec<String>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum MedicineCommand {
    List(PageArgs),
    Show { id: String },
    Create(MedicineFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: MedicineFields,
    },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum AdviceCommand {
    List(PageArgs),
    Show { id: String },
    /// 針對偵測結果（或指定藥品）給建議
    Create {
        #[arg(long)]
        detection: Option<String>,
        #[arg(long)]
        medicine: Option<String>,
        #[arg(long)]
        prescription: String,
    },
    Update {
        id: String,
        #[arg(long)]
        prescription: Option<String>,
        #[arg(long)]
        medicine: Option<String>,
    },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum FeedbackCommand {
    List(PageArgs),
    Show { id: String },
    Submit {
        #[arg(long)]
        detection: String,
        #[arg(long)]
        category: FeedbackCategory,
        #[arg(long)]
        comment: String,
        #[arg(long)]
        advice: Option<String>,
    },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum ResponseCommand {
    List(PageArgs),
    Show { id: String },
    Create {
        #[arg(long)]
        feedback: String,
        #[arg(long)]
        message: String,
    },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum DetectionCommand {
    List(PageArgs),
    Show { id: String },
    /// 上傳圖片檔或圖片網址
    Upload {
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        farmer: Option<String>,
    },
    Manual { url: String },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum UserCommand {
    List(PageArgs),
    Show { id: String },
    Role { id: String, role: Role },
    Delete { id: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum NotificationCommand {
    List {
        #[command(flatten)]
        page: PageArgs,
        /// 查看其他使用者的通知（僅限 ADMIN）
        #[arg(long)]
        user: Option<String>,
    },
    ReadAll,
    Delete { id: String },
}
