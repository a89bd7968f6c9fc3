//! # Certificate Record
//!
//! The validated data a badge is drawn from. Field names serialize in
//! camelCase so a stored record keeps the layout the form has always
//! written.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

pub const NAME_MAX_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 50;

/// The five certificates the badge commemorates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CertificateType {
    InfoSysProjectManager,
    SystemAnalyst,
    SystemArchitect,
    NetworkArchitect,
    SystemPlannerManager,
}

impl CertificateType {
    pub const ALL: [CertificateType; 5] = [
        CertificateType::InfoSysProjectManager,
        CertificateType::SystemAnalyst,
        CertificateType::SystemArchitect,
        CertificateType::NetworkArchitect,
        CertificateType::SystemPlannerManager,
    ];

    /// Display label printed on the badge.
    pub fn label(self) -> &'static str {
        match self {
            CertificateType::InfoSysProjectManager => "信息系统项目管理师",
            CertificateType::SystemAnalyst => "系统分析师",
            CertificateType::SystemArchitect => "系统架构设计师",
            CertificateType::NetworkArchitect => "网络规划设计师",
            CertificateType::SystemPlannerManager => "系统规划与管理师",
        }
    }
}

/// Known visual themes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeId {
    TitaniumRose,
    CrimsonCore,
    DigitalOcean,
    CherryBlossom,
}

/// One filled-in badge form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
    pub name: String,
    pub certificate_type: CertificateType,
    pub issue_date: NaiveDate,
    pub theme: ThemeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

impl Default for CertificateData {
    fn default() -> Self {
        Self {
            name: "莹老板".to_string(),
            certificate_type: CertificateType::InfoSysProjectManager,
            issue_date: chrono::Local::now().date_naive(),
            theme: ThemeId::TitaniumRose,
            custom_message: Some("技术与颜值并存，智慧与担当齐飞！".to_string()),
        }
    }
}

impl CertificateData {
    /// Full form validation: name 1–10 characters, message at most 50.
    pub fn validate(&self) -> ExportResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ExportError::validation("name", "is required", &self.name));
        }
        if name.chars().count() > NAME_MAX_CHARS {
            return Err(ExportError::validation(
                "name",
                format!("must be at most {} characters", NAME_MAX_CHARS),
                &self.name,
            ));
        }
        if let Some(message) = &self.custom_message {
            if message.chars().count() > MESSAGE_MAX_CHARS {
                return Err(ExportError::validation(
                    "customMessage",
                    format!("must be at most {} characters", MESSAGE_MAX_CHARS),
                    message,
                ));
            }
        }
        Ok(())
    }
}
