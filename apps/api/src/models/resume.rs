use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a resume or of one of its entries.
///
/// Opaque to everything but equality. New ids are v4 UUID strings, but whatever a stored
/// document carries is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Id {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Id {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual layout variant a resume is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Modern,
    Classic,
}

impl TemplateId {
    pub const ALL: [TemplateId; 2] = [TemplateId::Modern, TemplateId::Classic];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Modern => "modern",
            TemplateId::Classic => "classic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateId::Modern => "Modern",
            TemplateId::Classic => "Classic",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TemplateId::Modern => "Two-column layout with a dark sidebar and theme-colored accents.",
            TemplateId::Classic => "Single-column serif layout with a centered header.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: Id,
    #[serde(default)]
    pub value: String,
}

impl ContactInfo {
    pub fn blank() -> Self {
        Self {
            id: Id::generate(),
            value: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDetails {
    pub full_name: String,
    pub job_title: String,
    pub contact_info: Vec<ContactInfo>,
}

/// Dates are free text ("Jan 2020", "Present") and never parsed.
/// `description` is newline-delimited; lines conventionally start with '-'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub id: Id,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

impl WorkExperience {
    pub fn blank() -> Self {
        Self {
            id: Id::generate(),
            job_title: String::new(),
            company: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: Id,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl Education {
    pub fn blank() -> Self {
        Self {
            id: Id::generate(),
            institution: String::new(),
            degree: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        }
    }
}

/// The root document: one user-authored CV.
///
/// `id` is generated once at creation and never changes. `last_modified` moves only
/// when a mutation succeeds (see `editor::mutation`); it is stored as epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: Id,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub template_id: TemplateId,
    #[serde(default = "default_theme_color")]
    pub theme_color: String,
    #[serde(default)]
    pub personal_details: PersonalDetails,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub work_experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
}

fn default_theme_color() -> String {
    crate::models::seed::DEFAULT_THEME_COLOR.to_string()
}

impl Resume {
    pub fn experience(&self, id: &Id) -> Option<&WorkExperience> {
        self.work_experience.iter().find(|e| &e.id == id)
    }
}

/// Dashboard card for one resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: Id,
    pub title: String,
    pub subtitle: String,
    pub template_id: TemplateId,
    pub theme_color: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
}

impl From<&Resume> for ResumeSummary {
    fn from(resume: &Resume) -> Self {
        let details = &resume.personal_details;
        let title = if details.full_name.trim().is_empty() {
            "Untitled Resume".to_string()
        } else {
            details.full_name.clone()
        };
        let subtitle = if details.job_title.trim().is_empty() {
            "No title".to_string()
        } else {
            details.job_title.clone()
        };
        Self {
            id: resume.id.clone(),
            title,
            subtitle,
            template_id: resume.template_id,
            theme_color: resume.theme_color.clone(),
            last_modified: resume.last_modified,
        }
    }
}
