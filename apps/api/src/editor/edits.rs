//! Field-level edits the editor can apply to a resume.
//!
//! Every edit is a whole-field replacement or an insert/remove/update of a list entry by
//! identifier. Field names are closed enums, so a request naming an unknown field fails
//! to deserialize instead of writing a stray attribute.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::resume::{ContactInfo, Education, Id, Resume, TemplateId, WorkExperience};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{kind} entry {id} not found")]
    EntryNotFound { kind: &'static str, id: Id },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperienceField {
    JobTitle,
    Company,
    Location,
    StartDate,
    EndDate,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EducationField {
    Institution,
    Degree,
    Location,
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ResumeEdit {
    SetFullName { value: String },
    SetJobTitle { value: String },
    SetSummary { value: String },
    SetSkills { skills: Vec<String> },
    /// Comma-separated input as typed into the skills box.
    SetSkillsText { text: String },
    SetThemeColor { color: String },
    SetTemplate {
        #[serde(rename = "templateId")]
        template_id: TemplateId,
    },
    AddContact,
    UpdateContact { id: Id, value: String },
    RemoveContact { id: Id },
    AddExperience,
    UpdateExperience {
        id: Id,
        field: ExperienceField,
        value: String,
    },
    RemoveExperience { id: Id },
    AddEducation,
    UpdateEducation {
        id: Id,
        field: EducationField,
        value: String,
    },
    RemoveEducation { id: Id },
}

impl ResumeEdit {
    /// Applies the edit to `resume` in place. On error `resume` is left as it was.
    pub fn apply(self, resume: &mut Resume) -> Result<(), EditError> {
        match self {
            ResumeEdit::SetFullName { value } => resume.personal_details.full_name = value,
            ResumeEdit::SetJobTitle { value } => resume.personal_details.job_title = value,
            ResumeEdit::SetSummary { value } => resume.summary = value,
            ResumeEdit::SetSkills { skills } => resume.skills = skills,
            ResumeEdit::SetSkillsText { text } => resume.skills = split_skills(&text),
            ResumeEdit::SetThemeColor { color } => resume.theme_color = color,
            ResumeEdit::SetTemplate { template_id } => resume.template_id = template_id,
            ResumeEdit::AddContact => resume
                .personal_details
                .contact_info
                .push(ContactInfo::blank()),
            ResumeEdit::UpdateContact { id, value } => {
                let contact = resume
                    .personal_details
                    .contact_info
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| EditError::EntryNotFound {
                        kind: "contact",
                        id: id.clone(),
                    })?;
                contact.value = value;
            }
            ResumeEdit::RemoveContact { id } => {
                remove_by_id(&mut resume.personal_details.contact_info, id, "contact", |c| {
                    &c.id
                })?
            }
            ResumeEdit::AddExperience => resume.work_experience.push(WorkExperience::blank()),
            ResumeEdit::UpdateExperience { id, field, value } => {
                let exp = resume
                    .work_experience
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| EditError::EntryNotFound {
                        kind: "experience",
                        id: id.clone(),
                    })?;
                let slot = match field {
                    ExperienceField::JobTitle => &mut exp.job_title,
                    ExperienceField::Company => &mut exp.company,
                    ExperienceField::Location => &mut exp.location,
                    ExperienceField::StartDate => &mut exp.start_date,
                    ExperienceField::EndDate => &mut exp.end_date,
                    ExperienceField::Description => &mut exp.description,
                };
                *slot = value;
            }
            ResumeEdit::RemoveExperience { id } => {
                remove_by_id(&mut resume.work_experience, id, "experience", |e| &e.id)?
            }
            ResumeEdit::AddEducation => resume.education.push(Education::blank()),
            ResumeEdit::UpdateEducation { id, field, value } => {
                let edu = resume
                    .education
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| EditError::EntryNotFound {
                        kind: "education",
                        id: id.clone(),
                    })?;
                let slot = match field {
                    EducationField::Institution => &mut edu.institution,
                    EducationField::Degree => &mut edu.degree,
                    EducationField::Location => &mut edu.location,
                    EducationField::StartDate => &mut edu.start_date,
                    EducationField::EndDate => &mut edu.end_date,
                };
                *slot = value;
            }
            ResumeEdit::RemoveEducation { id } => {
                remove_by_id(&mut resume.education, id, "education", |e| &e.id)?
            }
        }
        Ok(())
    }
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: Id,
    kind: &'static str,
    id_of: impl Fn(&T) -> &Id,
) -> Result<(), EditError> {
    let before = items.len();
    items.retain(|item| *id_of(item) != id);
    if items.len() == before {
        return Err(EditError::EntryNotFound { kind, id });
    }
    Ok(())
}

/// Splits the skills text box on commas, trimming each piece. Empty pieces are kept so
/// a trailing comma survives while the user is still typing.
pub fn split_skills(text: &str) -> Vec<String> {
    text.split(',').map(|s| s.trim().to_string()).collect()
}
