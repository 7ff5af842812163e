// Single-column serif layout with a centered header.

use crate::models::resume::Resume;
use crate::render::{bullet_list, date_range, escape, join_present};

pub const STYLE: &str = "\
.classic { padding: 40px; font-family: Georgia, 'Times New Roman', serif; color: #111827; }
.classic header { text-align: center; border-bottom: 2px solid #d1d5db; padding-bottom: 16px; margin-bottom: 28px; }
.classic header h1 { font-size: 34px; font-weight: 700; letter-spacing: 0.05em; }
.classic .role { font-size: 17px; font-weight: 300; margin-top: 4px; }
.classic .contacts { font-size: 11px; color: #475569; margin-top: 8px; }
.classic section { margin-bottom: 22px; }
.classic h2 { font-size: 19px; font-weight: 600; border-bottom: 2px solid; padding-bottom: 3px; margin-bottom: 10px; }
.classic p { font-size: 13px; line-height: 1.6; }
.classic .entry { margin-bottom: 12px; }
.classic .entry-head { display: flex; justify-content: space-between; align-items: baseline; }
.classic .entry-title { font-size: 15px; font-weight: 700; }
.classic .dates { font-size: 11px; }
.classic .place { font-size: 13px; font-style: italic; }
.classic .bullets { margin-top: 4px; font-size: 13px; color: #374151; }
.classic .bullets li { margin-bottom: 3px; }";

fn section(color: &str, title: &str, content: &str) -> String {
    format!("<section><h2 style=\"border-color: {color}; color: {color}\">{title}</h2>{content}</section>")
}

fn entry(title: &str, start: &str, end: &str, place: String, bullets: String) -> String {
    format!(
        "<div class=\"entry\"><div class=\"entry-head\"><span class=\"entry-title\">{}</span>\
         <span class=\"dates\">{}</span></div><div class=\"place\">{place}</div>{bullets}</div>",
        escape(title),
        date_range(start, end),
    )
}

pub fn render(resume: &Resume) -> String {
    let color = escape(&resume.theme_color);
    let details = &resume.personal_details;

    let contacts: Vec<&str> = details.contact_info.iter().map(|c| c.value.as_str()).collect();
    let skills: Vec<&str> = resume.skills.iter().map(String::as_str).collect();

    let experience: String = resume
        .work_experience
        .iter()
        .map(|exp| {
            entry(
                &exp.job_title,
                &exp.start_date,
                &exp.end_date,
                join_present(&[&exp.company, &exp.location], ", "),
                bullet_list(&exp.description, "bullets"),
            )
        })
        .collect();

    let education: String = resume
        .education
        .iter()
        .map(|edu| {
            entry(
                &edu.institution,
                &edu.start_date,
                &edu.end_date,
                join_present(&[&edu.degree, &edu.location], ", "),
                String::new(),
            )
        })
        .collect();

    format!(
        "<div class=\"sheet classic\">\
         <header><h1 style=\"color: {color}\">{name}</h1><div class=\"role\">{title}</div>\
         <div class=\"contacts\">{contacts}</div></header>\
         {summary}{skills}{experience}{education}\
         </div>",
        name = escape(&details.full_name),
        title = escape(&details.job_title),
        contacts = join_present(&contacts, " &bull; "),
        summary = section(&color, "Summary", &format!("<p>{}</p>", escape(&resume.summary))),
        skills = section(&color, "Skills", &format!("<p>{}</p>", join_present(&skills, " &bull; "))),
        experience = section(&color, "Experience", &experience),
        education = section(&color, "Education", &education),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::Id;
    use crate::models::seed::starter_resume;
    use chrono::Utc;

    #[test]
    fn test_contacts_and_skills_are_bullet_joined() {
        let mut resume = starter_resume(Id::generate(), Utc::now());
        resume.personal_details.contact_info.truncate(2);
        resume.skills = vec!["Rust".into(), "".into(), "SQL".into()];

        let html = render(&resume);
        let contacts = &resume.personal_details.contact_info;
        assert!(html.contains(&format!(
            "{} &bull; {}",
            escape(&contacts[0].value),
            escape(&contacts[1].value)
        )));
        assert!(html.contains("<p>Rust &bull; SQL</p>"));
    }

    #[test]
    fn test_sections_follow_fixed_order() {
        let resume = starter_resume(Id::generate(), Utc::now());
        let html = render(&resume);
        let order: Vec<usize> = [">Summary<", ">Skills<", ">Experience<", ">Education<"]
            .iter()
            .map(|h| html.find(h).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }
}
