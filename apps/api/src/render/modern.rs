// Two-column layout: dark sidebar (identity, contact, skills, education) and a main
// column (profile summary, work experience).

use crate::models::resume::Resume;
use crate::render::{bullet_list, date_range, escape, join_present};

pub const STYLE: &str = "\
.modern { display: flex; font-family: 'Helvetica Neue', Arial, sans-serif; font-size: 12px; color: #1f2937; }
.modern .sidebar { width: 33%; background: #1e293b; color: #ffffff; padding: 28px 22px; }
.modern .main { width: 67%; padding: 28px 30px; }
.modern .identity { text-align: center; margin-bottom: 28px; }
.modern .identity h1 { font-size: 30px; font-weight: 700; margin-bottom: 4px; }
.modern .identity h2 { font-size: 15px; font-weight: 300; color: #cbd5e1; }
.modern .sidebar section { margin-bottom: 22px; }
.modern .sidebar h3 { font-size: 12px; font-weight: 600; text-transform: uppercase; letter-spacing: 0.08em; margin-bottom: 8px; }
.modern .contact li { list-style: none; font-size: 11px; color: #cbd5e1; margin-bottom: 3px; }
.modern .skills { display: flex; flex-wrap: wrap; }
.modern .skills li { list-style: none; font-size: 11px; color: #ffffff; padding: 3px 7px; margin: 0 5px 5px 0; border-radius: 2px; }
.modern .degree { font-weight: 700; font-size: 11px; }
.modern .institution { font-size: 11px; color: #cbd5e1; }
.modern .edu-dates { font-size: 11px; color: #94a3b8; margin-bottom: 10px; }
.modern .main h3 { font-size: 17px; font-weight: 700; color: #1e293b; border-bottom: 2px solid; padding-bottom: 3px; margin-bottom: 10px; }
.modern .main section { margin-bottom: 22px; }
.modern .summary { font-size: 11px; line-height: 1.6; }
.modern .job { margin-bottom: 14px; }
.modern .job-head { display: flex; justify-content: space-between; align-items: baseline; }
.modern .job-title { font-weight: 700; font-size: 14px; }
.modern .dates { font-size: 11px; color: #475569; }
.modern .employer { font-weight: 600; font-size: 12px; }
.modern .bullets { margin-top: 4px; font-size: 11px; }
.modern .bullets li { margin-bottom: 3px; }";

pub fn render(resume: &Resume) -> String {
    let color = escape(&resume.theme_color);
    let details = &resume.personal_details;

    let contacts: String = details
        .contact_info
        .iter()
        .map(|c| format!("<li>{}</li>", escape(&c.value)))
        .collect();

    let skills: String = resume
        .skills
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("<li style=\"background-color: {color}\">{}</li>", escape(s)))
        .collect();

    let education: String = resume
        .education
        .iter()
        .map(|edu| {
            format!(
                "<div class=\"edu\"><div class=\"degree\">{}</div><div class=\"institution\">{}</div>\
                 <div class=\"edu-dates\">{}</div></div>",
                escape(&edu.degree),
                join_present(&[&edu.institution, &edu.location], ", "),
                date_range(&edu.start_date, &edu.end_date),
            )
        })
        .collect();

    let experience: String = resume
        .work_experience
        .iter()
        .map(|exp| {
            format!(
                "<div class=\"job\"><div class=\"job-head\"><span class=\"job-title\">{}</span>\
                 <span class=\"dates\">{}</span></div>\
                 <div class=\"employer\" style=\"color: {color}\">{}</div>{}</div>",
                escape(&exp.job_title),
                date_range(&exp.start_date, &exp.end_date),
                join_present(&[&exp.company, &exp.location], " | "),
                bullet_list(&exp.description, "bullets"),
            )
        })
        .collect();

    format!(
        "<div class=\"sheet modern\">\
         <aside class=\"sidebar\">\
         <div class=\"identity\"><h1>{name}</h1><h2>{title}</h2></div>\
         <section><h3 style=\"color: {color}\">Contact</h3><ul class=\"contact\">{contacts}</ul></section>\
         <section><h3 style=\"color: {color}\">Skills</h3><ul class=\"skills\">{skills}</ul></section>\
         <section><h3 style=\"color: {color}\">Education</h3>{education}</section>\
         </aside>\
         <main class=\"main\">\
         <section><h3 style=\"border-color: {color}\">Profile Summary</h3><p class=\"summary\">{summary}</p></section>\
         <section><h3 style=\"border-color: {color}\">Work Experience</h3>{experience}</section>\
         </main>\
         </div>",
        name = escape(&details.full_name),
        title = escape(&details.job_title),
        summary = escape(&resume.summary),
    )
}
