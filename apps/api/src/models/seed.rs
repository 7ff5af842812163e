//! Starter document every new resume is seeded from.

use chrono::{DateTime, Utc};

use crate::models::resume::{
    ContactInfo, Education, Id, PersonalDetails, Resume, TemplateId, WorkExperience,
};

pub const DEFAULT_THEME_COLOR: &str = "#3b82f6";

/// Theme colors offered by the editor.
pub const THEME_COLORS: [&str; 6] = [
    "#3b82f6", "#10b981", "#8b5cf6", "#ef4444", "#f97316", "#334155",
];

/// Placeholder name written into freshly created resumes.
pub const NEW_RESUME_NAME: &str = "Your Name";

const SAMPLE_SUMMARY: &str = "Innovative Senior Software Engineer with over 8 years of experience \
in developing scalable web applications and leading cross-functional teams. Proficient in React, \
Node.js, and cloud technologies. Passionate about creating intuitive user experiences and driving \
technical excellence.";

const SAMPLE_SKILLS: [&str; 8] = [
    "React",
    "TypeScript",
    "Node.js",
    "GraphQL",
    "AWS",
    "Docker",
    "CI/CD",
    "Agile Methodologies",
];

const SAMPLE_CONTACTS: [&str; 5] = [
    "alex.doe@email.com",
    "123-456-7890",
    "San Francisco, CA",
    "linkedin.com/in/alexdoe",
    "alexdoe.dev",
];

/// Builds the sample document. Every call mints fresh entry identifiers.
pub fn starter_resume(id: Id, last_modified: DateTime<Utc>) -> Resume {
    Resume {
        id,
        last_modified,
        template_id: TemplateId::Modern,
        theme_color: DEFAULT_THEME_COLOR.to_string(),
        personal_details: PersonalDetails {
            full_name: "Alex Doe".to_string(),
            job_title: "Senior Software Engineer".to_string(),
            contact_info: SAMPLE_CONTACTS
                .iter()
                .map(|value| ContactInfo {
                    id: Id::generate(),
                    value: value.to_string(),
                })
                .collect(),
        },
        summary: SAMPLE_SUMMARY.to_string(),
        skills: SAMPLE_SKILLS.iter().map(|s| s.to_string()).collect(),
        work_experience: vec![
            WorkExperience {
                id: Id::generate(),
                job_title: "Senior Software Engineer".to_string(),
                company: "Tech Solutions Inc.".to_string(),
                location: "San Francisco, CA".to_string(),
                start_date: "Jan 2020".to_string(),
                end_date: "Present".to_string(),
                description: "- Led the development of a new client-facing dashboard using React and TypeScript, improving user engagement by 25%.\n\
- Mentored a team of 4 junior engineers, fostering a culture of collaboration and continuous improvement.\n\
- Architected and implemented a microservices-based backend with Node.js, resulting in a 40% reduction in API response times."
                    .to_string(),
            },
            WorkExperience {
                id: Id::generate(),
                job_title: "Software Engineer".to_string(),
                company: "Web Innovations".to_string(),
                location: "Boston, MA".to_string(),
                start_date: "Jun 2016".to_string(),
                end_date: "Dec 2019".to_string(),
                description: "- Developed and maintained features for a high-traffic e-commerce platform using React and Redux.\n\
- Collaborated with product managers and designers to translate business requirements into technical solutions.\n\
- Optimized application performance, leading to a 15% increase in page load speed."
                    .to_string(),
            },
        ],
        education: vec![
            Education {
                id: Id::generate(),
                institution: "State University".to_string(),
                degree: "M.S. in Computer Science".to_string(),
                location: "New York, NY".to_string(),
                start_date: "2014".to_string(),
                end_date: "2016".to_string(),
            },
            Education {
                id: Id::generate(),
                institution: "College of Technology".to_string(),
                degree: "B.S. in Software Engineering".to_string(),
                location: "Boston, MA".to_string(),
                start_date: "2010".to_string(),
                end_date: "2014".to_string(),
            },
        ],
    }
}

/// A new resume as created from the template picker: the starter document with the
/// chosen template and the placeholder name.
pub fn new_resume(template: TemplateId, last_modified: DateTime<Utc>) -> Resume {
    let mut resume = starter_resume(Id::generate(), last_modified);
    resume.template_id = template;
    resume.personal_details.full_name = NEW_RESUME_NAME.to_string();
    resume
}
