//! Template renderer: `Resume → HTML`.
//!
//! Each template is a pure function over a borrowed resume. Output is a complete,
//! self-contained document (inline CSS, no external assets) sized as a US Letter sheet,
//! so the same string serves the live preview and the rasterizer.

pub mod classic;
pub mod modern;

use crate::models::resume::{Resume, TemplateId};

/// CSS pixels at 96 dpi.
pub const SHEET_WIDTH_PX: u32 = 816;
pub const SHEET_HEIGHT_PX: u32 = 1056;

pub fn render_resume(resume: &Resume) -> String {
    let (style, body) = match resume.template_id {
        TemplateId::Modern => (modern::STYLE, modern::render(resume)),
        TemplateId::Classic => (classic::STYLE, classic::render(resume)),
    };
    page(&document_title(resume), style, &body)
}

/// Splits a description into bullet items: one per non-blank line, leading dash removed.
pub fn description_items(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix('-').unwrap_or(line).trim())
        .collect()
}

/// Escapes text for use in HTML element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `start - end`, or whichever side is present.
pub(crate) fn date_range(start: &str, end: &str) -> String {
    match (start.trim(), end.trim()) {
        ("", "") => String::new(),
        (s, "") => escape(s),
        ("", e) => escape(e),
        (s, e) => format!("{} - {}", escape(s), escape(e)),
    }
}

/// Joins the non-blank parts with `sep`, each escaped.
pub(crate) fn join_present(parts: &[&str], sep: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(escape)
        .collect::<Vec<_>>()
        .join(sep)
}

pub(crate) fn bullet_list(description: &str, class: &str) -> String {
    let items = description_items(description);
    if items.is_empty() {
        return String::new();
    }
    let mut html = format!("<ul class=\"{class}\">");
    for item in items {
        html.push_str(&format!("<li>{}</li>", escape(item)));
    }
    html.push_str("</ul>");
    html
}

fn document_title(resume: &Resume) -> String {
    let name = resume.personal_details.full_name.trim();
    if name.is_empty() {
        "Resume".to_string()
    } else {
        format!("{name} - Resume")
    }
}

fn page(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n\
         * {{ box-sizing: border-box; margin: 0; padding: 0; }}\n\
         html, body {{ background: #ffffff; }}\n\
         .sheet {{ width: {SHEET_WIDTH_PX}px; min-height: {SHEET_HEIGHT_PX}px; background: #ffffff; }}\n\
         ul {{ list-style-position: inside; }}\n\
         {style}\n</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
    )
}
