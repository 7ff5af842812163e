// Prompt templates for the AI rewrite of summary and work-description text.
// `{text}` is replaced with the current field text before sending.

use crate::editor::rewrite::RewriteKind;

/// Summary rewrite. Produces a paragraph.
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"As a professional resume writing expert, rewrite the following professional summary to be compelling and concise for a CV.
Highlight key strengths and career goals. Keep the tone professional and impactful.

Original summary:
"""
{text}
"""

Return a JSON object with this EXACT schema (no extra fields):
{"refined_text": "the rewritten summary"}"#;

/// Work-description rewrite. Produces dash-prefixed bullet lines.
pub const WORK_DESCRIPTION_PROMPT_TEMPLATE: &str = r#"As a professional resume writing expert, rewrite the following job description to be more impactful for a CV.
Use strong action verbs and focus on achievements and quantifiable results.
Format the output as bullet points, one per line, each starting with '-'.

Original description:
"""
{text}
"""

Return a JSON object with this EXACT schema (no extra fields):
{"refined_text": "- first bullet\n- second bullet"}"#;

pub fn build_rewrite_prompt(kind: RewriteKind, text: &str) -> String {
    let template = match kind {
        RewriteKind::Summary => SUMMARY_PROMPT_TEMPLATE,
        RewriteKind::WorkDescription => WORK_DESCRIPTION_PROMPT_TEMPLATE,
    };
    template.replace("{text}", text)
}
