use anyhow::{Context, Result};
use serde::Serialize;

use crate::model::{BlockData, ContentBlock, Page, QuestionKind};
use crate::normalize;

/// Counts shown next to a page in listings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    pub block_count: usize,
    pub exercise_count: usize,
    pub question_count: usize,
}

impl From<&Page> for PageSummary {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.to_string(),
            title: page.title.clone(),
            block_count: page.block_count(),
            exercise_count: page.exercise_count(),
            question_count: page.question_count(),
        }
    }
}

/// Serialize a page in its stored form
pub fn to_json(page: &Page) -> Result<String> {
    serde_json::to_string_pretty(page).context("Failed to serialize page")
}

/// Read a stored page; its blocks are normalized on the way in
pub fn page_from_json(json: &str) -> Result<Page> {
    serde_json::from_str(json).context("Failed to parse page")
}

pub fn blocks_to_json(blocks: &[ContentBlock]) -> Result<String> {
    serde_json::to_string_pretty(blocks).context("Failed to serialize blocks")
}

/// Read a bare block list as handed over by content storage
pub fn blocks_from_json(json: &str) -> Result<Vec<ContentBlock>> {
    let value: serde_json::Value = serde_json::from_str(json).context("Failed to parse blocks")?;
    Ok(normalize::normalize_value(&value))
}

/// Plain-text outline of a page, one section per block
pub fn generate_outline(page: &Page) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", page.title));

    if page.blocks.is_empty() {
        out.push_str("(empty page)\n");
        return out;
    }

    for (i, block) in page.blocks.iter().enumerate() {
        out.push_str(&format!("## {}. {}\n\n", i + 1, block.block_type().label()));
        match &block.data {
            BlockData::Intro(d) => {
                out.push_str(&d.text);
                out.push_str("\n\n");
            }
            BlockData::Image(d) => {
                out.push_str(&format!("![{}]({})\n", d.alt.as_deref().unwrap_or(""), d.url));
                if let Some(caption) = &d.caption {
                    out.push_str(&format!("_{}_\n", caption));
                }
                out.push('\n');
            }
            BlockData::Table(d) => {
                if !d.title.is_empty() {
                    out.push_str(&format!("**{}**\n\n", d.title));
                }
                out.push_str(&format!("| {} |\n", d.headers.join(" | ")));
                out.push_str(&format!("|{}\n", "---|".repeat(d.headers.len())));
                for row in &d.rows {
                    out.push_str(&format!("| {} |\n", row.join(" | ")));
                }
                out.push('\n');
            }
            BlockData::Youtube(d) => {
                let title = d.title.as_deref().unwrap_or("Video");
                match d.watch_url() {
                    Some(url) => out.push_str(&format!("{}: {}\n\n", title, url)),
                    None => out.push_str(&format!("{}: (no video set)\n\n", title)),
                }
            }
            BlockData::Exercise(d) => {
                if !d.title.is_empty() {
                    out.push_str(&format!("**{}**\n\n", d.title));
                }
                for (qi, q) in d.questions.iter().enumerate() {
                    out.push_str(&format!(
                        "{}. [{}] {}\n",
                        qi + 1,
                        q.question_type().label(),
                        q.prompt
                    ));
                    match &q.kind {
                        QuestionKind::WordOrder { words, .. } => {
                            out.push_str(&format!("   words: {}\n", words.join(" / ")));
                        }
                        QuestionKind::FillBlank { .. } => {}
                        QuestionKind::MultipleChoice { .. } | QuestionKind::TrueFalse { .. } => {
                            let answer = q.correct_answer();
                            for option in q.options() {
                                let mark = if !answer.is_empty() && option == answer {
                                    "x"
                                } else {
                                    " "
                                };
                                out.push_str(&format!("   [{}] {}\n", mark, option));
                            }
                        }
                    }
                    let answer = q.correct_answer();
                    if !answer.is_empty() {
                        out.push_str(&format!("   answer: {}\n", answer));
                    }
                }
                out.push('\n');
            }
            BlockData::Unknown(d) => {
                out.push_str(&format!("(`{}` block, kept as stored)\n\n", d.kind));
            }
        }
    }

    out
}
