//! Student-facing lesson rendering.
//!
//! Blocks are sorted by `order`, normalized, then dispatched by kind to the
//! presenters in [`html`]. A block that cannot be normalized is logged and
//! skipped; it never stops its siblings from rendering.

pub mod answers;
pub mod html;
pub mod navigation;

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;

use crate::content::{BlockContent, BlockKind, normalize};
use crate::models::{ContentBlock, Module};
pub use answers::{AnswerBook, AnswerFeedback, OptionMark};
use html::{BlockContext, render_content};
pub use navigation::{LessonLink, flatten_lessons, lesson_path, next_lesson};

pub const EMPTY_LESSON_HTML: &str =
    "<div class=\"lesson-empty\"><p>No content available for this lesson yet.</p></div>";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub key: String,
    pub kind: BlockKind,
    pub content: BlockContent,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderedLesson {
    pub title: String,
    pub blocks: Vec<RenderedBlock>,
    pub skipped: Vec<SkippedBlock>,
    pub next_lesson: Option<LessonLink>,
}

impl RenderedLesson {
    /// True when there is nothing visible to show, which gets the
    /// placeholder rather than a blank page.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<article class=\"lesson\">");
        if !self.title.is_empty() {
            let _ = write!(out, "<h1>{}</h1>", encode_text(&self.title));
        }
        if self.is_empty() {
            out.push_str(EMPTY_LESSON_HTML);
        }
        for block in &self.blocks {
            out.push_str(&block.html);
        }
        if let Some(next) = &self.next_lesson {
            let _ = write!(
                out,
                "<nav class=\"next-lesson\"><a href=\"{}\">Next: {}</a></nav>",
                encode_double_quoted_attribute(&next.path),
                encode_text(&next.title)
            );
        }
        out.push_str("</article>");
        out
    }
}

/// Renders blocks of one lesson. With an [`AnswerBook`] the question blocks
/// show the parent's selections; without one every question starts
/// unanswered.
#[derive(Default)]
pub struct LessonRenderer<'a> {
    answers: Option<&'a AnswerBook>,
}

impl<'a> LessonRenderer<'a> {
    pub fn new() -> Self {
        Self { answers: None }
    }

    pub fn with_answers(answers: &'a AnswerBook) -> Self {
        Self {
            answers: Some(answers),
        }
    }

    pub fn render_blocks(&self, blocks: &[ContentBlock]) -> RenderedLesson {
        let mut sorted: Vec<&ContentBlock> = blocks.iter().collect();
        // Stable, so equal orders keep their input position; unordered last.
        sorted.sort_by_key(|b| b.order.unwrap_or(u32::MAX));

        let mut lesson = RenderedLesson::default();
        for block in sorted {
            match self.render_block(block) {
                Ok(rendered) => lesson.blocks.push(rendered),
                Err(reason) => {
                    warn!(block = %block.key(), "skipping block: {}", reason);
                    lesson.skipped.push(SkippedBlock {
                        key: block.key(),
                        reason,
                    });
                }
            }
        }
        lesson
    }

    fn render_block(&self, block: &ContentBlock) -> Result<RenderedBlock, String> {
        let content = normalize(block).map_err(|e| e.to_string())?;
        let key = block.key();
        let lookup = |k: &str| self.answers.and_then(|a| a.selected(k));
        let ctx = BlockContext {
            key: &key,
            selected: lookup(&key),
            nested_selected: &lookup,
        };
        let html = render_content(&content, &ctx);

        Ok(RenderedBlock {
            kind: content.kind(),
            key,
            content,
            html,
        })
    }

    /// Renders a lesson located in the course tree, with its next-lesson link.
    /// `None` when the module or lesson does not exist.
    pub fn render_lesson(
        &self,
        course_id: &str,
        modules: &[Module],
        module_id: &str,
        sub_module_id: &str,
    ) -> Option<RenderedLesson> {
        let module = modules.iter().find(|m| m.id == module_id)?;
        let sub = module.sub_module(sub_module_id)?;

        let mut lesson = self.render_blocks(&sub.content_blocks);
        lesson.title = sub.title.clone();
        lesson.next_lesson = next_lesson(course_id, modules, module_id, sub_module_id);
        Some(lesson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blocks(value: serde_json::Value) -> Vec<ContentBlock> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_lesson_gets_placeholder() {
        let lesson = LessonRenderer::new().render_blocks(&[]);
        assert!(lesson.is_empty());
        assert!(lesson.to_html().contains("No content available"));
    }

    #[test]
    fn blocks_render_in_ascending_order() {
        let lesson = LessonRenderer::new().render_blocks(&blocks(json!([
            { "type": "text", "order": 3, "content": { "text": "c" } },
            { "type": "text", "order": 1, "content": { "text": "a" } },
            { "type": "text", "order": 2, "content": { "text": "b" } }
        ])));
        let texts: Vec<&str> = lesson
            .blocks
            .iter()
            .map(|b| match &b.content {
                BlockContent::Text(t) => t.text.as_str(),
                _ => "",
            })
            .collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn bogus_block_is_skipped_quietly() {
        let lesson = LessonRenderer::new().render_blocks(&blocks(json!([
            { "type": "text", "order": 1, "content": { "text": "a" } },
            { "type": "bogus", "order": 2, "content": { "text": "ghost" } },
            { "type": "summary", "order": 3, "content": { "title": "S", "description": "D" } }
        ])));
        assert_eq!(lesson.blocks.len(), 2);
        assert_eq!(lesson.skipped.len(), 1);
        assert!(!lesson.to_html().contains("ghost"));
    }

    #[test]
    fn answers_flow_into_questions() {
        let raw = blocks(json!([{
            "_id": "q1",
            "type": "mcq",
            "order": 1,
            "content": { "question": "?", "options": ["a", "b"], "correctAnswer": 1 }
        }]));
        let mut book = AnswerBook::new();
        book.record("q1", 1);

        let lesson = LessonRenderer::with_answers(&book).render_blocks(&raw);
        assert!(lesson.blocks[0].html.contains("option selected correct"));

        let fresh = LessonRenderer::new().render_blocks(&raw);
        assert!(!fresh.blocks[0].html.contains("selected"));
    }
}
