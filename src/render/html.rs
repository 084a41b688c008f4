//! Presentational renderers, one per block kind. Pure functions of
//! normalized content (plus the block's current answer selection).

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use tracing::warn;
use url::{ParseError, Url};

use super::answers::feedback;
use crate::content::schema::*;

/// Inputs a presenter may need beyond the content itself.
#[derive(Clone, Copy)]
pub struct BlockContext<'a> {
    pub key: &'a str,
    pub selected: Option<usize>,
    /// Looks up selections of nested questions (quiz blocks).
    pub nested_selected: &'a dyn Fn(&str) -> Option<usize>,
}

pub fn render_content(content: &BlockContent, ctx: &BlockContext<'_>) -> String {
    let body = match content {
        BlockContent::Text(c) => render_text(c),
        BlockContent::Heading(c) => render_heading(c),
        BlockContent::List(c) => render_list(c),
        BlockContent::CodeSnippet(c) => render_code_snippet(c),
        BlockContent::Summary(c) => render_summary(c),
        BlockContent::KeyFeatures(c) => titled_list("key-features", &c.title, &c.features),
        BlockContent::ConceptExplanation(c) => render_concept(c),
        BlockContent::ImportantNote(c) => render_important_note(c),
        BlockContent::MistakesToAvoid(c) => render_mistakes(c),
        BlockContent::Timeline(c) => render_timeline(c),
        BlockContent::HandsOn(c) => render_hands_on(c),
        BlockContent::Mcq(c) => render_question(
            ctx.key,
            &c.question,
            &c.options,
            c.correct_answer,
            c.explanation.as_deref(),
            ctx.selected,
        ),
        BlockContent::CodingExercise(c) => render_coding_exercise(c),
        BlockContent::Quiz(c) => render_quiz(c, ctx),
        BlockContent::Image(c) => render_image(c),
        BlockContent::Video(c) => render_video(c),
        BlockContent::Link(c) => render_link(c),
        BlockContent::Example(c) => render_example(c),
        BlockContent::Comparison(c) => render_comparison(c),
    };

    format!(
        "<section class=\"block block-{}\" data-block=\"{}\">{}</section>",
        content.kind(),
        attr(ctx.key),
        body
    )
}

fn heading(level: u8, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!("<h{level}>{}</h{level}>", text(value))
}

fn paragraph(class: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!("<p class=\"{class}\">{}</p>", text(value))
}

fn items(tag: &str, values: &[String]) -> String {
    if values.is_empty() {
        return String::new();
    }
    let mut out = format!("<{tag}>");
    for value in values {
        let _ = write!(out, "<li>{}</li>", text(value));
    }
    let _ = write!(out, "</{tag}>");
    out
}

fn code(language: &str, source: &str) -> String {
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>",
        attr(language),
        text(source)
    )
}

fn titled_list(class: &str, title: &str, values: &[String]) -> String {
    format!("{}<div class=\"{class}\">{}</div>", heading(3, title), items("ul", values))
}

fn render_text(c: &TextContent) -> String {
    c.text
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<p>{}</p>", text(p)))
        .collect()
}

fn render_heading(c: &HeadingContent) -> String {
    heading(c.level.clamp(1, 6), &c.text)
}

fn render_list(c: &ListContent) -> String {
    match c.list_type {
        ListType::Ordered => items("ol", &c.items),
        ListType::Unordered => items("ul", &c.items),
    }
}

fn render_code_snippet(c: &CodeSnippetContent) -> String {
    let mut out = heading(3, &c.title);
    out.push_str(&code(&c.language, &c.code));
    if let Some(explanation) = &c.explanation {
        out.push_str(&paragraph("explanation", explanation));
    }
    out
}

fn render_summary(c: &SummaryContent) -> String {
    format!("{}{}", heading(2, &c.title), paragraph("description", &c.description))
}

fn render_concept(c: &ConceptExplanationContent) -> String {
    let mut out = heading(2, &c.title);
    if !c.sections.is_empty() {
        for section in &c.sections {
            out.push_str("<div class=\"concept-section\">");
            if !section.icon.is_empty() {
                let _ = write!(out, "<span class=\"icon\">{}</span>", text(&section.icon));
            }
            out.push_str(&heading(3, &section.title));
            for line in &section.content {
                out.push_str(&paragraph("concept-line", line));
            }
            if let Some(source) = &section.code {
                out.push_str(&code("", source));
            }
            out.push_str("</div>");
        }
        return out;
    }

    if let Some(concept) = &c.concept {
        out.push_str(&paragraph("concept", concept));
    }
    if let Some(explanation) = &c.explanation {
        out.push_str(&paragraph("explanation", explanation));
    }
    if !c.examples.is_empty() {
        out.push_str("<div class=\"examples\">");
        out.push_str(&items("ul", &c.examples));
        out.push_str("</div>");
    }
    out
}

fn render_important_note(c: &ImportantNoteContent) -> String {
    let mut out = format!("<aside class=\"note\">{}", heading(3, &c.title));
    if let Some(description) = &c.description {
        out.push_str(&paragraph("description", description));
    }
    out.push_str(&items("ul", &c.points));
    out.push_str("</aside>");
    out
}

fn render_mistakes(c: &MistakesToAvoidContent) -> String {
    let mut out = heading(3, &c.title);
    let _ = write!(out, "<div class=\"mistakes\">{}</div>", items("ul", &c.mistakes));
    if !c.alternatives.is_empty() {
        let _ = write!(
            out,
            "<div class=\"alternatives\">{}</div>",
            items("ul", &c.alternatives)
        );
    }
    out
}

fn render_timeline(c: &TimelineContent) -> String {
    let mut out = heading(3, &c.title);
    out.push_str("<ol class=\"timeline\">");
    for event in &c.events {
        let _ = write!(
            out,
            "<li><span class=\"year\">{}</span><strong>{}</strong>{}</li>",
            text(&event.year),
            text(&event.title),
            paragraph("description", &event.description)
        );
    }
    out.push_str("</ol>");
    out
}

fn render_hands_on(c: &HandsOnContent) -> String {
    let mut out = heading(3, &c.title);
    out.push_str(&paragraph("instructions", &c.description));
    let _ = write!(
        out,
        "<textarea class=\"code-editor\" spellcheck=\"false\">{}</textarea>",
        text(&c.default_code)
    );
    if let Some(outcome) = &c.expected_outcome {
        out.push_str(&paragraph("expected-outcome", outcome));
    }
    out
}

fn render_question(
    key: &str,
    question: &str,
    options: &[String],
    correct_answer: usize,
    explanation: Option<&str>,
    selected: Option<usize>,
) -> String {
    let fb = feedback(options.len(), correct_answer, explanation, selected);
    let mut out = paragraph("question", question);
    let _ = write!(out, "<ol class=\"options\" data-question=\"{}\">", attr(key));
    for (index, (option, mark)) in options.iter().zip(&fb.marks).enumerate() {
        let mut classes = String::from("option");
        if selected == Some(index) {
            classes.push_str(" selected");
        }
        if !mark.css_class().is_empty() {
            classes.push(' ');
            classes.push_str(mark.css_class());
        }
        let _ = write!(
            out,
            "<li class=\"{classes}\" data-index=\"{index}\">{}</li>",
            text(option)
        );
    }
    out.push_str("</ol>");
    if let Some(explanation) = &fb.explanation {
        out.push_str(&paragraph("explanation", explanation));
    }
    out
}

fn render_coding_exercise(c: &CodingExerciseContent) -> String {
    let mut out = heading(3, &c.title);
    out.push_str(&paragraph("description", &c.description));
    let _ = write!(
        out,
        "<textarea class=\"code-editor\" spellcheck=\"false\">{}</textarea>",
        text(&c.starter_code)
    );
    if !c.hints.is_empty() {
        let _ = write!(
            out,
            "<details class=\"hints\"><summary>Hints</summary>{}</details>",
            items("ol", &c.hints)
        );
    }
    out
}

fn render_quiz(c: &QuizContent, ctx: &BlockContext<'_>) -> String {
    let mut out = heading(3, &c.title);
    for (index, question) in c.questions.iter().enumerate() {
        let key = quiz_question_key(ctx.key, index);
        out.push_str("<div class=\"quiz-question\">");
        out.push_str(&render_question(
            &key,
            &question.question,
            &question.options,
            question.correct_answer,
            question.explanation.as_deref(),
            (ctx.nested_selected)(&key),
        ));
        out.push_str("</div>");
    }
    out
}

/// Answer key of the `index`-th question inside a quiz block.
pub fn quiz_question_key(block_key: &str, index: usize) -> String {
    format!("{}:{}", block_key, index)
}

/// True for `http`, `https` and relative URLs. Anything else (`javascript:`,
/// `data:`, ...) must not reach an `href` or `src`.
pub fn is_safe_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}

fn checked_url<'a>(kind: &str, raw: &'a str) -> Option<&'a str> {
    if is_safe_url(raw) {
        Some(raw)
    } else {
        warn!(kind, url = raw, "dropping url with a disallowed scheme");
        None
    }
}

fn render_image(c: &ImageContent) -> String {
    let mut out = String::from("<figure>");
    match checked_url("image", &c.url) {
        Some(url) => {
            let _ = write!(
                out,
                "<img src=\"{}\" alt=\"{}\" loading=\"lazy\">",
                attr(url),
                attr(&c.alt)
            );
        }
        None => out.push_str(&paragraph("alt", &c.alt)),
    }
    if let Some(caption) = &c.caption {
        let _ = write!(out, "<figcaption>{}</figcaption>", text(caption));
    }
    out.push_str("</figure>");
    out
}

fn render_video(c: &VideoContent) -> String {
    let mut out = heading(3, &c.title);
    if let Some(url) = checked_url("video", &c.url) {
        let _ = write!(
            out,
            "<iframe src=\"{}\" title=\"{}\" allowfullscreen></iframe>",
            attr(url),
            attr(&c.title)
        );
    }
    if let Some(description) = &c.description {
        out.push_str(&paragraph("description", description));
    }
    out
}

fn render_link(c: &LinkContent) -> String {
    let mut out = match checked_url("link", &c.url) {
        Some(url) => {
            let label = if c.text.is_empty() { url } else { c.text.as_str() };
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                attr(url),
                text(label)
            )
        }
        None => format!("<span class=\"link\">{}</span>", text(&c.text)),
    };
    if let Some(description) = &c.description {
        out.push_str(&paragraph("description", description));
    }
    out
}

fn render_example(c: &ExampleContent) -> String {
    let mut out = heading(3, &c.title);
    out.push_str(&code("", &c.code));
    if let Some(output) = &c.output {
        let _ = write!(out, "<pre class=\"output\">{}</pre>", text(output));
    }
    if let Some(explanation) = &c.explanation {
        out.push_str(&paragraph("explanation", explanation));
    }
    out
}

fn render_comparison(c: &ComparisonContent) -> String {
    let mut out = heading(3, &c.title);
    out.push_str("<table><thead><tr>");
    for header in &c.headers {
        let _ = write!(out, "<th>{}</th>", text(header));
    }
    out.push_str("</tr></thead><tbody>");
    for row in &c.rows {
        out.push_str("<tr>");
        for cell in row {
            let _ = write!(out, "<td>{}</td>", text(cell));
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(selected: Option<usize>, nested: &'a dyn Fn(&str) -> Option<usize>) -> BlockContext<'a> {
        BlockContext {
            key: "b1",
            selected,
            nested_selected: nested,
        }
    }

    #[test]
    fn text_is_escaped() {
        let html = render_content(
            &BlockContent::Text(TextContent {
                text: "<script>alert(1)</script>".to_string(),
            }),
            &ctx(None, &|_| None),
        );
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn code_snippet_carries_language_class() {
        let html = render_content(
            &BlockContent::CodeSnippet(CodeSnippetContent {
                title: "Ex".to_string(),
                language: "java".to_string(),
                code: "a < b".to_string(),
                explanation: None,
            }),
            &ctx(None, &|_| None),
        );
        assert!(html.contains("class=\"language-java\""));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn url_schemes_are_checked() {
        assert!(is_safe_url("https://example.com/a.png"));
        assert!(is_safe_url("http://example.com"));
        assert!(is_safe_url("/static/diagram.png"));
        assert!(is_safe_url("images/diagram.png"));
        assert!(!is_safe_url("javascript:alert(document.cookie)"));
        assert!(!is_safe_url("  JavaScript:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url("data:text/html,<script>alert(1)</script>"));
    }

    #[test]
    fn script_urls_are_not_rendered() {
        let link = render_content(
            &BlockContent::Link(LinkContent {
                url: "javascript:alert(document.cookie)".to_string(),
                text: "click".to_string(),
                ..Default::default()
            }),
            &ctx(None, &|_| None),
        );
        assert!(!link.contains("javascript:"));
        assert!(!link.contains("href="));
        assert!(link.contains("click"));

        let image = render_content(
            &BlockContent::Image(ImageContent {
                url: "javascript:alert(1)".to_string(),
                alt: "diagram".to_string(),
                ..Default::default()
            }),
            &ctx(None, &|_| None),
        );
        assert!(!image.contains("<img"));
        assert!(image.contains("diagram"));

        let video = render_content(
            &BlockContent::Video(VideoContent {
                url: "data:text/html,hi".to_string(),
                title: "Intro".to_string(),
                ..Default::default()
            }),
            &ctx(None, &|_| None),
        );
        assert!(!video.contains("<iframe"));
    }

    #[test]
    fn http_links_are_rendered() {
        let link = render_content(
            &BlockContent::Link(LinkContent {
                url: "https://docs.oracle.com/javase/".to_string(),
                text: "Docs".to_string(),
                ..Default::default()
            }),
            &ctx(None, &|_| None),
        );
        assert!(link.contains("href=\"https://docs.oracle.com/javase/\""));
    }

    #[test]
    fn wrong_mcq_pick_reveals_explanation() {
        let mcq = BlockContent::Mcq(McqContent {
            question: "2+2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct_answer: 1,
            explanation: Some("Basic arithmetic".to_string()),
        });

        let wrong = render_content(&mcq, &ctx(Some(0), &|_| None));
        assert!(wrong.contains("class=\"option selected incorrect\" data-index=\"0\""));
        assert!(wrong.contains("Basic arithmetic"));

        let right = render_content(&mcq, &ctx(Some(1), &|_| None));
        assert!(right.contains("class=\"option selected correct\" data-index=\"1\""));

        let unanswered = render_content(&mcq, &ctx(None, &|_| None));
        assert!(!unanswered.contains("Basic arithmetic"));
    }

    #[test]
    fn quiz_questions_read_nested_selections() {
        let quiz = BlockContent::Quiz(QuizContent {
            title: "Check".to_string(),
            questions: vec![QuizQuestion {
                question: "?".to_string(),
                options: vec!["a".to_string(), "b".to_string()],
                correct_answer: 0,
                explanation: None,
            }],
        });
        let lookup = |key: &str| (key == "b1:0").then_some(0);
        let html = render_content(&quiz, &ctx(None, &lookup));
        assert!(html.contains("option selected correct"));
    }
}
