//! Reconciles the nested `content.*` layout with the flat legacy layout.
//!
//! Every field resolves in the same order: the nested `content` object, then
//! the legacy flat field(s) on the block, then the kind's default. `null` and
//! empty strings count as absent at every step; an empty array is a value.

use serde_json::{Map, Value};

use super::options::{McqOption, normalize_options};
use super::schema::*;
use crate::models::ContentBlock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("block {key} has no type")]
    MissingType { key: String },

    #[error("block {key} has unknown type {kind:?}")]
    UnknownType { key: String, kind: String },
}

/// Display text of a scalar. Numbers and booleans are stringified.
pub fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn strings_of(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(text_of).collect()),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

/// Non-negative whole number, also when written as `1.0` or `"1"`.
fn index_of(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize).or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as usize)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Dotted path lookup, e.g. `codeSnippet.code`.
fn lookup<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = map.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// The two places a field may live in, queried in resolution order.
struct FieldSource<'a> {
    nested: Option<&'a Map<String, Value>>,
    flat: Option<&'a Map<String, Value>>,
}

impl<'a> FieldSource<'a> {
    fn for_block(block: &'a ContentBlock) -> Self {
        Self {
            nested: block.content_object(),
            flat: Some(&block.legacy),
        }
    }

    fn for_record(record: &'a Map<String, Value>) -> Self {
        Self {
            nested: Some(record),
            flat: None,
        }
    }

    /// First present value of the right shape. `names` are looked up in the
    /// nested object, `legacy` are dotted paths on the flat block.
    fn find<T>(
        &self,
        names: &[&str],
        legacy: &[&str],
        parse: impl Fn(&'a Value) -> Option<T>,
    ) -> Option<T> {
        if let Some(nested) = self.nested {
            for name in names {
                if let Some(value) = nested.get(*name).filter(|v| !is_absent(v)) {
                    if let Some(parsed) = parse(value) {
                        return Some(parsed);
                    }
                }
            }
        }
        if let Some(flat) = self.flat {
            for path in legacy {
                if let Some(value) = lookup(flat, path).filter(|v| !is_absent(v)) {
                    if let Some(parsed) = parse(value) {
                        return Some(parsed);
                    }
                }
            }
        }
        None
    }

    fn opt_string(&self, names: &[&str], legacy: &[&str]) -> Option<String> {
        self.find(names, legacy, text_of)
    }

    fn string(&self, names: &[&str], legacy: &[&str]) -> String {
        self.opt_string(names, legacy).unwrap_or_default()
    }

    fn strings(&self, names: &[&str], legacy: &[&str]) -> Vec<String> {
        self.find(names, legacy, strings_of).unwrap_or_default()
    }

    fn index(&self, names: &[&str], legacy: &[&str]) -> Option<usize> {
        self.find(names, legacy, index_of)
    }

    fn array(&self, names: &[&str], legacy: &[&str]) -> &'a [Value] {
        self.find(names, legacy, |v| v.as_array().map(Vec::as_slice))
            .unwrap_or(&[])
    }
}

/// Resolves the block's kind and normalizes its content.
pub fn normalize(block: &ContentBlock) -> Result<BlockContent, NormalizeError> {
    let kind = match block.kind.as_deref() {
        None | Some("") => return Err(NormalizeError::MissingType { key: block.key() }),
        Some(raw) => raw.parse::<BlockKind>().map_err(|_| NormalizeError::UnknownType {
            key: block.key(),
            kind: raw.to_string(),
        })?,
    };
    Ok(normalize_as(block, kind))
}

/// Rewrites a block into the canonical nested shape, dropping legacy fields.
/// Normalizing the result again yields the same content.
pub fn canonicalize(block: &ContentBlock) -> Result<ContentBlock, NormalizeError> {
    let content = normalize(block)?;
    Ok(ContentBlock {
        id: block.id.clone(),
        kind: Some(content.kind().as_str().to_string()),
        order: block.order,
        content: Some(content.to_value()),
        legacy: Map::new(),
    })
}

/// Normalizes `block` as if it were of `kind`, whatever its `type` says.
pub fn normalize_as(block: &ContentBlock, kind: BlockKind) -> BlockContent {
    let f = FieldSource::for_block(block);
    // Some old text blocks stored the text directly as `content: "..."`.
    let inline_text = block
        .content
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    match kind {
        BlockKind::Text => BlockContent::Text(TextContent {
            text: inline_text.unwrap_or_else(|| f.string(&["text"], &["text", "textContent"])),
        }),
        BlockKind::Heading => BlockContent::Heading(HeadingContent {
            text: inline_text
                .unwrap_or_else(|| f.string(&["text"], &["text", "heading", "headingText"])),
            level: f
                .index(&["level"], &["level", "headingLevel"])
                .map(|level| level.clamp(1, 6) as u8)
                .unwrap_or(2),
        }),
        BlockKind::List => BlockContent::List(ListContent {
            items: f.strings(&["items"], &["items", "listItems"]),
            list_type: match f.opt_string(&["listType"], &["listType"]).as_deref() {
                Some("ordered") => ListType::Ordered,
                _ => ListType::Unordered,
            },
        }),
        BlockKind::CodeSnippet => BlockContent::CodeSnippet(CodeSnippetContent {
            title: f.string(&["title"], &["codeSnippet.title", "codeTitle", "title"]),
            language: f.string(&["language"], &["codeSnippet.language", "language"]),
            code: f.string(&["code"], &["codeSnippet.code", "code"]),
            explanation: f.opt_string(
                &["explanation"],
                &["codeSnippet.explanation", "explanation"],
            ),
        }),
        BlockKind::Summary => BlockContent::Summary(SummaryContent {
            title: f.string(&["title"], &["summaryTitle", "summary.title", "title"]),
            description: f.string(
                &["description"],
                &["summaryDescription", "summary.description", "description"],
            ),
        }),
        BlockKind::KeyFeatures => BlockContent::KeyFeatures(KeyFeaturesContent {
            title: f.string(&["title"], &["keyFeaturesTitle", "keyFeatures.title", "title"]),
            features: f.strings(&["features"], &["keyFeatures.features", "keyFeatures", "features"]),
        }),
        BlockKind::ConceptExplanation => {
            BlockContent::ConceptExplanation(ConceptExplanationContent {
                title: f.string(
                    &["title"],
                    &["conceptTitle", "conceptExplanation.title", "title"],
                ),
                sections: f
                    .array(&["sections"], &["conceptExplanation.sections", "sections"])
                    .iter()
                    .filter_map(Value::as_object)
                    .map(concept_section)
                    .collect(),
                concept: f.opt_string(&["concept"], &["conceptExplanation.concept", "concept"]),
                explanation: f.opt_string(
                    &["explanation"],
                    &["conceptExplanation.explanation", "explanation"],
                ),
                examples: f.strings(&["examples"], &["conceptExplanation.examples", "examples"]),
            })
        }
        BlockKind::ImportantNote => BlockContent::ImportantNote(ImportantNoteContent {
            title: f.string(&["title"], &["noteTitle", "importantNote.title", "title"]),
            points: f.strings(&["points"], &["importantNote.points", "notePoints", "points"]),
            description: f.opt_string(
                &["description"],
                &["importantNote.description", "noteDescription", "description"],
            ),
        }),
        BlockKind::MistakesToAvoid => BlockContent::MistakesToAvoid(MistakesToAvoidContent {
            title: f.string(&["title"], &["mistakesTitle", "mistakesToAvoid.title", "title"]),
            mistakes: f.strings(&["mistakes"], &["mistakesToAvoid.mistakes", "mistakes"]),
            alternatives: f.strings(
                &["alternatives"],
                &["mistakesToAvoid.alternatives", "alternatives"],
            ),
        }),
        BlockKind::Timeline => BlockContent::Timeline(TimelineContent {
            title: f.string(&["title"], &["timelineTitle", "timeline.title", "title"]),
            events: f
                .array(&["events"], &["timeline.events", "timelineEvents", "events"])
                .iter()
                .filter_map(Value::as_object)
                .map(timeline_event)
                .collect(),
        }),
        BlockKind::HandsOn => BlockContent::HandsOn(HandsOnContent {
            title: f.string(&["title"], &["handsOn.title", "handsOnTitle", "title"]),
            description: f.string(
                &["description", "instructions"],
                &[
                    "handsOn.description",
                    "handsOn.instructions",
                    "description",
                    "instructions",
                ],
            ),
            default_code: f.string(
                &["defaultCode", "starterCode"],
                &["handsOn.defaultCode", "defaultCode", "starterCode"],
            ),
            expected_outcome: f.opt_string(
                &["expectedOutcome"],
                &["handsOn.expectedOutcome", "expectedOutcome"],
            ),
        }),
        BlockKind::Mcq => {
            let raw: Vec<McqOption> = f
                .array(&["options"], &["mcq.options", "options"])
                .iter()
                .map(McqOption::from)
                .collect();
            let explicit = f.index(&["correctAnswer"], &["mcq.correctAnswer", "correctAnswer"]);
            let normalized = normalize_options(&raw, explicit);
            BlockContent::Mcq(McqContent {
                question: f.string(&["question"], &["mcq.question", "question"]),
                options: normalized.options,
                correct_answer: normalized.correct_answer,
                explanation: f.opt_string(&["explanation"], &["mcq.explanation", "explanation"]),
            })
        }
        BlockKind::CodingExercise => BlockContent::CodingExercise(CodingExerciseContent {
            title: f.string(
                &["title"],
                &["codingExercise.title", "exerciseTitle", "title"],
            ),
            description: f.string(
                &["description"],
                &["codingExercise.description", "description"],
            ),
            starter_code: f.string(
                &["starterCode"],
                &["codingExercise.starterCode", "starterCode"],
            ),
            hints: f.strings(&["hints"], &["codingExercise.hints", "hints"]),
        }),
        BlockKind::Quiz => BlockContent::Quiz(QuizContent {
            title: f.string(&["title"], &["quizTitle", "quiz.title", "title"]),
            questions: f
                .array(&["questions"], &["quiz.questions", "questions"])
                .iter()
                .filter_map(Value::as_object)
                .map(quiz_question)
                .collect(),
        }),
        BlockKind::Image => BlockContent::Image(ImageContent {
            url: f.string(&["url", "src"], &["imageUrl", "image.url", "url", "src"]),
            alt: f.string(&["alt"], &["imageAlt", "image.alt", "alt"]),
            caption: f.opt_string(&["caption"], &["imageCaption", "image.caption", "caption"]),
        }),
        BlockKind::Video => BlockContent::Video(VideoContent {
            url: f.string(&["url"], &["videoUrl", "video.url", "url"]),
            title: f.string(&["title"], &["videoTitle", "video.title", "title"]),
            description: f.opt_string(
                &["description"],
                &["videoDescription", "video.description", "description"],
            ),
        }),
        BlockKind::Link => BlockContent::Link(LinkContent {
            url: f.string(&["url", "href"], &["linkUrl", "link.url", "url", "href"]),
            text: f.string(&["text"], &["linkText", "link.text", "text"]),
            description: f.opt_string(
                &["description"],
                &["linkDescription", "link.description", "description"],
            ),
        }),
        BlockKind::Example => BlockContent::Example(ExampleContent {
            title: f.string(&["title"], &["exampleTitle", "example.title", "title"]),
            code: f.string(&["code"], &["exampleCode", "example.code", "code"]),
            explanation: f.opt_string(&["explanation"], &["example.explanation", "explanation"]),
            output: f.opt_string(&["output"], &["example.output", "output"]),
        }),
        BlockKind::Comparison => BlockContent::Comparison(ComparisonContent {
            title: f.string(&["title"], &["comparisonTitle", "comparison.title", "title"]),
            headers: f.strings(&["headers"], &["comparison.headers", "headers"]),
            rows: f
                .array(&["rows"], &["comparison.rows", "rows"])
                .iter()
                .filter_map(strings_of)
                .collect(),
        }),
    }
}

fn concept_section(record: &Map<String, Value>) -> ConceptSection {
    let f = FieldSource::for_record(record);
    ConceptSection {
        icon: f.string(&["icon"], &[]),
        title: f.string(&["title"], &[]),
        content: f.strings(&["content", "points"], &[]),
        code: f.opt_string(&["code"], &[]),
    }
}

fn timeline_event(record: &Map<String, Value>) -> TimelineEvent {
    let f = FieldSource::for_record(record);
    TimelineEvent {
        year: f.string(&["year", "date"], &[]),
        title: f.string(&["title"], &[]),
        description: f.string(&["description"], &[]),
    }
}

fn quiz_question(record: &Map<String, Value>) -> QuizQuestion {
    let f = FieldSource::for_record(record);
    let raw: Vec<McqOption> = f.array(&["options"], &[]).iter().map(McqOption::from).collect();
    let normalized = normalize_options(&raw, f.index(&["correctAnswer"], &[]));
    QuizQuestion {
        question: f.string(&["question"], &[]),
        options: normalized.options,
        correct_answer: normalized.correct_answer,
        explanation: f.opt_string(&["explanation"], &[]),
    }
}
