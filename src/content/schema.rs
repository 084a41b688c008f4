//! The closed set of block kinds and the canonical content record of each.
//!
//! Every dispatch point (rendering, form selection, serialization) matches on
//! [`BlockKind`] or [`BlockContent`] exhaustively, so a new kind has to be
//! handled everywhere before the crate compiles again.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Text,
    Heading,
    List,
    CodeSnippet,
    Summary,
    KeyFeatures,
    ConceptExplanation,
    ImportantNote,
    MistakesToAvoid,
    Timeline,
    HandsOn,
    Mcq,
    CodingExercise,
    Quiz,
    Image,
    Video,
    Link,
    Example,
    Comparison,
}

impl BlockKind {
    pub const ALL: [BlockKind; 19] = [
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::List,
        BlockKind::CodeSnippet,
        BlockKind::Summary,
        BlockKind::KeyFeatures,
        BlockKind::ConceptExplanation,
        BlockKind::ImportantNote,
        BlockKind::MistakesToAvoid,
        BlockKind::Timeline,
        BlockKind::HandsOn,
        BlockKind::Mcq,
        BlockKind::CodingExercise,
        BlockKind::Quiz,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Link,
        BlockKind::Example,
        BlockKind::Comparison,
    ];

    /// Wire name used in the block's `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading => "heading",
            BlockKind::List => "list",
            BlockKind::CodeSnippet => "codeSnippet",
            BlockKind::Summary => "summary",
            BlockKind::KeyFeatures => "keyFeatures",
            BlockKind::ConceptExplanation => "conceptExplanation",
            BlockKind::ImportantNote => "importantNote",
            BlockKind::MistakesToAvoid => "mistakesToAvoid",
            BlockKind::Timeline => "timeline",
            BlockKind::HandsOn => "handsOn",
            BlockKind::Mcq => "mcq",
            BlockKind::CodingExercise => "codingExercise",
            BlockKind::Quiz => "quiz",
            BlockKind::Image => "image",
            BlockKind::Video => "video",
            BlockKind::Link => "link",
            BlockKind::Example => "example",
            BlockKind::Comparison => "comparison",
        }
    }

    /// Human label for the admin type selector.
    pub fn label(self) -> &'static str {
        match self {
            BlockKind::Text => "Text",
            BlockKind::Heading => "Heading",
            BlockKind::List => "List",
            BlockKind::CodeSnippet => "Code Snippet",
            BlockKind::Summary => "Summary",
            BlockKind::KeyFeatures => "Key Features",
            BlockKind::ConceptExplanation => "Concept Explanation",
            BlockKind::ImportantNote => "Important Note",
            BlockKind::MistakesToAvoid => "Mistakes to Avoid",
            BlockKind::Timeline => "Timeline",
            BlockKind::HandsOn => "Hands-On Exercise",
            BlockKind::Mcq => "Multiple Choice Question",
            BlockKind::CodingExercise => "Coding Exercise",
            BlockKind::Quiz => "Quiz",
            BlockKind::Image => "Image",
            BlockKind::Video => "Video",
            BlockKind::Link => "Link",
            BlockKind::Example => "Example",
            BlockKind::Comparison => "Comparison Table",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block type: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Ordered,
    #[default]
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingContent {
    pub text: String,
    pub level: u8,
}

impl Default for HeadingContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            level: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListContent {
    pub items: Vec<String>,
    pub list_type: ListType,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeSnippetContent {
    pub title: String,
    pub language: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryContent {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyFeaturesContent {
    pub title: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConceptSection {
    pub icon: String,
    pub title: String,
    pub content: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Either a list of sections or the older single-concept layout
/// (`concept` + `explanation` + `examples`). Both are kept as authored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConceptExplanationContent {
    pub title: String,
    pub sections: Vec<ConceptSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportantNoteContent {
    pub title: String,
    pub points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MistakesToAvoidContent {
    pub title: String,
    pub mistakes: Vec<String>,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub year: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimelineContent {
    pub title: String,
    pub events: Vec<TimelineEvent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandsOnContent {
    pub title: String,
    pub description: String,
    pub default_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McqContent {
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingExerciseContent {
    pub title: String,
    pub description: String,
    pub starter_code: String,
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuizContent {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageContent {
    pub url: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoContent {
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkContent {
    pub url: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExampleContent {
    pub title: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonContent {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Canonical, fully populated content of one block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(TextContent),
    Heading(HeadingContent),
    List(ListContent),
    CodeSnippet(CodeSnippetContent),
    Summary(SummaryContent),
    KeyFeatures(KeyFeaturesContent),
    ConceptExplanation(ConceptExplanationContent),
    ImportantNote(ImportantNoteContent),
    MistakesToAvoid(MistakesToAvoidContent),
    Timeline(TimelineContent),
    HandsOn(HandsOnContent),
    Mcq(McqContent),
    CodingExercise(CodingExerciseContent),
    Quiz(QuizContent),
    Image(ImageContent),
    Video(VideoContent),
    Link(LinkContent),
    Example(ExampleContent),
    Comparison(ComparisonContent),
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Heading(_) => BlockKind::Heading,
            BlockContent::List(_) => BlockKind::List,
            BlockContent::CodeSnippet(_) => BlockKind::CodeSnippet,
            BlockContent::Summary(_) => BlockKind::Summary,
            BlockContent::KeyFeatures(_) => BlockKind::KeyFeatures,
            BlockContent::ConceptExplanation(_) => BlockKind::ConceptExplanation,
            BlockContent::ImportantNote(_) => BlockKind::ImportantNote,
            BlockContent::MistakesToAvoid(_) => BlockKind::MistakesToAvoid,
            BlockContent::Timeline(_) => BlockKind::Timeline,
            BlockContent::HandsOn(_) => BlockKind::HandsOn,
            BlockContent::Mcq(_) => BlockKind::Mcq,
            BlockContent::CodingExercise(_) => BlockKind::CodingExercise,
            BlockContent::Quiz(_) => BlockKind::Quiz,
            BlockContent::Image(_) => BlockKind::Image,
            BlockContent::Video(_) => BlockKind::Video,
            BlockContent::Link(_) => BlockKind::Link,
            BlockContent::Example(_) => BlockKind::Example,
            BlockContent::Comparison(_) => BlockKind::Comparison,
        }
    }

    /// Content a freshly created (or type-switched) block starts with.
    pub fn defaults(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => BlockContent::Text(Default::default()),
            BlockKind::Heading => BlockContent::Heading(Default::default()),
            BlockKind::List => BlockContent::List(Default::default()),
            BlockKind::CodeSnippet => BlockContent::CodeSnippet(CodeSnippetContent {
                language: "java".to_string(),
                ..Default::default()
            }),
            BlockKind::Summary => BlockContent::Summary(Default::default()),
            BlockKind::KeyFeatures => BlockContent::KeyFeatures(Default::default()),
            BlockKind::ConceptExplanation => {
                BlockContent::ConceptExplanation(Default::default())
            }
            BlockKind::ImportantNote => BlockContent::ImportantNote(Default::default()),
            BlockKind::MistakesToAvoid => BlockContent::MistakesToAvoid(Default::default()),
            BlockKind::Timeline => BlockContent::Timeline(Default::default()),
            BlockKind::HandsOn => BlockContent::HandsOn(Default::default()),
            BlockKind::Mcq => BlockContent::Mcq(McqContent {
                options: vec![String::new(), String::new()],
                ..Default::default()
            }),
            BlockKind::CodingExercise => BlockContent::CodingExercise(Default::default()),
            BlockKind::Quiz => BlockContent::Quiz(Default::default()),
            BlockKind::Image => BlockContent::Image(Default::default()),
            BlockKind::Video => BlockContent::Video(Default::default()),
            BlockKind::Link => BlockContent::Link(Default::default()),
            BlockKind::Example => BlockContent::Example(Default::default()),
            BlockKind::Comparison => BlockContent::Comparison(Default::default()),
        }
    }

    /// The nested `content` object written back to the wire.
    pub fn to_value(&self) -> Value {
        let value = match self {
            BlockContent::Text(c) => serde_json::to_value(c),
            BlockContent::Heading(c) => serde_json::to_value(c),
            BlockContent::List(c) => serde_json::to_value(c),
            BlockContent::CodeSnippet(c) => serde_json::to_value(c),
            BlockContent::Summary(c) => serde_json::to_value(c),
            BlockContent::KeyFeatures(c) => serde_json::to_value(c),
            BlockContent::ConceptExplanation(c) => serde_json::to_value(c),
            BlockContent::ImportantNote(c) => serde_json::to_value(c),
            BlockContent::MistakesToAvoid(c) => serde_json::to_value(c),
            BlockContent::Timeline(c) => serde_json::to_value(c),
            BlockContent::HandsOn(c) => serde_json::to_value(c),
            BlockContent::Mcq(c) => serde_json::to_value(c),
            BlockContent::CodingExercise(c) => serde_json::to_value(c),
            BlockContent::Quiz(c) => serde_json::to_value(c),
            BlockContent::Image(c) => serde_json::to_value(c),
            BlockContent::Video(c) => serde_json::to_value(c),
            BlockContent::Link(c) => serde_json::to_value(c),
            BlockContent::Example(c) => serde_json::to_value(c),
            BlockContent::Comparison(c) => serde_json::to_value(c),
        };
        // Plain derived structs of strings, vectors and integers always serialize.
        value.unwrap_or(Value::Null)
    }
}
