//! Per-kind form descriptors for the admin block editor.

use serde::Serialize;
use serde_json::Value;

use crate::content::{BlockKind, NormalizeError, normalize};
use crate::models::ContentBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "input", rename_all = "camelCase")]
pub enum InputKind {
    Text,
    TextArea,
    Code,
    Url,
    Number { min: u32, max: u32 },
    Select { choices: &'static [&'static str] },
    StringList,
    /// MCQ options with a correct-answer picker bound to `correctAnswer`.
    Options,
    /// List of records with the given string fields.
    Records { fields: &'static [&'static str] },
    /// Quiz questions: records of question, options, correctAnswer.
    Questions,
    /// Rows of cells, one per header.
    Table,
}

impl InputKind {
    pub fn is_list(self) -> bool {
        matches!(
            self,
            InputKind::StringList
                | InputKind::Options
                | InputKind::Records { .. }
                | InputKind::Questions
                | InputKind::Table
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Key inside the block's `content` object.
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
}

const fn field(name: &'static str, label: &'static str, input: InputKind, required: bool) -> FieldSpec {
    FieldSpec {
        name,
        label,
        input,
        required,
    }
}

const TITLE: FieldSpec = field("title", "Title", InputKind::Text, true);
const DESCRIPTION: FieldSpec = field("description", "Description", InputKind::TextArea, true);
const EXPLANATION: FieldSpec = field("explanation", "Explanation", InputKind::TextArea, false);

pub fn fields_for(kind: BlockKind) -> Vec<FieldSpec> {
    match kind {
        BlockKind::Text => vec![field("text", "Text", InputKind::TextArea, true)],
        BlockKind::Heading => vec![
            field("text", "Heading", InputKind::Text, true),
            field("level", "Level", InputKind::Number { min: 1, max: 6 }, true),
        ],
        BlockKind::List => vec![
            field("items", "Items", InputKind::StringList, true),
            field(
                "listType",
                "List type",
                InputKind::Select {
                    choices: &["unordered", "ordered"],
                },
                true,
            ),
        ],
        BlockKind::CodeSnippet => vec![
            TITLE,
            field("language", "Language", InputKind::Text, true),
            field("code", "Code", InputKind::Code, true),
            EXPLANATION,
        ],
        BlockKind::Summary => vec![TITLE, DESCRIPTION],
        BlockKind::KeyFeatures => vec![TITLE, field("features", "Features", InputKind::StringList, true)],
        BlockKind::ConceptExplanation => vec![
            TITLE,
            field(
                "sections",
                "Sections",
                InputKind::Records {
                    fields: &["icon", "title", "content", "code"],
                },
                false,
            ),
            field("concept", "Concept", InputKind::TextArea, false),
            EXPLANATION,
            field("examples", "Examples", InputKind::StringList, false),
        ],
        BlockKind::ImportantNote => vec![
            TITLE,
            field("points", "Points", InputKind::StringList, false),
            field("description", "Description", InputKind::TextArea, false),
        ],
        BlockKind::MistakesToAvoid => vec![
            TITLE,
            field("mistakes", "Mistakes", InputKind::StringList, true),
            field("alternatives", "Alternatives", InputKind::StringList, false),
        ],
        BlockKind::Timeline => vec![
            TITLE,
            field(
                "events",
                "Events",
                InputKind::Records {
                    fields: &["year", "title", "description"],
                },
                true,
            ),
        ],
        BlockKind::HandsOn => vec![
            TITLE,
            DESCRIPTION,
            field("defaultCode", "Default code", InputKind::Code, true),
            field("expectedOutcome", "Expected outcome", InputKind::TextArea, false),
        ],
        BlockKind::Mcq => vec![
            field("question", "Question", InputKind::TextArea, true),
            field("options", "Options", InputKind::Options, true),
            EXPLANATION,
        ],
        BlockKind::CodingExercise => vec![
            TITLE,
            DESCRIPTION,
            field("starterCode", "Starter code", InputKind::Code, true),
            field("hints", "Hints", InputKind::StringList, false),
        ],
        BlockKind::Quiz => vec![TITLE, field("questions", "Questions", InputKind::Questions, true)],
        BlockKind::Image => vec![
            field("url", "Image URL", InputKind::Url, true),
            field("alt", "Alt text", InputKind::Text, true),
            field("caption", "Caption", InputKind::Text, false),
        ],
        BlockKind::Video => vec![
            field("url", "Video URL", InputKind::Url, true),
            TITLE,
            field("description", "Description", InputKind::TextArea, false),
        ],
        BlockKind::Link => vec![
            field("url", "URL", InputKind::Url, true),
            field("text", "Link text", InputKind::Text, true),
            field("description", "Description", InputKind::TextArea, false),
        ],
        BlockKind::Example => vec![
            TITLE,
            field("code", "Code", InputKind::Code, true),
            EXPLANATION,
            field("output", "Output", InputKind::Code, false),
        ],
        BlockKind::Comparison => vec![
            TITLE,
            field("headers", "Headers", InputKind::StringList, true),
            field("rows", "Rows", InputKind::Table, true),
        ],
    }
}

pub fn field_spec(kind: BlockKind, name: &str) -> Option<FieldSpec> {
    fields_for(kind).into_iter().find(|f| f.name == name)
}

/// A form input with its current value read through the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub value: Value,
}

/// Entries for the type selector, in display order.
pub fn type_choices() -> Vec<(BlockKind, &'static str)> {
    BlockKind::ALL.iter().map(|k| (*k, k.label())).collect()
}

pub fn form_for(block: &ContentBlock) -> Result<Vec<FormField>, NormalizeError> {
    let content = normalize(block)?;
    let value = content.to_value();

    Ok(fields_for(content.kind())
        .into_iter()
        .map(|spec| FormField {
            value: value.get(spec.name).cloned().unwrap_or(Value::Null),
            spec,
        })
        .collect())
}
