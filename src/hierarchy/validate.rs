//! Pre-save gate shared by the admin client and the server.

use std::collections::HashSet;

use serde_json::Value;

use crate::content::{BlockContent, NormalizeError, canonicalize, normalize};
use crate::error::{FieldError, ValidationError};
use crate::models::{ContentBlock, Module};

pub fn validate_module(module: &Module) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    let label = if module.title.trim().is_empty() {
        module.id.clone()
    } else {
        module.title.clone()
    };

    if module.title.trim().is_empty() {
        errors.push(FieldError::new("title", "Module title is required"));
    }
    if module.course_id.trim().is_empty() {
        errors.push(FieldError::new("courseId", "Course id is required"));
    }
    if module.id.trim().is_empty() {
        errors.push(FieldError::new("id", "Module id is required"));
    }

    let mut seen = HashSet::new();
    for (s, sub) in module.sub_modules.iter().enumerate() {
        let path = format!("subModules[{}]", s);
        let sub_label = if sub.id.is_empty() {
            format!("#{}", s + 1)
        } else {
            format!("{:?}", sub.id)
        };

        if sub.id.trim().is_empty() {
            errors.push(FieldError::new(
                format!("{path}.id"),
                format!("Submodule {} in module {:?} needs an id", sub_label, label),
            ));
        } else if !seen.insert(sub.id.as_str()) {
            errors.push(FieldError::new(
                format!("{path}.id"),
                format!("Submodule id {} is used twice in module {:?}", sub_label, label),
            ));
        }
        if sub.title.trim().is_empty() {
            errors.push(FieldError::new(
                format!("{path}.title"),
                format!("Submodule {} needs a title", sub_label),
            ));
        }
        if sub.estimated_time == 0 {
            errors.push(FieldError::new(
                format!("{path}.estimatedTime"),
                format!("Submodule {} needs a positive estimated time", sub_label),
            ));
        }

        for (b, block) in sub.content_blocks.iter().enumerate() {
            let block_path = format!("{path}.contentBlocks[{}]", b);
            if let Some(error) = validate_block(block, &block_path, b + 1, &sub_label) {
                errors.push(error);
            }
        }
    }

    match errors.first() {
        None => Ok(()),
        Some(first) => Err(ValidationError {
            error: first.message.clone(),
            fields: errors,
        }),
    }
}

fn validate_block(
    block: &ContentBlock,
    path: &str,
    position: usize,
    sub_label: &str,
) -> Option<FieldError> {
    match normalize(block) {
        Err(NormalizeError::MissingType { .. }) => Some(FieldError::new(
            format!("{path}.type"),
            format!("Block {} in submodule {} is missing a type", position, sub_label),
        )),
        Err(NormalizeError::UnknownType { kind, .. }) => Some(FieldError::new(
            format!("{path}.type"),
            format!(
                "Block {} in submodule {} has unknown type {:?}",
                position, sub_label, kind
            ),
        )),
        Ok(BlockContent::Mcq(mcq)) if mcq.options.len() < 2 => Some(FieldError::new(
            format!("{path}.options"),
            format!(
                "Question block {} in submodule {} needs at least two options",
                position, sub_label
            ),
        )),
        Ok(_) => None,
    }
}

/// Validates, then returns the document as it goes over the wire: blocks
/// get an `order` if they lack one and empty arrays/objects are stripped.
pub fn prepare_for_save(module: &Module) -> Result<Module, ValidationError> {
    validate_module(module)?;

    let mut cleaned = module.clone();
    for sub in &mut cleaned.sub_modules {
        sub.content_blocks = sub
            .content_blocks
            .iter()
            .enumerate()
            .map(|(position, block)| clean_block(block, position))
            .collect();
        if sub.prerequisites.as_ref().is_some_and(Vec::is_empty) {
            sub.prerequisites = None;
        }
    }
    Ok(cleaned)
}

/// Rewrites the block in canonical shape before stripping. Stripping an
/// empty nested array would otherwise uncover the legacy value it hid.
fn clean_block(block: &ContentBlock, position: usize) -> ContentBlock {
    // Validation already rejected blocks that do not normalize.
    let mut cleaned = canonicalize(block).unwrap_or_else(|_| block.clone());
    if cleaned.order.is_none_or(|o| o == 0) {
        cleaned.order = Some(position as u32 + 1);
    }

    if let Some(content) = cleaned.content.as_mut() {
        strip_empty(content);
    }
    if cleaned.content.as_ref().is_some_and(is_empty) {
        cleaned.content = None;
    }

    cleaned.legacy.retain(|_, value| {
        strip_empty(value);
        !is_empty(value)
    });
    cleaned
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Drops empty arrays and objects from objects, recursively. Array elements
/// are cleaned but never removed, so positions stay meaningful.
pub fn strip_empty(value: &mut Value) {
    match value {
        Value::Object(map) => map.retain(|_, v| {
            strip_empty(v);
            !is_empty(v)
        }),
        Value::Array(items) => items.iter_mut().for_each(strip_empty),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubModule;
    use serde_json::json;

    fn module() -> Module {
        let mut module = Module::new("java", "basics", "Basics", 1);
        let mut sub = SubModule::new("hello", "Hello", 1);
        sub.content_blocks = serde_json::from_value(json!([
            { "type": "summary", "content": { "title": "T", "description": "D", "extra": [] } },
            { "type": "list", "order": 2, "content": { "items": [], "listType": "ordered" } }
        ]))
        .unwrap();
        module.sub_modules.push(sub);
        module
    }

    #[test]
    fn valid_module_is_cleaned() {
        let prepared = prepare_for_save(&module()).unwrap();
        let blocks = &prepared.sub_modules[0].content_blocks;
        assert_eq!(blocks[0].order, Some(1));
        assert_eq!(blocks[0].content, Some(json!({ "title": "T", "description": "D" })));
        assert_eq!(blocks[1].content, Some(json!({ "listType": "ordered" })));
    }

    #[test]
    fn missing_type_names_block_and_submodule() {
        let mut module = module();
        module.sub_modules[0].content_blocks[1].kind = None;

        let err = prepare_for_save(&module).unwrap_err();
        assert_eq!(err.fields.len(), 1);
        assert_eq!(err.fields[0].field, "subModules[0].contentBlocks[1].type");
        assert!(err.error.contains("Block 2"));
        assert!(err.error.contains("\"hello\""));
    }

    #[test]
    fn module_and_submodule_fields_are_required() {
        let mut module = module();
        module.title.clear();
        module.course_id.clear();
        module.sub_modules[0].id.clear();
        module.sub_modules[0].title.clear();

        let err = validate_module(&module).unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["title", "courseId", "subModules[0].id", "subModules[0].title"]
        );
    }

    #[test]
    fn mcq_needs_two_options() {
        let mut module = module();
        module.sub_modules[0].content_blocks = serde_json::from_value(json!([
            { "type": "mcq", "order": 1, "content": { "question": "?", "options": ["only"] } }
        ]))
        .unwrap();
        let err = validate_module(&module).unwrap_err();
        assert_eq!(err.fields[0].field, "subModules[0].contentBlocks[0].options");
    }

    #[test]
    fn saving_never_uncovers_hidden_legacy_values() {
        let mut module = module();
        module.sub_modules[0].content_blocks = serde_json::from_value(json!([
            {
                "type": "keyFeatures",
                "order": 1,
                "features": ["stale"],
                "content": { "title": "T", "features": [] }
            },
            {
                "type": "mcq",
                "order": 2,
                "content": {
                    "question": "2+2?",
                    "options": [{ "text": "3", "isCorrect": false }, { "text": "4", "isCorrect": true }]
                }
            },
            {
                "type": "codeSnippet",
                "order": 3,
                "codeSnippet": { "title": "Ex", "language": "java", "code": "x();" }
            }
        ]))
        .unwrap();

        let prepared = prepare_for_save(&module).unwrap();
        let before = &module.sub_modules[0].content_blocks;
        let after = &prepared.sub_modules[0].content_blocks;
        for (old, new) in before.iter().zip(after) {
            assert_eq!(normalize(old).unwrap(), normalize(new).unwrap());
            assert!(new.legacy.is_empty());
        }
        assert_eq!(
            normalize(&after[0]).unwrap(),
            BlockContent::KeyFeatures(crate::content::schema::KeyFeaturesContent {
                title: "T".to_string(),
                features: Vec::new(),
            })
        );
    }

    #[test]
    fn strip_keeps_array_positions() {
        let mut value = json!({ "rows": [[], ["a"]], "meta": { "tags": [] }, "text": "" });
        strip_empty(&mut value);
        assert_eq!(value, json!({ "rows": [[], ["a"]], "text": "" }));
    }
}
