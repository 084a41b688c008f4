//! Admin-side mutations of a lesson's block list.
//!
//! The list passed to [`BlockEditor`] is the single source of truth: every
//! edit lands on it immediately, nothing is staged. List-valued fields are
//! replaced with freshly built arrays, never modified in place.

pub mod form;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::content::{BlockContent, BlockKind, NormalizeError, canonicalize, normalize};
use crate::models::ContentBlock;
pub use form::{FieldSpec, FormField, InputKind, fields_for, form_for, type_choices};

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("no block at index {index} (lesson has {len})")]
    NoSuchBlock { index: usize, len: usize },

    #[error("{kind} blocks have no list field {field:?}")]
    NotAList { kind: BlockKind, field: String },

    #[error("no item {item} in {field:?} (has {len})")]
    NoSuchItem { field: String, item: usize, len: usize },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Returns `items` with `item` appended.
pub fn appended(items: &[Value], item: Value) -> Vec<Value> {
    let mut next = Vec::with_capacity(items.len() + 1);
    next.extend_from_slice(items);
    next.push(item);
    next
}

/// Returns `items` with position `index` replaced, or `None` if out of range.
pub fn replaced(items: &[Value], index: usize, item: Value) -> Option<Vec<Value>> {
    (index < items.len()).then(|| {
        items
            .iter()
            .enumerate()
            .map(|(i, v)| if i == index { item.clone() } else { v.clone() })
            .collect()
    })
}

/// Returns `items` without position `index`, or `None` if out of range.
pub fn removed(items: &[Value], index: usize) -> Option<Vec<Value>> {
    (index < items.len()).then(|| {
        items
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, v)| v.clone())
            .collect()
    })
}

/// Canonical fields of `block` that have a non-default value and do not
/// exist on `new_kind`. A type switch throws these away.
pub fn discarded_fields(block: &ContentBlock, new_kind: BlockKind) -> Vec<String> {
    let Ok(current) = normalize(block) else {
        return Vec::new();
    };
    if current.kind() == new_kind {
        return Vec::new();
    }

    let defaults = BlockContent::defaults(current.kind()).to_value();
    let kept: Vec<&str> = fields_for(new_kind).iter().map(|f| f.name).collect();
    let Value::Object(values) = current.to_value() else {
        return Vec::new();
    };

    values
        .into_iter()
        .filter(|(name, value)| defaults.get(name) != Some(value) && !kept.contains(&name.as_str()))
        .map(|(name, _)| name)
        .collect()
}

pub struct BlockEditor<'a> {
    blocks: &'a mut Vec<ContentBlock>,
}

impl<'a> BlockEditor<'a> {
    pub fn new(blocks: &'a mut Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        self.blocks
    }

    fn block_mut(&mut self, index: usize) -> Result<&mut ContentBlock, EditError> {
        let len = self.blocks.len();
        self.blocks
            .get_mut(index)
            .ok_or(EditError::NoSuchBlock { index, len })
    }

    /// Appends a block of `kind` with default content and `order = count + 1`.
    pub fn add(&mut self, kind: BlockKind) -> usize {
        let order = self.blocks.len() as u32 + 1;
        self.blocks.push(ContentBlock::new(kind, order));
        self.blocks.len() - 1
    }

    /// Merges `patch` into the block's content.
    ///
    /// The block is first rewritten to the canonical nested layout: legacy
    /// flat fields move into `content`, labeled MCQ options become plain
    /// strings with an explicit `correctAnswer`. Nothing the student view
    /// showed is lost and no stale field can shadow a later edit.
    pub fn update(&mut self, index: usize, patch: Map<String, Value>) -> Result<(), EditError> {
        let block = self.block_mut(index)?;
        *block = canonicalize(block)?;

        let mut content = block.content_object().cloned().unwrap_or_default();
        for (key, value) in patch {
            content.insert(key, value);
        }
        block.content = Some(Value::Object(content));
        Ok(())
    }

    pub fn set_field(&mut self, index: usize, field: &str, value: Value) -> Result<(), EditError> {
        let mut patch = Map::new();
        patch.insert(field.to_string(), value);
        self.update(index, patch)
    }

    /// Switches the block to `kind`, resetting its content to that kind's
    /// defaults. Returns the fields that were thrown away.
    pub fn change_type(&mut self, index: usize, kind: BlockKind) -> Result<Vec<String>, EditError> {
        let block = self.block_mut(index)?;
        let discarded = discarded_fields(block, kind);
        debug!(block = %block.key(), to = %kind, ?discarded, "changing block type");

        block.kind = Some(kind.as_str().to_string());
        block.content = Some(BlockContent::defaults(kind).to_value());
        block.legacy.clear();
        Ok(discarded)
    }

    /// Current canonical array behind list field `field`.
    fn list(&mut self, index: usize, field: &str) -> Result<Vec<Value>, EditError> {
        let block = self.block_mut(index)?;
        let content = normalize(block)?;
        let kind = content.kind();
        let is_list = form::field_spec(kind, field).is_some_and(|f| f.input.is_list());
        if !is_list {
            return Err(EditError::NotAList {
                kind,
                field: field.to_string(),
            });
        }
        Ok(content
            .to_value()
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub fn append_item(&mut self, index: usize, field: &str, item: Value) -> Result<(), EditError> {
        let items = self.list(index, field)?;
        self.set_field(index, field, Value::Array(appended(&items, item)))
    }

    pub fn edit_item(
        &mut self,
        index: usize,
        field: &str,
        item: usize,
        value: Value,
    ) -> Result<(), EditError> {
        let items = self.list(index, field)?;
        let len = items.len();
        let next = replaced(&items, item, value).ok_or_else(|| EditError::NoSuchItem {
            field: field.to_string(),
            item,
            len,
        })?;
        self.set_field(index, field, Value::Array(next))
    }

    /// Removes one item. Removing an MCQ option keeps `correctAnswer`
    /// pointing at the same option, or resets it to 0 if that option went.
    pub fn remove_item(&mut self, index: usize, field: &str, item: usize) -> Result<(), EditError> {
        let items = self.list(index, field)?;
        let len = items.len();
        let next = removed(&items, item).ok_or_else(|| EditError::NoSuchItem {
            field: field.to_string(),
            item,
            len,
        })?;

        let mut patch = Map::new();
        patch.insert(field.to_string(), Value::Array(next));
        if field == "options" {
            if let BlockContent::Mcq(mcq) = normalize(&self.blocks[index])? {
                let correct = match mcq.correct_answer {
                    c if c == item => 0,
                    c if c > item => c - 1,
                    c => c,
                };
                patch.insert("correctAnswer".to_string(), Value::from(correct));
            }
        }
        self.update(index, patch)
    }

    /// Swaps the block with its predecessor. Both get their new 1-based
    /// positions as `order`; no other block changes.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.blocks.len() {
            return false;
        }
        self.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.blocks.len() {
            return false;
        }
        self.swap(index, index + 1);
        true
    }

    fn swap(&mut self, upper: usize, lower: usize) {
        self.blocks.swap(upper, lower);
        self.blocks[upper].order = Some(upper as u32 + 1);
        self.blocks[lower].order = Some(lower as u32 + 1);
    }

    pub fn delete(&mut self, index: usize) -> Result<ContentBlock, EditError> {
        let len = self.blocks.len();
        if index >= len {
            return Err(EditError::NoSuchBlock { index, len });
        }
        Ok(self.blocks.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn lesson() -> Vec<ContentBlock> {
        serde_json::from_value(json!([
            { "_id": "a", "type": "text", "order": 1, "content": { "text": "a" } },
            { "_id": "b", "type": "text", "order": 2, "content": { "text": "b" } },
            { "_id": "c", "type": "text", "order": 3, "content": { "text": "c" } }
        ]))
        .unwrap()
    }

    fn orders(blocks: &[ContentBlock]) -> Vec<(String, u32)> {
        blocks
            .iter()
            .map(|b| (b.key(), b.order.unwrap_or(0)))
            .collect()
    }

    #[test]
    fn move_up_swaps_orders() {
        let mut blocks = lesson();
        assert!(BlockEditor::new(&mut blocks).move_up(2));
        assert_eq!(
            orders(&blocks),
            vec![("a".into(), 1), ("c".into(), 2), ("b".into(), 3)]
        );
    }

    #[test]
    fn move_down_swaps_orders() {
        let mut blocks = lesson();
        assert!(BlockEditor::new(&mut blocks).move_down(0));
        assert_eq!(
            orders(&blocks),
            vec![("b".into(), 1), ("a".into(), 2), ("c".into(), 3)]
        );
    }

    #[test]
    fn moves_past_the_ends_are_ignored() {
        let mut blocks = lesson();
        let mut editor = BlockEditor::new(&mut blocks);
        assert!(!editor.move_up(0));
        assert!(!editor.move_down(2));
        assert_eq!(orders(&blocks), orders(&lesson()));
    }

    #[test]
    fn update_migrates_legacy_blocks() {
        let mut blocks: Vec<ContentBlock> = serde_json::from_value(json!([{
            "type": "summary",
            "order": 1,
            "summaryTitle": "Old",
            "summaryDescription": "Keep me"
        }]))
        .unwrap();

        BlockEditor::new(&mut blocks)
            .set_field(0, "title", json!("New"))
            .unwrap();

        assert!(blocks[0].legacy.is_empty());
        assert_eq!(
            blocks[0].content,
            Some(json!({ "title": "New", "description": "Keep me" }))
        );
    }

    #[test]
    fn list_items_append_edit_remove() {
        let mut blocks = Vec::new();
        let mut editor = BlockEditor::new(&mut blocks);
        let i = editor.add(BlockKind::List);
        editor.append_item(i, "items", json!("one")).unwrap();
        editor.append_item(i, "items", json!("two")).unwrap();
        editor.edit_item(i, "items", 0, json!("uno")).unwrap();
        editor.remove_item(i, "items", 1).unwrap();

        assert_eq!(blocks[0].content.as_ref().unwrap()["items"], json!(["uno"]));
    }

    #[test]
    fn item_errors_are_reported() {
        let mut blocks = Vec::new();
        let mut editor = BlockEditor::new(&mut blocks);
        let i = editor.add(BlockKind::Summary);
        assert!(matches!(
            editor.append_item(i, "title", json!("x")),
            Err(EditError::NotAList { .. })
        ));

        let j = editor.add(BlockKind::List);
        assert!(matches!(
            editor.remove_item(j, "items", 0),
            Err(EditError::NoSuchItem { len: 0, .. })
        ));
        assert!(!editor.move_up(7));
        assert_eq!(
            editor.delete(7),
            Err(EditError::NoSuchBlock { index: 7, len: 2 })
        );
    }

    #[test]
    fn removing_an_option_keeps_the_correct_answer() {
        let mut blocks: Vec<ContentBlock> = serde_json::from_value(json!([{
            "type": "mcq",
            "order": 1,
            "content": { "question": "?", "options": ["a", "b", "c"], "correctAnswer": 2 }
        }]))
        .unwrap();

        BlockEditor::new(&mut blocks).remove_item(0, "options", 0).unwrap();
        let content = blocks[0].content.as_ref().unwrap();
        assert_eq!(content["options"], json!(["b", "c"]));
        assert_eq!(content["correctAnswer"], json!(1));
    }

    fn labeled_mcq() -> Vec<ContentBlock> {
        serde_json::from_value(json!([{
            "type": "mcq",
            "order": 1,
            "content": {
                "question": "2+2?",
                "options": [{ "text": "3", "isCorrect": false }, { "text": "4", "isCorrect": true }]
            }
        }]))
        .unwrap()
    }

    fn correct_answer(block: &ContentBlock) -> usize {
        match normalize(block).unwrap() {
            BlockContent::Mcq(mcq) => mcq.correct_answer,
            other => panic!("expected mcq, got {:?}", other),
        }
    }

    #[test]
    fn appending_an_option_keeps_labeled_correct_answer() {
        let mut blocks = labeled_mcq();
        assert_eq!(correct_answer(&blocks[0]), 1);

        BlockEditor::new(&mut blocks).append_item(0, "options", json!("5")).unwrap();

        let content = blocks[0].content.as_ref().unwrap();
        assert_eq!(content["options"], json!(["3", "4", "5"]));
        assert_eq!(content["correctAnswer"], json!(1));
        assert_eq!(correct_answer(&blocks[0]), 1);
    }

    #[test]
    fn editing_an_option_keeps_labeled_correct_answer() {
        let mut blocks = labeled_mcq();
        BlockEditor::new(&mut blocks)
            .edit_item(0, "options", 0, json!("three"))
            .unwrap();

        assert_eq!(blocks[0].content.as_ref().unwrap()["options"], json!(["three", "4"]));
        assert_eq!(correct_answer(&blocks[0]), 1);
    }

    #[test]
    fn editing_the_question_keeps_labeled_correct_answer() {
        let mut blocks = labeled_mcq();
        BlockEditor::new(&mut blocks)
            .set_field(0, "question", json!("Two plus two?"))
            .unwrap();
        assert_eq!(correct_answer(&blocks[0]), 1);
    }

    #[test]
    fn change_type_resets_content_and_reports_losses() {
        let mut blocks: Vec<ContentBlock> = serde_json::from_value(json!([{
            "type": "codeSnippet",
            "order": 1,
            "content": { "title": "T", "language": "java", "code": "x();" }
        }]))
        .unwrap();

        let discarded = BlockEditor::new(&mut blocks)
            .change_type(0, BlockKind::Summary)
            .unwrap();

        assert_eq!(discarded, vec!["code".to_string()]);
        assert_eq!(blocks[0].block_kind(), Some(BlockKind::Summary));
        assert_eq!(
            blocks[0].content,
            Some(json!({ "title": "", "description": "" }))
        );
    }
}
