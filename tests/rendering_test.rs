use coursebook::content::{BlockContent, BlockKind, normalize};
use coursebook::editor::BlockEditor;
use coursebook::models::ContentBlock;
use coursebook::render::{AnswerBook, LessonRenderer};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn blocks(value: Value) -> Vec<ContentBlock> {
    serde_json::from_value(value).unwrap()
}

#[test]
fn legacy_code_snippet_renders_before_summary() {
    let lesson = LessonRenderer::new().render_blocks(&blocks(json!([
        { "type": "summary", "order": 2, "content": { "title": "T", "description": "D" } },
        {
            "type": "codeSnippet",
            "order": 1,
            "codeSnippet": { "title": "Ex", "language": "java", "code": "System.out.println(1);" }
        }
    ])));

    let kinds: Vec<BlockKind> = lesson.blocks.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![BlockKind::CodeSnippet, BlockKind::Summary]);

    match &lesson.blocks[0].content {
        BlockContent::CodeSnippet(snippet) => {
            assert_eq!(snippet.language, "java");
            assert_eq!(snippet.code, "System.out.println(1);");
        }
        other => panic!("expected code snippet, got {:?}", other),
    }
}

#[test]
fn order_wins_over_input_position() {
    let inputs = [[1, 2, 3], [3, 1, 2], [2, 3, 1], [3, 2, 1]];
    for orders in inputs {
        let raw: Vec<Value> = orders
            .iter()
            .map(|o| json!({ "type": "text", "order": o, "content": { "text": format!("t{}", o) } }))
            .collect();
        let lesson = LessonRenderer::new().render_blocks(&blocks(Value::Array(raw)));
        let html = lesson.to_html();
        let positions: Vec<usize> = ["t1", "t2", "t3"]
            .iter()
            .map(|t| html.find(t).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "orders {:?}", orders);
    }
}

#[test]
fn bogus_block_leaves_siblings_alone() {
    let lesson = LessonRenderer::new().render_blocks(&blocks(json!([
        { "type": "heading", "order": 1, "content": { "text": "Intro" } },
        { "type": "bogus", "order": 2, "content": { "text": "ghost" } },
        { "type": "text", "order": 3, "content": { "text": "body" } }
    ])));

    assert_eq!(lesson.blocks.len(), 2);
    let html = lesson.to_html();
    assert!(html.contains("Intro"));
    assert!(html.contains("body"));
    assert!(!html.contains("ghost"));
}

#[test]
fn mcq_selection_marks_options() {
    let raw = blocks(json!([{
        "_id": "q1",
        "type": "mcq",
        "order": 1,
        "content": {
            "question": "2+2?",
            "options": [{ "text": "3", "isCorrect": false }, { "text": "4", "isCorrect": true }],
            "explanation": "Two pairs make four."
        }
    }]));

    match normalize(&raw[0]).unwrap() {
        BlockContent::Mcq(mcq) => {
            assert_eq!(mcq.options, vec!["3".to_string(), "4".to_string()]);
            assert_eq!(mcq.correct_answer, 1);
        }
        other => panic!("expected mcq, got {:?}", other),
    }

    let unanswered = LessonRenderer::new().render_blocks(&raw).to_html();
    assert!(!unanswered.contains("Two pairs make four."));

    let mut book = AnswerBook::new();
    book.record("q1", 1);
    let right = LessonRenderer::with_answers(&book).render_blocks(&raw).to_html();
    assert!(right.contains("option selected correct"));

    book.record("q1", 0);
    let wrong = LessonRenderer::with_answers(&book).render_blocks(&raw).to_html();
    assert!(wrong.contains("option selected incorrect"));
    assert!(wrong.contains("Two pairs make four."));
}

#[test]
fn moving_a_block_touches_only_the_swapped_pair() {
    let mut list = blocks(json!([
        { "_id": "a", "type": "text", "order": 1, "content": { "text": "a" } },
        { "_id": "b", "type": "text", "order": 2, "content": { "text": "b" } },
        { "_id": "c", "type": "text", "order": 3, "content": { "text": "c" } },
        { "_id": "d", "type": "text", "order": 4, "content": { "text": "d" } }
    ]));

    let mut editor = BlockEditor::new(&mut list);
    assert!(editor.move_down(1));
    assert!(!editor.move_up(0));

    let layout: Vec<(String, Option<u32>)> = list
        .iter()
        .map(|b| (b.key(), b.order))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("a".to_string(), Some(1)),
            ("c".to_string(), Some(2)),
            ("b".to_string(), Some(3)),
            ("d".to_string(), Some(4)),
        ]
    );
}

#[test]
fn edited_lesson_renders_what_the_admin_built() {
    let mut list = Vec::new();
    let mut editor = BlockEditor::new(&mut list);
    let heading = editor.add(BlockKind::Heading);
    editor.set_field(heading, "text", json!("Loops")).unwrap();
    let list_block = editor.add(BlockKind::List);
    editor.append_item(list_block, "items", json!("for")).unwrap();
    editor.append_item(list_block, "items", json!("while")).unwrap();
    assert!(editor.move_up(list_block));

    let html = LessonRenderer::new().render_blocks(&list).to_html();
    let items = html.find("while").unwrap();
    let title = html.find("Loops").unwrap();
    assert!(items < title);
}
