use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parent-managed selections, `block key -> selected option index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerBook(HashMap<String, usize>);

impl AnswerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, key: impl Into<String>, index: usize) {
        self.0.insert(key.into(), index);
    }

    pub fn selected(&self, key: &str) -> Option<usize> {
        self.0.get(key).copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How an option is drawn once the learner has (or has not) answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMark {
    Unanswered,
    /// Selected and right.
    Correct,
    /// Selected and wrong.
    Incorrect,
    /// Not selected, but the right answer after a wrong pick.
    Answer,
    Neutral,
}

impl OptionMark {
    pub fn css_class(self) -> &'static str {
        match self {
            OptionMark::Unanswered => "",
            OptionMark::Correct => "correct",
            OptionMark::Incorrect => "incorrect",
            OptionMark::Answer => "answer",
            OptionMark::Neutral => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub marks: Vec<OptionMark>,
    pub is_correct: Option<bool>,
    /// Explanation to show; only once an answer was picked.
    pub explanation: Option<String>,
}

pub fn feedback(
    option_count: usize,
    correct_answer: usize,
    explanation: Option<&str>,
    selected: Option<usize>,
) -> AnswerFeedback {
    let Some(selected) = selected.filter(|s| *s < option_count) else {
        return AnswerFeedback {
            marks: vec![OptionMark::Unanswered; option_count],
            is_correct: None,
            explanation: None,
        };
    };

    let is_correct = selected == correct_answer;
    let marks = (0..option_count)
        .map(|i| match (i == selected, i == correct_answer) {
            (true, true) => OptionMark::Correct,
            (true, false) => OptionMark::Incorrect,
            (false, true) if !is_correct => OptionMark::Answer,
            _ => OptionMark::Neutral,
        })
        .collect();

    AnswerFeedback {
        marks,
        is_correct: Some(is_correct),
        explanation: explanation.filter(|e| !e.is_empty()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_answer_marks_and_reveals() {
        let fb = feedback(2, 1, Some("because"), Some(0));
        assert_eq!(fb.marks, vec![OptionMark::Incorrect, OptionMark::Answer]);
        assert_eq!(fb.is_correct, Some(false));
        assert_eq!(fb.explanation.as_deref(), Some("because"));
    }

    #[test]
    fn right_answer_is_marked_correct() {
        let fb = feedback(2, 1, None, Some(1));
        assert_eq!(fb.marks, vec![OptionMark::Neutral, OptionMark::Correct]);
        assert_eq!(fb.is_correct, Some(true));
        assert_eq!(fb.explanation, None);
    }

    #[test]
    fn unanswered_reveals_nothing() {
        let fb = feedback(3, 0, Some("x"), None);
        assert_eq!(fb.is_correct, None);
        assert_eq!(fb.explanation, None);
        assert!(fb.marks.iter().all(|m| *m == OptionMark::Unanswered));
    }
}
