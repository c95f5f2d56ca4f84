//! Answers
//!
//! User selections for the follow-up question batch, keyed by question id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::schema::{FollowUpQuestion, QuestionBatch};

/// One selection, with a snapshot of the question text it answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Older clients omit this; the map key carries it too.
    #[serde(default)]
    pub question_id: String,
    /// Question text at the time of selection
    pub question: String,
    pub selected: String,
}

/// Mapping of question id to its single current answer.
///
/// Serializes as a plain JSON object so it can be sent to the model and
/// stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, Answer>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `option` for `question`, replacing any earlier selection.
    pub fn select(&mut self, question: &FollowUpQuestion, option: &str) -> CoreResult<()> {
        if !question.has_option(option) {
            return Err(CoreError::validation(format!(
                "'{}' is not an option of question {}",
                option, question.id
            )));
        }
        self.0.insert(
            question.id.clone(),
            Answer {
                question_id: question.id.clone(),
                question: question.question_text.clone(),
                selected: option.to_string(),
            },
        );
        Ok(())
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.0.get(question_id)
    }

    /// True when every question in `batch` has an answer.
    pub fn is_complete_for(&self, batch: &QuestionBatch) -> bool {
        !batch.is_empty() && batch.ids().all(|id| self.0.contains_key(id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Answer)> {
        self.0.iter()
    }
}
