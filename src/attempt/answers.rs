// src/attempt/answers.rs

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::models::{
    question::{OPTION_COUNT, is_valid_option},
    score::SubmitAnswersRequest,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(i64),

    #[error("option {0} is out of range (1-{OPTION_COUNT})")]
    OptionOutOfRange(u8),
}

/// Selected option per question for one attempt.
///
/// Only questions of the loaded quiz can be answered, and each has at most one
/// entry: answering again replaces the previous choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerBuffer {
    questions: BTreeSet<i64>,
    selected: BTreeMap<i64, u8>,
}

impl AnswerBuffer {
    pub fn new(question_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            questions: question_ids.into_iter().collect(),
            selected: BTreeMap::new(),
        }
    }

    /// Records `option` for `question_id`, returning the choice it replaced.
    pub fn record(&mut self, question_id: i64, option: u8) -> Result<Option<u8>, AnswerError> {
        if !self.questions.contains(&question_id) {
            return Err(AnswerError::UnknownQuestion(question_id));
        }
        if !is_valid_option(option) {
            return Err(AnswerError::OptionOutOfRange(option));
        }
        Ok(self.selected.insert(question_id, option))
    }

    pub fn get(&self, question_id: i64) -> Option<u8> {
        self.selected.get(&question_id).copied()
    }

    pub fn answered(&self) -> usize {
        self.selected.len()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// True once the answered count has reached the number of questions.
    pub fn is_complete(&self) -> bool {
        self.answered() >= self.total()
    }

    pub fn unanswered(&self) -> impl Iterator<Item = i64> + '_ {
        self.questions
            .iter()
            .copied()
            .filter(|id| !self.selected.contains_key(id))
    }

    pub fn to_request(&self) -> SubmitAnswersRequest {
        SubmitAnswersRequest {
            answers: self.selected.clone(),
        }
    }
}
