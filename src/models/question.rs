// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

/// Every question offers exactly this many options, numbered from 1.
pub const OPTION_COUNT: u8 = 4;

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_statement: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,

    /// Index (1-4) of the correct option. Never sent to the attempting user.
    pub correct_option: u8,
}

/// DTO for sending a question to the client (excludes the correct option).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_statement: String,
    pub options: [String; OPTION_COUNT as usize],
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            quiz_id: q.quiz_id,
            question_statement: q.question_statement,
            options: [q.option1, q.option2, q.option3, q.option4],
        }
    }
}

/// Whether `option` is a valid 1-based option index.
pub fn is_valid_option(option: u8) -> bool {
    (1..=OPTION_COUNT).contains(&option)
}
