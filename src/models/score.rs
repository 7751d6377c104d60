// src/models/score.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{
    catalog::{Chapter, Subject},
    quiz::Quiz,
};

/// Represents the 'scores' table in the database.
/// One row per submitted attempt; never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Score {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub time_stamp_of_attempt: DateTime<Utc>,
    pub total_scored: i64,
    pub max_score: i64,
}

impl Score {
    /// Percentage rounded to the nearest integer, 0 for an empty quiz.
    pub fn percentage(&self) -> i64 {
        if self.max_score <= 0 {
            return 0;
        }
        (self.total_scored as f64 / self.max_score as f64 * 100.0).round() as i64
    }
}

/// A score together with the quiz, chapter and subject it belongs to.
/// Entry of `GET /api/user/scores`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWithContext {
    #[serde(flatten)]
    pub score: Score,
    pub quiz: Quiz,
    pub chapter: Chapter,
    pub subject: Subject,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAnswersRequest {
    /// Key: question ID. Value: selected option (1-4).
    #[serde(default)]
    pub answers: BTreeMap<i64, u8>,
}

/// Response of `POST /api/user/quiz/{id}/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAnswersResponse {
    pub message: String,
    pub score: Score,
}
