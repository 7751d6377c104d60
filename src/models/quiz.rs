// src/models/quiz.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::question::PublicQuestion;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub chapter_id: i64,

    /// First day the quiz can be attempted.
    pub date_of_quiz: NaiveDate,

    /// Last day the quiz can be attempted, if any.
    pub end_date: Option<NaiveDate>,

    /// Allowed time, formatted as `HH:MM`.
    pub time_duration: String,

    pub remarks: Option<String>,
}

/// Why a quiz cannot be attempted on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Open,
    NotYetOpen,
    Expired,
}

impl Quiz {
    /// Checks the availability window against `today`. Both bounds are inclusive.
    pub fn availability(&self, today: NaiveDate) -> Availability {
        if self.date_of_quiz > today {
            return Availability::NotYetOpen;
        }
        match self.end_date {
            Some(end) if today > end => Availability::Expired,
            _ => Availability::Open,
        }
    }
}

/// Response of `GET /api/user/quiz/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttemptPayload {
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}
