// src/handlers/scores.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        catalog::{Chapter, Subject},
        quiz::Quiz,
        score::{Score, ScoreWithContext},
    },
    utils::jwt::CurrentUser,
};

/// One row joined from `scores`, `quizzes`, `chapters` and `subjects`.
#[derive(sqlx::FromRow)]
struct ScoreRow {
    id: i64,
    quiz_id: i64,
    user_id: i64,
    time_stamp_of_attempt: DateTime<Utc>,
    total_scored: i64,
    max_score: i64,
    chapter_id: i64,
    date_of_quiz: NaiveDate,
    end_date: Option<NaiveDate>,
    time_duration: String,
    remarks: Option<String>,
    subject_id: i64,
    chapter_name: String,
    chapter_description: Option<String>,
    subject_name: String,
    subject_description: Option<String>,
}

impl From<ScoreRow> for ScoreWithContext {
    fn from(row: ScoreRow) -> Self {
        Self {
            score: Score {
                id: row.id,
                quiz_id: row.quiz_id,
                user_id: row.user_id,
                time_stamp_of_attempt: row.time_stamp_of_attempt,
                total_scored: row.total_scored,
                max_score: row.max_score,
            },
            quiz: Quiz {
                id: row.quiz_id,
                chapter_id: row.chapter_id,
                date_of_quiz: row.date_of_quiz,
                end_date: row.end_date,
                time_duration: row.time_duration,
                remarks: row.remarks,
            },
            chapter: Chapter {
                id: row.chapter_id,
                subject_id: row.subject_id,
                name: row.chapter_name,
                description: row.chapter_description,
            },
            subject: Subject {
                id: row.subject_id,
                name: row.subject_name,
                description: row.subject_description,
            },
        }
    }
}

/// Lists the caller's own scores, newest first, each with the quiz, chapter
/// and subject it was earned in.
pub async fn list_scores(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let rows = sqlx::query_as::<_, ScoreRow>(
        r#"
        SELECT
            s.id, s.quiz_id, s.user_id, s.time_stamp_of_attempt, s.total_scored, s.max_score,
            q.chapter_id, q.date_of_quiz, q.end_date, q.time_duration, q.remarks,
            c.subject_id,
            c.name AS chapter_name, c.description AS chapter_description,
            sub.name AS subject_name, sub.description AS subject_description
        FROM scores s
        JOIN quizzes q ON s.quiz_id = q.id
        JOIN chapters c ON q.chapter_id = c.id
        JOIN subjects sub ON c.subject_id = sub.id
        WHERE s.user_id = ?
        ORDER BY s.id DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch scores for user {}: {:?}", user.id, e);
        AppError::from(e)
    })?;

    let scores: Vec<ScoreWithContext> = rows.into_iter().map(ScoreWithContext::from).collect();
    Ok(Json(json!({ "scores": scores })))
}
