// src/handlers/quiz.rs

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        question::{PublicQuestion, Question, is_valid_option},
        quiz::{Availability, Quiz, QuizAttemptPayload},
        score::{Score, SubmitAnswersRequest, SubmitAnswersResponse},
    },
    utils::jwt::CurrentUser,
};

/// Helper struct for fetching answer keys from the database.
#[derive(sqlx::FromRow)]
struct AnswerKey {
    id: i64,
    correct_option: u8,
}

async fn fetch_quiz(pool: &SqlitePool, quiz_id: i64) -> Result<Quiz, AppError> {
    sqlx::query_as::<_, Quiz>(
        "SELECT id, chapter_id, date_of_quiz, end_date, time_duration, remarks
         FROM quizzes WHERE id = ?",
    )
    .bind(quiz_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Quiz {quiz_id} not found")))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Rejects a quiz outside its availability window with 403.
/// `expired_message` differs between viewing and submitting.
fn ensure_available(quiz: &Quiz, date: NaiveDate, expired_message: &str) -> Result<(), AppError> {
    match quiz.availability(date) {
        Availability::Open => Ok(()),
        Availability::NotYetOpen => Err(AppError::Forbidden(
            "This quiz is not yet available".to_string(),
        )),
        Availability::Expired => Err(AppError::Forbidden(expired_message.to_string())),
    }
}

/// Counts the questions whose submitted option matches the key.
///
/// Questions without a submitted answer score nothing, as do answers for
/// question ids that are not part of the quiz.
fn count_correct(keys: &[AnswerKey], answers: &BTreeMap<i64, u8>) -> i64 {
    keys.iter()
        .filter(|key| answers.get(&key.id) == Some(&key.correct_option))
        .count() as i64
}

/// Returns a quiz and its questions for an attempt.
///
/// * 404 if the quiz does not exist.
/// * 403 if today lies outside the quiz's availability window.
/// * The correct option is stripped from every question.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, quiz_id).await?;

    ensure_available(&quiz, today(), "This quiz has expired")?;

    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, quiz_id, question_statement, option1, option2, option3, option4, correct_option
         FROM questions WHERE quiz_id = ? ORDER BY id",
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch questions for quiz {}: {:?}", quiz_id, e);
        AppError::from(e)
    })?;

    tracing::info!(quiz_id, user_id = user.id, questions = questions.len(), "quiz handed out");

    Ok(Json(QuizAttemptPayload {
        quiz,
        questions: questions.into_iter().map(PublicQuestion::from).collect(),
    }))
}

/// Submits a user's answers and calculates the score.
///
/// * One point per correct answer; the maximum is the number of quiz questions.
/// * Partial submissions are accepted (unanswered questions score zero).
/// * A new `scores` row is inserted for every submission.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = fetch_quiz(&pool, quiz_id).await?;

    ensure_available(
        &quiz,
        today(),
        "This quiz has expired and can no longer be submitted",
    )?;

    if let Some((question_id, option)) = req.answers.iter().find(|(_, o)| !is_valid_option(**o)) {
        return Err(AppError::BadRequest(format!(
            "Option {option} for question {question_id} is out of range"
        )));
    }

    let keys = sqlx::query_as::<_, AnswerKey>(
        "SELECT id, correct_option FROM questions WHERE quiz_id = ?",
    )
    .bind(quiz_id)
    .fetch_all(&pool)
    .await?;

    let total_scored = count_correct(&keys, &req.answers);
    let max_score = keys.len() as i64;

    let score = sqlx::query_as::<_, Score>(
        "INSERT INTO scores (quiz_id, user_id, time_stamp_of_attempt, total_scored, max_score)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, quiz_id, user_id, time_stamp_of_attempt, total_scored, max_score",
    )
    .bind(quiz_id)
    .bind(user.id)
    .bind(Utc::now())
    .bind(total_scored)
    .bind(max_score)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to record score: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(
        quiz_id,
        user_id = user.id,
        answered = req.answers.len(),
        total_scored,
        max_score,
        "quiz submitted"
    );

    Ok(Json(SubmitAnswersResponse {
        message: "Quiz submitted successfully".to_string(),
        score,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<AnswerKey> {
        vec![
            AnswerKey { id: 1, correct_option: 2 },
            AnswerKey { id: 2, correct_option: 4 },
            AnswerKey { id: 3, correct_option: 1 },
        ]
    }

    #[test]
    fn unanswered_questions_score_zero() {
        let answers = BTreeMap::from([(1, 2)]);
        assert_eq!(count_correct(&keys(), &answers), 1);
    }

    #[test]
    fn foreign_question_ids_are_ignored() {
        let answers = BTreeMap::from([(1, 2), (2, 4), (3, 1), (99, 1)]);
        assert_eq!(count_correct(&keys(), &answers), 3);
    }

    fn quiz(date_of_quiz: NaiveDate, end_date: Option<NaiveDate>) -> Quiz {
        Quiz {
            id: 1,
            chapter_id: 1,
            date_of_quiz,
            end_date,
            time_duration: "00:10".to_string(),
            remarks: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn availability_errors_carry_the_caller_message() {
        let expired = quiz(day(1), Some(day(5)));
        assert!(ensure_available(&expired, day(5), "gone").is_ok());
        assert!(matches!(
            ensure_available(&expired, day(6), "gone"),
            Err(AppError::Forbidden(msg)) if msg == "gone"
        ));
        assert!(matches!(
            ensure_available(&expired, day(1).pred_opt().unwrap(), "gone"),
            Err(AppError::Forbidden(msg)) if msg == "This quiz is not yet available"
        ));
    }

    #[test]
    fn wrong_options_do_not_count() {
        let answers = BTreeMap::from([(1, 1), (2, 3), (3, 1)]);
        assert_eq!(count_correct(&keys(), &answers), 1);
    }
}
