// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::{
        catalog::{Chapter, Subject},
        quiz::Quiz,
    },
};

#[derive(Debug, Deserialize)]
pub struct ChapterFilter {
    pub subject_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct QuizFilter {
    pub chapter_id: Option<i64>,
}

/// Lists every subject.
pub async fn list_subjects(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, description FROM subjects ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "subjects": subjects })))
}

/// Returns one subject, or 404.
pub async fn get_subject(
    State(pool): State<SqlitePool>,
    Path(subject_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let subject = sqlx::query_as::<_, Subject>(
        "SELECT id, name, description FROM subjects WHERE id = ?",
    )
    .bind(subject_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Subject {subject_id} not found")))?;

    Ok(Json(json!({ "subject": subject })))
}

/// Lists chapters, optionally restricted to one subject.
pub async fn list_chapters(
    State(pool): State<SqlitePool>,
    Query(filter): Query<ChapterFilter>,
) -> Result<impl IntoResponse, AppError> {
    let chapters = sqlx::query_as::<_, Chapter>(
        "SELECT id, subject_id, name, description FROM chapters
         WHERE ?1 IS NULL OR subject_id = ?1
         ORDER BY id",
    )
    .bind(filter.subject_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "chapters": chapters })))
}

/// Returns one chapter, or 404.
pub async fn get_chapter(
    State(pool): State<SqlitePool>,
    Path(chapter_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let chapter = sqlx::query_as::<_, Chapter>(
        "SELECT id, subject_id, name, description FROM chapters WHERE id = ?",
    )
    .bind(chapter_id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Chapter {chapter_id} not found")))?;

    Ok(Json(json!({ "chapter": chapter })))
}

/// Lists quizzes, optionally restricted to one chapter.
///
/// Unavailable quizzes are listed too; the attempt endpoint enforces the window.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Query(filter): Query<QuizFilter>,
) -> Result<impl IntoResponse, AppError> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        "SELECT id, chapter_id, date_of_quiz, end_date, time_duration, remarks FROM quizzes
         WHERE ?1 IS NULL OR chapter_id = ?1
         ORDER BY date_of_quiz, id",
    )
    .bind(filter.chapter_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "quizzes": quizzes })))
}
