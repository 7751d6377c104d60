// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;

use chrono::{NaiveDate, TimeDelta, Utc};
use quizhub::{config::Config, routes, state::AppState};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    /// Base URL, e.g. "http://127.0.0.1:12345".
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

/// A seeded quiz and the ids of its questions, in insertion order.
pub struct SeededQuiz {
    pub subject_id: i64,
    pub chapter_id: i64,
    pub quiz_id: i64,
    pub question_ids: Vec<i64>,
}

/// Spawns the app on a random port against a fresh in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single, never-recycled connection keeps the in-memory database alive.
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    };

    let app = routes::create_router(AppState {
        pool: pool.clone(),
        config,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        pool,
        client: reqwest::Client::new(),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + TimeDelta::days(days)
}

pub fn unique_email() -> String {
    format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8])
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, username: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "username": username,
                "password": PASSWORD,
                "full_name": "Test Student",
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Registers a fresh user and returns (username, bearer token).
    pub async fn signed_in_user(&self) -> (String, String) {
        let username = unique_email();
        assert_eq!(self.register(&username).await.status().as_u16(), 201);

        let login: serde_json::Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        let token = login["token"].as_str().expect("Token not found").to_string();
        (username, token)
    }

    pub async fn get_json(&self, path: &str, token: &str) -> (u16, serde_json::Value) {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or_default())
    }

    pub async fn post_json(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> (u16, serde_json::Value) {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or_default())
    }

    /// Seeds subject -> chapter -> quiz -> questions. `correct` holds each
    /// question's correct option.
    pub async fn seed_quiz(
        &self,
        date_of_quiz: NaiveDate,
        end_date: Option<NaiveDate>,
        duration: &str,
        correct: &[u8],
    ) -> SeededQuiz {
        let subject_id: i64 =
            sqlx::query_scalar("INSERT INTO subjects (name) VALUES ('Physics') RETURNING id")
                .fetch_one(&self.pool)
                .await
                .unwrap();

        let chapter_id: i64 = sqlx::query_scalar(
            "INSERT INTO chapters (subject_id, name) VALUES (?, 'Kinematics') RETURNING id",
        )
        .bind(subject_id)
        .fetch_one(&self.pool)
        .await
        .unwrap();

        let quiz_id: i64 = sqlx::query_scalar(
            "INSERT INTO quizzes (chapter_id, date_of_quiz, end_date, time_duration, remarks)
             VALUES (?, ?, ?, ?, 'Closed book') RETURNING id",
        )
        .bind(chapter_id)
        .bind(date_of_quiz)
        .bind(end_date)
        .bind(duration)
        .fetch_one(&self.pool)
        .await
        .unwrap();

        let mut question_ids = Vec::new();
        for (i, correct_option) in correct.iter().enumerate() {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO questions
                 (quiz_id, question_statement, option1, option2, option3, option4, correct_option)
                 VALUES (?, ?, 'A', 'B', 'C', 'D', ?) RETURNING id",
            )
            .bind(quiz_id)
            .bind(format!("Question {i}"))
            .bind(*correct_option)
            .fetch_one(&self.pool)
            .await
            .unwrap();
            question_ids.push(id);
        }

        SeededQuiz {
            subject_id,
            chapter_id,
            quiz_id,
            question_ids,
        }
    }

    /// A quiz that opened yesterday and has no end date.
    pub async fn seed_open_quiz(&self, duration: &str, correct: &[u8]) -> SeededQuiz {
        self.seed_quiz(days_from_today(-1), None, duration, correct)
            .await
    }
}
