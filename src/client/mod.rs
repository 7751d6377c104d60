// src/client/mod.rs

//! Client side of the REST API: the collaborators an attempt needs from the
//! surrounding application, and their HTTP implementation.

mod error;
mod http;

use std::sync::Arc;

use async_trait::async_trait;

pub use error::ClientError;
pub use http::HttpQuizApi;

use crate::models::{
    quiz::QuizAttemptPayload,
    score::{Score, SubmitAnswersRequest},
};

/// Where the application sends the user when an attempt is over.
pub const DASHBOARD_PATH: &str = "/user/dashboard";

/// The two REST calls a quiz attempt makes.
#[async_trait]
pub trait QuizApi: Send + Sync {
    /// `GET /api/user/quiz/{quiz_id}`
    async fn fetch_quiz(&self, quiz_id: i64) -> Result<QuizAttemptPayload, ClientError>;

    /// `POST /api/user/quiz/{quiz_id}/submit`; returns the server's authoritative score.
    async fn submit_answers(
        &self,
        quiz_id: i64,
        answers: &SubmitAnswersRequest,
    ) -> Result<Score, ClientError>;
}

/// Client-side routing.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// Session context handed to an attempt: an authenticated API plus routing.
#[derive(Clone)]
pub struct Session {
    pub api: Arc<dyn QuizApi>,
    pub navigator: Arc<dyn Navigator>,
}

impl Session {
    pub fn new(api: impl QuizApi + 'static, navigator: impl Navigator + 'static) -> Self {
        Self {
            api: Arc::new(api),
            navigator: Arc::new(navigator),
        }
    }
}
