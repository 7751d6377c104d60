// src/client/http.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::{
    client::{ClientError, QuizApi},
    models::{
        quiz::QuizAttemptPayload,
        score::{Score, SubmitAnswersRequest, SubmitAnswersResponse},
        user::{LoginRequest, LoginResponse},
    },
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body shape shared by every backend endpoint.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// [`QuizApi`] over the quizhub REST backend, authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpQuizApi {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl HttpQuizApi {
    pub fn new(base: Url, token: impl Into<String>) -> Self {
        Self {
            http: build_client(),
            base: with_trailing_slash(base),
            token: token.into(),
        }
    }

    /// Exchanges credentials for a token and returns a client that uses it.
    pub async fn login(base: Url, username: &str, password: &str) -> Result<Self, ClientError> {
        let http = build_client();
        let base = with_trailing_slash(base);

        let response = http
            .post(base.join("api/auth/login")?)
            .json(&LoginRequest {
                username: username.to_owned(),
                password: password.to_owned(),
            })
            .send()
            .await?;
        let login: LoginResponse = read_json(response).await?;
        tracing::info!(user_id = login.user.id, "logged in");

        Ok(Self {
            http,
            base,
            token: login.token,
        })
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.token)
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn fetch_quiz(&self, quiz_id: i64) -> Result<QuizAttemptPayload, ClientError> {
        let url = self.base.join(&format!("api/user/quiz/{quiz_id}"))?;
        let response = self.request(self.http.get(url)).send().await?;
        read_json(response).await
    }

    async fn submit_answers(
        &self,
        quiz_id: i64,
        answers: &SubmitAnswersRequest,
    ) -> Result<Score, ClientError> {
        let url = self.base.join(&format!("api/user/quiz/{quiz_id}/submit"))?;
        let response = self.request(self.http.post(url)).json(answers).send().await?;
        let body: SubmitAnswersResponse = read_json(response).await?;
        Ok(body.score)
    }
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// `Url::join` replaces the last path segment unless the base ends in '/'.
fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    decode_body(status, &body)
}

/// Decodes a response body. A `{"message": ...}` body that does not fit `T`
/// is a rejection even when the status is 2xx.
fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ClientError> {
    let rejected = |message| ClientError::Rejected { status, message };

    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|body| body.message);
        return Err(rejected(message));
    }

    match serde_json::from_slice::<T>(body) {
        Ok(value) => Ok(value),
        Err(e) => match serde_json::from_slice::<ErrorBody>(body) {
            Ok(ErrorBody {
                message: Some(message),
            }) => Err(rejected(Some(message))),
            _ => Err(e.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_only_success_body_is_a_rejection() {
        let body = br#"{"message": "You are not enrolled in this course"}"#;
        let err = decode_body::<QuizAttemptPayload>(200, body).unwrap_err();

        assert!(matches!(err, ClientError::Rejected { status: 200, .. }));
        assert_eq!(err.server_message(), Some("You are not enrolled in this course"));
    }

    #[test]
    fn error_status_keeps_the_server_message() {
        let body = br#"{"message": "This quiz has expired"}"#;
        let err = decode_body::<QuizAttemptPayload>(403, body).unwrap_err();

        assert!(matches!(err, ClientError::Rejected { status: 403, .. }));
        assert_eq!(err.server_message(), Some("This quiz has expired"));
    }

    #[test]
    fn garbage_success_body_is_a_decode_error() {
        let err = decode_body::<QuizAttemptPayload>(200, b"<html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn base_path_prefix_survives_join() {
        let base = with_trailing_slash(Url::parse("http://quiz.local/portal").unwrap());
        assert_eq!(
            base.join("api/user/quiz/3").unwrap().as_str(),
            "http://quiz.local/portal/api/user/quiz/3"
        );
    }

    #[test]
    fn bare_host_joins_at_root() {
        let base = with_trailing_slash(Url::parse("http://127.0.0.1:3000").unwrap());
        assert_eq!(
            base.join("api/user/quiz/3/submit").unwrap().as_str(),
            "http://127.0.0.1:3000/api/user/quiz/3/submit"
        );
    }
}
