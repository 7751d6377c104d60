// src/attempt/mod.rs

//! Quiz attempt controller.
//!
//! One controller drives one attempt at one quiz:
//!
//! ```text
//! Loading -> Ready -> InProgress -> Submitting -> Completed
//!    |                                  |
//!    +-> Failed(Load)                   +-> Failed(Submit) -> Submitting (retry)
//! ```
//!
//! The countdown is an owned [`Countdown`] that only advances while
//! [`AttemptController::tick`] is polled. Leaving `InProgress` drops it, so a
//! stale tick can never race a submission.

mod answers;
mod countdown;

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::time;
use tracing::{info, warn};

pub use answers::{AnswerBuffer, AnswerError};
pub use countdown::{Countdown, DurationError, TICK_PERIOD, format_hms, parse_duration};

use crate::{
    client::{ClientError, DASHBOARD_PATH, Session},
    models::{question::PublicQuestion, quiz::Quiz, score::Score},
};

/// Grace period between a failed load and the redirect to the dashboard.
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

const LOAD_FAILED: &str = "Failed to load quiz. Please try again.";
const SUBMIT_FAILED: &str = "Failed to submit quiz. Please try again.";
const INCOMPLETE_WARNING: &str = "You haven't answered all questions yet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The quiz could not be fetched. Only reloading leaves this state.
    Load(String),
    /// The answers could not be delivered. The buffer is kept for a retry.
    Submit(String),
}

impl Failure {
    pub fn message(&self) -> &str {
        match self {
            Failure::Load(message) | Failure::Submit(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    InProgress,
    Submitting,
    Completed(Score),
    Failed(Failure),
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::InProgress => "in progress",
            Phase::Submitting => "submitting",
            Phase::Completed(_) => "completed",
            Phase::Failed(_) => "failed",
        }
    }
}

/// Result of one countdown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Remaining(u64),
    /// Time ran out. The attempt is now `Submitting`; see
    /// [`AttemptController::submit_pending`].
    Expired,
}

/// What the confirmation step shows before a manual submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitPrompt {
    pub answered: usize,
    pub total: usize,
}

impl SubmitPrompt {
    pub fn is_complete(&self) -> bool {
        self.answered >= self.total
    }

    pub fn warning(&self) -> Option<&'static str> {
        (!self.is_complete()).then_some(INCOMPLETE_WARNING)
    }
}

#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("cannot {action} while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: &'static str,
    },

    #[error("submission has not been confirmed")]
    NotConfirmed,

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Duration(#[from] DurationError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

pub struct AttemptController {
    session: Session,
    quiz_id: i64,
    phase: Phase,
    quiz: Option<Quiz>,
    questions: Vec<PublicQuestion>,
    answers: AnswerBuffer,
    current: usize,
    remaining: u64,
    countdown: Option<Countdown>,
    confirming: bool,
}

impl AttemptController {
    pub fn new(session: Session, quiz_id: i64) -> Self {
        Self {
            session,
            quiz_id,
            phase: Phase::Loading,
            quiz: None,
            questions: Vec::new(),
            answers: AnswerBuffer::default(),
            current: 0,
            remaining: 0,
            countdown: None,
            confirming: false,
        }
    }

    /// Fetches the quiz and its questions, discarding any previous attempt state.
    ///
    /// On failure the attempt becomes `Failed(Load)` and a redirect to the
    /// dashboard fires after [`REDIRECT_DELAY`].
    pub async fn load(&mut self) -> Result<(), AttemptError> {
        self.countdown = None;
        self.phase = Phase::Loading;
        self.quiz = None;
        self.questions.clear();
        self.answers = AnswerBuffer::default();
        self.current = 0;
        self.remaining = 0;
        self.confirming = false;

        info!(quiz_id = self.quiz_id, "loading quiz");

        let payload = match self.session.api.fetch_quiz(self.quiz_id).await {
            Ok(payload) => payload,
            Err(e) => {
                let message = e.server_message().unwrap_or(LOAD_FAILED).to_owned();
                warn!(quiz_id = self.quiz_id, error = %e, "failed to load quiz");
                self.fail_load(message);
                return Err(e.into());
            }
        };

        let remaining = match parse_duration(&payload.quiz.time_duration) {
            Ok(seconds) => seconds,
            Err(e) => {
                warn!(quiz_id = self.quiz_id, error = %e, "quiz has an unusable duration");
                self.fail_load(LOAD_FAILED.to_owned());
                return Err(e.into());
            }
        };

        self.answers = AnswerBuffer::new(payload.questions.iter().map(|q| q.id));
        self.questions = payload.questions;
        self.quiz = Some(payload.quiz);
        self.remaining = remaining;
        self.phase = Phase::Ready;

        info!(
            quiz_id = self.quiz_id,
            questions = self.questions.len(),
            seconds = remaining,
            "quiz ready"
        );
        Ok(())
    }

    fn fail_load(&mut self, message: String) {
        self.phase = Phase::Failed(Failure::Load(message));

        let navigator = Arc::clone(&self.session.navigator);
        tokio::spawn(async move {
            time::sleep(REDIRECT_DELAY).await;
            navigator.navigate_to(DASHBOARD_PATH);
        });
    }

    /// Starts the attempt and its countdown.
    pub fn start(&mut self) -> Result<(), AttemptError> {
        self.ensure(matches!(self.phase, Phase::Ready), "start")?;

        // Never two tickers: the old one is dropped before the new one exists.
        self.countdown = None;
        self.countdown = Some(Countdown::start());
        self.phase = Phase::InProgress;

        info!(quiz_id = self.quiz_id, seconds = self.remaining, "attempt started");
        Ok(())
    }

    /// Waits one second and decrements the countdown.
    ///
    /// Returns `None` straight away when no countdown is running. When the
    /// countdown reaches zero the attempt moves to `Submitting` without
    /// confirmation and [`Tick::Expired`] is returned. Cancel safe.
    pub async fn tick(&mut self) -> Option<Tick> {
        let countdown = self.countdown.as_mut()?;
        countdown.wait().await;

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Some(Tick::Remaining(self.remaining));
        }

        info!(quiz_id = self.quiz_id, "time is up, submitting");
        self.begin_submission();
        Some(Tick::Expired)
    }

    /// Runs the countdown to zero and submits whatever has been answered.
    pub async fn wait_for_expiry(&mut self) -> Result<Score, AttemptError> {
        loop {
            match self.tick().await {
                Some(Tick::Remaining(_)) => continue,
                Some(Tick::Expired) => return self.submit_pending().await,
                None => {
                    return Err(AttemptError::InvalidPhase {
                        action: "wait for expiry",
                        phase: self.phase.name(),
                    });
                }
            }
        }
    }

    /// Records `option` (1-4) for `question_id`, replacing any earlier choice.
    pub fn select_answer(&mut self, question_id: i64, option: u8) -> Result<(), AttemptError> {
        self.ensure(matches!(self.phase, Phase::InProgress), "answer")?;
        self.answers.record(question_id, option)?;
        Ok(())
    }

    /// Moves to the next question. Returns false on the last one.
    pub fn next(&mut self) -> bool {
        if !matches!(self.phase, Phase::InProgress) || self.current + 1 >= self.questions.len() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Moves to the previous question. Returns false on the first one.
    pub fn previous(&mut self) -> bool {
        if !matches!(self.phase, Phase::InProgress) || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Whether the manual submit control is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::InProgress) && self.answers.is_complete()
    }

    /// Opens the confirmation step of a manual submission.
    pub fn request_submit(&mut self) -> Result<SubmitPrompt, AttemptError> {
        self.ensure(matches!(self.phase, Phase::InProgress), "submit")?;
        self.confirming = true;
        Ok(SubmitPrompt {
            answered: self.answers.answered(),
            total: self.answers.total(),
        })
    }

    pub fn cancel_submit(&mut self) {
        self.confirming = false;
    }

    /// Commits a confirmed manual submission.
    pub async fn confirm_submit(&mut self) -> Result<Score, AttemptError> {
        self.ensure(matches!(self.phase, Phase::InProgress), "submit")?;
        if !self.confirming {
            return Err(AttemptError::NotConfirmed);
        }
        self.begin_submission();
        self.deliver().await
    }

    /// Delivers the answers of an attempt that is already `Submitting`,
    /// e.g. after [`Tick::Expired`] or an interrupted delivery.
    pub async fn submit_pending(&mut self) -> Result<Score, AttemptError> {
        self.ensure(matches!(self.phase, Phase::Submitting), "deliver answers")?;
        self.deliver().await
    }

    /// Re-sends the unchanged answers after a failed submission.
    pub async fn retry_submit(&mut self) -> Result<Score, AttemptError> {
        self.ensure(
            matches!(self.phase, Phase::Failed(Failure::Submit(_))),
            "retry submission",
        )?;
        self.phase = Phase::Submitting;
        self.deliver().await
    }

    /// Leaves a completed attempt for the dashboard.
    pub fn finish(&self) -> Result<(), AttemptError> {
        self.ensure(matches!(self.phase, Phase::Completed(_)), "finish")?;
        self.session.navigator.navigate_to(DASHBOARD_PATH);
        Ok(())
    }

    fn begin_submission(&mut self) {
        // The countdown must be gone before any request goes out.
        self.countdown = None;
        self.confirming = false;
        self.phase = Phase::Submitting;
    }

    async fn deliver(&mut self) -> Result<Score, AttemptError> {
        let request = self.answers.to_request();
        info!(
            quiz_id = self.quiz_id,
            answered = request.answers.len(),
            total = self.answers.total(),
            "submitting answers"
        );

        match self.session.api.submit_answers(self.quiz_id, &request).await {
            Ok(score) => {
                info!(
                    quiz_id = self.quiz_id,
                    total_scored = score.total_scored,
                    max_score = score.max_score,
                    "attempt completed"
                );
                self.answers = AnswerBuffer::default();
                self.phase = Phase::Completed(score.clone());
                Ok(score)
            }
            Err(e) => {
                warn!(quiz_id = self.quiz_id, error = %e, "submission failed");
                self.phase = Phase::Failed(Failure::Submit(SUBMIT_FAILED.to_owned()));
                Err(e.into())
            }
        }
    }

    fn ensure(&self, allowed: bool, action: &'static str) -> Result<(), AttemptError> {
        if allowed {
            Ok(())
        } else {
            Err(AttemptError::InvalidPhase {
                action,
                phase: self.phase.name(),
            })
        }
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn questions(&self) -> &[PublicQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerBuffer {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&PublicQuestion> {
        self.questions.get(self.current)
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn selected_option(&self, question_id: i64) -> Option<u8> {
        self.answers.get(question_id)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining
    }

    pub fn formatted_remaining(&self) -> String {
        format_hms(self.remaining)
    }

    /// Share of questions before the current one, in percent.
    pub fn progress_percent(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.current as f64 / self.questions.len() as f64 * 100.0
    }

    pub fn is_ticking(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }
}
