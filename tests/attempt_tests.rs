// tests/attempt_tests.rs

mod common;

use std::time::Duration;

use common::{PASSWORD, TestApp, days_from_today, spawn_app};
use quizhub::{
    attempt::{AttemptController, Failure, Phase, Tick},
    client::{ClientError, DASHBOARD_PATH, HttpQuizApi, Navigator, QuizApi, Session},
    models::score::SubmitAnswersRequest,
};
use tokio::sync::mpsc;
use url::Url;

struct ChannelNavigator(mpsc::UnboundedSender<String>);

impl Navigator for ChannelNavigator {
    fn navigate_to(&self, path: &str) {
        let _ = self.0.send(path.to_owned());
    }
}

async fn controller_for(
    app: &TestApp,
    quiz_id: i64,
) -> (AttemptController, mpsc::UnboundedReceiver<String>) {
    let (username, _) = app.signed_in_user().await;
    let api = HttpQuizApi::login(Url::parse(&app.address).unwrap(), &username, PASSWORD)
        .await
        .expect("login through the client failed");

    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(api, ChannelNavigator(tx));
    (AttemptController::new(session, quiz_id), rx)
}

#[tokio::test]
async fn manual_attempt_completes_with_the_server_score() {
    let app = spawn_app().await;
    let quiz = app.seed_open_quiz("00:30", &[2, 4]).await;
    let (mut ctl, mut nav) = controller_for(&app, quiz.quiz_id).await;

    ctl.load().await.unwrap();
    assert_eq!(ctl.phase(), &Phase::Ready);
    assert_eq!(ctl.remaining_secs(), 30 * 60);
    assert_eq!(ctl.quiz().and_then(|q| q.remarks.as_deref()), Some("Closed book"));

    ctl.start().unwrap();
    ctl.select_answer(quiz.question_ids[0], 2).unwrap();
    assert!(ctl.next());
    ctl.select_answer(quiz.question_ids[1], 1).unwrap();
    assert!(ctl.can_submit());

    let prompt = ctl.request_submit().unwrap();
    assert!(prompt.warning().is_none());
    let score = ctl.confirm_submit().await.unwrap();

    assert_eq!((score.total_scored, score.max_score), (1, 2));
    assert_eq!(ctl.phase(), &Phase::Completed(score));
    assert!(!ctl.is_ticking());

    ctl.finish().unwrap();
    assert_eq!(nav.recv().await.as_deref(), Some(DASHBOARD_PATH));
}

#[tokio::test]
async fn zero_length_quiz_submits_on_the_first_tick() {
    let app = spawn_app().await;
    let quiz = app.seed_open_quiz("00:00", &[3, 3]).await;
    let (mut ctl, _nav) = controller_for(&app, quiz.quiz_id).await;

    ctl.load().await.unwrap();
    ctl.start().unwrap();
    ctl.select_answer(quiz.question_ids[1], 3).unwrap();

    let tick = tokio::time::timeout(Duration::from_secs(5), ctl.tick())
        .await
        .expect("countdown never ticked");
    assert_eq!(tick, Some(Tick::Expired));

    let score = ctl.submit_pending().await.unwrap();
    assert_eq!((score.total_scored, score.max_score), (1, 2));
    assert!(ctl.tick().await.is_none());
}

#[tokio::test]
async fn unavailable_quiz_shows_server_message_then_redirects() {
    let app = spawn_app().await;
    let quiz = app.seed_quiz(days_from_today(3), None, "00:10", &[1]).await;
    let (mut ctl, mut nav) = controller_for(&app, quiz.quiz_id).await;

    assert!(ctl.load().await.is_err());
    assert_eq!(
        ctl.phase(),
        &Phase::Failed(Failure::Load("This quiz is not yet available".to_string()))
    );
    assert!(nav.try_recv().is_err());

    let path = tokio::time::timeout(Duration::from_secs(5), nav.recv())
        .await
        .expect("no redirect after a failed load");
    assert_eq!(path.as_deref(), Some(DASHBOARD_PATH));
}

#[tokio::test]
async fn client_surfaces_rejections_with_status_and_message() {
    let app = spawn_app().await;
    let quiz = app.seed_quiz(days_from_today(-5), Some(days_from_today(-2)), "00:10", &[1]).await;
    let (_, token) = app.signed_in_user().await;
    let api = HttpQuizApi::new(Url::parse(&app.address).unwrap(), token);

    let err = api
        .submit_answers(quiz.quiz_id, &SubmitAnswersRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Rejected { status: 403, .. }));
    assert_eq!(
        err.server_message(),
        Some("This quiz has expired and can no longer be submitted")
    );
}

#[tokio::test]
async fn bad_token_fails_the_load() {
    let app = spawn_app().await;
    let quiz = app.seed_open_quiz("00:10", &[1]).await;
    let api = HttpQuizApi::new(Url::parse(&app.address).unwrap(), "not-a-token");
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut ctl = AttemptController::new(Session::new(api, ChannelNavigator(tx)), quiz.quiz_id);

    assert!(ctl.load().await.is_err());
    assert!(matches!(ctl.phase(), Phase::Failed(Failure::Load(_))));
}
