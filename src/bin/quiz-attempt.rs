// src/bin/quiz-attempt.rs

//! Takes one timed quiz in the terminal against a running quizhub server.

use anyhow::{Context, bail};
use clap::Parser;
use quizhub::{
    attempt::{AttemptController, AttemptError, Failure, Phase, Tick, format_hms},
    client::{HttpQuizApi, Navigator, Session},
    models::score::Score,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug, Parser)]
#[command(name = "quiz-attempt", about = "Take a timed quiz against a quizhub server")]
struct Args {
    /// Quiz to attempt.
    quiz_id: i64,

    #[arg(long, env = "QUIZHUB_API_URL", default_value = "http://127.0.0.1:3000")]
    api_url: Url,

    /// Bearer token; takes precedence over username/password.
    #[arg(long, env = "QUIZHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "QUIZHUB_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "QUIZHUB_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log: String,
}

/// Routes navigation requests back into the main loop.
struct TerminalNavigator(mpsc::UnboundedSender<String>);

impl Navigator for TerminalNavigator {
    fn navigate_to(&self, path: &str) {
        // The loop may already be gone; nothing left to navigate then.
        let _ = self.0.send(path.to_owned());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to a file only; stdout belongs to the quiz.
    let file_appender = tracing_appender::rolling::daily("logs", "quiz-attempt.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(EnvFilter::new(&args.log))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let api = match (&args.token, &args.username, &args.password) {
        (Some(token), _, _) => HttpQuizApi::new(args.api_url.clone(), token.clone()),
        (None, Some(username), Some(password)) => {
            HttpQuizApi::login(args.api_url.clone(), username, password)
                .await
                .context("login failed")?
        }
        _ => bail!("pass --token, or --username and --password"),
    };

    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let session = Session::new(api, TerminalNavigator(nav_tx));
    let mut ctl = AttemptController::new(session, args.quiz_id);

    match ctl.load().await {
        Ok(()) => print_intro(&ctl),
        Err(_) => {
            if let Phase::Failed(failure) = ctl.phase() {
                println!("{}", failure.message());
            }
            println!("Redirecting back to dashboard...");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            tick = ctl.tick(), if ctl.is_ticking() => match tick {
                Some(Tick::Remaining(secs)) if secs % 60 == 0 || secs <= 10 => {
                    println!("[{} left]", format_hms(secs));
                }
                Some(Tick::Expired) => {
                    println!("Time is up. Submitting your answers...");
                    let result = ctl.submit_pending().await;
                    report(&ctl, result);
                }
                _ => {}
            },
            Some(path) = nav_rx.recv() => {
                println!("-> {path}");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle(&mut ctl, line.trim()).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Applies one command. Returns false when the user quits.
async fn handle(ctl: &mut AttemptController, command: &str) -> bool {
    match command {
        "" => {}
        "quit" | "q" => return false,
        "help" | "?" => print_help(),
        "start" => match ctl.start() {
            Ok(()) => print_question(ctl),
            Err(e) => println!("{e}"),
        },
        "show" | "s" => print_question(ctl),
        "time" | "t" => println!("{} left", ctl.formatted_remaining()),
        "next" | "n" => {
            if ctl.next() {
                print_question(ctl);
            } else {
                println!("This is the last question.");
            }
        }
        "prev" | "p" => {
            if ctl.previous() {
                print_question(ctl);
            } else {
                println!("This is the first question.");
            }
        }
        "submit" => {
            if !ctl.can_submit() {
                let left = ctl.answers().unanswered().count();
                println!("Submit is disabled until every question is answered ({left} left).");
                return true;
            }
            match ctl.request_submit() {
                Ok(prompt) => {
                    println!("Are you sure you want to submit this quiz? (yes/no)");
                    match prompt.warning() {
                        Some(warning) => println!("Warning: {warning}"),
                        None => println!("Once submitted, you won't be able to change your answers."),
                    }
                }
                Err(e) => println!("{e}"),
            }
        }
        "yes" | "y" if ctl.is_confirming() => {
            let result = ctl.confirm_submit().await;
            report(ctl, result);
        }
        "no" if ctl.is_confirming() => {
            ctl.cancel_submit();
            println!("Submission cancelled.");
        }
        "retry" => {
            let result = ctl.retry_submit().await;
            report(ctl, result);
        }
        "done" => {
            if let Err(e) = ctl.finish() {
                println!("{e}");
            }
        }
        other => match parse_option(other) {
            Some(option) => answer_current(ctl, option),
            None => println!("Unknown command {other:?}; type 'help'."),
        },
    }
    true
}

fn parse_option(input: &str) -> Option<u8> {
    let mut chars = input.chars();
    let (c, None) = (chars.next()?, chars.next()) else {
        return None;
    };
    let c = c.to_ascii_uppercase();
    if let Some(index) = OPTION_LABELS.iter().position(|&label| label == c) {
        return Some(index as u8 + 1);
    }
    c.to_digit(10).map(|d| d as u8)
}

fn answer_current(ctl: &mut AttemptController, option: u8) {
    let Some(question_id) = ctl.current_question().map(|q| q.id) else {
        println!("No question to answer.");
        return;
    };
    match ctl.select_answer(question_id, option) {
        Ok(()) => println!(
            "Answer recorded ({}/{} answered).",
            ctl.answers().answered(),
            ctl.answers().total()
        ),
        Err(e) => println!("{e}"),
    }
}

fn report(ctl: &AttemptController, result: Result<Score, AttemptError>) {
    match result {
        Ok(score) => {
            println!("Quiz Completed! {}%", score.percentage());
            println!("Your Score: {} / {}", score.total_scored, score.max_score);
            println!(
                "Completed on {}",
                score.time_stamp_of_attempt.format("%B %-d, %Y")
            );
            println!("Type 'done' to return to the dashboard.");
        }
        Err(_) => {
            if let Phase::Failed(Failure::Submit(message)) = ctl.phase() {
                println!("{message} Type 'retry' to send your answers again.");
            }
        }
    }
}

fn print_intro(ctl: &AttemptController) {
    let Some(quiz) = ctl.quiz() else { return };
    println!("Quiz: {}", quiz.date_of_quiz.format("%B %-d, %Y"));
    println!("- {} multiple-choice questions", ctl.questions().len());
    println!("- {} (hh:mm) to complete the quiz", quiz.time_duration);
    println!("- Once started, the timer cannot be paused");
    if let Some(remarks) = &quiz.remarks {
        println!("Additional instructions: {remarks}");
    }
    println!("Type 'start' to begin, 'help' for commands.");
}

fn print_question(ctl: &AttemptController) {
    let Some(question) = ctl.current_question() else { return };
    let selected = ctl.selected_option(question.id);

    println!();
    println!(
        "Question {} of {} ({:.0}%)  [{}]  {}",
        ctl.current_index() + 1,
        ctl.questions().len(),
        ctl.progress_percent(),
        ctl.formatted_remaining(),
        if ctl.can_submit() { "(submit enabled)" } else { "" }
    );
    println!("{}", question.question_statement);
    for (index, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(index as u8 + 1) { '*' } else { ' ' };
        println!(" {marker}{}) {option}", OPTION_LABELS[index]);
    }
}

fn print_help() {
    println!("start          begin the quiz and its timer");
    println!("a-d | 1-4      answer the current question");
    println!("n / p          next / previous question");
    println!("show, time     redisplay the question / remaining time");
    println!("submit         submit (asks for confirmation)");
    println!("retry          resend answers after a failed submission");
    println!("done           return to the dashboard after completion");
    println!("quit           leave without submitting");
}
