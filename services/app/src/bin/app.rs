//! services/app/src/bin/app.rs
//!
//! The interactive shell around the stores: a line-oriented replacement for
//! the page shells of the original UI. It wires configuration, adapters and
//! stores together, restores the session, and then drives everything from
//! stdin commands.

use app_lib::{
    adapters::{
        FileSessionStorage, HttpAuthAdapter, OpenAiOcrAdapter, OpenAiStudyAdapter,
        TracingNavigator, TracingNotifier,
    },
    config::{Config, ConfigError},
    error::AppError,
    state::AppState,
    stores::{decide, RouteDecision},
};
use async_openai::{config::OpenAIConfig, Client};
use chrono::{DateTime, NaiveDate, Utc};
use polaris_core::domain::{Route, SourceFile};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting Polaris...");

    // --- 2. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let auth = Arc::new(HttpAuthAdapter::new(
        reqwest::Client::new(),
        config.auth_base_url.clone(),
    ));
    let ocr = Arc::new(OpenAiOcrAdapter::new(
        openai_client.clone(),
        config.ocr_model.clone(),
    ));
    let ai = Arc::new(OpenAiStudyAdapter::new(
        openai_client,
        config.summary_model.clone(),
        config.qa_model.clone(),
        config.generator_model.clone(),
    ));
    let storage = Arc::new(FileSessionStorage::new(config.session_file.clone()));
    let notifier = Arc::new(TracingNotifier);
    let navigator = Arc::new(TracingNavigator);

    // --- 3. Build the Shared AppState & Restore the Session ---
    let state = AppState::new(config, auth, ocr, ai, storage, notifier, navigator);
    state.session.restore();
    info!(
        "Session restored: {}",
        match state.session.snapshot().user() {
            Some(user) => format!("signed in as {}", user.email),
            None => "signed out".to_string(),
        }
    );

    // --- 4. Drive the Stores From Stdin ---
    run_shell(state).await?;
    Ok(())
}

async fn run_shell(state: AppState) -> Result<(), AppError> {
    let mut current_route = Route::Landing;
    let mut selected_date: DateTime<Utc> = Utc::now();

    println!("polaris ready. type 'help' for commands, 'quit' to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ' ');
        let command = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or("").trim();

        match command {
            "quit" | "exit" => break,
            "help" => print_help(),
            "login" => {
                let (email, password) = split_pair(rest);
                let _ = state.session.login(email, password).await;
            }
            "register" => {
                let (email, password) = split_pair(rest);
                let _ = state.session.register(email, password).await;
            }
            "logout" => state.session.logout(),
            "whoami" => match state.session.snapshot().user() {
                Some(user) => println!("{}", user.email),
                None => println!("not signed in"),
            },
            "open" => match parse_route(rest) {
                Some(route) => current_route = open(&state, route),
                None => println!("unknown view '{}'", rest),
            },
            "file" => match std::fs::read(rest) {
                Ok(bytes) => {
                    let selected = state
                        .notes
                        .select_file(SourceFile {
                            name: rest.to_string(),
                            bytes,
                        })
                        .await;
                    if selected {
                        println!("selected {}", rest);
                    } else {
                        println!("a call is still in progress; try again shortly");
                    }
                }
                Err(e) => println!("could not read {}: {}", rest, e),
            },
            "extract" => {
                if state.notes.extract().await.is_ok() {
                    if let Some(text) = state.notes.snapshot().await.extracted_text {
                        println!("{}", text);
                    }
                }
            }
            "summarize" => {
                if state.notes.summarize().await.is_ok() {
                    if let Some(summary) = state.notes.snapshot().await.summary {
                        println!("{}", summary);
                    }
                }
            }
            "ask" => {
                if state.notes.ask(rest).await.is_ok() {
                    if let Some(answer) = state.notes.snapshot().await.answer {
                        println!("{}", answer);
                    }
                }
            }
            "quiz" => run_quiz_command(&state, rest).await,
            "cards" => run_cards_command(&state, rest).await,
            "date" => match NaiveDate::parse_from_str(rest, "%Y-%m-%d") {
                Ok(day) => {
                    selected_date = day
                        .and_hms_opt(0, 0, 0)
                        .expect("midnight is always valid")
                        .and_utc();
                    println!("selected {}", day);
                }
                Err(_) => println!("expected a date like 2024-03-01"),
            },
            "goal" => {
                let _ = state.planner.add_goal(rest, "", Some(selected_date)).await;
            }
            "toggle" => {
                let goals = state.planner.goals_for(selected_date).await;
                match rest.parse::<usize>().ok().and_then(|n| goals.get(n)) {
                    Some(goal) => state.planner.toggle_goal(goal.id).await,
                    None => println!("no goal #{} on the selected date", rest),
                }
            }
            "reminder" => {
                let (time, message) = split_pair(rest);
                let _ = state
                    .planner
                    .add_reminder(message, time, Some(selected_date))
                    .await;
            }
            "plan" => {
                for (i, goal) in state.planner.goals_for(selected_date).await.iter().enumerate() {
                    let mark = if goal.completed { "x" } else { " " };
                    println!("[{}] {} {}", mark, i, goal.title);
                }
                for reminder in state.planner.reminders_for(selected_date).await {
                    println!("    {} {}", reminder.time, reminder.message);
                }
            }
            "recommend" => {
                if state.planner.recommend_schedule().await.is_ok() {
                    if let Some(schedule) = state.planner.recommendation().await {
                        println!("{}", schedule);
                    }
                }
            }
            other => println!("unknown command '{}'; type 'help'", other),
        }

        // Session state may have changed; the guard decides again for the
        // view that is currently open.
        current_route = reevaluate(&state, current_route);
    }
    Ok(())
}

/// Applies the route guard to a navigation attempt and reports the outcome.
fn open(state: &AppState, route: Route) -> Route {
    match decide(&state.session.snapshot(), route) {
        RouteDecision::Render => {
            println!("viewing {:?}", route);
            route
        }
        RouteDecision::RedirectToLogin => {
            println!("redirected to Login");
            Route::Login
        }
        RouteDecision::Pending => {
            println!("session still restoring");
            route
        }
    }
}

fn reevaluate(state: &AppState, current: Route) -> Route {
    match decide(&state.session.snapshot(), current) {
        RouteDecision::RedirectToLogin => {
            println!("redirected to Login");
            Route::Login
        }
        _ => current,
    }
}

async fn run_quiz_command(state: &AppState, rest: &str) {
    let (sub, arg) = split_pair(rest);
    match sub {
        "generate" => {
            let source = state
                .notes
                .snapshot()
                .await
                .extracted_text
                .unwrap_or_default();
            let _ = state.quiz.generate(&source).await;
        }
        "start" => {
            let _ = state.quiz.start().await;
        }
        "answer" => {
            let (index, answer) = split_pair(arg);
            let quizzes = state.quiz.snapshot().await.quizzes;
            match index.parse::<usize>().ok().and_then(|n| quizzes.get(n)) {
                Some(quiz) => {
                    let _ = state.quiz.answer(quiz.id, answer).await;
                }
                None => println!("no question #{}", index),
            }
        }
        "submit" => {
            let _ = state.quiz.submit().await;
        }
        "show" => {
            for (i, quiz) in state.quiz.snapshot().await.quizzes.iter().enumerate() {
                println!("{}. {}", i, quiz.prompt);
                for option in &quiz.options {
                    println!("   - {}", option);
                }
                if let Some(answer) = &quiz.user_answer {
                    println!("   your answer: {}", answer);
                }
            }
        }
        _ => println!("quiz commands: generate, start, answer <n> <text>, submit, show"),
    }
}

async fn run_cards_command(state: &AppState, rest: &str) {
    let (sub, arg) = split_pair(rest);
    match sub {
        "generate" => {
            let source = state
                .notes
                .snapshot()
                .await
                .extracted_text
                .unwrap_or_default();
            let _ = state.flashcards.generate(&source).await;
        }
        "clear" => state.flashcards.clear().await,
        "flip" => {
            let payload = state.flashcards.snapshot().await;
            match arg.parse::<usize>().ok().and_then(|n| payload.cards.get(n)) {
                Some(card) => {
                    let back = state.flashcards.toggle_flip(card.id).await;
                    println!("{}", if back { &card.back } else { &card.front });
                }
                None => println!("no card #{}", arg),
            }
        }
        "show" => {
            let payload = state.flashcards.snapshot().await;
            for (i, card) in payload.cards.iter().enumerate() {
                let side = if payload.flipped.contains(&card.id) {
                    &card.back
                } else {
                    &card.front
                };
                println!("{}. {}", i, side);
            }
        }
        _ => println!("cards commands: generate, clear, flip <n>, show"),
    }
}

fn split_pair(input: &str) -> (&str, &str) {
    let mut parts = input.splitn(2, ' ');
    (
        parts.next().unwrap_or_default().trim(),
        parts.next().unwrap_or("").trim(),
    )
}

fn parse_route(name: &str) -> Option<Route> {
    match name.to_ascii_lowercase().as_str() {
        "landing" => Some(Route::Landing),
        "login" => Some(Route::Login),
        "register" => Some(Route::Register),
        "dashboard" => Some(Route::Dashboard),
        "profile" => Some(Route::Profile),
        _ => None,
    }
}

fn print_help() {
    println!("session:  login <email> <password> | register <email> <password> | logout | whoami");
    println!("views:    open <landing|login|register|dashboard|profile>");
    println!("notes:    file <path> | extract | summarize | ask <question>");
    println!("quiz:     quiz <generate|start|answer n text|submit|show>");
    println!("cards:    cards <generate|clear|flip n|show>");
    println!("planner:  date <YYYY-MM-DD> | goal <title> | toggle <n> | reminder <HH:MM> <msg> | plan | recommend");
}
