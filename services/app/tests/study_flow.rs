//! End-to-end journey through the stores against fake gateways: restore,
//! log in, extract and summarize notes, run a quiz, plan a revision day,
//! and log out again.

use std::sync::Arc;

use app_lib::state::AppState;
use app_lib::stores::{decide, QuizPhase, RouteDecision, SessionSnapshot};
use polaris_test_support::{
    FakeAiService, FakeAuthService, FakeOcrService, MemorySessionStorage, RecordingNavigator,
    RecordingNotifier,
};
use chrono::{TimeZone, Utc};
use polaris_core::domain::{Quiz, QuizKind, Route, SourceFile, User};
use polaris_core::ports::LoginResponse;

fn test_config() -> app_lib::config::Config {
    // Bypass the environment: the stores never read the config themselves.
    app_lib::config::Config {
        auth_base_url: "http://localhost:3000".to_string(),
        log_level: tracing::Level::INFO,
        session_file: std::env::temp_dir().join("polaris_test_session.json"),
        openai_api_key: None,
        ocr_model: "test".to_string(),
        summary_model: "test".to_string(),
        qa_model: "test".to_string(),
        generator_model: "test".to_string(),
    }
}

fn build_state() -> (AppState, Arc<MemorySessionStorage>, Arc<RecordingNavigator>) {
    let auth = FakeAuthService::with_login(Ok(LoginResponse {
        success: true,
        user: Some(User {
            email: "ada@example.com".to_string(),
        }),
    }));
    let quizzes = vec![
        Quiz::new(
            QuizKind::Mcq,
            "What is the capital of France?",
            vec!["Berlin".to_string(), "Paris".to_string()],
            "Paris",
        ),
        Quiz::new(
            QuizKind::TrueFalse,
            "The Eiffel Tower is located in London.",
            vec![],
            "False",
        ),
    ];
    let storage = Arc::new(MemorySessionStorage::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let state = AppState::new(
        Arc::new(test_config()),
        Arc::new(auth),
        Arc::new(FakeOcrService::with_text(
            "The capital of France is Paris. The Eiffel Tower is located in Paris.",
        )),
        Arc::new(FakeAiService::default().with_quizzes(quizzes)),
        storage.clone(),
        Arc::new(RecordingNotifier::default()),
        navigator.clone(),
    );
    (state, storage, navigator)
}

#[tokio::test]
async fn full_study_session_journey() {
    let (state, storage, navigator) = build_state();

    // Before restoration completes the guard renders nothing at all.
    assert_eq!(
        decide(&state.session.snapshot(), Route::Dashboard),
        RouteDecision::Pending
    );

    state.session.restore();
    assert_eq!(
        decide(&state.session.snapshot(), Route::Dashboard),
        RouteDecision::RedirectToLogin
    );

    // Log in and land on the dashboard.
    state
        .session
        .login("ada@example.com", "secret")
        .await
        .unwrap();
    assert!(state.session.snapshot().authenticated());
    assert_eq!(navigator.last(), Some(Route::Dashboard));
    assert_eq!(
        decide(&state.session.snapshot(), Route::Dashboard),
        RouteDecision::Render
    );

    // Notes flow: upload, extract, summarize, ask.
    state
        .notes
        .select_file(SourceFile {
            name: "france.png".to_string(),
            bytes: vec![1, 2, 3],
        })
        .await;
    state.notes.extract().await.unwrap();
    state.notes.summarize().await.unwrap();
    state.notes.ask("Where is the Eiffel Tower?").await.unwrap();
    let notes = state.notes.snapshot().await;
    let source_text = notes.extracted_text.clone().unwrap();
    assert!(notes.summary.is_some());
    assert!(notes.answer.is_some());

    // Quiz flow driven from the extracted text.
    state.quiz.generate(&source_text).await.unwrap();
    state.quiz.start().await.unwrap();
    let quizzes = state.quiz.snapshot().await.quizzes;
    state.quiz.answer(quizzes[0].id, "Paris").await.unwrap();
    state.quiz.answer(quizzes[1].id, "False").await.unwrap();
    assert_eq!(state.quiz.submit().await.unwrap(), 2);
    assert_eq!(state.quiz.snapshot().await.phase, QuizPhase::Scored);

    // Flashcards are an independent pipeline instance.
    state.flashcards.generate(&source_text).await.unwrap();
    assert!(!state.flashcards.snapshot().await.cards.is_empty());
    state.flashcards.clear().await;
    assert!(state.flashcards.snapshot().await.cards.is_empty());

    // Plan a revision day.
    let day = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    let goal_id = state
        .planner
        .add_goal("Review France notes", "", Some(day))
        .await
        .unwrap();
    state
        .planner
        .add_reminder("Quiz yourself again", "18:00", Some(day))
        .await
        .unwrap();
    let evening = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap();
    assert_eq!(state.planner.goals_for(evening).await.len(), 1);
    assert_eq!(state.planner.reminders_for(evening).await.len(), 1);
    state.planner.toggle_goal(goal_id).await;
    assert!(state.planner.goals_for(evening).await[0].completed);
    state.planner.recommend_schedule().await.unwrap();
    assert!(state.planner.recommendation().await.is_some());

    // Logging out removes the durable record and the guard redirects the
    // open protected view immediately.
    let mut session_rx = state.session.subscribe();
    state.session.logout();
    session_rx.changed().await.unwrap();
    assert_eq!(*session_rx.borrow(), SessionSnapshot::SignedOut);
    assert_eq!(storage.stored(), None);
    assert_eq!(
        decide(&state.session.snapshot(), Route::Dashboard),
        RouteDecision::RedirectToLogin
    );
    assert_eq!(navigator.last(), Some(Route::Landing));

    // A fresh restore after logout stays signed out.
    state.session.restore();
    assert_eq!(state.session.snapshot(), SessionSnapshot::SignedOut);
}
