//! crates/polaris_test_support/src/lib.rs
//!
//! In-memory fakes for the service ports, shared by the unit tests next
//! to the stores and by the integration tests under `services/app/tests/`.
//! A dev-dependency only; nothing here ships in a production build.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use polaris_core::domain::{Flashcard, Quiz, QuizKind, Route, SourceFile, User};
use polaris_core::ports::{
    AiService, AuthService, GatewayError, GatewayResult, LoginResponse, Navigator, Notifier,
    OcrService, RegisterResponse, SessionStorage,
};
use tokio::sync::{watch, Semaphore};

/// Lets a test hold a fake's gateway call open: the fake parks inside
/// `pass` until the test calls `release`, and the test can wait until a
/// given number of calls have entered the gateway.
#[derive(Clone)]
pub struct Gate {
    entered: watch::Sender<usize>,
    release: Arc<Semaphore>,
}

impl Default for Gate {
    fn default() -> Self {
        let (entered, _) = watch::channel(0);
        Self {
            entered,
            release: Arc::new(Semaphore::new(0)),
        }
    }
}

impl Gate {
    /// Waits until at least `n` calls have entered the gateway.
    pub async fn wait_entered(&self, n: usize) {
        let mut rx = self.entered.subscribe();
        while *rx.borrow_and_update() < n {
            rx.changed().await.expect("gate dropped");
        }
    }

    /// Lets exactly one parked call proceed.
    pub fn release(&self) {
        self.release.add_permits(1);
    }

    async fn pass(&self) {
        self.entered.send_modify(|n| *n += 1);
        self.release
            .acquire()
            .await
            .expect("gate closed")
            .forget();
    }
}

fn clone_error(e: &GatewayError) -> GatewayError {
    match e {
        GatewayError::Service(m) => GatewayError::Service(m.clone()),
        GatewayError::Contract(m) => GatewayError::Contract(m.clone()),
    }
}

fn clone_result<T: Clone>(r: &GatewayResult<T>) -> GatewayResult<T> {
    match r {
        Ok(v) => Ok(v.clone()),
        Err(e) => Err(clone_error(e)),
    }
}

//=========================================================================================
// Auth
//=========================================================================================

pub struct FakeAuthService {
    login: GatewayResult<LoginResponse>,
    register: GatewayResult<RegisterResponse>,
    calls: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

impl FakeAuthService {
    pub fn with_login(login: GatewayResult<LoginResponse>) -> Self {
        Self {
            login,
            register: Ok(RegisterResponse { success: true }),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    pub fn with_register(register: GatewayResult<RegisterResponse>) -> Self {
        Self {
            login: Err(GatewayError::Service("unexpected login call".into())),
            register,
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Gate::default());
        self
    }

    pub fn gate(&self) -> Gate {
        self.gate.clone().expect("fake is not gated")
    }

    pub fn call_count(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
    }
}

#[async_trait]
impl AuthService for FakeAuthService {
    async fn login(&self, _email: &str, _password: &str) -> GatewayResult<LoginResponse> {
        self.enter().await;
        clone_result(&self.login)
    }

    async fn register(&self, _email: &str, _password: &str) -> GatewayResult<RegisterResponse> {
        self.enter().await;
        clone_result(&self.register)
    }
}

//=========================================================================================
// OCR
//=========================================================================================

pub struct FakeOcrService {
    text: Mutex<String>,
    calls: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

impl FakeOcrService {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Gate::default());
        self
    }

    pub fn gate(&self) -> Gate {
        self.gate.clone().expect("fake is not gated")
    }

    pub fn call_count(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }
}

#[async_trait]
impl OcrService for FakeOcrService {
    async fn extract_text(&self, _file: &SourceFile) -> GatewayResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        Ok(self.text.lock().unwrap().clone())
    }
}

//=========================================================================================
// AI
//=========================================================================================

pub struct FakeAiService {
    quizzes: Vec<Quiz>,
    flashcards: Vec<Flashcard>,
    failing: bool,
}

impl Default for FakeAiService {
    fn default() -> Self {
        Self {
            quizzes: vec![Quiz::new(
                QuizKind::TrueFalse,
                "Water boils at 100C at sea level.",
                vec![],
                "True",
            )],
            flashcards: vec![Flashcard::new("front", "back")],
            failing: false,
        }
    }
}

impl FakeAiService {
    /// A service whose every call rejects with a gateway error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_quizzes(mut self, quizzes: Vec<Quiz>) -> Self {
        self.quizzes = quizzes;
        self
    }

    pub fn with_flashcards(mut self, flashcards: Vec<Flashcard>) -> Self {
        self.flashcards = flashcards;
        self
    }

    fn check(&self) -> GatewayResult<()> {
        if self.failing {
            Err(GatewayError::Service("service unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AiService for FakeAiService {
    async fn summarize(&self, text: &str) -> GatewayResult<String> {
        self.check()?;
        Ok(format!("Summary of: {}", text))
    }

    async fn ask_question(&self, _context: &str, question: &str) -> GatewayResult<String> {
        self.check()?;
        Ok(format!("Answer to: {}", question))
    }

    async fn generate_quizzes(&self, _text: &str) -> GatewayResult<Vec<Quiz>> {
        self.check()?;
        Ok(self.quizzes.clone())
    }

    async fn generate_flashcards(&self, _text: &str) -> GatewayResult<Vec<Flashcard>> {
        self.check()?;
        Ok(self.flashcards.clone())
    }

    async fn recommend_revision(&self, goals: &str) -> GatewayResult<String> {
        self.check()?;
        Ok(format!("Revise in this order: {}", goals))
    }
}

//=========================================================================================
// Storage, Notifier, Navigator
//=========================================================================================

#[derive(Default)]
pub struct MemorySessionStorage {
    record: Mutex<Option<User>>,
}

impl MemorySessionStorage {
    pub fn with_record(user: User) -> Self {
        Self {
            record: Mutex::new(Some(user)),
        }
    }

    pub fn stored(&self) -> Option<User> {
        self.record.lock().unwrap().clone()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Option<User> {
        self.record.lock().unwrap().clone()
    }

    fn save(&self, user: &User) -> std::io::Result<()> {
        *self.record.lock().unwrap() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) {
        *self.record.lock().unwrap() = None;
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<Route> {
        self.visits.lock().unwrap().last().copied()
    }

    pub fn visits(&self) -> Vec<Route> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.visits.lock().unwrap().push(route);
    }
}
