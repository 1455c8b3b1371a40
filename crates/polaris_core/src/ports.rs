//! crates/polaris_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the auth
//! backend, the OCR/AI services, or the durable session storage.

use async_trait::async_trait;

use crate::domain::{Flashcard, Quiz, Route, SourceFile, User};

//=========================================================================================
// Generic Gateway Error and Result Types
//=========================================================================================

/// The error type for all gateway operations.
///
/// `Service` covers network and service failures; `Contract` covers a
/// response that arrived but is missing fields the contract requires.
/// Both are recoverable by retrying the operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway call failed: {0}")]
    Service(String),
    #[error("malformed gateway response: {0}")]
    Contract(String),
}

/// A convenience type alias for `Result<T, GatewayError>`.
pub type GatewayResult<T> = Result<T, GatewayError>;

//=========================================================================================
// Auth Wire Records
//=========================================================================================

/// Result of an `AuthService::login` call.
///
/// `success == true` with `user` absent is a contract violation and must
/// be surfaced as `GatewayError::Contract` by the caller, never defaulted.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<User>,
}

/// Result of an `AuthService::register` call. Registration never yields a
/// session by itself.
#[derive(Debug, Clone)]
pub struct RegisterResponse {
    pub success: bool,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<LoginResponse>;
    async fn register(&self, email: &str, password: &str) -> GatewayResult<RegisterResponse>;
}

#[async_trait]
pub trait OcrService: Send + Sync {
    /// Extracts the text content of an uploaded image or PDF.
    async fn extract_text(&self, file: &SourceFile) -> GatewayResult<String>;
}

#[async_trait]
pub trait AiService: Send + Sync {
    /// Produces a plain-language summary of the extracted text.
    async fn summarize(&self, text: &str) -> GatewayResult<String>;

    /// Answers a question grounded in the extracted text.
    async fn ask_question(&self, context: &str, question: &str) -> GatewayResult<String>;

    /// Generates an ordered batch of quiz questions from the text.
    async fn generate_quizzes(&self, text: &str) -> GatewayResult<Vec<Quiz>>;

    /// Generates an ordered batch of flashcards from the text.
    async fn generate_flashcards(&self, text: &str) -> GatewayResult<Vec<Flashcard>>;

    /// Recommends a revision schedule from a summary of the user's goals.
    async fn recommend_revision(&self, goals: &str) -> GatewayResult<String>;
}

/// Durable client storage holding the single serialized session record.
///
/// Reads and writes are synchronous from the core's perspective. A missing
/// or malformed record means "no session" and must never panic.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Option<User>;
    fn save(&self, user: &User) -> std::io::Result<()>;
    fn clear(&self);
}

/// User-facing notification surface (the toast boundary).
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// The router boundary. The core requests navigation; the UI performs it.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}
