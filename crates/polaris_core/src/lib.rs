pub mod domain;
pub mod ports;

pub use domain::{Flashcard, Quiz, QuizKind, Route, SourceFile, StudyGoal, StudyReminder, User};
pub use ports::{
    AiService, AuthService, GatewayError, GatewayResult, LoginResponse, Navigator, Notifier,
    OcrService, RegisterResponse, SessionStorage,
};
