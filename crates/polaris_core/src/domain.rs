//! crates/polaris_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any storage or serialization format,
//! except for `User`, which doubles as the durable session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated identity for the current session.
///
/// This is also the record persisted to durable client storage, so it
/// derives the serde traits directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

/// A file the user selected for text extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The navigable views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Profile,
}

impl Route {
    /// Whether this view sits behind the authentication gate.
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Profile)
    }
}

/// The two question formats the quiz generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    Mcq,
    TrueFalse,
}

/// A single generated quiz question, including the user's answer and
/// its correctness once the quiz has been scored.
#[derive(Debug, Clone)]
pub struct Quiz {
    pub id: Uuid,
    pub kind: QuizKind,
    pub prompt: String,
    /// Candidate answers, ordered. Empty for true/false questions.
    pub options: Vec<String>,
    pub correct_answer: String,
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
}

impl Quiz {
    /// Creates an unanswered question with a fresh client-generated id.
    pub fn new(
        kind: QuizKind,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            prompt: prompt.into(),
            options,
            correct_answer: correct_answer.into(),
            user_answer: None,
            is_correct: None,
        }
    }
}

/// A single revision flashcard. Flip state is UI-local and deliberately
/// not part of this entity.
#[derive(Debug, Clone)]
pub struct Flashcard {
    pub id: Uuid,
    pub front: String,
    pub back: String,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            front: front.into(),
            back: back.into(),
        }
    }
}

/// A study goal pinned to a calendar day.
#[derive(Debug, Clone)]
pub struct StudyGoal {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub completed: bool,
}

/// A study reminder pinned to a calendar day, with a display time
/// such as "09:00".
#[derive(Debug, Clone)]
pub struct StudyReminder {
    pub id: Uuid,
    pub message: String,
    pub time: String,
    pub date: DateTime<Utc>,
}
