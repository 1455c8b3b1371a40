pub mod flashcards;
pub mod guard;
pub mod notes;
pub mod pipeline;
pub mod planner;
pub mod quiz;
pub mod session;

// Re-export the store types so callers don't have to reach into submodules.
pub use flashcards::{FlashcardPayload, FlashcardPipeline};
pub use guard::{decide, RouteDecision};
pub use notes::{NotesPayload, NotesPipeline};
pub use pipeline::{Pipeline, Stage};
pub use planner::PlannerStore;
pub use quiz::{QuizPayload, QuizPhase, QuizPipeline};
pub use session::{SessionSnapshot, SessionStore};
