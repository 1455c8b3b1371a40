//! services/app/src/state.rs
//!
//! Defines the application's shared state: one instance of every store,
//! created once at startup and handed to the UI layer.

use std::sync::Arc;

use polaris_core::ports::{
    AiService, AuthService, Navigator, Notifier, OcrService, SessionStorage,
};

use crate::config::Config;
use crate::stores::{
    FlashcardPipeline, NotesPipeline, PlannerStore, QuizPipeline, SessionStore,
};

/// The shared application state. The stores own their state exclusively;
/// distinct pipeline instances are fully independent and may have gateway
/// calls outstanding simultaneously.
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<SessionStore>,
    pub notes: Arc<NotesPipeline>,
    pub quiz: Arc<QuizPipeline>,
    pub flashcards: Arc<FlashcardPipeline>,
    pub planner: Arc<PlannerStore>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        auth: Arc<dyn AuthService>,
        ocr: Arc<dyn OcrService>,
        ai: Arc<dyn AiService>,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            session: Arc::new(SessionStore::new(auth, storage, notifier.clone(), navigator)),
            notes: Arc::new(NotesPipeline::new(ocr, ai.clone(), notifier.clone())),
            quiz: Arc::new(QuizPipeline::new(ai.clone(), notifier.clone())),
            flashcards: Arc::new(FlashcardPipeline::new(ai.clone(), notifier.clone())),
            planner: Arc::new(PlannerStore::new(ai, notifier)),
        }
    }
}
