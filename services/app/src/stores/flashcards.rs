//! services/app/src/stores/flashcards.rs
//!
//! The flashcard pipeline: generate a batch of cards from source text and
//! clear it again. Flip state lives here as an ephemeral id set, not on the
//! `Flashcard` entity, and is never persisted.

use std::collections::HashSet;
use std::sync::Arc;

use polaris_core::domain::Flashcard;
use polaris_core::ports::{AiService, Notifier};
use uuid::Uuid;

use crate::error::AppError;
use crate::stores::pipeline::{Pipeline, Stage};

const GENERATE: Stage = Stage {
    working: "Generating flashcards...",
    done: "Flashcards generated!",
    failed: "Failed to generate flashcards. Please try again.",
};

const NO_SOURCE_TEXT: &str =
    "Please upload and extract text in the Notes & Uploads tab first.";

#[derive(Debug, Clone, Default)]
pub struct FlashcardPayload {
    pub cards: Vec<Flashcard>,
    /// Ids of cards currently showing their back.
    pub flipped: HashSet<Uuid>,
}

pub struct FlashcardPipeline {
    ai: Arc<dyn AiService>,
    pipeline: Pipeline<FlashcardPayload>,
}

impl FlashcardPipeline {
    pub fn new(ai: Arc<dyn AiService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ai,
            pipeline: Pipeline::new(notifier, FlashcardPayload::default()),
        }
    }

    pub async fn snapshot(&self) -> FlashcardPayload {
        self.pipeline.read(|p| p.clone()).await
    }

    pub async fn is_busy(&self) -> bool {
        self.pipeline.is_busy().await
    }

    pub async fn last_error(&self) -> Option<String> {
        self.pipeline.last_error().await
    }

    /// Generates a fresh batch of cards, replacing any prior batch and
    /// resetting all flip state.
    pub async fn generate(&self, text: &str) -> Result<(), AppError> {
        let ai = self.ai.clone();
        let text = text.trim().to_string();
        self.pipeline
            .run_stage(
                &GENERATE,
                |_| {
                    if text.is_empty() {
                        return Err(AppError::precondition(NO_SOURCE_TEXT));
                    }
                    Ok(text.clone())
                },
                |text| async move { ai.generate_flashcards(&text).await },
                |p, cards| {
                    p.cards = cards;
                    p.flipped.clear();
                },
            )
            .await
    }

    /// Clears the batch. Always available and idempotent: clearing an empty
    /// batch leaves it empty and reports no error.
    pub async fn clear(&self) {
        self.pipeline
            .mutate(|p| {
                p.cards.clear();
                p.flipped.clear();
            })
            .await;
    }

    /// Toggles one card between front and back. Returns whether the card now
    /// shows its back; an unknown id is ignored.
    pub async fn toggle_flip(&self, id: Uuid) -> bool {
        self.pipeline
            .mutate(|p| {
                if !p.cards.iter().any(|c| c.id == id) {
                    return false;
                }
                if p.flipped.remove(&id) {
                    false
                } else {
                    p.flipped.insert(id);
                    true
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_test_support::{FakeAiService, RecordingNotifier};

    fn sample_cards() -> Vec<Flashcard> {
        vec![
            Flashcard::new("Capital of France", "Paris"),
            Flashcard::new("Currency of France", "Euro"),
        ]
    }

    fn pipeline_with(cards: Vec<Flashcard>) -> (FlashcardPipeline, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let ai = FakeAiService::default().with_flashcards(cards);
        (
            FlashcardPipeline::new(Arc::new(ai), notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn generate_requires_source_text() {
        let (pipeline, _notifier) = pipeline_with(sample_cards());

        let result = pipeline.generate("").await;

        assert!(matches!(result, Err(AppError::Precondition(_))));
        assert!(pipeline.snapshot().await.cards.is_empty());
    }

    #[tokio::test]
    async fn generate_then_clear_empties_the_batch() {
        let (pipeline, _notifier) = pipeline_with(sample_cards());
        pipeline.generate("France facts").await.unwrap();
        assert_eq!(pipeline.snapshot().await.cards.len(), 2);

        pipeline.clear().await;
        assert!(pipeline.snapshot().await.cards.is_empty());
    }

    #[tokio::test]
    async fn clearing_an_empty_batch_is_idempotent() {
        let (pipeline, notifier) = pipeline_with(sample_cards());

        pipeline.clear().await;
        pipeline.clear().await;

        assert!(pipeline.snapshot().await.cards.is_empty());
        assert!(notifier.errors().is_empty());
        assert_eq!(pipeline.last_error().await, None);
    }

    #[tokio::test]
    async fn flip_state_toggles_and_resets_on_generate() {
        let (pipeline, _notifier) = pipeline_with(sample_cards());
        pipeline.generate("France facts").await.unwrap();

        let id = pipeline.snapshot().await.cards[0].id;
        assert!(pipeline.toggle_flip(id).await);
        assert!(pipeline.snapshot().await.flipped.contains(&id));
        assert!(!pipeline.toggle_flip(id).await);
        assert!(!pipeline.snapshot().await.flipped.contains(&id));

        pipeline.toggle_flip(id).await;
        pipeline.generate("France facts").await.unwrap();
        assert!(pipeline.snapshot().await.flipped.is_empty());
    }

    #[tokio::test]
    async fn flipping_an_unknown_id_is_ignored() {
        let (pipeline, _notifier) = pipeline_with(sample_cards());
        pipeline.generate("France facts").await.unwrap();

        assert!(!pipeline.toggle_flip(Uuid::new_v4()).await);
        assert!(pipeline.snapshot().await.flipped.is_empty());
    }
}
