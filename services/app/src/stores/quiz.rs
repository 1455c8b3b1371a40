//! services/app/src/stores/quiz.rs
//!
//! The quiz pipeline: generate a batch of questions from source text, start
//! the quiz, record answers in any order, then score. Scoring is a pure
//! function of the current answers, so resubmitting with unchanged answers
//! yields the same score.

use std::sync::Arc;

use polaris_core::domain::Quiz;
use polaris_core::ports::{AiService, Notifier};
use uuid::Uuid;

use crate::error::AppError;
use crate::stores::pipeline::{Pipeline, Stage};

const GENERATE: Stage = Stage {
    working: "Generating quizzes...",
    done: "Quizzes generated!",
    failed: "Failed to generate quizzes. Please try again.",
};

const NO_SOURCE_TEXT: &str =
    "Please upload and extract text in the Notes & Uploads tab first.";

/// Where the quiz flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    /// No batch has been generated yet.
    #[default]
    Idle,
    /// A batch exists but the quiz has not been started.
    Ready,
    /// Answers are being collected.
    InProgress,
    /// The quiz has been scored.
    Scored,
}

#[derive(Debug, Clone, Default)]
pub struct QuizPayload {
    pub quizzes: Vec<Quiz>,
    pub phase: QuizPhase,
    pub score: Option<usize>,
}

pub struct QuizPipeline {
    ai: Arc<dyn AiService>,
    notifier: Arc<dyn Notifier>,
    pipeline: Pipeline<QuizPayload>,
}

impl QuizPipeline {
    pub fn new(ai: Arc<dyn AiService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            ai,
            notifier: notifier.clone(),
            pipeline: Pipeline::new(notifier, QuizPayload::default()),
        }
    }

    pub async fn snapshot(&self) -> QuizPayload {
        self.pipeline.read(|p| p.clone()).await
    }

    pub async fn is_busy(&self) -> bool {
        self.pipeline.is_busy().await
    }

    pub async fn last_error(&self) -> Option<String> {
        self.pipeline.last_error().await
    }

    /// Generates a fresh batch of questions, atomically replacing any prior
    /// batch along with its answers and score.
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
                |text| async move { ai.generate_quizzes(&text).await },
                |p, quizzes| {
                    p.quizzes = quizzes;
                    p.phase = QuizPhase::Ready;
                    p.score = None;
                },
            )
            .await
    }

    /// Notifies on a failed precondition for the local (non-gateway) steps,
    /// matching what the gateway stages do through the stage controller.
    fn report<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(AppError::Precondition(msg)) = &result {
            self.notifier.error(msg);
        }
        result
    }

    /// Starts (or restarts) the quiz, discarding any prior answers and score.
    pub async fn start(&self) -> Result<(), AppError> {
        let result = self
            .pipeline
            .mutate(|p| {
                if p.quizzes.is_empty() {
                    return Err(AppError::precondition(
                        "Generate quizzes before starting the quiz.",
                    ));
                }
                for quiz in &mut p.quizzes {
                    quiz.user_answer = None;
                    quiz.is_correct = None;
                }
                p.phase = QuizPhase::InProgress;
                p.score = None;
                Ok(())
            })
            .await;
        self.report(result)
    }

    /// Records an answer for one question. Questions may be answered in any
    /// order and none are mandatory; an unknown id is ignored.
    pub async fn answer(&self, id: Uuid, answer: &str) -> Result<(), AppError> {
        let answer = answer.to_string();
        let result = self
            .pipeline
            .mutate(|p| {
                if p.phase != QuizPhase::InProgress {
                    return Err(AppError::precondition(
                        "Start the quiz before answering questions.",
                    ));
                }
                if let Some(quiz) = p.quizzes.iter_mut().find(|q| q.id == id) {
                    quiz.user_answer = Some(answer);
                }
                Ok(())
            })
            .await;
        self.report(result)
    }

    /// Scores the quiz: one point per question whose answer exactly matches
    /// the correct answer. Stamps each question's correctness and reports
    /// the score. Idempotent for unchanged answers.
    pub async fn submit(&self) -> Result<usize, AppError> {
        let scored = self.pipeline.mutate(scoring_pass).await;
        let (score, total) = self.report(scored)?;
        self.notifier
            .success(&format!("Quiz completed! Your score: {}/{}", score, total));
        Ok(score)
    }
}

/// Scores the current batch in place. Pure over the payload, so a second
/// pass with unchanged answers produces the same result.
fn scoring_pass(p: &mut QuizPayload) -> Result<(usize, usize), AppError> {
    if p.quizzes.is_empty() || !matches!(p.phase, QuizPhase::InProgress | QuizPhase::Scored) {
        return Err(AppError::precondition(
            "Start the quiz before submitting it.",
        ));
    }
    let mut score = 0;
    for quiz in &mut p.quizzes {
        let correct = quiz.user_answer.as_deref() == Some(quiz.correct_answer.as_str());
        quiz.is_correct = Some(correct);
        if correct {
            score += 1;
        }
    }
    p.score = Some(score);
    p.phase = QuizPhase::Scored;
    Ok((score, p.quizzes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_test_support::{FakeAiService, RecordingNotifier};
    use polaris_core::domain::QuizKind;

    fn capital_quizzes() -> Vec<Quiz> {
        vec![
            Quiz::new(
                QuizKind::Mcq,
                "What is the capital of France?",
                vec![
                    "Berlin".to_string(),
                    "Madrid".to_string(),
                    "Paris".to_string(),
                    "Rome".to_string(),
                ],
                "Paris",
            ),
            Quiz::new(
                QuizKind::TrueFalse,
                "The Eiffel Tower is located in London.",
                vec![],
                "False",
            ),
        ]
    }

    fn pipeline_with(quizzes: Vec<Quiz>) -> (QuizPipeline, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let ai = FakeAiService::default().with_quizzes(quizzes);
        (QuizPipeline::new(Arc::new(ai), notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn generate_requires_source_text() {
        let (pipeline, notifier) = pipeline_with(capital_quizzes());

        let result = pipeline.generate("   ").await;

        assert!(matches!(result, Err(AppError::Precondition(_))));
        assert!(pipeline.snapshot().await.quizzes.is_empty());
        assert!(notifier.errors().contains(&NO_SOURCE_TEXT.to_string()));
    }

    #[tokio::test]
    async fn start_requires_a_generated_batch() {
        let (pipeline, notifier) = pipeline_with(capital_quizzes());

        let result = pipeline.start().await;

        assert!(matches!(result, Err(AppError::Precondition(_))));
        assert_eq!(pipeline.snapshot().await.phase, QuizPhase::Idle);
        assert!(notifier
            .errors()
            .contains(&"Generate quizzes before starting the quiz.".to_string()));
    }

    #[tokio::test]
    async fn scoring_counts_exact_matches() {
        let (pipeline, notifier) = pipeline_with(capital_quizzes());
        pipeline.generate("France facts").await.unwrap();
        pipeline.start().await.unwrap();

        let ids: Vec<Uuid> = pipeline.snapshot().await.quizzes.iter().map(|q| q.id).collect();
        pipeline.answer(ids[0], "Paris").await.unwrap();
        pipeline.answer(ids[1], "False").await.unwrap();

        let score = pipeline.submit().await.unwrap();
        assert_eq!(score, 2);

        let payload = pipeline.snapshot().await;
        assert_eq!(payload.phase, QuizPhase::Scored);
        assert_eq!(payload.score, Some(2));
        assert!(payload.quizzes.iter().all(|q| q.is_correct == Some(true)));
        assert!(notifier
            .successes()
            .contains(&"Quiz completed! Your score: 2/2".to_string()));
    }

    #[tokio::test]
    async fn wrong_answer_scores_one_of_two() {
        let (pipeline, _notifier) = pipeline_with(capital_quizzes());
        pipeline.generate("France facts").await.unwrap();
        pipeline.start().await.unwrap();

        let ids: Vec<Uuid> = pipeline.snapshot().await.quizzes.iter().map(|q| q.id).collect();
        pipeline.answer(ids[0], "Rome").await.unwrap();
        pipeline.answer(ids[1], "False").await.unwrap();

        assert_eq!(pipeline.submit().await.unwrap(), 1);
        let payload = pipeline.snapshot().await;
        assert_eq!(payload.quizzes[0].is_correct, Some(false));
        assert_eq!(payload.quizzes[1].is_correct, Some(true));
    }

    #[tokio::test]
    async fn resubmitting_unchanged_answers_yields_the_same_score() {
        let (pipeline, _notifier) = pipeline_with(capital_quizzes());
        pipeline.generate("France facts").await.unwrap();
        pipeline.start().await.unwrap();

        let ids: Vec<Uuid> = pipeline.snapshot().await.quizzes.iter().map(|q| q.id).collect();
        pipeline.answer(ids[0], "Paris").await.unwrap();

        let first = pipeline.submit().await.unwrap();
        let second = pipeline.submit().await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(pipeline.snapshot().await.score, Some(1));
    }

    #[tokio::test]
    async fn restart_clears_answers_and_score() {
        let (pipeline, _notifier) = pipeline_with(capital_quizzes());
        pipeline.generate("France facts").await.unwrap();
        pipeline.start().await.unwrap();

        let ids: Vec<Uuid> = pipeline.snapshot().await.quizzes.iter().map(|q| q.id).collect();
        pipeline.answer(ids[0], "Paris").await.unwrap();
        pipeline.submit().await.unwrap();

        pipeline.start().await.unwrap();
        let payload = pipeline.snapshot().await;
        assert_eq!(payload.phase, QuizPhase::InProgress);
        assert_eq!(payload.score, None);
        assert!(payload
            .quizzes
            .iter()
            .all(|q| q.user_answer.is_none() && q.is_correct.is_none()));
    }

    #[tokio::test]
    async fn answering_an_unknown_id_is_ignored() {
        let (pipeline, _notifier) = pipeline_with(capital_quizzes());
        pipeline.generate("France facts").await.unwrap();
        pipeline.start().await.unwrap();

        pipeline.answer(Uuid::new_v4(), "Paris").await.unwrap();

        assert!(pipeline
            .snapshot()
            .await
            .quizzes
            .iter()
            .all(|q| q.user_answer.is_none()));
    }

    #[tokio::test]
    async fn generate_replaces_the_previous_batch_atomically() {
        let (pipeline, _notifier) = pipeline_with(capital_quizzes());
        pipeline.generate("France facts").await.unwrap();
        pipeline.start().await.unwrap();
        pipeline.submit().await.unwrap();

        pipeline.generate("France facts").await.unwrap();
        let payload = pipeline.snapshot().await;
        assert_eq!(payload.phase, QuizPhase::Ready);
        assert_eq!(payload.score, None);
        assert_eq!(payload.quizzes.len(), 2);
        assert!(payload.quizzes.iter().all(|q| q.user_answer.is_none()));
    }
}
