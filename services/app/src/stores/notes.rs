//! services/app/src/stores/notes.rs
//!
//! The notes pipeline: select a file, extract its text, summarize it, ask
//! the tutor questions about it. Each stage depends on the previous stage's
//! output; re-invoking an earlier stage invalidates everything derived from
//! the old output.

use std::sync::Arc;

use polaris_core::domain::SourceFile;
use polaris_core::ports::{AiService, Notifier, OcrService};

use crate::error::AppError;
use crate::stores::pipeline::{Pipeline, Stage};

const EXTRACT: Stage = Stage {
    working: "Uploading file and performing OCR...",
    done: "Text extracted successfully!",
    failed: "Failed to extract text. Please try again.",
};

const SUMMARIZE: Stage = Stage {
    working: "Summarizing text...",
    done: "Text summarized!",
    failed: "Failed to summarize text. Please try again.",
};

const ASK: Stage = Stage {
    working: "Asking AI tutor...",
    done: "Answer received!",
    failed: "Failed to get an answer. Please try again.",
};

/// Everything the notes flow has produced so far.
#[derive(Debug, Clone, Default)]
pub struct NotesPayload {
    pub source_file: Option<SourceFile>,
    pub extracted_text: Option<String>,
    pub summary: Option<String>,
    pub question: Option<String>,
    pub answer: Option<String>,
}

pub struct NotesPipeline {
    ocr: Arc<dyn OcrService>,
    ai: Arc<dyn AiService>,
    pipeline: Pipeline<NotesPayload>,
}

impl NotesPipeline {
    pub fn new(
        ocr: Arc<dyn OcrService>,
        ai: Arc<dyn AiService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ocr,
            ai,
            pipeline: Pipeline::new(notifier, NotesPayload::default()),
        }
    }

    pub async fn snapshot(&self) -> NotesPayload {
        self.pipeline.read(|p| p.clone()).await
    }

    pub async fn is_busy(&self) -> bool {
        self.pipeline.is_busy().await
    }

    pub async fn last_error(&self) -> Option<String> {
        self.pipeline.last_error().await
    }

    /// Selects a new source file. Everything derived from the previous file
    /// is discarded so stale output is never shown against new source data.
    ///
    /// Selection is the first stage of the pipeline, so it obeys the same
    /// overlap rule as the gateway stages: while a call is outstanding the
    /// selection is a no-op and `false` is returned. Otherwise the in-flight
    /// OCR result would be attributed to the newly selected file.
    pub async fn select_file(&self, file: SourceFile) -> bool {
        self.pipeline
            .mutate_idle(|p| {
                p.source_file = Some(file);
                p.extracted_text = None;
                p.summary = None;
                p.question = None;
                p.answer = None;
            })
            .await
    }

    /// Runs OCR on the selected file. Requires a selected file; clears any
    /// previously derived summary and answer before the call resolves.
    pub async fn extract(&self) -> Result<(), AppError> {
        let ocr = self.ocr.clone();
        self.pipeline
            .run_stage(
                &EXTRACT,
                |p| {
                    let file = p
                        .source_file
                        .clone()
                        .ok_or_else(|| AppError::precondition("Please select a file first."))?;
                    p.summary = None;
                    p.answer = None;
                    Ok(file)
                },
                |file| async move { ocr.extract_text(&file).await },
                |p, text| p.extracted_text = Some(text),
            )
            .await
    }

    /// Summarizes the extracted text. Requires a non-empty extraction.
    pub async fn summarize(&self) -> Result<(), AppError> {
        let ai = self.ai.clone();
        self.pipeline
            .run_stage(
                &SUMMARIZE,
                |p| match &p.extracted_text {
                    Some(text) if !text.trim().is_empty() => Ok(text.clone()),
                    _ => Err(AppError::precondition("Please extract text first.")),
                },
                |text| async move { ai.summarize(&text).await },
                |p, summary| p.summary = Some(summary),
            )
            .await
    }

    /// Asks the tutor a question about the extracted text. Re-invocable per
    /// new question; earlier output is left intact.
    pub async fn ask(&self, question: &str) -> Result<(), AppError> {
        let ai = self.ai.clone();
        let question = question.trim().to_string();
        self.pipeline
            .run_stage(
                &ASK,
                |p| {
                    let context = match &p.extracted_text {
                        Some(text) if !text.trim().is_empty() => text.clone(),
                        _ => {
                            return Err(AppError::precondition(
                                "Please extract text and ask a question.",
                            ))
                        }
                    };
                    if question.is_empty() {
                        return Err(AppError::precondition(
                            "Please extract text and ask a question.",
                        ));
                    }
                    p.question = Some(question.clone());
                    Ok((context, question.clone()))
                },
                |(context, question)| async move { ai.ask_question(&context, &question).await },
                |p, answer| p.answer = Some(answer),
            )
            .await
    }
}
