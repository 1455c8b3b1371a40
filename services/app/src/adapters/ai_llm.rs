//! services/app/src/adapters/ai_llm.rs
//!
//! This module contains the adapter for the study AI operations. It
//! implements the `AiService` port from the `core` crate: summaries,
//! tutor Q&A and revision advice go through the Responses API; quiz and
//! flashcard generation use chat completions with a JSON answer shape
//! that is validated before anything reaches the domain.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        chat::{
            ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
            CreateChatCompletionRequestArgs,
        },
        responses::CreateResponseArgs,
    },
    Client,
};
use async_trait::async_trait;
use polaris_core::{
    domain::{Flashcard, Quiz, QuizKind},
    ports::{AiService, GatewayError, GatewayResult},
};
use serde::Deserialize;

const SUMMARY_INSTRUCTIONS: &str = "You are a study assistant. Summarize the provided study \
material in plain language a student can revise from. Keep it to a short paragraph and do not \
add information that is not in the text.";

const QA_INSTRUCTIONS: &str = "You are an AI tutor. Answer the student's question using the \
provided study material as context. Be conversational and concise; if the material does not \
cover the answer, say so.";

const REVISION_INSTRUCTIONS: &str = "You are a study planner. Given the student's goals, \
recommend a short, concrete revision schedule. A few sentences at most.";

const QUIZ_SYSTEM: &str = r#"You generate quiz questions from study material. Respond with ONLY a JSON array, no prose and no code fences. Each element must have:
- "type": "mcq" or "true_false"
- "question": the question text
- "options": an array of answer options (mcq only; omit for true_false)
- "correctAnswer": the correct option, or "True"/"False" for true_false
Generate 3 to 5 questions covering the material."#;

const FLASHCARD_SYSTEM: &str = r#"You generate revision flashcards from study material. Respond with ONLY a JSON array, no prose and no code fences. Each element must have:
- "front": the prompt side
- "back": the answer side
Generate 3 to 6 cards covering the material."#;

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct QuizRecord {
    #[serde(rename = "type")]
    kind: String,
    question: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: String,
}

#[derive(Deserialize)]
struct FlashcardRecord {
    front: String,
    back: String,
}

/// Models tend to wrap JSON in markdown fences despite instructions.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

fn parse_quizzes(raw: &str) -> GatewayResult<Vec<Quiz>> {
    let records: Vec<QuizRecord> = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| GatewayError::Contract(format!("quiz payload did not parse: {}", e)))?;
    records.into_iter().map(quiz_from_record).collect()
}

fn quiz_from_record(record: QuizRecord) -> GatewayResult<Quiz> {
    let kind = match record.kind.as_str() {
        "mcq" => QuizKind::Mcq,
        "true_false" => QuizKind::TrueFalse,
        other => {
            return Err(GatewayError::Contract(format!(
                "unknown quiz type '{}'",
                other
            )))
        }
    };
    if kind == QuizKind::Mcq && record.options.is_empty() {
        return Err(GatewayError::Contract(
            "mcq question arrived without options".to_string(),
        ));
    }
    Ok(Quiz::new(
        kind,
        record.question,
        record.options,
        record.correct_answer,
    ))
}

fn parse_flashcards(raw: &str) -> GatewayResult<Vec<Flashcard>> {
    let records: Vec<FlashcardRecord> = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| GatewayError::Contract(format!("flashcard payload did not parse: {}", e)))?;
    Ok(records
        .into_iter()
        .map(|r| Flashcard::new(r.front, r.back))
        .collect())
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AiService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiStudyAdapter {
    client: Client<OpenAIConfig>,
    summary_model: String,
    qa_model: String,
    generator_model: String,
}

impl OpenAiStudyAdapter {
    /// Creates a new `OpenAiStudyAdapter`.
    pub fn new(
        client: Client<OpenAIConfig>,
        summary_model: String,
        qa_model: String,
        generator_model: String,
    ) -> Self {
        Self {
            client,
            summary_model,
            qa_model,
            generator_model,
        }
    }

    async fn respond(
        &self,
        model: &str,
        instructions: &str,
        input: String,
    ) -> GatewayResult<String> {
        let request = CreateResponseArgs::default()
            .model(model)
            .instructions(instructions)
            .input(input)
            .max_output_tokens(1000u32)
            .build()
            .map_err(|e| GatewayError::Service(e.to_string()))?;

        let response = self
            .client
            .responses()
            .create(request)
            .await
            .map_err(|e: OpenAIError| GatewayError::Service(e.to_string()))?;

        response
            .output_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GatewayError::Contract("response contained no output text".to_string()))
    }

    async fn generate(&self, system: &str, input: String) -> GatewayResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| GatewayError::Service(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(input)
                .build()
                .map_err(|e| GatewayError::Service(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.generator_model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| GatewayError::Service(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| GatewayError::Service(e.to_string()))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            GatewayError::Contract("generator returned no choices in its response".to_string())
        })?;
        choice.message.content.ok_or_else(|| {
            GatewayError::Contract("generator response contained no text content".to_string())
        })
    }
}

//=========================================================================================
// `AiService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AiService for OpenAiStudyAdapter {
    async fn summarize(&self, text: &str) -> GatewayResult<String> {
        self.respond(&self.summary_model, SUMMARY_INSTRUCTIONS, text.to_string())
            .await
    }

    async fn ask_question(&self, context: &str, question: &str) -> GatewayResult<String> {
        let input = format!(
            "STUDY MATERIAL:\n---\n{}\n---\n\nQUESTION:\n{}",
            context, question
        );
        self.respond(&self.qa_model, QA_INSTRUCTIONS, input).await
    }

    async fn generate_quizzes(&self, text: &str) -> GatewayResult<Vec<Quiz>> {
        let raw = self.generate(QUIZ_SYSTEM, text.to_string()).await?;
        parse_quizzes(&raw)
    }

    async fn generate_flashcards(&self, text: &str) -> GatewayResult<Vec<Flashcard>> {
        let raw = self.generate(FLASHCARD_SYSTEM, text.to_string()).await?;
        parse_flashcards(&raw)
    }

    async fn recommend_revision(&self, goals: &str) -> GatewayResult<String> {
        self.respond(
            &self.generator_model,
            REVISION_INSTRUCTIONS,
            goals.to_string(),
        )
        .await
    }
}
