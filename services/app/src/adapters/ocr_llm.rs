//! services/app/src/adapters/ocr_llm.rs
//!
//! This module contains the adapter for text extraction from uploaded
//! files. It implements the `OcrService` port from the `core` crate by
//! sending the file to a vision-capable model as a data URL.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use polaris_core::{
    domain::SourceFile,
    ports::{GatewayError, GatewayResult, OcrService},
};

const OCR_PROMPT: &str = "Extract all readable text from this document exactly as written. \
Output only the extracted text, with no commentary.";

/// An adapter that implements the `OcrService` port using a vision-capable
/// OpenAI model.
#[derive(Clone)]
pub struct OpenAiOcrAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiOcrAdapter {
    /// Creates a new `OpenAiOcrAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn data_url(file: &SourceFile) -> String {
        format!("data:{};base64,{}", mime_type(&file.name), STANDARD.encode(&file.bytes))
    }
}

/// The upload surface accepts .png, .jpg, .jpeg and .pdf.
fn mime_type(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|ext| ext.to_ascii_lowercase()) {
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl OcrService for OpenAiOcrAdapter {
    /// Extracts the text content of the uploaded file.
    async fn extract_text(&self, file: &SourceFile) -> GatewayResult<String> {
        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(Self::data_url(file))
                    .build()
                    .map_err(|e| GatewayError::Service(e.to_string()))?,
            )
            .build()
            .map_err(|e| GatewayError::Service(e.to_string()))?;
        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(OCR_PROMPT)
            .build()
            .map_err(|e| GatewayError::Service(e.to_string()))?;

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(vec![text_part.into(), image_part.into()])
            .build()
            .map_err(|e| GatewayError::Service(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| GatewayError::Service(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| GatewayError::Service(e.to_string()))?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            GatewayError::Contract("OCR returned no choices in its response".to_string())
        })?;
        choice.message.content.ok_or_else(|| {
            GatewayError::Contract("OCR response contained no text content".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_follows_the_accepted_extensions() {
        assert_eq!(mime_type("notes.png"), "image/png");
        assert_eq!(mime_type("scan.JPG"), "image/jpeg");
        assert_eq!(mime_type("chapter.jpeg"), "image/jpeg");
        assert_eq!(mime_type("textbook.pdf"), "application/pdf");
        assert_eq!(mime_type("mystery"), "application/octet-stream");
    }

    #[test]
    fn data_url_embeds_the_mime_type_and_payload() {
        let file = SourceFile {
            name: "notes.png".to_string(),
            bytes: vec![0, 1, 2],
        };
        let url = OpenAiOcrAdapter::data_url(&file);
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
