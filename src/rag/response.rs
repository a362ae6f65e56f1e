//! RAG response generation and answer parsing.

use super::context::ContextFormatter;
use crate::config::{Prompts, RagSettings};
use crate::embedding::Embedder;
use crate::error::{ConsultaError, Result};
use crate::openai::create_client;
use crate::retrieval::{HybridRetriever, RetrievalConfig};
use crate::vector_store::{Document, VectorStore};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Kind of an answer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Normal,
    Emphasis,
}

/// One segment of a model answer. Every segment's content is expected to end
/// with a `(Fuente: <name>, Timestamp: HH:MM:SS)` citation; that contract
/// lives in the prompt, not in this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSegment {
    #[serde(rename = "type")]
    pub kind: SegmentKind,
    pub content: String,
}

/// A parsed model answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswer {
    pub segments: Vec<AnswerSegment>,
}

impl RagAnswer {
    /// Parse the model's raw output into typed segments.
    ///
    /// The model is instructed to emit a bare JSON array, but real outputs
    /// sometimes arrive fenced in markdown or wrapped in prose; the parser
    /// tolerates both by extracting the outermost `[...]` span. Anything
    /// that still fails to parse is a malformed-answer error for the caller.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let unfenced = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .map(|s| s.strip_suffix("```").unwrap_or(s))
            .unwrap_or(trimmed)
            .trim();

        let start = unfenced.find('[');
        let end = unfenced.rfind(']');
        let array = match (start, end) {
            (Some(start), Some(end)) if start < end => &unfenced[start..=end],
            _ => {
                return Err(ConsultaError::Answer(
                    "no JSON array found in model output".to_string(),
                ))
            }
        };

        let segments: Vec<AnswerSegment> = serde_json::from_str(array)
            .map_err(|e| ConsultaError::Answer(format!("invalid answer array: {}", e)))?;

        Ok(Self { segments })
    }

    /// All segment contents joined into one plain string.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A RAG response with the parsed answer and its supporting documents.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The parsed, citation-bearing answer.
    pub answer: RagAnswer,
    /// Documents that were formatted into the prompt context.
    pub sources: Vec<Document>,
}

/// RAG engine for question answering.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    retriever: HybridRetriever,
    formatter: ContextFormatter,
    prompts: Prompts,
}

impl RagEngine {
    /// Create a new RAG engine over session-owned components.
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        rag_settings: &RagSettings,
        retrieval: RetrievalConfig,
        prompts: Prompts,
    ) -> Self {
        let retriever = HybridRetriever::new(store, embedder).with_config(retrieval);

        Self {
            client: create_client(),
            model: rag_settings.model.clone(),
            temperature: rag_settings.temperature,
            retriever,
            formatter: ContextFormatter::new(),
            prompts,
        }
    }

    /// Access the context formatter (source-name cleaning for display).
    pub fn formatter(&self) -> &ContextFormatter {
        &self.formatter
    }

    /// Ask a single question and get a cited answer.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let documents = self.retriever.retrieve(question).await?;

        if documents.is_empty() {
            return Ok(RagResponse {
                answer: RagAnswer {
                    segments: vec![AnswerSegment {
                        kind: SegmentKind::Normal,
                        content: "No encontré información relevante en los transcritos indexados \
                                  para esta consulta."
                            .to_string(),
                    }],
                },
                sources: Vec::new(),
            });
        }

        let context = self.formatter.format(&documents);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);

        let user_prompt = self
            .prompts
            .render_with_custom(&self.prompts.rag.user, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.rag.system.clone())
                .build()
                .map_err(|e| ConsultaError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| ConsultaError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| ConsultaError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ConsultaError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let raw = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ConsultaError::Rag("Empty response from LLM".to_string()))?
            .clone();

        let answer = RagAnswer::parse(&raw)?;
        debug!(
            "Parsed answer with {} segments from {} context documents",
            answer.segments.len(),
            documents.len()
        );

        Ok(RagResponse {
            answer,
            sources: documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let raw = r#"[
            {"type": "normal", "content": "Hola (Fuente: A, Timestamp: 00:01:02)"},
            {"type": "emphasis", "content": "mundo (Fuente: B, Timestamp: 00:03:04)"}
        ]"#;

        let answer = RagAnswer::parse(raw).unwrap();
        assert_eq!(answer.segments.len(), 2);
        assert_eq!(answer.segments[0].kind, SegmentKind::Normal);
        assert_eq!(answer.segments[1].kind, SegmentKind::Emphasis);
    }

    #[test]
    fn test_parse_fenced_output() {
        let raw = "```json\n[{\"type\": \"normal\", \"content\": \"Hola\"}]\n```";
        let answer = RagAnswer::parse(raw).unwrap();
        assert_eq!(answer.segments.len(), 1);
    }

    #[test]
    fn test_parse_wrapped_in_prose() {
        let raw = r#"Respuesta: [{"type": "normal", "content": "Hola "}, {"type": "emphasis", "content": "mundo"}] (fin)"#;
        let answer = RagAnswer::parse(raw).unwrap();
        assert_eq!(answer.plain_text(), "Hola  mundo");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(RagAnswer::parse("no hay respuesta estructurada").is_err());
        assert!(RagAnswer::parse("[not valid json]").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_segment_kind() {
        let raw = r#"[{"type": "heading", "content": "Hola"}]"#;
        assert!(RagAnswer::parse(raw).is_err());
    }

    #[test]
    fn test_plain_text_joins_segments() {
        let answer = RagAnswer {
            segments: vec![
                AnswerSegment {
                    kind: SegmentKind::Normal,
                    content: "uno".to_string(),
                },
                AnswerSegment {
                    kind: SegmentKind::Emphasis,
                    content: "dos".to_string(),
                },
            ],
        };
        assert_eq!(answer.plain_text(), "uno dos");
    }
}
