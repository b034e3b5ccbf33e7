//! Gardening Q&A chat backed by the analysis service.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::i18n::t;
use crate::preferences::Language;
use crate::services::AnalysisService;

const ASSISTANT_PERSONA: &str = "You are Green Guardian's AI Assistant, a friendly and knowledgeable botanist. Answer the user's questions about plants, gardening, and plant care. Keep your answers concise, helpful, and formatted with markdown.";

fn language_instruction(lang: Language) -> &'static str {
    match lang {
        Language::En => "Always respond in English.",
        Language::Hi => "Always respond in Hindi (हिंदी). Use Devanagari script.",
        Language::Bn => "Always respond in Bengali (বাংলা). Use Bengali script.",
    }
}

/// Full prompt for one user question.
pub fn assistant_prompt(lang: Language, question: &str) -> String {
    format!(
        "{} {}\n\nUser Question: {}",
        ASSISTANT_PERSONA,
        language_instruction(lang),
        question.trim()
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    fn ai(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Ai,
            content: content.into(),
        }
    }
}

pub struct Assistant {
    service: Arc<dyn AnalysisService>,
    language: Language,
    transcript: Vec<ChatMessage>,
}

impl Assistant {
    /// New chat opened with the localized greeting.
    pub fn new(service: Arc<dyn AnalysisService>, language: Language) -> Self {
        Self {
            service,
            language,
            transcript: vec![ChatMessage::ai(t("ai_greeting", language))],
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Ask one question and return the reply.
    ///
    /// Service failures are answered with a localized apology instead of an
    /// error; only a blank question is rejected.
    pub async fn ask(&mut self, question: &str) -> Result<String, String> {
        let question = question.trim();
        if question.is_empty() {
            return Err("Question is empty".to_string());
        }

        self.transcript.push(ChatMessage {
            role: ChatRole::User,
            content: question.to_string(),
        });

        let prompt = assistant_prompt(self.language, question);
        info!("Assistant question ({} chars, {})", question.len(), self.language);

        let reply = match self.service.invoke(&prompt, &[], None).await {
            Ok(value) => match reply_text(value) {
                Some(text) => text,
                None => {
                    warn!("Assistant returned an empty reply");
                    t("assistant_error", self.language).to_string()
                }
            },
            Err(e) => {
                warn!("Assistant request failed: {}", e);
                t("assistant_error", self.language).to_string()
            }
        };

        self.transcript.push(ChatMessage::ai(reply.clone()));
        Ok(reply)
    }
}

fn reply_text(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Null => return None,
        other => other.to_string(),
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
