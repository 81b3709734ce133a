use super::llm_repository::LlmRepository;
use crate::domain::generation::{GeneratedPackage, SourceContent, TranslatablePackage};
use crate::domain::report::QuestionPersona;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for a single retry sleep
const MAX_BACKOFF: Duration = Duration::from_secs(8);

const PACKAGE_MAX_TOKENS: u32 = 1200;
const REFLECTIONS_MAX_TOKENS: u32 = 1800;
const QUESTIONS_MAX_TOKENS: u32 = 800;
const TRANSLATE_PACKAGE_MAX_TOKENS: u32 = 2200;
const TRANSLATE_TEXT_MAX_TOKENS: u32 = 1600;

/// Transport settings for chat completions
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub fallback_models: Vec<String>,
    pub request_timeout: Duration,
    pub retry_count: u32,
    pub retry_backoff: Duration,
}

/// Outcome of one model's attempts
#[derive(Debug)]
struct CallError {
    message: String,
    model_missing: bool,
}

/// OpenAI chat-completions implementation of the language model capability
pub struct OpenAiLlmRepository {
    client: Arc<Client<OpenAIConfig>>,
    settings: LlmSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageBody {
    script: String,
    highlights: Vec<String>,
    reflections: Vec<String>,
    questions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReflectionsBody {
    reflections: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuestionsBody {
    questions: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TranslationBody {
    title: String,
    script: String,
    highlights: Vec<String>,
}

impl OpenAiLlmRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, settings: LlmSettings) -> Self {
        Self { client, settings }
    }

    /// Primary model followed by the fallbacks, without repeats
    fn model_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let all = std::iter::once(&self.settings.model).chain(self.settings.fallback_models.iter());
        for model in all {
            let model = model.trim();
            if !model.is_empty() && !candidates.iter().any(|c| c == model) {
                candidates.push(model.to_string());
            }
        }
        candidates
    }

    /// Run a completion, walking the fallback list only when a model does not exist
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String, String> {
        let candidates = self.model_candidates();
        let mut last_error = String::from("no model configured");

        for model in &candidates {
            match self.complete_with_retry(model, system, user, max_tokens).await {
                Ok(content) => return Ok(content),
                Err(err) if err.model_missing => {
                    tracing::warn!(model = %model, error = %err.message, "Model not found, trying next fallback");
                    last_error = err.message;
                }
                Err(err) => return Err(err.message),
            }
        }

        Err(format!(
            "no usable model among [{}], last error: {}",
            candidates.join(","),
            last_error
        ))
    }

    async fn complete_with_retry(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, CallError> {
        let attempts = self.settings.retry_count.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let start_time = std::time::Instant::now();
            match self.call_openai(model, system, user, max_tokens).await {
                Ok(content) => {
                    tracing::info!(
                        provider = "openai",
                        model = %model,
                        attempt = attempt,
                        latency_ms = start_time.elapsed().as_millis(),
                        response_length = content.len(),
                        "Chat completion succeeded"
                    );
                    return Ok(content);
                }
                Err(message) if is_model_not_found(&message) => {
                    return Err(CallError {
                        message,
                        model_missing: true,
                    });
                }
                Err(message) => {
                    tracing::warn!(
                        model = %model,
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %message,
                        "Chat completion failed"
                    );
                    last_error = message;
                }
            }

            if attempt < attempts {
                tokio::time::sleep(backoff_delay(self.settings.retry_backoff, attempt)).await;
            }
        }

        Err(CallError {
            message: format!("request failed after {} attempts: {}", attempts, last_error),
            model_missing: false,
        })
    }

    async fn call_openai(
        &self,
        model: &str,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| e.to_string())?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| e.to_string())?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| e.to_string())?;

        let response = tokio::time::timeout(
            self.settings.request_timeout,
            self.client.chat().create(request),
        )
        .await
        .map_err(|_| {
            format!(
                "timed out after {}s",
                self.settings.request_timeout.as_secs()
            )
        })?
        .map_err(|e| format!("OpenAI chat error: {}", e))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }

    async fn complete_json<T>(&self, system: &str, user: &str, max_tokens: u32) -> Result<T, String>
    where
        T: for<'de> Deserialize<'de>,
    {
        let content = self.complete(system, user, max_tokens).await?;
        let json = extract_json(&content).ok_or("model response contained no JSON object")?;
        serde_json::from_str(json).map_err(|e| format!("invalid JSON from model: {}", e))
    }
}

#[async_trait]
impl LlmRepository for OpenAiLlmRepository {
    async fn generate_package(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<GeneratedPackage, String> {
        let system = format!(
            "You are a broadcast news editor with a background in international finance. \
             Rewrite the meeting summary as a plain-spoken narration script in the language of the summary, \
             extract exactly 2 highlights, give 3 to 5 actionable reflections covering corporate governance, \
             finance and the global financial environment, and ask 1 to 3 probing questions. \
             Questions take this perspective: {} Questions must not contain answers. \
             Return strict JSON only: \
             {{\"script\":\"...\",\"highlights\":[\"...\",\"...\"],\"reflections\":[\"...\"],\"questions\":[\"...\"]}}",
            persona.prompt()
        );
        let user = format!(
            "Title: {}\nSpeaker: {}\nMeeting summary: {}",
            source.title, source.speaker, source.summary
        );

        let body: PackageBody = self.complete_json(&system, &user, PACKAGE_MAX_TOKENS).await?;
        Ok(GeneratedPackage {
            script: body.script,
            highlights: body.highlights,
            reflections: body.reflections,
            questions: body.questions,
        })
    }

    async fn generate_reflections(&self, source: &SourceContent) -> Result<Vec<String>, String> {
        let system = "You are an expert in international finance and corporate governance. \
                      Based on the meeting content give 3 to 5 actionable reflections, written in the language of the content, \
                      covering corporate governance, financial health and the global financial environment. \
                      Return strict JSON only: {\"reflections\":[\"...\",\"...\",\"...\"]}";
        let user = source_payload(source, None);

        let body: ReflectionsBody = self
            .complete_json(system, &user, REFLECTIONS_MAX_TOKENS)
            .await?;
        Ok(body.reflections)
    }

    async fn generate_questions(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<Vec<String>, String> {
        let system = format!(
            "{} Ask 1 to 3 sharp questions about the meeting content, written in the language of the content. \
             Stay specific to the content, never include answers and avoid repeats. \
             Return strict JSON only: {{\"questions\":[\"...\",\"...\"]}}",
            persona.prompt()
        );
        let user = source_payload(source, Some(persona));

        let body: QuestionsBody = self
            .complete_json(&system, &user, QUESTIONS_MAX_TOKENS)
            .await?;
        Ok(body.questions)
    }

    async fn translate_package(
        &self,
        package: &TranslatablePackage,
        target_label: &str,
    ) -> Result<TranslatablePackage, String> {
        let system = format!(
            "You are a professional news translation editor. Translate the input into {}. \
             Do not add or drop facts. {}\
             Return strict JSON only: {{\"title\":\"...\",\"script\":\"...\",\"highlights\":[\"...\",\"...\"]}}",
            target_label,
            extra_rules(target_label)
        );
        let input = TranslationBody {
            title: package.title.clone(),
            script: package.script.clone(),
            highlights: package.highlights.clone(),
        };
        let user = serde_json::to_string(&input).map_err(|e| e.to_string())?;

        let body: TranslationBody = self
            .complete_json(&system, &user, TRANSLATE_PACKAGE_MAX_TOKENS)
            .await?;
        Ok(TranslatablePackage {
            title: body.title,
            script: body.script,
            highlights: body.highlights,
        })
    }

    async fn translate_text(&self, text: &str, target_label: &str) -> Result<String, String> {
        let system = format!(
            "You are a professional news narration translator. Translate the input into {}. \
             Stay faithful to the source and keep numbers, names and dates exact. \
             The output must read naturally aloud. {}\
             Return only the translated text with no explanation, quotes or heading.",
            target_label,
            extra_rules(target_label)
        );

        let content = self
            .complete(&system, text, TRANSLATE_TEXT_MAX_TOKENS)
            .await?;
        if content.is_empty() {
            return Err("empty translation".to_string());
        }
        Ok(content)
    }
}

fn source_payload(source: &SourceContent, persona: Option<QuestionPersona>) -> String {
    serde_json::json!({
        "title": source.title.trim(),
        "summary": source.summary.trim(),
        "script": source.script.trim(),
        "persona": persona.map(|p| p.as_str()),
    })
    .to_string()
}

fn extra_rules(target_label: &str) -> &'static str {
    if target_label.contains("Cantonese") {
        "Write colloquial spoken Cantonese in Traditional Chinese characters; do not fall back to written Mandarin. "
    } else {
        ""
    }
}

/// Exponential backoff, `base * 2^(attempt-1)`, capped
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor).min(MAX_BACKOFF)
}

fn is_model_not_found(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("resource not found")
        || lowered.contains("model_not_found")
        || lowered.contains("deploymentnotfound")
        || lowered.contains("error code: 404")
        || (lowered.contains("model") && lowered.contains("does not exist"))
}

/// The JSON object in a model reply: the whole reply, or its outermost braces
fn extract_json(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.starts_with('{') && text.ends_with('}') {
        return Some(text);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
