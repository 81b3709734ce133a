use super::tts_repository::TtsRepository;
use crate::domain::language::LanguageKey;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI accepts at most 4096 characters per speech request
const MAX_BATCH_CHARS: usize = 4096;

/// OpenAI TTS implementation of the speech capability
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    default_voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, default_voice: String) -> Self {
        Self {
            client,
            model,
            default_voice,
        }
    }

    fn voice_for_language(language: LanguageKey) -> &'static str {
        match language {
            LanguageKey::Zh | LanguageKey::En => "alloy",
            LanguageKey::Yue => "nova",
            LanguageKey::Ja => "shimmer",
            LanguageKey::Id => "echo",
            LanguageKey::Ms => "fable",
            LanguageKey::Hi => "onyx",
            LanguageKey::Th => "nova",
        }
    }

    async fn call_openai(&self, text: &str, voice: &str) -> Result<Vec<u8>, String> {
        tracing::debug!(
            model = %self.model,
            voice = voice,
            text_chars = text.chars().count(),
            "Calling OpenAI TTS API"
        );

        let model = match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };

        let voice_enum = match voice.to_lowercase().as_str() {
            "echo" => Voice::Echo,
            "fable" => Voice::Fable,
            "onyx" => Voice::Onyx,
            "nova" => Voice::Nova,
            "shimmer" => Voice::Shimmer,
            _ => Voice::Alloy,
        };

        let request = CreateSpeechRequest {
            model,
            input: text.to_string(),
            voice: voice_enum,
            response_format: None,
            speed: None,
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = voice,
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        Ok(response.bytes.to_vec())
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str, language: LanguageKey) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        let voice = if self.default_voice.is_empty() {
            Self::voice_for_language(language)
        } else {
            self.default_voice.as_str()
        };

        let batches = split_into_batches(text, MAX_BATCH_CHARS);
        let mut merged_audio = Vec::new();
        for (index, batch) in batches.iter().enumerate() {
            let audio = self.call_openai(batch, voice).await?;
            merged_audio.extend(audio);
            tracing::debug!(
                batch_index = index,
                total_audio_size = merged_audio.len(),
                "Batch synthesized and merged"
            );
        }

        tracing::info!(
            provider = "openai",
            model = %self.model,
            language = %language,
            voice = voice,
            latency_ms = start_time.elapsed().as_millis(),
            characters_count = text.chars().count(),
            batch_count = batches.len(),
            audio_size_bytes = merged_audio.len(),
            "TTS synthesis completed"
        );

        Ok(merged_audio)
    }
}

fn ends_sentence(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '；')
}

fn is_latin_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split `text` into sentences. Latin punctuation ends a sentence only
/// when followed by whitespace; CJK punctuation always does.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let boundary = ends_sentence(c)
            || (is_latin_terminal(c) && chars.peek().map_or(true, |n| n.is_whitespace()));
        if boundary {
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() || is_latin_terminal(next) || ends_sentence(next) {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

/// Group sentences into batches of at most `max_chars` characters.
/// A sentence longer than the limit is cut on character boundaries.
fn split_into_batches(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for sentence in split_sentences(text) {
        let sentence_chars = sentence.chars().count();

        if current_chars + sentence_chars > max_chars && !current.trim().is_empty() {
            batches.push(current.trim().to_string());
            current.clear();
            current_chars = 0;
        }

        if sentence_chars > max_chars {
            let chars: Vec<char> = sentence.chars().collect();
            for chunk in chars.chunks(max_chars) {
                let piece: String = chunk.iter().collect();
                if !piece.trim().is_empty() {
                    batches.push(piece.trim().to_string());
                }
            }
            continue;
        }

        current.push_str(&sentence);
        current_chars += sentence_chars;
    }

    if !current.trim().is_empty() {
        batches.push(current.trim().to_string());
    }

    batches
}
