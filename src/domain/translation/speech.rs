use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::hashing::content_hash;
use crate::domain::language::LanguageKey;
use crate::infrastructure::repositories::TtsRepository;

const CACHE_CAPACITY: u64 = 128;

/// Speech synthesis with an optional in-process cache keyed by
/// (text hash, language)
pub struct SpeechSynthesizer {
    tts_repo: Arc<dyn TtsRepository>,
    cache: Option<Cache<(String, LanguageKey), Vec<u8>>>,
}

impl SpeechSynthesizer {
    pub fn new(tts_repo: Arc<dyn TtsRepository>, cache_enabled: bool) -> Self {
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(CACHE_CAPACITY)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self { tts_repo, cache }
    }

    /// Narration for `text`; empty input or empty provider output is an error
    pub async fn synthesize(&self, text: &str, language: LanguageKey) -> Result<Vec<u8>, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("nothing to synthesize".to_string());
        }

        let key = (content_hash(text), language);
        if let Some(cache) = &self.cache {
            if let Some(audio) = cache.get(&key).await {
                tracing::debug!(language = %language, audio_size = audio.len(), "Speech cache hit");
                return Ok(audio);
            }
        }

        let audio = self.tts_repo.synthesize(text, language).await?;
        if audio.is_empty() {
            return Err(format!("speech provider returned no audio for {}", language));
        }

        if let Some(cache) = &self.cache {
            cache.insert(key, audio.clone()).await;
        }
        Ok(audio)
    }
}
