pub mod http_meeting_source_repository;
pub mod llm_repository;
pub mod meeting_source_repository;
pub mod memory_store;
pub mod openai_llm_repository;
pub mod openai_tts_repository;
pub mod postgres_reflection_audio_repository;
pub mod postgres_report_repository;
pub mod postgres_translation_repository;
pub mod reflection_audio_repository;
pub mod report_repository;
pub mod translation_repository;
pub mod tts_repository;

pub use http_meeting_source_repository::HttpMeetingSourceRepository;
pub use llm_repository::LlmRepository;
pub use meeting_source_repository::MeetingSourceRepository;
pub use memory_store::MemoryStore;
pub use openai_llm_repository::{LlmSettings, OpenAiLlmRepository};
pub use openai_tts_repository::OpenAiTtsRepository;
pub use postgres_reflection_audio_repository::PostgresReflectionAudioRepository;
pub use postgres_report_repository::PostgresReportRepository;
pub use postgres_translation_repository::PostgresTranslationRepository;
pub use reflection_audio_repository::ReflectionAudioRepository;
pub use report_repository::{ReportListFilter, ReportRepository};
pub use translation_repository::TranslationRepository;
pub use tts_repository::TtsRepository;
