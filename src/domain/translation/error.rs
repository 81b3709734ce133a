use crate::domain::generation::GenerationError;
use crate::domain::language::{LanguageKey, UnknownLanguage};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum TranslationServiceError {
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("{0} is the source language of report {1}; edit the report itself")]
    SourceLanguageNoTranslation(LanguageKey, i64),
    #[error("report {0} not found")]
    ReportNotFound(i64),
    #[error("no target languages to translate for report {0}")]
    NoTargets(i64),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("translation into {language} failed: {message}")]
    Translation {
        language: LanguageKey,
        message: String,
    },
    #[error("speech synthesis for {language} failed: {message}")]
    Synthesis {
        language: LanguageKey,
        message: String,
    },
    #[error("storage is busy, please retry")]
    ConcurrentWriteConflict,
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<UnknownLanguage> for TranslationServiceError {
    fn from(err: UnknownLanguage) -> Self {
        TranslationServiceError::UnsupportedLanguage(err.0)
    }
}

impl From<AppError> for TranslationServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::ServiceUnavailable(_) => TranslationServiceError::ConcurrentWriteConflict,
            _ => TranslationServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<TranslationServiceError> for AppError {
    fn from(err: TranslationServiceError) -> Self {
        match err {
            TranslationServiceError::UnsupportedLanguage(_)
            | TranslationServiceError::SourceLanguageNoTranslation(..)
            | TranslationServiceError::NoTargets(_) => AppError::BadRequest(err.to_string()),
            TranslationServiceError::ReportNotFound(_) => AppError::NotFound(err.to_string()),
            TranslationServiceError::Generation(inner) => inner.into(),
            TranslationServiceError::Translation { .. }
            | TranslationServiceError::Synthesis { .. } => AppError::ExternalService(err.to_string()),
            TranslationServiceError::ConcurrentWriteConflict => {
                AppError::ServiceUnavailable(err.to_string())
            }
            TranslationServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
