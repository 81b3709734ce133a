use crate::domain::generation::GenerationError;
use crate::domain::language::UnknownLanguage;
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("report {0} not found")]
    NotFound(i64),
    #[error("no published report")]
    NoPublishedReport,
    #[error("report cannot be published: {0}")]
    NotPublishable(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("storage is busy, please retry")]
    ConcurrentWriteConflict,
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<UnknownLanguage> for ReportServiceError {
    fn from(err: UnknownLanguage) -> Self {
        ReportServiceError::Invalid(err.to_string())
    }
}

impl From<AppError> for ReportServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ReportServiceError::Invalid(msg),
            AppError::ServiceUnavailable(_) => ReportServiceError::ConcurrentWriteConflict,
            _ => ReportServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<ReportServiceError> for AppError {
    fn from(err: ReportServiceError) -> Self {
        match err {
            ReportServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ReportServiceError::NotPublishable(_) => AppError::BadRequest(err.to_string()),
            ReportServiceError::NotFound(_) | ReportServiceError::NoPublishedReport => {
                AppError::NotFound(err.to_string())
            }
            ReportServiceError::Generation(inner) => inner.into(),
            ReportServiceError::ConcurrentWriteConflict => {
                AppError::ServiceUnavailable(err.to_string())
            }
            ReportServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
