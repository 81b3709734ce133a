use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ImportServiceError {
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("meeting source error: {0}")]
    Upstream(String),
    #[error("storage is busy, please retry")]
    ConcurrentWriteConflict,
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<AppError> for ImportServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => ImportServiceError::Invalid(msg),
            AppError::ExternalService(msg) => ImportServiceError::Upstream(msg),
            AppError::ServiceUnavailable(_) => ImportServiceError::ConcurrentWriteConflict,
            _ => ImportServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<ImportServiceError> for AppError {
    fn from(err: ImportServiceError) -> Self {
        match err {
            ImportServiceError::Invalid(msg) => AppError::BadRequest(msg),
            ImportServiceError::Upstream(msg) => AppError::ExternalService(msg),
            ImportServiceError::ConcurrentWriteConflict => {
                AppError::ServiceUnavailable(err.to_string())
            }
            ImportServiceError::Dependency(msg) => AppError::Internal(msg),
        }
    }
}
