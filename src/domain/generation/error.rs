use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("report content is empty")]
    EmptySource,
    #[error("incomplete generation result: {0}")]
    Incomplete(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::EmptySource => AppError::BadRequest(err.to_string()),
            GenerationError::Incomplete(_) | GenerationError::Dependency(_) => {
                AppError::ExternalService(err.to_string())
            }
        }
    }
}
