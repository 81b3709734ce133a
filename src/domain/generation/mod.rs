pub mod error;
pub mod model;
pub mod service;

pub use error::GenerationError;
pub use model::{GeneratedPackage, SourceContent, TranslatablePackage};
pub use service::{GenerationService, GenerationServiceApi};
