use crate::domain::generation::{GeneratedPackage, SourceContent, TranslatablePackage};
use crate::domain::report::QuestionPersona;
use async_trait::async_trait;

/// Language model capability.
///
/// Implementations own transport concerns (timeouts, retries, model
/// fallback, JSON extraction) and return raw, unvalidated content.
#[async_trait]
pub trait LlmRepository: Send + Sync {
    /// Script, highlights, reflections and questions in one call
    async fn generate_package(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<GeneratedPackage, String>;

    async fn generate_reflections(&self, source: &SourceContent) -> Result<Vec<String>, String>;

    async fn generate_questions(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<Vec<String>, String>;

    /// Translate title, script and highlights together
    async fn translate_package(
        &self,
        package: &TranslatablePackage,
        target_label: &str,
    ) -> Result<TranslatablePackage, String>;

    async fn translate_text(&self, text: &str, target_label: &str) -> Result<String, String>;
}
