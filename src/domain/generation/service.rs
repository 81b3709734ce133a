use super::error::GenerationError;
use super::model::{GeneratedPackage, SourceContent, TranslatablePackage};
use crate::domain::language::LanguageKey;
use crate::domain::report::normalize::{
    normalize_highlights, normalize_questions, normalize_reflections, MAX_HIGHLIGHTS,
};
use crate::domain::report::QuestionPersona;
use crate::infrastructure::repositories::LlmRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// Fewer generated reflections than this triggers the dedicated generator
const MIN_REFLECTIONS: usize = 3;

pub struct GenerationService {
    llm_repo: Arc<dyn LlmRepository>,
}

impl GenerationService {
    pub fn new(llm_repo: Arc<dyn LlmRepository>) -> Self {
        Self { llm_repo }
    }
}

#[async_trait]
pub trait GenerationServiceApi: Send + Sync {
    /// Generate the narration script with its list fields.
    ///
    /// Exactly two highlights are required; a shorter or longer list is an
    /// incomplete result. Missing reflections and questions are back-filled
    /// by the dedicated generators.
    async fn generate_package(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<GeneratedPackage, GenerationError>;

    /// Three to five reflections, falling back to fixed templates
    async fn generate_reflections(
        &self,
        source: &SourceContent,
    ) -> Result<Vec<String>, GenerationError>;

    /// One to three questions, falling back to fixed templates
    async fn generate_questions(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<Vec<String>, GenerationError>;

    async fn translate_package(
        &self,
        package: &TranslatablePackage,
        target: LanguageKey,
    ) -> Result<TranslatablePackage, GenerationError>;

    async fn translate_text(
        &self,
        text: &str,
        target: LanguageKey,
    ) -> Result<String, GenerationError>;
}

#[async_trait]
impl GenerationServiceApi for GenerationService {
    async fn generate_package(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<GeneratedPackage, GenerationError> {
        if source.summary.trim().is_empty() {
            return Err(GenerationError::EmptySource);
        }

        tracing::info!(
            title = %source.title,
            persona = %persona,
            summary_length = source.summary.len(),
            "Generating report package"
        );

        let raw = self
            .llm_repo
            .generate_package(source, persona)
            .await
            .map_err(GenerationError::Dependency)?;

        let script = strip_fences(&raw.script);
        if script.is_empty() {
            return Err(GenerationError::Incomplete(
                "model returned no script".to_string(),
            ));
        }

        let highlights = normalize_highlights(&strip_all(&raw.highlights));
        if highlights.len() != MAX_HIGHLIGHTS {
            return Err(GenerationError::Incomplete(format!(
                "expected {} highlights, got {}",
                MAX_HIGHLIGHTS,
                highlights.len()
            )));
        }

        let with_script = SourceContent {
            script: script.clone(),
            ..source.clone()
        };

        let mut reflections = normalize_reflections(&strip_all(&raw.reflections));
        if reflections.len() < MIN_REFLECTIONS {
            tracing::info!(
                generated = reflections.len(),
                "Too few reflections in package, generating separately"
            );
            reflections = self.generate_reflections(&with_script).await?;
        }

        let mut questions = normalize_questions(&strip_all(&raw.questions));
        if questions.is_empty() {
            tracing::info!("No questions in package, generating separately");
            questions = self.generate_questions(&with_script, persona).await?;
        }

        Ok(GeneratedPackage {
            script,
            highlights,
            reflections,
            questions,
        })
    }

    async fn generate_reflections(
        &self,
        source: &SourceContent,
    ) -> Result<Vec<String>, GenerationError> {
        if source.primary_text().is_empty() {
            return Err(GenerationError::EmptySource);
        }

        match self.llm_repo.generate_reflections(source).await {
            Ok(raw) => {
                let reflections = normalize_reflections(&strip_all(&raw));
                if reflections.len() >= MIN_REFLECTIONS {
                    return Ok(reflections);
                }
                tracing::warn!(
                    generated = reflections.len(),
                    "Reflection generator returned too few items, using templates"
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reflection generation failed, using templates");
            }
        }

        Ok(fallback_reflections())
    }

    async fn generate_questions(
        &self,
        source: &SourceContent,
        persona: QuestionPersona,
    ) -> Result<Vec<String>, GenerationError> {
        let primary = source.primary_text();
        if primary.is_empty() {
            return Err(GenerationError::EmptySource);
        }

        match self.llm_repo.generate_questions(source, persona).await {
            Ok(raw) => {
                let questions = normalize_questions(&strip_all(&raw));
                if !questions.is_empty() {
                    return Ok(questions);
                }
                tracing::warn!(persona = %persona, "Question generator returned nothing, using templates");
            }
            Err(e) => {
                tracing::warn!(error = %e, persona = %persona, "Question generation failed, using templates");
            }
        }

        Ok(fallback_questions(primary))
    }

    async fn translate_package(
        &self,
        package: &TranslatablePackage,
        target: LanguageKey,
    ) -> Result<TranslatablePackage, GenerationError> {
        let source_highlights = normalize_highlights(&package.highlights);
        let input = TranslatablePackage {
            title: package.title.trim().to_string(),
            script: package.script.trim().to_string(),
            highlights: source_highlights.clone(),
        };
        if input.script.is_empty() {
            return Err(GenerationError::EmptySource);
        }

        let raw = self
            .llm_repo
            .translate_package(&input, target.label())
            .await
            .map_err(GenerationError::Dependency)?;

        let script = strip_fences(&raw.script);
        if script.is_empty() {
            return Err(GenerationError::Incomplete(format!(
                "empty {} translation",
                target
            )));
        }

        let title = match strip_fences(&raw.title) {
            t if t.is_empty() => input.title,
            t => t,
        };

        let mut highlights = normalize_highlights(&strip_all(&raw.highlights));
        if highlights.is_empty() {
            highlights = source_highlights;
        }

        Ok(TranslatablePackage {
            title,
            script,
            highlights,
        })
    }

    async fn translate_text(
        &self,
        text: &str,
        target: LanguageKey,
    ) -> Result<String, GenerationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptySource);
        }

        let translated = self
            .llm_repo
            .translate_text(text, target.label())
            .await
            .map_err(GenerationError::Dependency)?;

        let translated = strip_fences(&translated);
        if translated.is_empty() {
            return Err(GenerationError::Incomplete(format!(
                "empty {} translation",
                target
            )));
        }
        Ok(translated)
    }
}

/// Models sometimes wrap output in markdown fences, which must not be narrated
fn strip_fences(text: &str) -> String {
    text.replace("```", "").trim().to_string()
}

fn strip_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| strip_fences(s)).collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split(|c: char| matches!(c, '。' | '！' | '？' | '!' | '?' | '\n'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn fallback_reflections() -> Vec<String> {
    vec![
        "从公司治理看，建议明确决策链路和问责人，避免跨部门推进时责任模糊。".to_string(),
        "从财务角度看，建议先量化投入产出与现金流影响，并设置分阶段预算关口。".to_string(),
        "从全球金融环境看，建议评估汇率、利率和外部需求波动对目标的影响。".to_string(),
    ]
}

fn fallback_questions(source_text: &str) -> Vec<String> {
    let anchor = split_sentences(source_text)
        .first()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "本次会议的关键目标".to_string());
    vec![
        format!("围绕“{}”，最晚的交付节点究竟是哪一天？", anchor),
        "如果核心假设被证伪，团队有没有能立即执行的替代方案？".to_string(),
        "谁对最终结果负责，验收标准和问责机制写清楚了吗？".to_string(),
    ]
}
