pub mod catalog;
pub mod detect;

pub use catalog::{
    normalize_source_language, parse_language_list, LanguageKey, RenderMode, UnknownLanguage,
};
pub use detect::detect_source_language;
