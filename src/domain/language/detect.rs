use super::catalog::LanguageKey;

/// Minimum stop-word hits before a Latin-script language is claimed
const MIN_STOPWORD_HITS: usize = 3;

/// Words that are common in Malay but spelled differently in Indonesian
const MALAY_HINTS: &[&str] = &[
    "kerana", "boleh", "sahaja", "bahawa", "mahu", "wang", "kerajaan", "syarikat", "berkenaan",
    "manakala", "ialah", "iaitu",
];

/// Indonesian counterparts of the Malay hints above
const INDONESIAN_HINTS: &[&str] = &[
    "karena", "bisa", "saja", "bahwa", "mau", "uang", "pemerintah", "perusahaan", "tersebut",
    "sedangkan", "adalah", "yaitu",
];

/// Language used when there is no text at all
const EMPTY_TEXT_LANGUAGE: LanguageKey = LanguageKey::Zh;

/// Language used when no rule matches
const FALLBACK_LANGUAGE: LanguageKey = LanguageKey::En;

/// Guess the language a report was written in.
///
/// Script ranges are checked first (Devanagari, kana, CJK ideographs, Thai),
/// then Malay/Indonesian stop-word counts. Never fails.
pub fn detect_source_language(title: &str, raw_text: &str, script_text: &str) -> LanguageKey {
    let text = format!("{}\n{}\n{}", title, raw_text, script_text);
    if text.trim().is_empty() {
        return EMPTY_TEXT_LANGUAGE;
    }

    if text.chars().any(is_devanagari) {
        return LanguageKey::Hi;
    }
    if text.chars().any(is_kana) {
        return LanguageKey::Ja;
    }
    if text.chars().any(is_cjk_ideograph) {
        return LanguageKey::Zh;
    }
    if text.chars().any(is_thai) {
        return LanguageKey::Th;
    }

    let lowered = text.to_lowercase();
    let malay_hits = count_hits(&lowered, MALAY_HINTS);
    let indonesian_hits = count_hits(&lowered, INDONESIAN_HINTS);

    if malay_hits >= MIN_STOPWORD_HITS && malay_hits >= indonesian_hits {
        return LanguageKey::Ms;
    }
    if indonesian_hits >= MIN_STOPWORD_HITS {
        return LanguageKey::Id;
    }

    FALLBACK_LANGUAGE
}

fn count_hits(text: &str, hints: &[&str]) -> usize {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|word| !word.is_empty() && hints.contains(word))
        .count()
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097f}').contains(&c)
}

fn is_kana(c: char) -> bool {
    ('\u{3040}'..='\u{30ff}').contains(&c)
}

fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

fn is_thai(c: char) -> bool {
    ('\u{0e00}'..='\u{0e7f}').contains(&c)
}
