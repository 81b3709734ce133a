pub const MAX_HIGHLIGHTS: usize = 2;
pub const MAX_REFLECTIONS: usize = 5;
pub const MAX_QUESTIONS: usize = 3;

pub fn normalize_highlights(items: &[String]) -> Vec<String> {
    normalize_list(items, MAX_HIGHLIGHTS)
}

pub fn normalize_reflections(items: &[String]) -> Vec<String> {
    normalize_list(items, MAX_REFLECTIONS)
}

pub fn normalize_questions(items: &[String]) -> Vec<String> {
    normalize_list(items, MAX_QUESTIONS)
}

/// Trim entries, drop blanks and repeats, keep the first `cap` in order
pub fn normalize_list(items: &[String], cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(cap.min(items.len()));
    for item in items {
        if out.len() == cap {
            break;
        }
        let trimmed = item.trim();
        if trimmed.is_empty() || out.iter().any(|existing| existing == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// Number of entries that would survive normalization before capping
pub fn non_blank_count(items: &[String]) -> usize {
    items.iter().filter(|item| !item.trim().is_empty()).count()
}
