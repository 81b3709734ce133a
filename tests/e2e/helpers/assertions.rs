use serde_json::Value;

pub fn assert_report_response(report: &Value, expected_title: &str) {
    assert!(report.get("id").and_then(|v| v.as_i64()).is_some());
    assert_eq!(
        report.get("title").and_then(|v| v.as_str()),
        Some(expected_title)
    );

    for field in [
        "summary_raw",
        "source_language",
        "speaker",
        "meeting_time",
        "script_final",
        "question_persona",
        "status",
        "created_at",
        "updated_at",
    ] {
        assert!(report.get(field).is_some(), "Missing field '{}'", field);
    }
    for list in [
        "highlights_final",
        "reflections_final",
        "questions_final",
    ] {
        assert!(
            report.get(list).and_then(|v| v.as_array()).is_some(),
            "Field '{}' should be a list",
            list
        );
    }
}

/// Find the entry for `language` in a translations or jobs listing
pub fn language_item<'a>(listing: &'a Value, language: &str) -> &'a Value {
    listing
        .get("items")
        .and_then(|v| v.as_array())
        .and_then(|items| {
            items
                .iter()
                .find(|item| item.get("language_key").and_then(|k| k.as_str()) == Some(language))
        })
        .unwrap_or_else(|| panic!("No item for language '{}' in {}", language, listing))
}

pub fn assert_language_status(listing: &Value, language: &str, expected: &str) {
    let item = language_item(listing, language);
    assert_eq!(
        item.get("status").and_then(|v| v.as_str()),
        Some(expected),
        "Unexpected status for '{}': {}",
        language,
        item
    );
}

pub fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
