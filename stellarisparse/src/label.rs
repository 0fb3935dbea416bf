//! Localization-key and machine-token normalization.
//!
//! The save format stands in machine tokens (`auth_machine_intelligence`,
//! `SPEC_Human`, `NAME_Klaxxon`) for display strings. Resolution here means
//! mapping those tokens to human-usable labels.

/// Species-prefixed localization keys become plain space-joined names;
/// anything else passes through unchanged.
pub fn normalize_localization_key(value: &str) -> String {
    match value.strip_prefix("SPEC_") {
        Some(rest) => rest.replace('_', " "),
        None => value.to_string(),
    }
}

/// Strip a machine prefix and title-case the remaining words. Single-letter
/// words stay upper-case so initialisms like `u_n` survive as "U N".
pub fn to_human_label(value: &str, prefix: &str) -> String {
    if value.trim().is_empty() {
        return value.to_string();
    }

    let stripped = if !prefix.is_empty()
        && value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    {
        &value[prefix.len()..]
    } else {
        value
    };

    let normalized = stripped.replace('_', " ");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return value.to_string();
    }

    normalized
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if word.chars().count() == 1 => first.to_uppercase().collect(),
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hive-minded empires carry a redundant "Hive " prefix on civic labels;
/// strip every leading occurrence.
pub fn normalize_civic_label(label: &str) -> String {
    let mut trimmed = label.trim();
    while trimmed
        .get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("Hive "))
    {
        trimmed = trimmed[5..].trim_start();
    }
    trimmed.to_string()
}

/// Final cleanup for a resolved federation name: drop a leading unresolved
/// name-key prefix and replace underscores with spaces.
pub fn normalize_federation_name(value: &str) -> String {
    match value.strip_prefix("NAME_") {
        Some(rest) => rest.replace('_', " "),
        None => value.replace('_', " "),
    }
}
