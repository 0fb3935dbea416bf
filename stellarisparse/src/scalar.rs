//! First-match-wins scalar extraction over raw block text.
//!
//! Numeric extractors default to zero on absence or malformed text; the
//! format's irregularities (missing fields, localization placeholders where a
//! number is expected) are routine, not errors.

use regex::Regex;

/// Try each pattern in caller-specified priority order and return the first
/// capture group of the first pattern that matches. Callers list the
/// localized-key form before the plain-string form.
pub fn extract_string(text: &str, patterns: &[&str]) -> Option<String> {
    for pattern in patterns {
        let Ok(re) = Regex::new(pattern) else { continue };
        if let Some(m) = re.captures(text).and_then(|caps| caps.get(1)) {
            return Some(m.as_str().to_string());
        }
    }
    None
}

pub fn extract_int(text: &str, pattern: &str) -> u32 {
    extract_parsed(text, pattern).unwrap_or(0)
}

pub fn extract_long(text: &str, pattern: &str) -> i64 {
    extract_parsed(text, pattern).unwrap_or(0)
}

pub fn extract_decimal(text: &str, pattern: &str) -> f64 {
    extract_parsed(text, pattern).unwrap_or(0.0)
}

fn extract_parsed<T: std::str::FromStr>(text: &str, pattern: &str) -> Option<T> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Last match wins. Some numeric fields are logged repeatedly as a change
/// history and only the final occurrence reflects current state, so this
/// scans all matches and keeps the last one.
pub fn extract_last_decimal(text: &str, pattern: &str) -> f64 {
    let Ok(re) = Regex::new(pattern) else {
        return 0.0;
    };
    re.captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Every standalone integer in a block, in document order. Used for the
/// flat id lists the format favors (`members`, `subjects`, `owned_planets`).
pub fn extract_int_list(text: &str) -> Vec<u32> {
    let Ok(re) = Regex::new(r"\b(\d+)\b") else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
