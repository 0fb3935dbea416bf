//! Per-country record construction from one raw country block, plus the
//! second cross-referential pass that substitutes ids for resolved names.

use std::collections::HashMap;

use regex::Regex;
use stellaristxt::extract_inline_block;

use crate::label::{normalize_civic_label, normalize_localization_key, to_human_label};
use crate::scalar::{
    extract_decimal, extract_int, extract_int_list, extract_long, extract_string,
};
use crate::Country;

/// AI archetypes that mark narrative-system bookkeeping entities rather than
/// real empires.
const AI_DENY_TYPES: [&str; 5] = [
    "global_event",
    "shroud",
    "shroud_spirits",
    "enclave",
    "mercenary",
];

/// Internal pseudo-countries identified only by their resolved name.
const NAME_DENY_LIST: [&str; 2] = ["global_event_country", "name_animator"];

/// Markers the format leaves behind when a name template was never resolved.
const PLACEHOLDER_MARKERS: [&str; 2] = ["%ADJECTIVE%", "%ADJ%"];

/// Build one country's normalized record, or `None` when the block belongs to
/// a non-player bookkeeping entity. The enumerating caller filters the
/// `None`s, so one bad block never aborts the scope.
pub fn build_country(country_id: u32, data: &str) -> Option<Country> {
    if is_excluded_country(data) {
        return None;
    }

    let mut country = Country {
        country_id,
        name: extract_string(
            data,
            &[r#"name=\s*\{\s*key="([^"]+)""#, r#"name=\s*"([^"]+)""#],
        )
        .unwrap_or_else(|| "Unknown".to_string()),
        adjective: extract_string(
            data,
            &[
                r#"adjective=\s*\{\s*key="([^"]+)""#,
                r#"adjective=\s*"([^"]+)""#,
            ],
        )
        .unwrap_or_else(|| "Unknown".to_string()),
        government_type: extract_string(data, &[r#"government=\s*\{\s*key="([^"]+)""#])
            .unwrap_or_else(|| "Unknown".to_string()),
        authority: extract_string(data, &[r#"authority="([^"]+)""#])
            .unwrap_or_else(|| "Unknown".to_string()),
        ethos: extract_ethos(data),
        civics: extract_list_value(data, "civics", "civic_"),
        tradition_trees: extract_list_value(data, "tradition_categories", "tradition_"),
        ascension_perks: extract_list_value(data, "ascension_perks", "ap_"),
        federation_type: String::new(),
        subject_status: extract_subject_status(data),
        diplomatic_stance: extract_diplomatic_stance(data),
        diplomatic_weight: extract_diplomatic_weight(data),
        personality: extract_string(data, &[r#"personality="([^"]+)""#])
            .unwrap_or_else(|| "Unknown".to_string()),
        graphical_culture: extract_string(data, &[r#"graphical_culture="([^"]+)""#])
            .unwrap_or_else(|| "Unknown".to_string()),
        capital: extract_int(data, r"capital=(\d+)"),
        military_power: extract_decimal(data, r"military_power=([0-9.]+)"),
        economy_power: extract_decimal(data, r"economy_power=([0-9.]+)"),
        tech_power: extract_decimal(data, r"tech_power=([0-9.]+)"),
        fleet_size: extract_int(data, r"fleet_size=(\d+)"),
        empire_size: extract_int(data, r"empire_size=(\d+)"),
        num_sapient_pops: extract_long(data, r"num_sapient_pops=(\d+)"),
        victory_rank: extract_int(data, r"victory_rank=(\d+)"),
        victory_score: extract_decimal(data, r"victory_score=([0-9.]+)"),
    };

    // These values only occur for placeholder/administrative ids, never real
    // empires.
    if country.economy_power == 1.0 || country.num_sapient_pops == 0 {
        return None;
    }

    if PLACEHOLDER_MARKERS.contains(&country.name.as_str()) {
        if let Some(resolved) =
            extract_inline_block(data, "name").and_then(resolve_name_from_block)
        {
            country.name = resolved;
        }
    }

    if PLACEHOLDER_MARKERS.contains(&country.adjective.as_str()) {
        if let Some(resolved) =
            extract_inline_block(data, "adjective").and_then(resolve_adjective_from_block)
        {
            country.adjective = resolved;
        }
    }

    if country.government_type == "Unknown" {
        if let Some(block) = extract_inline_block(data, "government") {
            if let Some(resolved) =
                extract_string(block, &[r#"type="([^"]+)""#, r#"key="([^"]+)""#])
                    .filter(|v| !v.trim().is_empty())
            {
                country.government_type = resolved;
            }
        }
    }

    if NAME_DENY_LIST
        .iter()
        .any(|deny| country.name.eq_ignore_ascii_case(deny))
    {
        return None;
    }

    country.name = normalize_localization_key(&country.name);
    country.adjective = normalize_localization_key(&country.adjective);
    country.authority = to_human_label(&country.authority, "auth_");
    country.government_type = to_human_label(&country.government_type, "gov_");

    // Still carrying an unresolved name key after every resolution attempt.
    if country.name.starts_with("NAME_") {
        return None;
    }

    Some(country)
}

/// Pre-build exclusion filter. When an `ai` sub-block declares a type, that
/// declaration alone decides; the pre-FTL pattern checks only run for blocks
/// without one.
fn is_excluded_country(data: &str) -> bool {
    if let Some(ai_block) = extract_inline_block(data, "ai") {
        if let Some(ai_type) = extract_string(ai_block, &[r#"\btype="([^"]+)""#]) {
            return AI_DENY_TYPES.contains(&ai_type.as_str());
        }
    }

    const PRE_FTL_PATTERNS: [&str; 4] = [
        r#"(?i)\btype="primitive""#,
        r#"(?i)\bpersonality="pre_ftl_"#,
        r#"(?i)\borigin="origin_default_pre_ftl""#,
        r#"(?i)\bcategory="pre_ftl""#,
    ];
    PRE_FTL_PATTERNS
        .iter()
        .any(|pattern| Regex::new(pattern).map(|re| re.is_match(data)).unwrap_or(false))
}

fn extract_ethos(data: &str) -> String {
    let Some(block) = extract_inline_block(data, "ethos") else {
        return String::new();
    };
    let Ok(re) = Regex::new(r#"ethic="([^"]+)""#) else {
        return String::new();
    };

    let mut labels: Vec<String> = Vec::new();
    for caps in re.captures_iter(block) {
        let Some(value) = caps.get(1) else { continue };
        if value.as_str().trim().is_empty() {
            continue;
        }
        let label = to_human_label(value.as_str(), "ethic_");
        if !labels.iter().any(|seen| seen.eq_ignore_ascii_case(&label)) {
            labels.push(label);
        }
    }
    labels.join(", ")
}

/// Extract a de-duplicated, human-labeled, comma-joined list from an inline
/// block of quoted tokens. Hive-variant civics are folded onto their base
/// civic before labeling.
fn extract_list_value(data: &str, key: &str, prefix: &str) -> String {
    let Some(block) = extract_inline_block(data, key) else {
        return String::new();
    };
    let Ok(re) = Regex::new(r#""([^"]+)""#) else {
        return String::new();
    };

    const HIVE_INFIX: &str = "civic_hive_";
    let mut values: Vec<String> = Vec::new();
    for caps in re.captures_iter(block) {
        let Some(value) = caps.get(1) else { continue };
        let raw = value.as_str();
        if raw.trim().is_empty() {
            continue;
        }

        let folded: String;
        let raw = if prefix.eq_ignore_ascii_case("civic_")
            && raw
                .get(..HIVE_INFIX.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(HIVE_INFIX))
        {
            folded = format!("civic_{}", &raw[HIVE_INFIX.len()..]);
            &folded
        } else {
            raw
        };

        let label = normalize_civic_label(&to_human_label(raw, prefix));
        if !values.iter().any(|seen| seen.eq_ignore_ascii_case(&label)) {
            values.push(label);
        }
    }
    values.join(", ")
}

/// First-pass subject status: raw ids, resolved to names later once the
/// complete id map exists.
fn extract_subject_status(data: &str) -> String {
    let overlord = extract_int(data, r"overlord=(\d+)");
    if overlord != 0 {
        return format!("Subject of: {}", overlord);
    }

    if let Some(block) = extract_inline_block(data, "subjects") {
        let subjects = extract_int_list(block);
        if !subjects.is_empty() {
            let joined = subjects
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return format!("Overlord of: {}", joined);
        }
    }

    String::new()
}

fn extract_diplomatic_stance(data: &str) -> String {
    let stance = extract_string(
        data,
        &[
            r#"policy="diplomatic_stance"[\s\S]{0,500}?selected="([^"]+)""#,
            r#"policy="diplomatic_stance"[\s\S]{0,500}?"(diplo_stance_[^"]+)""#,
        ],
    );
    match stance {
        Some(stance) if !stance.trim().is_empty() => to_human_label(&stance, "diplo_stance_"),
        _ => String::new(),
    }
}

fn extract_diplomatic_weight(data: &str) -> String {
    let mut weight = extract_decimal(data, r"diplo_weight=([0-9.]+)");
    if weight == 0.0 {
        weight = extract_decimal(data, r"diplomatic_weight=([0-9.]+)");
    }
    if weight == 0.0 {
        String::new()
    } else {
        format_trimmed(weight)
    }
}

/// Two decimal places at most, trailing zeros dropped.
fn format_trimmed(value: f64) -> String {
    let rendered = format!("{:.2}", value);
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Compose a name from an unresolved `name` sub-block: the template's
/// `adjective` variable plus its `1` suffix variable, falling back to
/// whichever resolved.
fn resolve_name_from_block(block: &str) -> Option<String> {
    let adjective = extract_variable_value(block, "adjective");
    let suffix = extract_variable_value(block, "1");
    match (adjective, suffix) {
        (Some(adjective), Some(suffix)) => Some(format!("{} {}", adjective, suffix)),
        (Some(adjective), None) => Some(adjective),
        (None, suffix) => suffix,
    }
}

/// First non-placeholder localization key in an `adjective` sub-block,
/// preferring a species-prefixed key over any other.
fn resolve_adjective_from_block(block: &str) -> Option<String> {
    let re = Regex::new(r#"key="([^"]+)""#).ok()?;
    let candidates: Vec<&str> = re
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|value| !value.starts_with('%'))
        .collect();

    let species = candidates.iter().find(|c| c.starts_with("SPEC_"));
    species.or(candidates.first()).map(|v| (*v).to_string())
}

/// Look up `variable_key` among a block's `key="..."` entries and return the
/// first non-placeholder key that follows it.
fn extract_variable_value(block: &str, variable_key: &str) -> Option<String> {
    let re = Regex::new(r#"key="([^"]+)""#).ok()?;
    let keys: Vec<&str> = re
        .captures_iter(block)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect();

    for i in 0..keys.len().saturating_sub(1) {
        if keys[i] != variable_key {
            continue;
        }
        for key in &keys[i + 1..] {
            if !key.starts_with('%') {
                return Some((*key).to_string());
            }
        }
    }
    None
}

/// Second pass: replace raw overlord/subject ids with resolved names. Runs
/// only after every country in the document has been built, because it needs
/// the complete id map.
pub fn resolve_subject_status(countries: &mut [Country], names_by_id: &HashMap<u32, String>) {
    let Ok(subject_re) = Regex::new(r"Subject of:\s*(\d+)") else {
        return;
    };
    let Ok(overlord_re) = Regex::new(r"Overlord of:\s*(.+)") else {
        return;
    };

    for country in countries.iter_mut() {
        if country.subject_status.trim().is_empty() {
            continue;
        }

        if let Some(id) = subject_re
            .captures(&country.subject_status)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            if let Some(name) = names_by_id.get(&id) {
                country.subject_status = format!("Subject of: {}", name);
            }
        }

        if overlord_re.is_match(&country.subject_status) {
            let mut names: Vec<String> = Vec::new();
            for id in extract_int_list(&country.subject_status) {
                let Some(name) = names_by_id.get(&id) else {
                    // Unknown ids drop out of the list entirely.
                    continue;
                };
                if name.trim().is_empty() {
                    continue;
                }
                if !names.iter().any(|seen| seen.eq_ignore_ascii_case(name)) {
                    names.push(name.clone());
                }
            }
            country.subject_status = if names.is_empty() {
                String::new()
            } else {
                format!("Overlord of: {}", names.join(", "))
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viable_block(extra: &str) -> String {
        format!(
            concat!(
                "\n\tname=\"Testland\"\n\tadjective=\"Testish\"\n",
                "\tauthority=\"auth_democratic\"\n",
                "\tmilitary_power=120.5\n\teconomy_power=300.25\n\ttech_power=80\n",
                "\tfleet_size=12\n\tempire_size=40\n\tnum_sapient_pops=55\n{}"
            ),
            extra
        )
    }

    #[test]
    fn builds_viable_country() {
        let block = viable_block("");
        let country = build_country(4, &block).expect("country");
        assert_eq!(country.country_id, 4);
        assert_eq!(country.name, "Testland");
        assert_eq!(country.authority, "Democratic");
        assert_eq!(country.economy_power, 300.25);
    }

    #[test]
    fn economy_power_one_is_dropped() {
        let block = "\n\tname=\"Bookkeeper\"\n\teconomy_power=1\n\tnum_sapient_pops=10\n";
        assert!(build_country(90, block).is_none());
    }

    #[test]
    fn zero_sapient_pops_is_dropped() {
        let block = "\n\tname=\"Empty\"\n\teconomy_power=250.5\n";
        assert!(build_country(91, block).is_none());
    }

    #[test]
    fn mercenary_ai_type_is_dropped() {
        let block = viable_block("\tai={\n\t\ttype=\"mercenary\"\n\t}\n");
        assert!(build_country(92, &block).is_none());
    }

    #[test]
    fn benign_ai_type_skips_pre_ftl_checks() {
        // An explicit ai type decides alone, even with pre-FTL markers nearby.
        let block = viable_block("\tai={\n\t\ttype=\"default\"\n\t}\n\tcategory=\"pre_ftl\"\n");
        assert!(build_country(93, &block).is_some());
    }

    #[test]
    fn pre_ftl_marker_is_dropped_without_ai_type() {
        let block = viable_block("\tpersonality=\"pre_ftl_watchful\"\n");
        assert!(build_country(94, &block).is_none());
    }

    #[test]
    fn name_deny_list_applies_case_insensitively() {
        let block = "\n\tname=\"Global_Event_Country\"\n\teconomy_power=50\n\tnum_sapient_pops=5\n";
        assert!(build_country(95, block).is_none());
    }

    #[test]
    fn unresolved_name_key_is_dropped() {
        let block = "\n\tname=\"NAME_Unparsed\"\n\teconomy_power=50\n\tnum_sapient_pops=5\n";
        assert!(build_country(96, block).is_none());
    }

    #[test]
    fn placeholder_name_resolves_from_sub_block() {
        let block = concat!(
            "\n\tname={\n\t\tkey=\"%ADJECTIVE%\"\n\t\tvariables={\n",
            "\t\t\t{\n\t\t\t\tkey=\"adjective\"\n\t\t\t\tvalue={\n\t\t\t\t\tkey=\"SPEC_Vok\"\n\t\t\t\t}\n\t\t\t}\n",
            "\t\t\t{\n\t\t\t\tkey=\"1\"\n\t\t\t\tvalue={\n\t\t\t\t\tkey=\"Imperium\"\n\t\t\t\t}\n\t\t\t}\n",
            "\t\t}\n\t}\n",
            "\tadjective={\n\t\tkey=\"%ADJ%\"\n\t\tvariables={\n",
            "\t\t\t{\n\t\t\t\tkey=\"adjective\"\n\t\t\t\tvalue={\n\t\t\t\t\tkey=\"SPEC_Vok\"\n\t\t\t\t}\n\t\t\t}\n",
            "\t\t}\n\t}\n",
            "\teconomy_power=500\n\tnum_sapient_pops=33\n"
        );
        let country = build_country(5, block).expect("country");
        assert_eq!(country.name, "Vok Imperium");
        assert_eq!(country.adjective, "Vok");
    }

    #[test]
    fn government_fallback_accepts_type_or_key() {
        let block = viable_block("\tgovernment={\n\t\ttype=\"gov_hive_mind\"\n\t}\n");
        let country = build_country(6, &block).expect("country");
        assert_eq!(country.government_type, "Hive Mind");
    }

    #[test]
    fn civics_fold_hive_variants() {
        let block = viable_block(
            "\tcivics={\n\t\t\"civic_hive_ascetic\"\n\t\t\"civic_ascetic\"\n\t\t\"civic_one_mind\"\n\t}\n",
        );
        let country = build_country(7, &block).expect("country");
        assert_eq!(country.civics, "Ascetic, One Mind");
    }

    #[test]
    fn ethos_labels_are_deduplicated() {
        let block = viable_block(
            "\tethos={\n\t\tethic=\"ethic_fanatic_egalitarian\"\n\t\tethic=\"ethic_xenophile\"\n\t\tethic=\"ethic_xenophile\"\n\t}\n",
        );
        let country = build_country(8, &block).expect("country");
        assert_eq!(country.ethos, "Fanatic Egalitarian, Xenophile");
    }

    #[test]
    fn subject_status_prefers_overlord_field() {
        let block = viable_block("\toverlord=2\n\tsubjects={\n\t\t9\n\t}\n");
        let country = build_country(9, &block).expect("country");
        assert_eq!(country.subject_status, "Subject of: 2");
    }

    #[test]
    fn subject_resolution_substitutes_names() {
        let mut countries = vec![
            {
                let mut c = build_country(1, &viable_block("\toverlord=500\n")).unwrap();
                c.subject_status = "Subject of: 500".to_string();
                c
            },
            {
                let mut c = build_country(2, &viable_block("")).unwrap();
                c.subject_status = "Overlord of: 1, 777".to_string();
                c
            },
        ];
        let names: HashMap<u32, String> = [
            (500, "Something".to_string()),
            (1, "Testland".to_string()),
        ]
        .into_iter()
        .collect();

        resolve_subject_status(&mut countries, &names);
        assert_eq!(countries[0].subject_status, "Subject of: Something");
        // Unknown id 777 drops out of the overlord list.
        assert_eq!(countries[1].subject_status, "Overlord of: Testland");
    }

    #[test]
    fn overlord_list_clears_when_no_id_resolves() {
        let mut countries = vec![{
            let mut c = build_country(3, &viable_block("")).unwrap();
            c.subject_status = "Overlord of: 41, 42".to_string();
            c
        }];
        resolve_subject_status(&mut countries, &HashMap::new());
        assert_eq!(countries[0].subject_status, "");
    }

    #[test]
    fn diplomatic_weight_is_trimmed() {
        let block = viable_block("\tdiplo_weight=334.50\n");
        let country = build_country(10, &block).expect("country");
        assert_eq!(country.diplomatic_weight, "334.5");
    }
}
