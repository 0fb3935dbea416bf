//! Federation id -> name resolution.
//!
//! Two ordered phases over in-memory maps: facts are gathered before any
//! country exists, names are resolved only once the complete country
//! adjective map is available. Modeling the phases explicitly avoids the
//! ordering bugs lazy lookups would invite.

use std::collections::HashMap;

use regex::{NoExpand, Regex};
use stellaristxt::{extract_inline_block, extract_top_level_block, id_blocks};

use crate::label::{normalize_federation_name, to_human_label};
use crate::scalar::{extract_int, extract_int_list, extract_string};
use crate::Country;

/// Facts gathered from one federation id-block. Consumed during name
/// resolution, then discarded; never exported.
#[derive(Debug, Clone)]
pub(crate) struct FederationInfo {
    /// Space-joined localization keys; may still contain `%ADJ%`.
    pub name_template: String,
    /// Human-labeled `federation_type`, used when the template cannot be
    /// resolved.
    pub type_fallback: String,
    pub members: Vec<u32>,
}

/// First phase: collect every federation's template, fallback and members.
/// Federations with neither a usable template nor any members are dropped.
pub(crate) fn parse_federation_info(content: &str) -> HashMap<u32, FederationInfo> {
    let mut result = HashMap::new();
    let Some(scope) = extract_top_level_block(content, "federation") else {
        return result;
    };

    for (federation_id, data) in id_blocks(scope) {
        let name_template = extract_name_template(data);
        let type_fallback = extract_string(data, &[r#"federation_type="([^"]+)""#])
            .filter(|value| !value.trim().is_empty())
            .map(|value| to_human_label(&value, "federation_"))
            .unwrap_or_default();
        let members = extract_int_list(extract_inline_block(data, "members").unwrap_or(""));

        if !name_template.trim().is_empty() || !members.is_empty() {
            result.insert(
                federation_id,
                FederationInfo {
                    name_template,
                    type_fallback,
                    members,
                },
            );
        }
    }

    log::debug!("Collected {} federations", result.len());
    result
}

/// Concatenate, in order, every non-placeholder localization key inside the
/// federation's `name` block. Pure-numeric keys are template variable slots,
/// not name parts.
fn extract_name_template(data: &str) -> String {
    let Some(name_block) = extract_inline_block(data, "name") else {
        return String::new();
    };
    let Ok(re) = Regex::new(r#"key="([^"]+)""#) else {
        return String::new();
    };

    let keys: Vec<&str> = re
        .captures_iter(name_block)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|value| {
            !value.trim().is_empty() && !value.chars().all(|c| c.is_ascii_digit())
        })
        .collect();
    keys.join(" ")
}

/// Second phase: substitute `%ADJ%` with the first member's non-empty
/// adjective (list order, case-insensitive substitution). A template that
/// still carries `%ADJ%` afterwards resolves to nothing and falls back to
/// the federation type label.
pub(crate) fn resolve_federation_names(
    federation_info: &HashMap<u32, FederationInfo>,
    adjectives_by_id: &HashMap<u32, String>,
) -> HashMap<u32, String> {
    let mut result = HashMap::new();
    let Ok(adj_re) = Regex::new(r"(?i)%ADJ%") else {
        return result;
    };

    for (id, info) in federation_info {
        if info.name_template.trim().is_empty() {
            continue;
        }

        let adjective = info
            .members
            .iter()
            .filter_map(|member_id| adjectives_by_id.get(member_id))
            .find(|adjective| !adjective.trim().is_empty());

        let mut resolved = info.name_template.clone();
        if let Some(adjective) = adjective {
            if adj_re.is_match(&resolved) {
                resolved = adj_re
                    .replace_all(&resolved, NoExpand(adjective.as_str()))
                    .into_owned();
            }
        }
        if adj_re.is_match(&resolved) {
            resolved.clear();
        }

        let mut resolved = normalize_federation_name(&resolved);
        if resolved.trim().is_empty() && !info.type_fallback.trim().is_empty() {
            resolved = info.type_fallback.clone();
        }
        if !resolved.trim().is_empty() {
            result.insert(*id, resolved);
        }
    }
    result
}

/// Country blocks reference their federation via `federation=` or, for
/// associate members, `associated_federation=`.
pub(crate) fn extract_federation_id(data: &str) -> u32 {
    let id = extract_int(data, r"federation=(\d+)");
    if id != 0 {
        id
    } else {
        extract_int(data, r"associated_federation=(\d+)")
    }
}

/// Assign resolved federation names onto the built countries, keyed through
/// each country's raw block.
pub(crate) fn assign_federation_labels(
    countries: &mut [Country],
    raw_blocks: &HashMap<u32, &str>,
    federation_names: &HashMap<u32, String>,
) {
    for country in countries.iter_mut() {
        let Some(data) = raw_blocks.get(&country.country_id) else {
            continue;
        };
        let federation_id = extract_federation_id(data);
        if federation_id == 0 {
            continue;
        }
        if let Some(name) = federation_names.get(&federation_id) {
            country.federation_type = name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(template: &str, fallback: &str, members: Vec<u32>) -> HashMap<u32, FederationInfo> {
        [(
            1u32,
            FederationInfo {
                name_template: template.to_string(),
                type_fallback: fallback.to_string(),
                members,
            },
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn collects_template_fallback_and_members() {
        let content = concat!(
            "federation={\n\t1={\n",
            "\t\tname={\n\t\t\tkey=\"%ADJ%\"\n\t\t\tkey=\"1\"\n\t\t\tkey=\"Commonwealth\"\n\t\t}\n",
            "\t\tfederation_type=\"default_federation\"\n",
            "\t\tmembers={\n\t\t\t0 4\n\t\t}\n",
            "\t}\n\t2={\n\t\tleader=7\n\t}\n}\n"
        );
        let federations = parse_federation_info(content);
        assert_eq!(federations.len(), 1);
        let info = &federations[&1];
        assert_eq!(info.name_template, "%ADJ% Commonwealth");
        assert_eq!(info.type_fallback, "Default Federation");
        assert_eq!(info.members, vec![0, 4]);
    }

    #[test]
    fn substitutes_first_resolvable_member_adjective() {
        let adjectives: HashMap<u32, String> = [
            (0, String::new()),
            (4, "Earthling".to_string()),
        ]
        .into_iter()
        .collect();
        let names = resolve_federation_names(
            &info("%ADJ% Commonwealth", "Default Federation", vec![0, 4]),
            &adjectives,
        );
        assert_eq!(names[&1], "Earthling Commonwealth");
    }

    #[test]
    fn falls_back_to_type_when_template_unresolved() {
        let names = resolve_federation_names(
            &info("%ADJ% Commonwealth", "Martial Alliance", vec![9]),
            &HashMap::new(),
        );
        assert_eq!(names[&1], "Martial Alliance");
    }

    #[test]
    fn strips_name_key_prefix_on_resolution() {
        let names =
            resolve_federation_names(&info("NAME_Star_Concord", "", vec![2]), &HashMap::new());
        assert_eq!(names[&1], "Star Concord");
    }

    #[test]
    fn federation_id_falls_back_to_associated() {
        assert_eq!(extract_federation_id("\tfederation=3\n"), 3);
        assert_eq!(extract_federation_id("\tassociated_federation=8\n"), 8);
        assert_eq!(extract_federation_id("\tname=\"None\"\n"), 0);
    }
}
