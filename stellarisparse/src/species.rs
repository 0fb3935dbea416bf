//! Species population aggregation from planet ownership and pop groups.

use std::collections::{HashMap, HashSet};

use stellaristxt::{extract_inline_block, extract_top_level_block, id_blocks};

use crate::label::normalize_localization_key;
use crate::scalar::{extract_decimal, extract_int, extract_int_list, extract_string};
use crate::{GlobalSpeciesPopulation, SpeciesPopulation};

/// Species id -> display name from the `species_db` scope. Entries whose
/// name normalizes to empty are omitted so consumers fall back to a numbered
/// placeholder instead of a blank.
fn parse_species_names(species_db: &str) -> HashMap<u32, String> {
    let mut names = HashMap::new();
    for (species_id, data) in id_blocks(species_db) {
        let Some(raw) = extract_string(
            data,
            &[r#"name=\s*\{\s*key="([^"]+)""#, r#"name=\s*"([^"]+)""#],
        ) else {
            continue;
        };
        let name = normalize_localization_key(&raw);
        if !name.trim().is_empty() {
            names.insert(species_id, name);
        }
    }
    names
}

/// Per-country species populations, restricted to the given country ids.
///
/// Pop groups live on planets and planets know their owner, so ownership is
/// resolved planet-first: the `planet` scope's own `owner`/`controller`
/// fields, then each allowed country's `owned_planets`/`controlled_planets`
/// lists for planets the first pass missed.
pub fn parse_species_demographics(
    content: &str,
    allowed_country_ids: &HashSet<u32>,
) -> Vec<SpeciesPopulation> {
    let (Some(species_db), Some(planets), Some(pop_groups)) = (
        extract_top_level_block(content, "species_db"),
        extract_top_level_block(content, "planets"),
        extract_top_level_block(content, "pop_groups"),
    ) else {
        return Vec::new();
    };

    let species_names = parse_species_names(species_db);
    let planet_owners = resolve_planet_owners(content, planets, allowed_country_ids);

    let mut totals: HashMap<(u32, u32), f64> = HashMap::new();
    for (_, data) in id_blocks(pop_groups) {
        let planet_id = extract_int(data, r"planet=(\d+)");
        if planet_id == 0 {
            continue;
        }
        let Some(&owner) = planet_owners.get(&planet_id) else {
            continue;
        };
        if !allowed_country_ids.contains(&owner) {
            continue;
        }
        let species_id = extract_int(data, r"species=(\d+)");
        if species_id == 0 {
            continue;
        }
        let size = extract_decimal(data, r"size=([0-9.]+)");
        if size <= 0.0 {
            continue;
        }
        *totals.entry((owner, species_id)).or_insert(0.0) += size;
    }

    let mut populations: Vec<SpeciesPopulation> = totals
        .into_iter()
        .map(|((country_id, species_id), amount)| SpeciesPopulation {
            country_id,
            species_id,
            species_name: species_display_name(&species_names, species_id),
            amount,
        })
        .collect();
    populations.sort_by(|a, b| {
        (a.country_id, a.species_id).cmp(&(b.country_id, b.species_id))
    });

    log::debug!("Aggregated {} country/species pairs", populations.len());
    populations
}

/// Galaxy-wide totals per species, with no ownership filter. Pop groups
/// detached from any planet still count here.
pub fn parse_global_species_demographics(content: &str) -> Vec<GlobalSpeciesPopulation> {
    let (Some(species_db), Some(pop_groups)) = (
        extract_top_level_block(content, "species_db"),
        extract_top_level_block(content, "pop_groups"),
    ) else {
        return Vec::new();
    };

    let species_names = parse_species_names(species_db);

    let mut totals: HashMap<u32, f64> = HashMap::new();
    for (_, data) in id_blocks(pop_groups) {
        let species_id = extract_int(data, r"species=(\d+)");
        if species_id == 0 {
            continue;
        }
        let size = extract_decimal(data, r"size=([0-9.]+)");
        if size <= 0.0 {
            continue;
        }
        *totals.entry(species_id).or_insert(0.0) += size;
    }

    let mut populations: Vec<GlobalSpeciesPopulation> = totals
        .into_iter()
        .map(|(species_id, amount)| GlobalSpeciesPopulation {
            species_id,
            species_name: species_display_name(&species_names, species_id),
            amount,
        })
        .collect();
    populations.sort_by_key(|entry| entry.species_id);
    populations
}

fn species_display_name(species_names: &HashMap<u32, String>, species_id: u32) -> String {
    species_names
        .get(&species_id)
        .filter(|name| !name.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| format!("Species {species_id}"))
}

/// Planet id -> owning country id. Planet-declared ownership wins; country
/// planet lists only fill in planets with no recorded owner.
fn resolve_planet_owners(
    content: &str,
    planets: &str,
    allowed_country_ids: &HashSet<u32>,
) -> HashMap<u32, u32> {
    let mut owners = HashMap::new();

    if let Some(planet_scope) = extract_inline_block(planets, "planet") {
        for (planet_id, data) in id_blocks(planet_scope) {
            let owner = extract_int(data, r"owner=(\d+)");
            let owner = if owner != 0 {
                owner
            } else {
                extract_int(data, r"controller=(\d+)")
            };
            if owner != 0 {
                owners.insert(planet_id, owner);
            }
        }
    }

    if let Some(country_scope) = extract_top_level_block(content, "country") {
        for (country_id, data) in id_blocks(country_scope) {
            if !allowed_country_ids.contains(&country_id) {
                continue;
            }
            for list_key in ["owned_planets", "controlled_planets"] {
                let Some(list) = extract_inline_block(data, list_key) else {
                    continue;
                };
                for planet_id in extract_int_list(list) {
                    owners.entry(planet_id).or_insert(country_id);
                }
            }
        }
    }

    owners
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gamestate() -> String {
        concat!(
            "species_db={\n",
            "\t0={\n\t\tname={\n\t\t\tkey=\"SPEC_Human\"\n\t\t}\n\t}\n",
            "\t1={\n\t\tname=\"Vok\"\n\t}\n",
            "\t2={\n\t\tname=\"SPEC_\"\n\t}\n",
            "}\n",
            "country={\n",
            "\t0={\n\t\towned_planets={\n\t\t\t5\n\t\t}\n\t}\n",
            "\t1={\n\t\tcontrolled_planets={\n\t\t\t6\n\t\t}\n\t}\n",
            "}\n",
            "planets={\n\tplanet={\n",
            "\t\t3={\n\t\t\towner=1\n\t\t}\n",
            "\t\t4={\n\t\t\tcontroller=1\n\t\t}\n",
            "\t\t5={\n\t\t\tclass=\"pc_desert\"\n\t\t}\n",
            "\t\t6={\n\t\t\tclass=\"pc_ocean\"\n\t\t}\n",
            "\t}\n}\n",
            "pop_groups={\n",
            "\t10={\n\t\tplanet=3\n\t\tspecies=0\n\t\tsize=40.5\n\t}\n",
            "\t11={\n\t\tplanet=5\n\t\tspecies=1\n\t\tsize=7\n\t}\n",
            "\t12={\n\t\tplanet=4\n\t\tspecies=0\n\t\tsize=10\n\t}\n",
            "\t13={\n\t\tplanet=6\n\t\tspecies=2\n\t\tsize=3\n\t}\n",
            "\t14={\n\t\tplanet=0\n\t\tspecies=0\n\t\tsize=99\n\t}\n",
            "\t15={\n\t\tplanet=3\n\t\tspecies=0\n\t\tsize=0\n\t}\n",
            "}\n"
        )
        .to_string()
    }

    #[test]
    fn aggregates_per_country_through_planet_ownership() {
        let allowed: HashSet<u32> = [0, 1].into_iter().collect();
        let populations = parse_species_demographics(&gamestate(), &allowed);
        assert_eq!(populations.len(), 3);

        // Planet 5 has no recorded owner; country 0's owned_planets fills it in.
        assert_eq!(populations[0].country_id, 0);
        assert_eq!(populations[0].species_id, 1);
        assert_eq!(populations[0].species_name, "Vok");
        assert_eq!(populations[0].amount, 7.0);

        // Planets 3 and 4 resolve directly; both carry species 0.
        assert_eq!(populations[1].country_id, 1);
        assert_eq!(populations[1].species_name, "Human");
        assert_eq!(populations[1].amount, 50.5);

        // Blank species_db name falls back to a numbered placeholder.
        assert_eq!(populations[2].species_name, "Species 2");
        assert_eq!(populations[2].amount, 3.0);
    }

    #[test]
    fn ownership_filter_drops_other_countries() {
        let allowed: HashSet<u32> = [1].into_iter().collect();
        let populations = parse_species_demographics(&gamestate(), &allowed);
        assert_eq!(populations.len(), 2);
        assert!(populations.iter().all(|p| p.country_id == 1));
    }

    #[test]
    fn global_totals_ignore_ownership() {
        let populations = parse_global_species_demographics(&gamestate());
        assert_eq!(populations.len(), 3);
        // Planet-less group 14 counts globally.
        assert_eq!(populations[0].amount, 40.5 + 10.0 + 99.0);
        assert_eq!(populations[1].amount, 7.0);
        assert_eq!(populations[2].amount, 3.0);
    }

    #[test]
    fn missing_scopes_yield_empty() {
        let allowed: HashSet<u32> = [0].into_iter().collect();
        assert!(parse_species_demographics("country={\n}\n", &allowed).is_empty());
        assert!(parse_global_species_demographics("planets={\n}\n").is_empty());
    }
}
