//! Pipeline orchestration: one pass over a gamestate, in dependency order.
//!
//! Country blocks are scanned once and kept as borrowed slices so the
//! federation and subject-status passes can re-read them without a second
//! scan of the document.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use stellaristxt::{extract_top_level_block, id_blocks};

use crate::scalar::{extract_int, extract_string};
use crate::{budget, country, federation, species, war, ParseResult};

/// Read a plain-text gamestate file and parse it.
pub fn load_save(path: &Path) -> Result<ParseResult> {
    log::info!("Loading gamestate from {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gamestate {}", path.display()))?;
    Ok(parse_gamestate(&content))
}

/// Parse a full gamestate document. Never fails; sections that are missing
/// or malformed simply produce empty output.
pub fn parse_gamestate(content: &str) -> ParseResult {
    let mut result = ParseResult::default();

    result.game_date = extract_string(content, &[r#"(?m)^date="([^"]+)""#])
        .unwrap_or_else(|| "Unknown".to_string());
    result.tick = extract_int(content, r"(?m)^tick=(\d+)");
    log::info!("Gamestate date {} (tick {})", result.game_date, result.tick);

    let federation_info = federation::parse_federation_info(content);

    // Country blocks are consumed twice: once to build records, again for
    // the federation and subject passes that need the raw text.
    let mut raw_blocks: HashMap<u32, &str> = HashMap::new();
    if let Some(scope) = extract_top_level_block(content, "country") {
        for (country_id, data) in id_blocks(scope) {
            raw_blocks.insert(country_id, data);
            if let Some(built) = country::build_country(country_id, data) {
                result.budget_line_items.extend(budget::parse_budget(country_id, data));
                result.countries.push(built);
            }
        }
    }
    log::info!(
        "Built {} countries ({} blocks scanned)",
        result.countries.len(),
        raw_blocks.len()
    );

    if !result.countries.is_empty() {
        let names_by_id: HashMap<u32, String> = result
            .countries
            .iter()
            .map(|c| (c.country_id, c.name.clone()))
            .collect();
        let adjectives_by_id: HashMap<u32, String> = result
            .countries
            .iter()
            .map(|c| (c.country_id, c.adjective.clone()))
            .collect();

        let federation_names =
            federation::resolve_federation_names(&federation_info, &adjectives_by_id);
        federation::assign_federation_labels(
            &mut result.countries,
            &raw_blocks,
            &federation_names,
        );

        result.wars = war::parse_wars(content, &result.game_date, &names_by_id);
        country::resolve_subject_status(&mut result.countries, &names_by_id);

        let allowed: HashSet<u32> = result.countries.iter().map(|c| c.country_id).collect();
        result.species_populations = species::parse_species_demographics(content, &allowed);
    }

    result.global_species_populations = species::parse_global_species_demographics(content);

    log::info!(
        "Parsed {} budget items, {} wars, {} species rows ({} global)",
        result.budget_line_items.len(),
        result.wars.len(),
        result.species_populations.len(),
        result.global_species_populations.len()
    );
    result
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
