//! Extraction pipeline for Stellaris gamestate documents.
//!
//! Converts the nested `key=value` / `key={...}` save dialect into normalized
//! relational records describing empires, their budgets, populations and wars
//! at one point in time. The pipeline runs single-threaded over an in-memory
//! document and never fails outright: absent sections yield empty collections,
//! and a malformed entity drops only itself.

pub mod budget;
pub mod country;
pub mod federation;
pub mod label;
pub mod parse;
pub mod scalar;
pub mod species;
pub mod war;

use serde::{Deserialize, Serialize};

/// One empire extracted from the gamestate's `country` scope.
///
/// Non-player bookkeeping entities (event countries, pre-FTL primitives,
/// mercenary enclaves, placeholder ids) never make it into this struct; the
/// country builder filters them out before construction completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub country_id: u32,
    pub name: String,
    pub adjective: String,
    pub government_type: String,
    pub authority: String,
    /// De-duplicated, human-labeled ethics, comma-joined.
    pub ethos: String,
    pub civics: String,
    pub tradition_trees: String,
    pub ascension_perks: String,
    /// Resolved federation name, filled in by the second pass; empty when the
    /// country belongs to no federation.
    pub federation_type: String,
    /// `"Subject of: <name>"` or `"Overlord of: <names>"` after second-pass
    /// resolution; empty otherwise.
    pub subject_status: String,
    pub diplomatic_stance: String,
    /// Trimmed decimal string; empty when the save carries no weight.
    pub diplomatic_weight: String,
    pub personality: String,
    pub graphical_culture: String,
    pub capital: u32,
    pub military_power: f64,
    pub economy_power: f64,
    pub tech_power: f64,
    pub fleet_size: u32,
    pub empire_size: u32,
    pub num_sapient_pops: i64,
    pub victory_rank: u32,
    pub victory_score: f64,
}

/// One `current_month` budget entry for one country.
///
/// Not unique-keyed: the same `(country, section, category, resource)` tuple
/// can legitimately occur from different sub-blocks and every occurrence is
/// kept. Summing is the consumer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLineItem {
    pub country_id: u32,
    /// One of `income`, `expenses`, `balance`.
    pub section: String,
    pub category: String,
    pub resource_type: String,
    pub amount: f64,
}

/// Aggregate population of one species under one empire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPopulation {
    pub country_id: u32,
    pub species_id: u32,
    pub species_name: String,
    pub amount: f64,
}

/// Galaxy-wide aggregate population of one species, independent of ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSpeciesPopulation {
    pub species_id: u32,
    pub species_name: String,
    pub amount: f64,
}

/// One labeled war from the document-level `war` scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedWar {
    pub war_id: u32,
    /// Comma-joined attacker names; unknown ids render as `"Country <id>"`.
    pub attackers: String,
    pub defenders: String,
    /// `"<attackers> vs <defenders>"`, empty when either side has no label.
    pub war_name: String,
    pub war_start_date: String,
    /// `"<years>y <months>m"` or `"<months>m"`; empty when either date is
    /// unparseable.
    pub war_length: String,
    pub attacker_war_exhaustion: f64,
    pub defender_war_exhaustion: f64,
    pub attacker_ids: Vec<u32>,
    pub defender_ids: Vec<u32>,
}

/// Everything extracted from one gamestate document. Constructed fresh per
/// parse, immutable once returned, owned exclusively by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseResult {
    pub countries: Vec<Country>,
    pub budget_line_items: Vec<BudgetLineItem>,
    pub species_populations: Vec<SpeciesPopulation>,
    pub global_species_populations: Vec<GlobalSpeciesPopulation>,
    pub wars: Vec<ParsedWar>,
    pub game_date: String,
    pub tick: u32,
}
