//! Active war extraction: participants, exhaustion, and elapsed length.

use std::collections::HashMap;

use regex::Regex;
use stellaristxt::{extract_inline_block, extract_top_level_block, id_blocks};

use crate::scalar::{extract_last_decimal, extract_string};
use crate::ParsedWar;

/// Walk the top-level `war` scope and build one record per id-block that has
/// at least one participant on either side.
pub fn parse_wars(
    content: &str,
    game_date: &str,
    names_by_id: &HashMap<u32, String>,
) -> Vec<ParsedWar> {
    let mut wars = Vec::new();
    let Some(scope) = extract_top_level_block(content, "war") else {
        return wars;
    };

    for (war_id, data) in id_blocks(scope) {
        let attacker_ids = extract_war_side(data, "attackers");
        let defender_ids = extract_war_side(data, "defenders");
        if attacker_ids.is_empty() && defender_ids.is_empty() {
            continue;
        }

        let attackers = build_side_label(&attacker_ids, names_by_id);
        let defenders = build_side_label(&defender_ids, names_by_id);
        let war_name = build_war_name(&attackers, &defenders);

        let war_start_date =
            extract_string(data, &[r#"start_date=\s*"([^"]+)""#]).unwrap_or_default();
        let war_length = build_war_length(game_date, &war_start_date);

        // Exhaustion lines accumulate per battle; the last one is current.
        let attacker_war_exhaustion =
            extract_last_decimal(data, r"attacker_war_exhaustion=([0-9.]+)");
        let defender_war_exhaustion =
            extract_last_decimal(data, r"defender_war_exhaustion=([0-9.]+)");

        wars.push(ParsedWar {
            war_id,
            attackers,
            defenders,
            war_name,
            war_start_date,
            war_length,
            attacker_war_exhaustion,
            defender_war_exhaustion,
            attacker_ids,
            defender_ids,
        });
    }

    log::debug!("Parsed {} wars", wars.len());
    wars
}

/// Country ids under one side's block, in document order with duplicates
/// collapsed.
fn extract_war_side(data: &str, side: &str) -> Vec<u32> {
    let Some(block) = extract_inline_block(data, side) else {
        return Vec::new();
    };
    let Ok(re) = Regex::new(r"country=(\d+)") else {
        return Vec::new();
    };

    let mut ids = Vec::new();
    for caps in re.captures_iter(block) {
        let Some(id) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// "A, B" style participant label. Unknown ids fall back to a numbered
/// placeholder so the side is never silently shortened.
fn build_side_label(ids: &[u32], names_by_id: &HashMap<u32, String>) -> String {
    let mut names: Vec<String> = Vec::new();
    for id in ids {
        let name = names_by_id
            .get(id)
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Country {id}"));
        if !names
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(&name))
        {
            names.push(name);
        }
    }
    names.join(", ")
}

/// "A vs D", synthesized from the side labels alone. The block's own `name`
/// field is an unresolved localization template and is never used.
fn build_war_name(attackers: &str, defenders: &str) -> String {
    if !attackers.trim().is_empty() && !defenders.trim().is_empty() {
        return format!("{attackers} vs {defenders}");
    }
    String::new()
}

/// Elapsed time between two `yyyy.mm.dd` dates as a "Ny Mm" / "Mm" label.
///
/// Whole months only. When the current day of month is earlier than the
/// start's, the in-progress month has not completed and is not counted.
pub fn build_war_length(current_date: &str, start_date: &str) -> String {
    let (Some((cy, cm, cd)), Some((sy, sm, sd))) =
        (parse_game_date(current_date), parse_game_date(start_date))
    else {
        return String::new();
    };

    let mut months = (cy - sy) * 12 + (cm - sm);
    if cd < sd {
        months -= 1;
    }
    let months = months.max(0);

    if months >= 12 {
        format!("{}y {}m", months / 12, months % 12)
    } else {
        format!("{months}m")
    }
}

/// Strict `yyyy.mm.dd` with calendar validation. Game dates use years far
/// outside any real calendar but still follow Gregorian month lengths.
fn parse_game_date(value: &str) -> Option<(i64, i64, i64)> {
    let re = Regex::new(r"^(\d{4})\.(\d{2})\.(\d{2})$").ok()?;
    let caps = re.captures(value.trim())?;
    let year: i64 = caps.get(1)?.as_str().parse().ok()?;
    let month: i64 = caps.get(2)?.as_str().parse().ok()?;
    let day: i64 = caps.get(3)?.as_str().parse().ok()?;

    if year < 1 || !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
        return None;
    }
    Some((year, month, day))
}

fn days_in_month(year: i64, month: i64) -> i64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}
