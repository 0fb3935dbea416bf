//! Budget line-item extraction from one country block.

use regex::Regex;
use stellaristxt::extract_inline_block;

use crate::BudgetLineItem;

const SECTIONS: [&str; 3] = ["income", "expenses", "balance"];

/// Pull every resource/value pair from a country's
/// `budget -> current_month -> {income, expenses, balance}` scopes.
///
/// Sections are independent; a missing one simply yields no items. Duplicate
/// `(section, category, resource)` tuples are kept as-is for the consumer to
/// sum.
pub fn parse_budget(country_id: u32, data: &str) -> Vec<BudgetLineItem> {
    let mut items = Vec::new();
    let Some(budget) = extract_inline_block(data, "budget") else {
        return items;
    };
    let Some(current_month) = extract_inline_block(budget, "current_month") else {
        return items;
    };

    for section in SECTIONS {
        let Some(section_block) = extract_inline_block(current_month, section) else {
            continue;
        };
        extract_budget_categories(section, country_id, section_block, &mut items);
    }
    items
}

/// Two-level scan: outer `category = { ... }`, inner repeated
/// `resource = <decimal>`. Malformed values skip the pair, never the
/// category or section.
fn extract_budget_categories(
    section: &str,
    country_id: u32,
    content: &str,
    items: &mut Vec<BudgetLineItem>,
) {
    let Ok(category_re) = Regex::new(r"(?s)(\w+)=\s*\{(.*?)\}") else {
        return;
    };
    let Ok(resource_re) = Regex::new(r"(\w+)=([0-9.]+)") else {
        return;
    };

    for category_caps in category_re.captures_iter(content) {
        let (Some(category), Some(inner)) = (category_caps.get(1), category_caps.get(2)) else {
            continue;
        };
        for resource_caps in resource_re.captures_iter(inner.as_str()) {
            let (Some(resource), Some(amount)) = (resource_caps.get(1), resource_caps.get(2))
            else {
                continue;
            };
            let Ok(amount) = amount.as_str().parse::<f64>() else {
                continue;
            };
            items.push(BudgetLineItem {
                country_id,
                section: section.to_string(),
                category: category.as_str().to_string(),
                resource_type: resource.as_str().to_string(),
                amount,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_income_item() {
        let data = concat!(
            "\tbudget={\n\t\tcurrent_month={\n",
            "\t\t\tincome={\n\t\t\t\ttrade={\n\t\t\t\t\ttrade_value=12.5\n\t\t\t\t}\n\t\t\t}\n",
            "\t\t}\n\t}\n"
        );
        let items = parse_budget(3, data);
        assert_eq!(
            items,
            vec![BudgetLineItem {
                country_id: 3,
                section: "income".to_string(),
                category: "trade".to_string(),
                resource_type: "trade_value".to_string(),
                amount: 12.5,
            }]
        );
    }

    #[test]
    fn sections_are_independent() {
        // No income section at all; expenses still yield items.
        let data = concat!(
            "\tbudget={\n\t\tcurrent_month={\n",
            "\t\t\texpenses={\n\t\t\t\tships={\n\t\t\t\t\tenergy=5.5\n\t\t\t\t\talloys=2\n\t\t\t\t}\n\t\t\t}\n",
            "\t\t}\n\t}\n"
        );
        let items = parse_budget(1, data);
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.section == "expenses"));
        assert_eq!(items[0].resource_type, "energy");
        assert_eq!(items[1].amount, 2.0);
    }

    #[test]
    fn missing_budget_yields_nothing() {
        assert!(parse_budget(1, "\tname=\"No Budget\"\n").is_empty());
        assert!(parse_budget(1, "\tbudget={\n\t\tlast_month={ }\n\t}\n").is_empty());
    }

    #[test]
    fn malformed_value_skips_only_that_pair() {
        let data = concat!(
            "\tbudget={\n\t\tcurrent_month={\n",
            "\t\t\tincome={\n\t\t\t\ttrade={\n\t\t\t\t\tbad=..\n\t\t\t\t\tgood=4.25\n\t\t\t\t}\n\t\t\t}\n",
            "\t\t}\n\t}\n"
        );
        let items = parse_budget(2, data);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].resource_type, "good");
        assert_eq!(items[0].amount, 4.25);
    }
}
