use rapidfuzz::fuzz;
use serde::Serialize;
use tracing::debug;

use crate::common::Table;

/// Pairs scoring at or below this are not offered.
pub const SIMILARITY_THRESHOLD: u8 = 80;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct JoinSuggestion {
    pub left_column: String,
    pub right_column: String,
    pub score: u8,
}

/// Scores every (left column, right column) pair by case-insensitive name
/// similarity and returns those above [`SIMILARITY_THRESHOLD`], best first.
///
/// The sort is stable, so equal scores keep left-outer, right-inner order.
pub fn suggest(left: &Table, right: &Table) -> Vec<JoinSuggestion> {
    let mut suggestions = Vec::new();
    for left_column in left.column_names() {
        let left_lower = left_column.to_lowercase();
        for right_column in right.column_names() {
            let score = similarity(&left_lower, &right_column.to_lowercase());
            if score > SIMILARITY_THRESHOLD {
                suggestions.push(JoinSuggestion {
                    left_column: left_column.to_owned(),
                    right_column: right_column.to_owned(),
                    score,
                });
            }
        }
    }
    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    debug!(
        left = left.name(),
        right = right.name(),
        candidates = suggestions.len(),
        "scored join keys"
    );
    suggestions
}

// Indel ratio over chars, scaled to 0..=100.
fn similarity(left: &str, right: &str) -> u8 {
    (fuzz::ratio(left.chars(), right.chars()) * 100.0).round() as u8
}

/// Join keys to use when the user names none: the best suggestion, else the
/// first column of each table.
pub fn default_keys(left: &Table, right: &Table) -> Option<(String, String)> {
    if let Some(best) = suggest(left, right).into_iter().next() {
        return Some((best.left_column, best.right_column));
    }
    match (left.column_names().next(), right.column_names().next()) {
        (Some(left_key), Some(right_key)) => Some((left_key.to_owned(), right_key.to_owned())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::table_of;

    fn headers(columns: &[&str]) -> Table {
        table_of(columns, Vec::new())
    }

    #[test]
    fn ranks_similar_names_best_first() {
        let left = headers(&["CustomerID", "Amount", "Region"]);
        let right = headers(&["customer_id", "amount", "Currency"]);

        let suggestions = suggest(&left, &right);
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].left_column, "Amount");
        assert_eq!(suggestions[0].right_column, "amount");
        assert_eq!(suggestions[0].score, 100);
        assert_eq!(suggestions[1].left_column, "CustomerID");
        assert_eq!(suggestions[1].right_column, "customer_id");
        assert!(suggestions.windows(2).all(|pair| pair[0].score >= pair[1].score));
        assert!(suggestions.iter().all(|s| s.score > SIMILARITY_THRESHOLD));
    }

    #[test]
    fn unrelated_names_give_nothing() {
        let left = headers(&["BillingDocument", "Currency"]);
        let right = headers(&["Budget", "Year"]);
        assert!(suggest(&left, &right).is_empty());
    }

    #[test]
    fn swapping_tables_mirrors_the_pairs() {
        let left = headers(&["CustomerID", "Amount"]);
        let right = headers(&["customer_id", "amount"]);

        let forward = suggest(&left, &right);
        let backward = suggest(&right, &left);
        assert_eq!(forward.len(), backward.len());
        for pair in &forward {
            assert!(backward.iter().any(|other| other.left_column == pair.right_column
                && other.right_column == pair.left_column
                && other.score == pair.score));
        }
    }

    #[test]
    fn ties_keep_encounter_order_and_duplicates_count_separately() {
        let left = headers(&["id", "id"]);
        let right = headers(&["ID"]);

        let suggestions = suggest(&left, &right);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.iter().all(|s| s.score == 100 && s.left_column == "id"));
    }

    #[test]
    fn accented_names_are_scored_by_character() {
        let left = headers(&["Città", "Quantità"]);
        let right = headers(&["Citta", "Quantita"]);

        let suggestions = suggest(&left, &right);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].left_column, "Quantità");
        assert_eq!(suggestions[0].right_column, "Quantita");
        assert_eq!(suggestions[0].score, 88);
        assert_eq!(similarity("città", "citta"), 80);
        assert_eq!(
            default_keys(&left, &right),
            Some(("Quantità".to_string(), "Quantita".to_string()))
        );
    }

    #[test]
    fn empty_tables_give_nothing() {
        assert!(suggest(&headers(&[]), &headers(&["id"])).is_empty());
        assert_eq!(default_keys(&headers(&[]), &headers(&["id"])), None);
    }

    #[test]
    fn falls_back_to_first_columns() {
        let left = headers(&["BillingDocument", "Currency"]);
        let right = headers(&["Budget", "Year"]);
        assert_eq!(
            default_keys(&left, &right),
            Some(("BillingDocument".to_string(), "Budget".to_string()))
        );

        let right = headers(&["Year", "currency"]);
        assert_eq!(
            default_keys(&left, &right),
            Some(("Currency".to_string(), "currency".to_string()))
        );
    }
}
