use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::{ColumnType, Error, Row, Table, Value, ValueKey};

pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Outer,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Outer => "outer",
        };
        f.write_str(name)
    }
}

impl FromStr for JoinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinType::Inner),
            "left" => Ok(JoinType::Left),
            "right" => Ok(JoinType::Right),
            "outer" => Ok(JoinType::Outer),
            other => Err(Error::ParseError(format!(
                "Unknown join type '{}', expected inner, left, right or outer",
                other
            ))),
        }
    }
}

/// Joins `left` and `right` on `left_key = right_key`.
///
/// Columns come out left first, then right. A key column shared by name is
/// emitted once; any other name present on both sides gets [`LEFT_SUFFIX`] or
/// [`RIGHT_SUFFIX`]. Null keys never match. Outer join rows come out sorted
/// by key.
pub fn join(
    left: &Table,
    right: &Table,
    left_key: &str,
    right_key: &str,
    join_type: JoinType,
) -> Result<Table, Error> {
    let left_index = left.column_index(left_key).ok_or_else(|| {
        Error::JoinError(format!("Table {} has no column {}", left.name(), left_key))
    })?;
    let right_index = right.column_index(right_key).ok_or_else(|| {
        Error::JoinError(format!("Table {} has no column {}", right.name(), right_key))
    })?;
    check_key_types(left, left_index, right, right_index)?;

    let shared_key = left_key == right_key;
    let headers = output_headers(left, right, right_index, shared_key);

    let mut right_by_key: HashMap<ValueKey, Vec<usize>> = HashMap::new();
    for (position, row) in right.rows().iter().enumerate() {
        if let Some(key) = row[right_index].key() {
            right_by_key.entry(key).or_default().push(position);
        }
    }

    let assemble = |left_row: Option<&Row>, right_row: Option<&Row>| -> Row {
        let mut row = Vec::with_capacity(headers.len());
        match left_row {
            Some(values) => row.extend(values.iter().cloned()),
            None => row.extend(std::iter::repeat(Value::Null).take(left.columns().len())),
        }
        if shared_key && left_row.is_none() {
            if let Some(values) = right_row {
                row[left_index] = values[right_index].clone();
            }
        }
        for index in 0..right.columns().len() {
            if shared_key && index == right_index {
                continue;
            }
            row.push(right_row.map_or(Value::Null, |values| values[index].clone()));
        }
        row
    };

    let mut relations = Vec::new();
    match join_type {
        JoinType::Right => {
            let mut left_by_key: HashMap<ValueKey, Vec<usize>> = HashMap::new();
            for (position, row) in left.rows().iter().enumerate() {
                if let Some(key) = row[left_index].key() {
                    left_by_key.entry(key).or_default().push(position);
                }
            }
            for right_row in right.rows() {
                let matches = right_row[right_index]
                    .key()
                    .and_then(|key| left_by_key.get(&key));
                match matches {
                    Some(positions) => {
                        for &position in positions {
                            relations.push(assemble(Some(&left.rows()[position]), Some(right_row)));
                        }
                    }
                    None => relations.push(assemble(None, Some(right_row))),
                }
            }
        }
        JoinType::Inner | JoinType::Left | JoinType::Outer => {
            let mut right_matched = vec![false; right.len()];
            for left_row in left.rows() {
                let matches = left_row[left_index]
                    .key()
                    .and_then(|key| right_by_key.get(&key));
                match matches {
                    Some(positions) => {
                        for &position in positions {
                            right_matched[position] = true;
                            relations.push(assemble(Some(left_row), Some(&right.rows()[position])));
                        }
                    }
                    None if join_type != JoinType::Inner => {
                        relations.push(assemble(Some(left_row), None))
                    }
                    None => {}
                }
            }
            if join_type == JoinType::Outer {
                for (right_row, matched) in right.rows().iter().zip(right_matched) {
                    if !matched {
                        relations.push(assemble(None, Some(right_row)));
                    }
                }
                // Ascending by key, null keys last. Right-only rows carry their
                // key in the right key column unless it was merged.
                let right_key_position = left.columns().len() + right_index;
                relations.sort_by_cached_key(|row| {
                    let key = row[left_index].key().or_else(|| {
                        if shared_key {
                            None
                        } else {
                            row[right_key_position].key()
                        }
                    });
                    (key.is_none(), key)
                });
            }
        }
    }

    info!(
        left = left.name(),
        right = right.name(),
        %join_type,
        rows = relations.len(),
        "joined tables"
    );
    Table::from_records(format!("{}_{}", left.name(), right.name()), headers, relations)
}

fn check_key_types(left: &Table, left_index: usize, right: &Table, right_index: usize) -> Result<(), Error> {
    let left_type = left.column_type(left_index).unwrap_or(ColumnType::Other);
    let right_type = right.column_type(right_index).unwrap_or(ColumnType::Other);
    let incompatible = matches!(
        (left_type, right_type),
        (ColumnType::Numeric, ColumnType::Text) | (ColumnType::Text, ColumnType::Numeric)
    );
    if incompatible {
        return Err(Error::JoinError(format!(
            "Cannot join {} column {}.{} with {} column {}.{}",
            left_type,
            left.name(),
            left.columns()[left_index].0,
            right_type,
            right.name(),
            right.columns()[right_index].0
        )));
    }
    Ok(())
}

fn output_headers(left: &Table, right: &Table, right_index: usize, shared_key: bool) -> Vec<String> {
    let kept_right: Vec<&str> = right
        .column_names()
        .enumerate()
        .filter(|(index, _)| !(shared_key && *index == right_index))
        .map(|(_, name)| name)
        .collect();

    let mut headers: Vec<String> = left
        .column_names()
        .map(|name| {
            if kept_right.contains(&name) {
                format!("{}{}", name, LEFT_SUFFIX)
            } else {
                name.to_owned()
            }
        })
        .collect();
    headers.extend(kept_right.iter().map(|name| {
        if left.column_names().any(|left_name| left_name == *name) {
            format!("{}{}", name, RIGHT_SUFFIX)
        } else {
            (*name).to_owned()
        }
    }));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{int, table_of, text};

    fn ids(values: &[i64], extra: &str, tag: &str) -> Table {
        table_of(
            &["id", extra],
            values
                .iter()
                .map(|id| vec![int(*id), text(&format!("{}{}", tag, id))])
                .collect(),
        )
    }

    #[test]
    fn inner_join_keeps_matching_rows() {
        let left = ids(&[1, 2, 3], "l", "a");
        let right = ids(&[2, 3, 4], "r", "b");

        let joined = join(&left, &right, "id", "id", JoinType::Inner).unwrap();
        assert_eq!(joined.column_names().collect::<Vec<_>>(), vec!["id", "l", "r"]);
        assert_eq!(joined.len(), 2);
        let keys: Vec<&Value> = joined.column_values(0).collect();
        assert_eq!(keys, vec![&int(2), &int(3)]);
    }

    #[test]
    fn left_join_fills_missing_right_side_with_nulls() {
        let left = ids(&[1, 2, 3], "l", "a");
        let right = ids(&[2, 3, 4], "r", "b");

        let joined = join(&left, &right, "id", "id", JoinType::Left).unwrap();
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.rows()[0], vec![int(1), text("a1"), Value::Null]);
    }

    #[test]
    fn right_join_follows_right_order() {
        let left = ids(&[1, 2, 3], "l", "a");
        let right = ids(&[2, 3, 4], "r", "b");

        let joined = join(&left, &right, "id", "id", JoinType::Right).unwrap();
        assert_eq!(joined.len(), 3);
        assert_eq!(joined.rows()[2], vec![int(4), Value::Null, text("b4")]);
    }

    #[test]
    fn outer_join_keeps_everything_and_coalesces_the_key() {
        let left = ids(&[1, 2, 3], "l", "a");
        let right = ids(&[2, 3, 4], "r", "b");

        let joined = join(&left, &right, "id", "id", JoinType::Outer).unwrap();
        assert_eq!(joined.len(), 4);
        let keys: Vec<&Value> = joined.column_values(0).collect();
        assert_eq!(keys, vec![&int(1), &int(2), &int(3), &int(4)]);
        assert_eq!(joined.column_type(0), Some(ColumnType::Numeric));
    }

    #[test]
    fn outer_join_sorts_by_key() {
        let left = ids(&[3, 1], "l", "a");
        let right = ids(&[2, 3], "r", "b");

        let joined = join(&left, &right, "id", "id", JoinType::Outer).unwrap();
        let keys: Vec<&Value> = joined.column_values(0).collect();
        assert_eq!(keys, vec![&int(1), &int(2), &int(3)]);
        assert_eq!(joined.rows()[2], vec![int(3), text("a3"), text("b3")]);
    }

    #[test]
    fn outer_join_with_distinct_key_names_sorts_nulls_last() {
        let left = table_of(
            &["code", "l"],
            vec![vec![text("c"), int(1)], vec![Value::Null, int(2)]],
        );
        let right = table_of(&["ref", "r"], vec![vec![text("b"), int(3)]]);

        let joined = join(&left, &right, "code", "ref", JoinType::Outer).unwrap();
        let order: Vec<(&Value, &Value)> = joined
            .rows()
            .iter()
            .map(|row| (&row[0], &row[2]))
            .collect();
        assert_eq!(
            order,
            vec![
                (&Value::Null, &text("b")),
                (&text("c"), &Value::Null),
                (&Value::Null, &Value::Null),
            ]
        );
    }

    #[test]
    fn colliding_columns_get_suffixes() {
        let left = table_of(&["CustomerID", "Amount"], vec![vec![text("C100"), int(10)]]);
        let right = table_of(&["customer", "Amount"], vec![vec![text("C100"), int(99)]]);

        let joined = join(&left, &right, "CustomerID", "customer", JoinType::Inner).unwrap();
        assert_eq!(
            joined.column_names().collect::<Vec<_>>(),
            vec!["CustomerID", "Amount_x", "customer", "Amount_y"]
        );
        assert_eq!(joined.rows()[0], vec![text("C100"), int(10), text("C100"), int(99)]);
    }

    #[test]
    fn duplicate_keys_multiply_rows() {
        let left = table_of(&["k", "v"], vec![vec![text("a"), int(1)], vec![text("a"), int(2)]]);
        let right = table_of(&["k", "w"], vec![vec![text("a"), int(3)], vec![text("a"), int(4)]]);

        let joined = join(&left, &right, "k", "k", JoinType::Inner).unwrap();
        assert_eq!(joined.len(), 4);
    }

    #[test]
    fn null_keys_do_not_match() {
        let left = table_of(&["k"], vec![vec![Value::Null]]);
        let right = table_of(&["k"], vec![vec![Value::Null]]);

        assert!(join(&left, &right, "k", "k", JoinType::Inner).unwrap().is_empty());
        assert_eq!(join(&left, &right, "k", "k", JoinType::Outer).unwrap().len(), 2);
    }

    #[test]
    fn missing_or_mismatched_keys_are_errors() {
        let left = table_of(&["id"], vec![vec![int(1)]]);
        let right = table_of(&["code"], vec![vec![text("1")]]);

        assert!(matches!(
            join(&left, &right, "nope", "code", JoinType::Inner),
            Err(Error::JoinError(_))
        ));
        assert!(matches!(
            join(&left, &right, "id", "code", JoinType::Inner),
            Err(Error::JoinError(_))
        ));
    }

    #[test]
    fn parses_join_types() {
        assert_eq!("OUTER".parse::<JoinType>().unwrap(), JoinType::Outer);
        assert!("cross".parse::<JoinType>().is_err());
    }
}
