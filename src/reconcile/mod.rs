// src/reconcile/mod.rs
use crate::error::{PipelineError, Result, Side};
use crate::table::{Table, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Suffixes for non-key columns present on both sides.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

/// Which column to join on, and the right-hand column to rename into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinSpec {
    pub key: String,
    pub rename_from: String,
    pub rename_to: String,
}

impl Default for JoinSpec {
    fn default() -> Self {
        Self {
            key: "event_id".into(),
            rename_from: "id".into(),
            rename_to: "event_id".into(),
        }
    }
}

/// Rename on the right, check the key on both sides, then inner join.
#[tracing::instrument(level = "info", skip(left, right), fields(key = %spec.key))]
pub fn reconcile(left: Table, mut right: Table, spec: &JoinSpec) -> Result<Table> {
    right.rename_column(&spec.rename_from, &spec.rename_to)?;
    check_join_key(&left, &right, &spec.key)?;
    inner_join(&left, &right, &spec.key)
}

/// Fails with `MissingJoinKey` naming the side(s) lacking `key`.
pub fn check_join_key(left: &Table, right: &Table, key: &str) -> Result<()> {
    key_indices(left, right, key).map(|_| ())
}

fn key_indices(left: &Table, right: &Table, key: &str) -> Result<(usize, usize)> {
    let side = match (left.column_index(key), right.column_index(key)) {
        (Some(lk), Some(rk)) => return Ok((lk, rk)),
        (None, Some(_)) => Side::Left,
        (Some(_), None) => Side::Right,
        (None, None) => Side::Both,
    };
    Err(PipelineError::MissingJoinKey {
        key: key.to_string(),
        side,
    })
}

/// Relational inner join on `key`. Output rows follow left order, then right
/// order within a key; k left × m right matches give k×m rows.
pub fn inner_join(left: &Table, right: &Table, key: &str) -> Result<Table> {
    let (lk, rk) = key_indices(left, right, key)?;

    let columns = merged_columns(left.columns(), right.columns(), lk, rk)?;

    let mut by_key: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        by_key.entry(&row[rk]).or_default().push(i);
    }

    let mut rows = Vec::new();
    for lrow in left.rows() {
        let Some(matches) = by_key.get(&lrow[lk]) else {
            continue;
        };
        for &ri in matches {
            let rrow = &right.rows()[ri];
            let mut out = Vec::with_capacity(columns.len());
            out.extend(lrow.iter().cloned());
            out.extend(
                rrow.iter()
                    .enumerate()
                    .filter(|&(j, _)| j != rk)
                    .map(|(_, v)| v.clone()),
            );
            rows.push(out);
        }
    }

    info!(
        left_rows = left.num_rows(),
        right_rows = right.num_rows(),
        merged_rows = rows.len(),
        "inner join"
    );
    Table::new(columns, rows)
}

/// Left columns in order, then right columns minus the key. Shared non-key
/// names get `_x` / `_y`; a suffixed name that is already taken is a
/// `ColumnCollision`.
fn merged_columns(left: &[String], right: &[String], lk: usize, rk: usize) -> Result<Vec<String>> {
    let left_names: HashSet<&str> = left
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != lk)
        .map(|(_, c)| c.as_str())
        .collect();
    let right_names: HashSet<&str> = right
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != rk)
        .map(|(_, c)| c.as_str())
        .collect();

    let mut out = Vec::with_capacity(left.len() + right.len() - 1);
    for (i, c) in left.iter().enumerate() {
        if i != lk && right_names.contains(c.as_str()) {
            out.push(format!("{}{}", c, LEFT_SUFFIX));
        } else {
            out.push(c.clone());
        }
    }
    for (j, c) in right.iter().enumerate() {
        if j == rk {
            continue;
        }
        if left_names.contains(c.as_str()) {
            out.push(format!("{}{}", c, RIGHT_SUFFIX));
        } else {
            out.push(c.clone());
        }
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(out.len());
    for c in &out {
        if !seen.insert(c.as_str()) {
            return Err(PipelineError::ColumnCollision { column: c.clone() });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn christians(keys: &[i64]) -> Table {
        let rows = keys
            .iter()
            .enumerate()
            .map(|(i, &k)| {
                vec![
                    Value::Int(i as i64 + 1),
                    Value::Text(format!("member{}", i + 1)),
                    Value::Int(k),
                ]
            })
            .collect();
        Table::new(vec!["id".into(), "name".into(), "event_id".into()], rows).unwrap()
    }

    fn events(ids: &[i64]) -> Table {
        let rows = ids
            .iter()
            .map(|&id| vec![Value::Int(id), Value::Text(format!("event{}", id))])
            .collect();
        Table::new(vec!["id".into(), "name".into()], rows).unwrap()
    }

    fn keys(t: &Table) -> Vec<Value> {
        t.column("event_id").unwrap().cloned().collect()
    }

    #[test]
    fn keeps_only_keys_present_on_both_sides() {
        let merged = reconcile(christians(&[1, 2, 3]), events(&[2, 3, 4]), &JoinSpec::default())
            .unwrap();
        assert_eq!(keys(&merged), vec![Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn multiplicity_is_the_product_of_matches() {
        let merged = reconcile(
            christians(&[2, 2, 3, 5]),
            events(&[2, 2, 2, 3, 4]),
            &JoinSpec::default(),
        )
        .unwrap();
        // key 2: 2×3, key 3: 1×1
        assert_eq!(merged.num_rows(), 7);
        assert_eq!(
            keys(&merged).iter().filter(|k| **k == Value::Int(2)).count(),
            6
        );
    }

    #[test]
    fn shared_non_key_columns_get_suffixes() {
        let merged = reconcile(christians(&[2]), events(&[2]), &JoinSpec::default()).unwrap();
        assert_eq!(
            merged.columns(),
            ["id", "name_x", "event_id", "name_y"]
        );
        assert_eq!(
            merged.rows()[0],
            vec![
                Value::Int(1),
                Value::from("member1"),
                Value::Int(2),
                Value::from("event2"),
            ]
        );
    }

    #[test]
    fn missing_key_is_reported_per_side() {
        let spec = JoinSpec::default();

        let left = Table::new(vec!["id".into()], vec![vec![Value::Int(1)]]).unwrap();
        let err = reconcile(left, events(&[1]), &spec).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingJoinKey { side: Side::Left, .. }
        ));

        let right = Table::new(vec!["uid".into()], vec![vec![Value::Int(1)]]).unwrap();
        let err = reconcile(christians(&[1]), right.clone(), &spec).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingJoinKey { side: Side::Right, .. }
        ));

        let left = Table::new(vec!["uid".into()], vec![vec![Value::Int(1)]]).unwrap();
        let err = reconcile(left, right, &spec).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingJoinKey { side: Side::Both, .. }
        ));
    }

    #[test]
    fn rename_into_an_existing_column_is_refused() {
        let right = Table::new(
            vec!["id".into(), "event_id".into()],
            vec![vec![Value::Int(1), Value::Int(1)]],
        )
        .unwrap();
        let err = reconcile(christians(&[1]), right, &JoinSpec::default()).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnCollision { .. }));
    }

    #[test]
    fn suffix_clashing_with_an_existing_column_is_refused() {
        let left = Table::new(
            vec!["event_id".into(), "name".into(), "name_x".into()],
            vec![vec![Value::Int(1), Value::from("Ruth"), Value::from("R")]],
        )
        .unwrap();
        let err = reconcile(left, events(&[1]), &JoinSpec::default()).unwrap_err();
        match err {
            PipelineError::ColumnCollision { column } => assert_eq!(column, "name_x"),
            other => panic!("expected ColumnCollision, got {other:?}"),
        }
    }

    #[test]
    fn no_overlap_gives_an_empty_table_with_merged_columns() {
        let merged = reconcile(christians(&[1]), events(&[9]), &JoinSpec::default()).unwrap();
        assert_eq!(merged.num_rows(), 0);
        assert_eq!(merged.num_columns(), 4);
    }
}
