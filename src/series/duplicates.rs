//! Resolution of repeated date keys.
//!
//! The same policy is applied twice, always within one input:
//! - at load (identical raw keys)
//! - right before the merge (distinct raw keys that parse to the same date)

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use crate::domain::{Column, ColumnValues, DuplicatePolicy};
use crate::error::PipelineError;

/// Rows after duplicate resolution, plus how many rows were folded away.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<K, V> {
    pub rows: Vec<(K, V)>,
    pub folded: usize,
}

/// Collapse rows that share a key, keeping first-seen key order.
///
/// `input` names the table in error messages.
pub fn resolve_duplicates<K, V>(
    rows: Vec<(K, V)>,
    policy: DuplicatePolicy,
    input: &str,
) -> Result<Resolved<K, V>, PipelineError>
where
    K: Eq + Hash + Clone + Display,
    V: ColumnValues,
{
    let total = rows.len();
    let mut slots: HashMap<K, usize> = HashMap::with_capacity(total);
    let mut groups: Vec<(K, Vec<V>)> = Vec::with_capacity(total);

    for (key, values) in rows {
        match slots.get(&key) {
            Some(&slot) => {
                if policy == DuplicatePolicy::Reject {
                    return Err(PipelineError::DuplicateDate {
                        input: input.to_string(),
                        key: key.to_string(),
                    });
                }
                groups[slot].1.push(values);
            }
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, vec![values]));
            }
        }
    }

    let rows: Vec<(K, V)> = groups
        .into_iter()
        .map(|(key, group)| {
            let values = match policy {
                DuplicatePolicy::Mean if group.len() > 1 => mean_values(&group),
                _ => group[0],
            };
            (key, values)
        })
        .collect();

    let folded = total - rows.len();
    if folded > 0 {
        tracing::warn!(input, folded, ?policy, "collapsed rows with duplicate dates");
    }

    Ok(Resolved { rows, folded })
}

/// Field-wise mean over the non-null values of each column.
fn mean_values<V: ColumnValues>(group: &[V]) -> V {
    let mut out = V::default();
    for column in Column::all() {
        let mut sum = 0.0;
        let mut n = 0usize;
        for v in group {
            if let Some(x) = v.get(column) {
                sum += x;
                n += 1;
            }
        }
        if n > 0 {
            out.set(column, Some(sum / n as f64));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measurements;

    fn oil(v: Option<f64>, gas: Option<f64>) -> Measurements {
        Measurements {
            oil_vol: v,
            gas_vol: gas,
            ..Measurements::default()
        }
    }

    #[test]
    fn reject_fails_on_repeated_key() {
        let rows = vec![
            ("2020-01-01".to_string(), oil(Some(1.0), None)),
            ("2020-01-01".to_string(), oil(Some(2.0), None)),
        ];
        let err = resolve_duplicates(rows, DuplicatePolicy::Reject, "historical").unwrap_err();
        assert_eq!(
            err,
            PipelineError::DuplicateDate {
                input: "historical".to_string(),
                key: "2020-01-01".to_string(),
            }
        );
    }

    #[test]
    fn first_keeps_first_occurrence_in_order() {
        let rows = vec![
            ("b".to_string(), oil(Some(1.0), None)),
            ("a".to_string(), oil(Some(2.0), None)),
            ("b".to_string(), oil(Some(3.0), None)),
        ];
        let out = resolve_duplicates(rows, DuplicatePolicy::First, "historical").unwrap();
        assert_eq!(out.folded, 1);
        assert_eq!(out.rows[0].0, "b");
        assert_eq!(out.rows[0].1.oil_vol, Some(1.0));
        assert_eq!(out.rows[1].0, "a");
    }

    #[test]
    fn mean_ignores_nulls_per_field() {
        let rows = vec![
            ("d".to_string(), oil(Some(10.0), None)),
            ("d".to_string(), oil(Some(20.0), Some(4.0))),
            ("d".to_string(), oil(None, None)),
        ];
        let out = resolve_duplicates(rows, DuplicatePolicy::Mean, "historical").unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.folded, 2);
        let v = out.rows[0].1;
        assert_eq!(v.oil_vol, Some(15.0));
        assert_eq!(v.gas_vol, Some(4.0));
        assert_eq!(v.water_vol, None);
    }
}
