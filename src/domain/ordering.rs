//! Product ordering within a catalogue.
//!
//! Positions are zero-based and contiguous: a catalogue with `n` products
//! always holds exactly the sort orders `0..n`. Reorders rewrite the full set.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SortPosition {
    pub id: Uuid,
    pub sort_order: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderingError {
    #[error("index {index} is out of range for {len} products")]
    OutOfRange { index: usize, len: usize },
    #[error("reorder must list all {expected} products, got {actual}")]
    IncompleteSet { expected: usize, actual: usize },
    #[error("product {0} is listed more than once")]
    DuplicateProduct(Uuid),
    #[error("product {0} does not belong to this catalogue")]
    UnknownProduct(Uuid),
    #[error("sort positions must be exactly 0..{0} without gaps or repeats")]
    NonContiguous(usize),
}

/// Move the element at `from` so that it ends up at index `to`.
pub fn move_item<T>(mut items: Vec<T>, from: usize, to: usize) -> Result<Vec<T>, OrderingError> {
    let len = items.len();
    if from >= len {
        return Err(OrderingError::OutOfRange { index: from, len });
    }
    if to >= len {
        return Err(OrderingError::OutOfRange { index: to, len });
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(items)
}

/// Zero-based positions in list order.
pub fn assign_positions(ids: &[Uuid]) -> Vec<SortPosition> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| SortPosition {
            id: *id,
            sort_order: index as i32,
        })
        .collect()
}

/// Check a full reorder request against the products currently in the
/// catalogue and return the product ids in their new order.
pub fn validate_reorder(
    existing: &[Uuid],
    requested: &[SortPosition],
) -> Result<Vec<Uuid>, OrderingError> {
    if requested.len() != existing.len() {
        return Err(OrderingError::IncompleteSet {
            expected: existing.len(),
            actual: requested.len(),
        });
    }

    let known: HashSet<Uuid> = existing.iter().copied().collect();
    let mut seen_ids = HashSet::with_capacity(requested.len());
    let mut by_position: HashMap<i32, Uuid> = HashMap::with_capacity(requested.len());
    let n = requested.len();

    for entry in requested {
        if !known.contains(&entry.id) {
            return Err(OrderingError::UnknownProduct(entry.id));
        }
        if !seen_ids.insert(entry.id) {
            return Err(OrderingError::DuplicateProduct(entry.id));
        }
        if entry.sort_order < 0 || entry.sort_order as usize >= n {
            return Err(OrderingError::NonContiguous(n));
        }
        if by_position.insert(entry.sort_order, entry.id).is_some() {
            return Err(OrderingError::NonContiguous(n));
        }
    }

    (0..n as i32)
        .map(|pos| {
            by_position
                .get(&pos)
                .copied()
                .ok_or(OrderingError::NonContiguous(n))
        })
        .collect()
}

/// True when `positions` is a permutation of `0..positions.len()`.
pub fn is_contiguous(positions: &[i32]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, pos)| *pos == index as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn move_item_forward_and_back() {
        let moved = move_item(vec!['a', 'b', 'c', 'd'], 0, 2).unwrap();
        assert_eq!(moved, vec!['b', 'c', 'a', 'd']);

        let moved = move_item(vec!['a', 'b', 'c', 'd'], 3, 0).unwrap();
        assert_eq!(moved, vec!['d', 'a', 'b', 'c']);

        let same = move_item(vec![1, 2, 3], 1, 1).unwrap();
        assert_eq!(same, vec![1, 2, 3]);
    }

    #[test]
    fn move_item_rejects_out_of_range() {
        let err = move_item(vec![1, 2], 0, 2).unwrap_err();
        assert_eq!(err, OrderingError::OutOfRange { index: 2, len: 2 });
        assert!(move_item(Vec::<u8>::new(), 0, 0).is_err());
    }

    #[test]
    fn assigned_positions_are_contiguous() {
        let products = ids(5);
        let positions = assign_positions(&products);
        let orders: Vec<i32> = positions.iter().map(|p| p.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
        assert!(is_contiguous(&orders));
        assert_eq!(positions[3].id, products[3]);
    }

    #[test]
    fn validate_reorder_returns_new_order() {
        let products = ids(3);
        let request = vec![
            SortPosition { id: products[0], sort_order: 2 },
            SortPosition { id: products[1], sort_order: 0 },
            SortPosition { id: products[2], sort_order: 1 },
        ];
        let ordered = validate_reorder(&products, &request).unwrap();
        assert_eq!(ordered, vec![products[1], products[2], products[0]]);
    }

    #[test]
    fn validate_reorder_rejects_partial_and_duplicate_sets() {
        let products = ids(3);
        let partial = assign_positions(&products[..2]);
        assert_eq!(
            validate_reorder(&products, &partial),
            Err(OrderingError::IncompleteSet { expected: 3, actual: 2 })
        );

        let dup = vec![
            SortPosition { id: products[0], sort_order: 0 },
            SortPosition { id: products[0], sort_order: 1 },
            SortPosition { id: products[2], sort_order: 2 },
        ];
        assert_eq!(
            validate_reorder(&products, &dup),
            Err(OrderingError::DuplicateProduct(products[0]))
        );
    }

    #[test]
    fn validate_reorder_rejects_gaps_and_foreign_products() {
        let products = ids(2);
        let gap = vec![
            SortPosition { id: products[0], sort_order: 0 },
            SortPosition { id: products[1], sort_order: 5 },
        ];
        assert_eq!(
            validate_reorder(&products, &gap),
            Err(OrderingError::NonContiguous(2))
        );

        let repeated = vec![
            SortPosition { id: products[0], sort_order: 1 },
            SortPosition { id: products[1], sort_order: 1 },
        ];
        assert_eq!(
            validate_reorder(&products, &repeated),
            Err(OrderingError::NonContiguous(2))
        );

        let stranger = Uuid::new_v4();
        let foreign = vec![
            SortPosition { id: products[0], sort_order: 0 },
            SortPosition { id: stranger, sort_order: 1 },
        ];
        assert_eq!(
            validate_reorder(&products, &foreign),
            Err(OrderingError::UnknownProduct(stranger))
        );
    }

    #[test]
    fn empty_catalogue_reorders_to_nothing() {
        assert_eq!(validate_reorder(&[], &[]), Ok(vec![]));
        assert!(is_contiguous(&[]));
        assert!(!is_contiguous(&[0, 2]));
    }
}
