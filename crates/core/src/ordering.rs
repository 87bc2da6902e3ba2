//! Gapless ordering of sibling entities within a parent scope.
//!
//! Siblings that are not deleted always occupy positions `1..=N`. Moving an
//! entity shifts the block of siblings between its old and new position by
//! one; removing an entity closes the gap it leaves behind. Both operations
//! are planned here as a [`Shift`] that the db crate applies in SQL.

use crate::error::CoreError;
use crate::lifecycle::DraftState;
use crate::types::SortOrder;

/// A block move applied to every live sibling whose order lies in
/// `from..=to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    pub from: SortOrder,
    pub to: SortOrder,
    pub delta: SortOrder,
}

/// Accessors needed to order an entity among its siblings.
pub trait Ordered {
    fn order(&self) -> SortOrder;
    fn state(&self) -> DraftState;
}

/// Caller-level validation of a reorder request.
///
/// Rejects non-positive targets and no-op moves before the store is touched.
pub fn validate_new_order(current: SortOrder, requested: SortOrder) -> Result<(), CoreError> {
    if requested < 1 {
        return Err(CoreError::OrderOutOfRange {
            requested,
            max: current.max(1),
        });
    }
    if requested == current {
        return Err(CoreError::Validation(format!(
            "Entity is already at position {current}"
        )));
    }
    Ok(())
}

/// Plan the sibling shift for moving an entity from `current` to
/// `requested`, where `max` is the highest live order in the scope.
///
/// Returns `Ok(None)` when the positions are equal.
pub fn plan_reorder(
    current: SortOrder,
    requested: SortOrder,
    max: SortOrder,
) -> Result<Option<Shift>, CoreError> {
    if requested < 1 || requested > max {
        return Err(CoreError::OrderOutOfRange { requested, max });
    }

    let shift = if requested < current {
        Some(Shift {
            from: requested,
            to: current - 1,
            delta: 1,
        })
    } else if requested > current {
        Some(Shift {
            from: current + 1,
            to: requested,
            delta: -1,
        })
    } else {
        None
    };
    Ok(shift)
}

/// Plan the shift that closes the gap left at `removed`.
pub fn plan_compaction(removed: SortOrder) -> Shift {
    Shift {
        from: removed + 1,
        to: SortOrder::MAX,
        delta: -1,
    }
}

/// Whether the live siblings occupy exactly `1..=N` with no duplicates.
pub fn is_contiguous<T: Ordered>(siblings: &[T]) -> bool {
    let mut orders: Vec<SortOrder> = siblings
        .iter()
        .filter(|s| s.state().is_live())
        .map(Ordered::order)
        .collect();
    orders.sort_unstable();
    orders
        .iter()
        .enumerate()
        .all(|(i, &order)| order == i as SortOrder + 1)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        order: SortOrder,
        state: DraftState,
    }

    impl Ordered for Item {
        fn order(&self) -> SortOrder {
            self.order
        }
        fn state(&self) -> DraftState {
            self.state
        }
    }

    fn items(count: SortOrder) -> Vec<Item> {
        (1..=count)
            .map(|order| Item {
                order,
                state: DraftState::Actual,
            })
            .collect()
    }

    /// Apply a planned shift the way the SQL update does.
    fn apply(list: &mut [Item], shift: Shift, skip: usize) {
        for (i, item) in list.iter_mut().enumerate() {
            if i != skip
                && item.state.is_live()
                && item.order >= shift.from
                && item.order <= shift.to
            {
                item.order += shift.delta;
            }
        }
    }

    #[test]
    fn test_plan_move_up_shifts_block_down() {
        let shift = plan_reorder(4, 2, 5).unwrap().unwrap();
        assert_eq!(
            shift,
            Shift {
                from: 2,
                to: 3,
                delta: 1
            }
        );
    }

    #[test]
    fn test_plan_move_down_shifts_block_up() {
        let shift = plan_reorder(2, 4, 5).unwrap().unwrap();
        assert_eq!(
            shift,
            Shift {
                from: 3,
                to: 4,
                delta: -1
            }
        );
    }

    #[test]
    fn test_plan_same_position_is_noop() {
        assert_eq!(plan_reorder(3, 3, 5).unwrap(), None);
    }

    #[test]
    fn test_plan_rejects_out_of_range() {
        assert_matches!(
            plan_reorder(1, 6, 5),
            Err(CoreError::OrderOutOfRange {
                requested: 6,
                max: 5
            })
        );
        assert_matches!(
            plan_reorder(1, 0, 5),
            Err(CoreError::OrderOutOfRange { requested: 0, .. })
        );
    }

    #[test]
    fn test_validate_new_order() {
        assert!(validate_new_order(2, 1).is_ok());
        assert_matches!(validate_new_order(2, 2), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_new_order(2, -1),
            Err(CoreError::OrderOutOfRange { requested: -1, .. })
        );
    }

    #[test]
    fn test_compaction_covers_everything_after_the_gap() {
        let shift = plan_compaction(2);
        assert_eq!(shift.from, 3);
        assert_eq!(shift.to, SortOrder::MAX);
        assert_eq!(shift.delta, -1);
    }

    #[test]
    fn test_every_planned_move_preserves_contiguity() {
        for index in 0..5 {
            for target in 1..=5 {
                let mut list = items(5);
                let current = list[index].order;
                if let Some(shift) = plan_reorder(current, target, 5).unwrap() {
                    apply(&mut list, shift, index);
                }
                list[index].order = target;
                assert!(
                    is_contiguous(&list),
                    "moving #{index} to {target} broke contiguity: {list:?}"
                );
            }
        }
    }

    #[test]
    fn test_planned_compaction_skips_deleted_siblings() {
        let mut list = items(4);
        list[1].state = DraftState::Deleted;
        apply(&mut list, plan_compaction(2), 1);
        assert_eq!(list[1].order, 2, "deleted sibling keeps its stale order");
        assert!(is_contiguous(&list));
    }

    #[test]
    fn test_is_contiguous_detects_gaps_and_duplicates() {
        let mut list = items(3);
        assert!(is_contiguous(&list));
        list[2].order = 4;
        assert!(!is_contiguous(&list));
        list[2].order = 2;
        assert!(!is_contiguous(&list));
        assert!(is_contiguous::<Item>(&[]));
    }

    #[test]
    fn test_is_contiguous_ignores_deleted() {
        let mut list = items(3);
        list[2].state = DraftState::Deleted;
        list[2].order = 7;
        assert!(is_contiguous(&list));
    }
}
