//! Sibling ordering and lifecycle helpers shared by the draft repositories.
//!
//! Draft questions and draft options follow identical ordering rules, so the
//! SQL lives here once, parameterized by a [`DraftTable`] marker. Every
//! helper runs inside the caller's transaction and expects the scope row to
//! be locked with [`lock_scope`] first.

use surveyor_core::error::CoreError;
use surveyor_core::lifecycle::{DeleteAction, DraftState};
use surveyor_core::ordering::{plan_compaction, plan_reorder, Shift};
use surveyor_core::types::{DbId, SortOrder};

use crate::error::StoreError;
use crate::models::outcome::DeleteOutcome;

/// Describes a draft table whose rows are ordered within a parent scope.
pub trait DraftTable {
    /// Entity name used in error messages.
    const ENTITY: &'static str;
    const TABLE: &'static str;
    /// Column referencing the scope row.
    const PARENT_COLUMN: &'static str;
    /// Table holding the scope row that serializes writers.
    const SCOPE_TABLE: &'static str;
    /// Entity name of the scope row, for error messages.
    const SCOPE_ENTITY: &'static str;
}

/// Draft questions, ordered within a survey.
pub struct QuestionDrafts;

impl DraftTable for QuestionDrafts {
    const ENTITY: &'static str = "DraftQuestion";
    const TABLE: &'static str = "draft_questions";
    const PARENT_COLUMN: &'static str = "survey_id";
    const SCOPE_TABLE: &'static str = "surveys";
    const SCOPE_ENTITY: &'static str = "Survey";
}

/// Draft options, ordered within a draft question.
pub struct OptionDrafts;

impl DraftTable for OptionDrafts {
    const ENTITY: &'static str = "DraftOption";
    const TABLE: &'static str = "draft_options";
    const PARENT_COLUMN: &'static str = "question_id";
    const SCOPE_TABLE: &'static str = "draft_questions";
    const SCOPE_ENTITY: &'static str = "DraftQuestion";
}

/// Lock the scope row `FOR UPDATE`, failing with `NotFound` if it is absent.
pub async fn lock_scope<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
) -> Result<(), StoreError> {
    let query = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", T::SCOPE_TABLE);
    sqlx::query_scalar::<_, DbId>(&query)
        .bind(parent_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| StoreError::not_found(T::SCOPE_ENTITY, parent_id))?;
    Ok(())
}

/// Highest order among live siblings, `0` for an empty scope.
pub async fn max_live_order<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
) -> Result<SortOrder, StoreError> {
    let query = format!(
        "SELECT COALESCE(MAX(sort_order), 0) FROM {} \
         WHERE {} = $1 AND state <> 'DELETED'",
        T::TABLE,
        T::PARENT_COLUMN
    );
    let max = sqlx::query_scalar::<_, SortOrder>(&query)
        .bind(parent_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(max)
}

async fn apply_shift<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    shift: Shift,
) -> Result<u64, StoreError> {
    let query = format!(
        "UPDATE {} SET sort_order = sort_order + $2 \
         WHERE {} = $1 AND state <> 'DELETED' AND sort_order BETWEEN $3 AND $4",
        T::TABLE,
        T::PARENT_COLUMN
    );
    let result = sqlx::query(&query)
        .bind(parent_id)
        .bind(shift.delta)
        .bind(shift.from)
        .bind(shift.to)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

/// Move the entity at `current` to `requested`, shifting the live siblings in
/// between so the scope stays contiguous.
///
/// `requested` must lie in `1..=max_live_order`; equal positions are a no-op.
pub async fn reorder<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    id: DbId,
    current: SortOrder,
    requested: SortOrder,
) -> Result<(), StoreError> {
    let max = max_live_order::<T>(tx, parent_id).await?;
    let Some(shift) = plan_reorder(current, requested, max)? else {
        return Ok(());
    };
    apply_shift::<T>(tx, parent_id, shift).await?;

    let query = format!("UPDATE {} SET sort_order = $2 WHERE id = $1", T::TABLE);
    sqlx::query(&query)
        .bind(id)
        .bind(requested)
        .execute(&mut **tx)
        .await?;

    tracing::debug!(
        entity = T::ENTITY,
        id,
        from = current,
        to = requested,
        "Reordered draft"
    );
    Ok(())
}

/// Close the gap left by an entity that sat at `removed`.
pub async fn compact<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    removed: SortOrder,
) -> Result<(), StoreError> {
    apply_shift::<T>(tx, parent_id, plan_compaction(removed)).await?;
    Ok(())
}

/// Put a soft-deleted entity back at the end of the live siblings as an
/// `ACTUAL` row and return its new order.
pub async fn reenter<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    id: DbId,
) -> Result<SortOrder, StoreError> {
    let order = max_live_order::<T>(tx, parent_id).await? + 1;
    let query = format!(
        "UPDATE {} SET sort_order = $2, state = 'ACTUAL' WHERE id = $1",
        T::TABLE
    );
    sqlx::query(&query)
        .bind(id)
        .bind(order)
        .execute(&mut **tx)
        .await?;
    Ok(order)
}

/// Set the lifecycle state of a draft row.
pub async fn set_state<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
    state: DraftState,
) -> Result<(), StoreError> {
    let query = format!("UPDATE {} SET state = $2 WHERE id = $1", T::TABLE);
    sqlx::query(&query)
        .bind(id)
        .bind(state.as_str())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Hard-delete a draft row and, if it was live, compact its siblings.
pub async fn purge<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    id: DbId,
    order: SortOrder,
    state: DraftState,
) -> Result<(), StoreError> {
    let query = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
    sqlx::query(&query).bind(id).execute(&mut **tx).await?;
    if state.is_live() {
        compact::<T>(tx, parent_id, order).await?;
    }
    Ok(())
}

/// Apply the lifecycle's delete action: purge a `NEW` draft or mark a
/// published-backed one `DELETED`. The scope is compacted in both cases.
pub async fn remove<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    id: DbId,
    order: SortOrder,
    state: DraftState,
) -> Result<DeleteOutcome, StoreError> {
    match state.on_delete()? {
        DeleteAction::Purge => {
            purge::<T>(tx, parent_id, id, order, state).await?;
            Ok(DeleteOutcome::Purged { id })
        }
        DeleteAction::MarkDeleted => {
            set_state::<T>(tx, id, DraftState::Deleted).await?;
            compact::<T>(tx, parent_id, order).await?;
            Ok(DeleteOutcome::MarkedDeleted { id })
        }
    }
}

/// Rename a draft row, applying the lifecycle's edit transition.
pub async fn relabel<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: DbId,
    state: DraftState,
    label: &str,
) -> Result<(), StoreError> {
    let next = state.on_edit()?;
    let query = format!(
        "UPDATE {} SET label = $2, state = $3 WHERE id = $1",
        T::TABLE
    );
    sqlx::query(&query)
        .bind(id)
        .bind(label)
        .bind(next.as_str())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Move a draft row to `requested`, applying the lifecycle's edit transition.
pub async fn move_to<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    id: DbId,
    current: SortOrder,
    state: DraftState,
    requested: SortOrder,
) -> Result<(), StoreError> {
    let next = state.on_edit()?;
    surveyor_core::ordering::validate_new_order(current, requested)?;
    reorder::<T>(tx, parent_id, id, current, requested).await?;
    set_state::<T>(tx, id, next).await
}

/// Place a restored entity at its published position, clamped to the live
/// range, re-entering it first if it had been soft-deleted.
pub async fn restore_position<T: DraftTable>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    parent_id: DbId,
    id: DbId,
    current: SortOrder,
    state: DraftState,
    published_order: SortOrder,
) -> Result<SortOrder, StoreError> {
    let current = if state.is_live() {
        current
    } else {
        reenter::<T>(tx, parent_id, id).await?
    };
    let max = max_live_order::<T>(tx, parent_id).await?;
    if max < 1 {
        return Err(CoreError::Internal(format!(
            "{} {id} is live but its scope is empty",
            T::ENTITY
        ))
        .into());
    }
    let target = published_order.clamp(1, max);
    reorder::<T>(tx, parent_id, id, current, target).await?;
    Ok(target)
}
