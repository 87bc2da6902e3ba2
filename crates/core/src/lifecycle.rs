//! Draft entity lifecycle state machine.
//!
//! Every draft question and draft option carries a [`DraftState`] that
//! records how it relates to its published counterpart. State changes are
//! expressed as transition functions that either return the next state (or
//! the action the store must take) or reject the operation with
//! [`CoreError::InvalidState`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Lifecycle state of a draft entity relative to the published copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftState {
    /// Created in the draft, never published.
    New,
    /// Mirrors the published row exactly.
    Actual,
    /// Edited since the last publish.
    Changed,
    /// Marked for removal on the next publish.
    Deleted,
}

/// What a delete request does to the draft row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAction {
    /// Remove the row outright; nothing was ever published.
    Purge,
    /// Keep the row with state [`DraftState::Deleted`] so publish can retire
    /// the published counterpart.
    MarkDeleted,
}

/// What happens to a question's option drafts when its type changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDisposal {
    /// Hard-delete every option draft.
    Purge,
    /// Mark published-backed option drafts deleted, purge pure creations.
    Retire,
}

/// Outcome of a question type change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeChange {
    pub state: DraftState,
    pub options: OptionDisposal,
}

/// What a restore request does to the draft row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreAction {
    /// No published counterpart: undo the creation.
    Purge,
    /// Copy the published row (identified by the id) back onto the draft.
    Resync(DbId),
}

impl DraftState {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftState::New => "NEW",
            DraftState::Actual => "ACTUAL",
            DraftState::Changed => "CHANGED",
            DraftState::Deleted => "DELETED",
        }
    }

    /// Whether the entity still occupies a position in its parent scope.
    pub fn is_live(self) -> bool {
        !matches!(self, DraftState::Deleted)
    }

    /// State after a payload or order edit.
    pub fn on_edit(self) -> Result<DraftState, CoreError> {
        match self {
            DraftState::New => Ok(DraftState::New),
            DraftState::Actual | DraftState::Changed => Ok(DraftState::Changed),
            DraftState::Deleted => Err(CoreError::InvalidState(
                "cannot edit an entity marked as deleted".to_string(),
            )),
        }
    }

    pub fn on_delete(self) -> Result<DeleteAction, CoreError> {
        match self {
            DraftState::New => Ok(DeleteAction::Purge),
            DraftState::Actual | DraftState::Changed => Ok(DeleteAction::MarkDeleted),
            DraftState::Deleted => Err(CoreError::InvalidState(
                "entity is already marked as deleted".to_string(),
            )),
        }
    }

    pub fn on_type_change(self) -> Result<TypeChange, CoreError> {
        match self {
            DraftState::New => Ok(TypeChange {
                state: DraftState::New,
                options: OptionDisposal::Purge,
            }),
            DraftState::Actual | DraftState::Changed => Ok(TypeChange {
                state: DraftState::Changed,
                options: OptionDisposal::Retire,
            }),
            DraftState::Deleted => Err(CoreError::InvalidState(
                "cannot change the type of a question marked as deleted".to_string(),
            )),
        }
    }

    /// Restore works from any state; only the link decides the action.
    pub fn on_restore(original_id: Option<DbId>) -> RestoreAction {
        match original_id {
            Some(id) => RestoreAction::Resync(id),
            None => RestoreAction::Purge,
        }
    }
}

impl fmt::Display for DraftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(DraftState::New),
            "ACTUAL" => Ok(DraftState::Actual),
            "CHANGED" => Ok(DraftState::Changed),
            "DELETED" => Ok(DraftState::Deleted),
            other => Err(CoreError::Internal(format!("unknown draft state '{other}'"))),
        }
    }
}

impl TryFrom<String> for DraftState {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Lifecycle of the published survey row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurveyState {
    /// Never published; not visible to respondents.
    Draft,
    /// Published at least once.
    Active,
}

impl SurveyState {
    pub fn as_str(self) -> &'static str {
        match self {
            SurveyState::Draft => "DRAFT",
            SurveyState::Active => "ACTIVE",
        }
    }
}

impl FromStr for SurveyState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(SurveyState::Draft),
            "ACTIVE" => Ok(SurveyState::Active),
            other => Err(CoreError::Internal(format!("unknown survey state '{other}'"))),
        }
    }
}

impl TryFrom<String> for SurveyState {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
