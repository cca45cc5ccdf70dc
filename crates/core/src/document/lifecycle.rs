//! Soft-delete lifecycle for documents.
//!
//! A document is `active`, or `deleted` with the deletion instant, and may
//! move between the two; purging (hard delete) is terminal and happens at
//! the storage layer. The state is persisted as a nullable `deleted_at`
//! column but handled here as an explicit tagged state so transitions are
//! checked in one place.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The lifecycle state of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Visible in listings, editable.
    Active,
    /// Hidden from listings; restorable.
    Deleted {
        /// When the document was soft-deleted.
        at: DateTime<Utc>,
    },
}

/// Invalid lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Delete invoked on an already-deleted document.
    #[error("document is already deleted")]
    AlreadyDeleted,

    /// Restore invoked on a document that is not deleted.
    #[error("document is not deleted")]
    NotDeleted,
}

impl Lifecycle {
    /// Reconstructs the state from the persisted `deleted_at` column.
    #[must_use]
    pub const fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(at) => Self::Deleted { at },
        }
    }

    /// The persisted representation of this state.
    #[must_use]
    pub const fn deleted_at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(at),
        }
    }

    /// Whether the document is soft-deleted.
    #[must_use]
    pub const fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted { .. })
    }

    /// Soft-deletes an active document.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyDeleted`] if the document is already
    /// deleted.
    pub fn delete(self, at: DateTime<Utc>) -> Result<Self, LifecycleError> {
        match self {
            Self::Active => Ok(Self::Deleted { at }),
            Self::Deleted { .. } => Err(LifecycleError::AlreadyDeleted),
        }
    }

    /// Restores a soft-deleted document.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotDeleted`] if the document is active.
    pub fn restore(self) -> Result<Self, LifecycleError> {
        match self {
            Self::Deleted { .. } => Ok(Self::Active),
            Self::Active => Err(LifecycleError::NotDeleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_deleted_at() {
        assert_eq!(Lifecycle::from_deleted_at(None), Lifecycle::Active);

        let at = Utc::now();
        assert_eq!(
            Lifecycle::from_deleted_at(Some(at)),
            Lifecycle::Deleted { at }
        );
    }

    #[test]
    fn test_delete_then_restore_round_trips() {
        let at = Utc::now();
        let deleted = Lifecycle::Active.delete(at).unwrap();
        assert_eq!(deleted.deleted_at(), Some(at));

        let restored = deleted.restore().unwrap();
        assert_eq!(restored, Lifecycle::Active);
        assert_eq!(restored.deleted_at(), None);
    }

    #[test]
    fn test_double_delete_rejected() {
        let deleted = Lifecycle::Active.delete(Utc::now()).unwrap();
        assert_eq!(
            deleted.delete(Utc::now()),
            Err(LifecycleError::AlreadyDeleted)
        );
    }

    #[test]
    fn test_restore_active_rejected() {
        assert_eq!(Lifecycle::Active.restore(), Err(LifecycleError::NotDeleted));
    }
}
