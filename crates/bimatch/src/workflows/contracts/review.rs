//! The admin-only review pipeline over a contract document.
//!
//! An edit always lands on `DRAFT`, even from `GENERATED`: the validated
//! text no longer matches what was validated, so the promotion has to be
//! earned again. Terminal states freeze the text.

use super::domain::ContractStatus;

/// Legal targets reachable from a given status. Empty slice means terminal.
pub fn legal_targets(from: ContractStatus) -> &'static [ContractStatus] {
    use ContractStatus::*;
    match from {
        Draft => &[Generated, PendingReview],
        Generated => &[Draft, PendingReview],
        PendingReview => &[Approved, Rejected],
        Approved => &[Archived],
        Rejected => &[Archived],
        Archived => &[],
    }
}

/// Whether the text may still be edited in this status.
pub fn can_edit(status: ContractStatus) -> bool {
    matches!(status, ContractStatus::Draft | ContractStatus::Generated)
}

pub fn is_terminal(status: ContractStatus) -> bool {
    legal_targets(status).is_empty()
}

pub fn ensure_legal(from: ContractStatus, to: ContractStatus) -> Result<(), ReviewViolation> {
    if legal_targets(from).contains(&to) {
        Ok(())
    } else {
        Err(ReviewViolation::IllegalTarget { from, to })
    }
}

/// Violation raised when a review transition is not in the table.
#[derive(Debug, thiserror::Error)]
pub enum ReviewViolation {
    #[error("illegal contract transition from '{from}' to '{to}'")]
    IllegalTarget {
        from: ContractStatus,
        to: ContractStatus,
    },
}
