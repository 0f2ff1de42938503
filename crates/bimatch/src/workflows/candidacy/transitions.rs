//! The transition table governing a candidacy's status.
//!
//! Every status change funnels through this table so no call site can
//! perform an unguarded write to `status`. Rejection during an active
//! interview negotiation stays legal: the interview outcome statuses are
//! signals, not finalizations.

use super::domain::ApplicationStatus;

/// Minimum length for a rejection or interview-decline reason.
pub const MIN_REASON_LEN: usize = 10;

/// Legal targets reachable from a given status. Empty slice means terminal.
pub fn legal_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;
    match from {
        Inviata => &[InRevisione, Preselezionata, Accettata, Rifiutata],
        InRevisione => &[Preselezionata, Accettata, Rifiutata],
        Preselezionata => &[ColloquioProposto, Accettata, Rifiutata],
        ColloquioProposto => &[
            ColloquioAccettatoProf,
            ColloquioRifiutatoProf,
            ColloquioRipianificatoProf,
            Accettata,
            Rifiutata,
        ],
        ColloquioAccettatoProf => &[Accettata, Rifiutata],
        ColloquioRifiutatoProf => &[Accettata, Rifiutata],
        ColloquioRipianificatoProf => &[ColloquioProposto, Accettata, Rifiutata],
        Accettata | Rifiutata => &[],
    }
}

pub fn is_terminal(status: ApplicationStatus) -> bool {
    legal_targets(status).is_empty()
}

pub fn ensure_legal(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Result<(), TransitionViolation> {
    if legal_targets(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionViolation::IllegalTarget { from, to })
    }
}

/// Validate a mandatory free-text reason attached to a transition payload.
pub fn require_reason(field: &'static str, reason: &str) -> Result<(), TransitionViolation> {
    let length = reason.trim().chars().count();
    if length == 0 {
        return Err(TransitionViolation::MissingField { field });
    }
    if length < MIN_REASON_LEN {
        return Err(TransitionViolation::ReasonTooShort {
            field,
            minimum: MIN_REASON_LEN,
        });
    }
    Ok(())
}

/// Validate a mandatory non-empty payload field.
pub fn require_field(field: &'static str, value: &str) -> Result<(), TransitionViolation> {
    if value.trim().is_empty() {
        Err(TransitionViolation::MissingField { field })
    } else {
        Ok(())
    }
}

/// Violations raised before any write happens: either the target status is
/// not reachable from the current one, or the payload for the transition is
/// missing a required field.
#[derive(Debug, thiserror::Error)]
pub enum TransitionViolation {
    #[error("illegal status transition from '{from}' to '{to}'")]
    IllegalTarget {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("'{field}' is required for this transition")]
    MissingField { field: &'static str },
    #[error("'{field}' must be at least {minimum} characters")]
    ReasonTooShort { field: &'static str, minimum: usize },
}
