//! Payloads and notice templates for the interview negotiation sub-protocol.
//!
//! The back-and-forth is asynchronous: proposals and responses travel as
//! document fields, never as a synchronous handshake. Responses are only
//! meaningful while the candidacy sits in `colloquio_proposto`, which the
//! service enforces with a guarded write.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the company sends when proposing an interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewProposal {
    pub message: String,
    pub date: NaiveDate,
}

/// The professional's acceptance, optionally carrying a message and a
/// counter-proposed date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterviewReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub counter_date: Option<NaiveDate>,
}

/// A reschedule request: a new date is mandatory, the note is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleRequest {
    pub new_date: NaiveDate,
    #[serde(default)]
    pub message: Option<String>,
}

pub(crate) fn proposal_message(project_title: &str, proposal: &InterviewProposal) -> String {
    format!(
        "L'azienda propone un colloquio per \"{project_title}\" il {}. {}",
        proposal.date, proposal.message
    )
}

pub(crate) fn acceptance_message(project_title: &str, reply: &InterviewReply) -> String {
    let mut message =
        format!("Il professionista ha ACCETTATO il colloquio per \"{project_title}\".");
    if let Some(text) = reply.message.as_deref().filter(|text| !text.trim().is_empty()) {
        message.push_str(" Messaggio: ");
        message.push_str(text.trim());
    }
    if let Some(date) = reply.counter_date {
        message.push_str(&format!(" Data alternativa proposta: {date}."));
    }
    message
}

pub(crate) fn decline_message(project_title: &str, reason: &str) -> String {
    format!(
        "Il professionista ha RIFIUTATO il colloquio per \"{project_title}\". Motivazione: {}",
        reason.trim()
    )
}

pub(crate) fn reschedule_message(project_title: &str, request: &RescheduleRequest) -> String {
    let mut message = format!(
        "Il professionista ha proposto una nuova data per il colloquio su \"{project_title}\": {}.",
        request.new_date
    );
    if let Some(text) = request.message.as_deref().filter(|text| !text.trim().is_empty()) {
        message.push_str(" Messaggio: ");
        message.push_str(text.trim());
    }
    message
}
