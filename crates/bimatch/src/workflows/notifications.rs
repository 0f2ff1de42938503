//! Addressed, typed notices keeping both sides of a candidacy synchronized.
//!
//! The dispatcher creates exactly one unread notice per call and never reads
//! prior notices: deduplication is the caller's job, since each workflow
//! transition dispatches exactly once. Feed reads and the read flag are the
//! only mutations the workflow ever performs on a stored notice.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for stored notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub String);

/// Identifier of a notice recipient. Professionals and companies address
/// their notices with their own platform identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workflow events a notice can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ApplicationReceived,
    ApplicationUnderReview,
    ApplicationPreselected,
    ApplicationAccepted,
    ApplicationRejected,
    InterviewProposed,
    InterviewAccepted,
    InterviewDeclined,
    InterviewRescheduled,
    ContractPendingReview,
    ContractApproved,
    ContractRejected,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::ApplicationReceived => "application_received",
            NotificationKind::ApplicationUnderReview => "application_under_review",
            NotificationKind::ApplicationPreselected => "application_preselected",
            NotificationKind::ApplicationAccepted => "application_accepted",
            NotificationKind::ApplicationRejected => "application_rejected",
            NotificationKind::InterviewProposed => "interview_proposed",
            NotificationKind::InterviewAccepted => "interview_accepted",
            NotificationKind::InterviewDeclined => "interview_declined",
            NotificationKind::InterviewRescheduled => "interview_rescheduled",
            NotificationKind::ContractPendingReview => "contract_pending_review",
            NotificationKind::ContractApproved => "contract_approved",
            NotificationKind::ContractRejected => "contract_rejected",
        }
    }
}

/// Event-specific payload bag carried alongside the rendered title/message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_date: Option<NaiveDate>,
}

/// A stored notice, visible in the recipient's feed immediately after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNotification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link_to: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub payload: NotificationPayload,
}

/// Everything needed to create one notice. Kept as a standalone value so a
/// failed dispatch can be retried later without re-running the transition
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeRequest {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link_to: String,
    pub payload: NotificationPayload,
}

/// Storage abstraction over the notification collection.
pub trait NotificationRepository: Send + Sync {
    fn create(&self, notification: UserNotification) -> Result<UserNotification, NotificationError>;
    fn for_user(&self, user: &UserId) -> Result<Vec<UserNotification>, NotificationError>;
    fn mark_read(&self, id: &NotificationId) -> Result<UserNotification, NotificationError>;
}

/// Error enumeration for notification storage failures.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification not found")]
    NotFound,
    #[error("notification store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of the dispatch attempt that follows a successful status write.
/// A `Failed` delivery is a partial failure: the transition stands, and the
/// carried request can be re-dispatched on its own.
#[derive(Debug)]
pub enum NotificationDelivery {
    Delivered(UserNotification),
    Failed {
        request: NoticeRequest,
        error: NotificationError,
    },
}

impl NotificationDelivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotificationDelivery::Delivered(_))
    }

    pub fn notification(&self) -> Option<&UserNotification> {
        match self {
            NotificationDelivery::Delivered(notification) => Some(notification),
            NotificationDelivery::Failed { .. } => None,
        }
    }
}

static NOTIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_notification_id() -> NotificationId {
    let id = NOTIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    NotificationId(format!("ntf-{id:06}"))
}

/// Creates one addressed notice per event over the backing repository.
pub struct NotificationDispatcher<N> {
    repository: Arc<N>,
}

impl<N> Clone for NotificationDispatcher<N> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<N> NotificationDispatcher<N>
where
    N: NotificationRepository,
{
    pub fn new(repository: Arc<N>) -> Self {
        Self { repository }
    }

    /// Create one unread notice with a server-assigned creation time.
    pub fn dispatch(&self, request: NoticeRequest) -> Result<UserNotification, NotificationError> {
        let notification = UserNotification {
            id: next_notification_id(),
            user_id: request.recipient,
            kind: request.kind,
            title: request.title,
            message: request.message,
            link_to: request.link_to,
            is_read: false,
            created_at: Utc::now(),
            payload: request.payload,
        };
        self.repository.create(notification)
    }

    /// Dispatch without surfacing the error to the transition result: the
    /// status write already happened, so a failure here is reported back as
    /// a retryable receipt instead of an `Err`.
    pub fn dispatch_reported(&self, request: NoticeRequest) -> NotificationDelivery {
        match self.dispatch(request.clone()) {
            Ok(notification) => NotificationDelivery::Delivered(notification),
            Err(error) => {
                tracing::warn!(
                    %error,
                    recipient = %request.recipient,
                    kind = request.kind.label(),
                    "notification dispatch failed after the status write; keeping request for retry"
                );
                NotificationDelivery::Failed { request, error }
            }
        }
    }

    pub fn feed(&self, user: &UserId) -> Result<Vec<UserNotification>, NotificationError> {
        self.repository.for_user(user)
    }

    pub fn mark_read(&self, id: &NotificationId) -> Result<UserNotification, NotificationError> {
        self.repository.mark_read(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryNotifications {
        records: Mutex<HashMap<NotificationId, UserNotification>>,
    }

    impl NotificationRepository for MemoryNotifications {
        fn create(
            &self,
            notification: UserNotification,
        ) -> Result<UserNotification, NotificationError> {
            let mut guard = self.records.lock().expect("notification mutex poisoned");
            guard.insert(notification.id.clone(), notification.clone());
            Ok(notification)
        }

        fn for_user(&self, user: &UserId) -> Result<Vec<UserNotification>, NotificationError> {
            let guard = self.records.lock().expect("notification mutex poisoned");
            Ok(guard
                .values()
                .filter(|notification| notification.user_id == *user)
                .cloned()
                .collect())
        }

        fn mark_read(&self, id: &NotificationId) -> Result<UserNotification, NotificationError> {
            let mut guard = self.records.lock().expect("notification mutex poisoned");
            let notification = guard.get_mut(id).ok_or(NotificationError::NotFound)?;
            notification.is_read = true;
            Ok(notification.clone())
        }
    }

    struct OfflineNotifications;

    impl NotificationRepository for OfflineNotifications {
        fn create(&self, _: UserNotification) -> Result<UserNotification, NotificationError> {
            Err(NotificationError::Unavailable("store offline".to_string()))
        }

        fn for_user(&self, _: &UserId) -> Result<Vec<UserNotification>, NotificationError> {
            Err(NotificationError::Unavailable("store offline".to_string()))
        }

        fn mark_read(&self, _: &NotificationId) -> Result<UserNotification, NotificationError> {
            Err(NotificationError::Unavailable("store offline".to_string()))
        }
    }

    fn request() -> NoticeRequest {
        NoticeRequest {
            recipient: UserId("company-7".to_string()),
            kind: NotificationKind::ApplicationReceived,
            title: "Nuova candidatura".to_string(),
            message: "Hai ricevuto una nuova candidatura.".to_string(),
            link_to: "/company/projects/prj-1/candidates".to_string(),
            payload: NotificationPayload::default(),
        }
    }

    #[test]
    fn dispatch_creates_unread_notice_with_creation_time() {
        let dispatcher = NotificationDispatcher::new(Arc::new(MemoryNotifications::default()));
        let created = dispatcher.dispatch(request()).expect("notice created");
        assert!(!created.is_read);
        assert_eq!(created.user_id, UserId("company-7".to_string()));

        let feed = dispatcher
            .feed(&UserId("company-7".to_string()))
            .expect("feed readable");
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn dispatch_reported_keeps_request_on_failure() {
        let dispatcher = NotificationDispatcher::new(Arc::new(OfflineNotifications));
        match dispatcher.dispatch_reported(request()) {
            NotificationDelivery::Failed { request, error } => {
                assert_eq!(request.kind, NotificationKind::ApplicationReceived);
                assert!(matches!(error, NotificationError::Unavailable(_)));
            }
            other => panic!("expected failed delivery, got {other:?}"),
        }
    }

    #[test]
    fn mark_read_flips_the_flag_only() {
        let dispatcher = NotificationDispatcher::new(Arc::new(MemoryNotifications::default()));
        let created = dispatcher.dispatch(request()).expect("notice created");
        let updated = dispatcher.mark_read(&created.id).expect("flag flipped");
        assert!(updated.is_read);
        assert_eq!(updated.message, created.message);
    }
}
