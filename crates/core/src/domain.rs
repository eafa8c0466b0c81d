use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// Seconds a persisted win stays visible before the store expires it.
pub const WIN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Placeholder stored when a submission leaves the description blank.
pub const DEFAULT_DESCRIPTION: &str = "Big WIN!";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinId(pub String);

impl WinId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// The raw field values captured from a submitted dialog, before any
/// defaulting or validation has been applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WinSubmission {
    pub user_id: String,
    pub user_name: String,
    pub who: String,
    pub title: String,
    pub description: String,
}

/// One recognition record. Immutable after creation; there is no update
/// path, so `updated_at` always equals `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Win {
    pub id: WinId,
    pub user_id: String,
    pub user_name: String,
    pub who: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Win {
    /// Builds a win from a dialog submission, stamped at `now`.
    ///
    /// `who` and `title` must be non-empty after trimming; an empty
    /// description is replaced with [`DEFAULT_DESCRIPTION`]. `expires_at`
    /// is always exactly seven days after `updated_at`.
    pub fn submit(submission: WinSubmission, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if submission.who.trim().is_empty() {
            return Err(DomainError::EmptyField("who"));
        }
        if submission.title.trim().is_empty() {
            return Err(DomainError::EmptyField("title"));
        }

        let description = if submission.description.is_empty() {
            DEFAULT_DESCRIPTION.to_owned()
        } else {
            submission.description
        };

        Ok(Self {
            id: WinId::generate(),
            user_id: submission.user_id,
            user_name: submission.user_name,
            who: submission.who,
            title: submission.title,
            description,
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::seconds(WIN_TTL_SECONDS),
        })
    }

    /// Age of this win relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{Win, WinSubmission, DEFAULT_DESCRIPTION, WIN_TTL_SECONDS};
    use crate::errors::DomainError;

    fn submission() -> WinSubmission {
        WinSubmission {
            user_id: "U123".to_owned(),
            user_name: "alice".to_owned(),
            who: "Bob".to_owned(),
            title: "Shipped feature".to_owned(),
            description: String::new(),
        }
    }

    #[test]
    fn empty_description_gets_the_placeholder() {
        let win = Win::submit(submission(), Utc::now()).expect("submit");
        assert_eq!(win.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn non_empty_description_passes_through_unchanged() {
        let win = Win::submit(
            WinSubmission { description: "Closed the Q3 deal".to_owned(), ..submission() },
            Utc::now(),
        )
        .expect("submit");
        assert_eq!(win.description, "Closed the Q3 deal");
    }

    #[test]
    fn expiry_is_exactly_seven_days_after_update() {
        let now = Utc::now();
        let win = Win::submit(submission(), now).expect("submit");

        assert_eq!(win.created_at, now);
        assert_eq!(win.updated_at, now);
        assert_eq!(win.expires_at - win.updated_at, Duration::seconds(WIN_TTL_SECONDS));
        assert_eq!(WIN_TTL_SECONDS, 604_800);
    }

    #[test]
    fn blank_who_is_rejected() {
        let error = Win::submit(WinSubmission { who: "  ".to_owned(), ..submission() }, Utc::now())
            .expect_err("blank who must fail");
        assert_eq!(error, DomainError::EmptyField("who"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let error =
            Win::submit(WinSubmission { title: String::new(), ..submission() }, Utc::now())
                .expect_err("blank title must fail");
        assert_eq!(error, DomainError::EmptyField("title"));
    }

    #[test]
    fn two_submissions_get_distinct_ids() {
        let now = Utc::now();
        let first = Win::submit(submission(), now).expect("first");
        let second = Win::submit(submission(), now).expect("second");
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn expiry_check_is_inclusive_of_the_instant() {
        let now = Utc::now();
        let win = Win::submit(submission(), now).expect("submit");
        assert!(!win.is_expired(now));
        assert!(win.is_expired(now + Duration::seconds(WIN_TTL_SECONDS)));
    }
}
