//! Exchange request model and lifecycle types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use super::book::{BookCondition, BookStatus};
use super::user::UserPublic;

/// Lifecycle state of an exchange request.
/// `Pending` is the only non-terminal state; a request leaves it exactly
/// once, into `Accepted` or `Declined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Declined => "declined",
        }
    }

    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    /// Whether a pending request may move to `target`
    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        *self == RequestStatus::Pending && target.is_terminal()
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "declined" => Ok(RequestStatus::Declined),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// SQLx conversion for RequestStatus (stored as TEXT)
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Exchange request row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookRequest {
    pub id: i32,
    pub book_id: i32,
    pub requester_id: i32,
    pub message: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Limited book fields inlined into request views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestBook {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub condition: BookCondition,
    pub image_path: Option<String>,
    pub owner_id: i32,
    pub owner_name: String,
    pub status: BookStatus,
}

/// Exchange request with the book and requester inlined
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestDetails {
    pub id: i32,
    pub message: String,
    pub status: RequestStatus,
    pub book: RequestBook,
    pub requester: UserPublic,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRequest {
    pub book_id: i32,
    #[validate(custom(function = "crate::models::non_blank", message = "Message is required"))]
    pub message: String,
}

/// Decision payload: the owner's accept/decline of a pending request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequestStatus {
    pub status: RequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("pending".parse::<RequestStatus>().unwrap(), RequestStatus::Pending);
        assert_eq!("Accepted".parse::<RequestStatus>().unwrap(), RequestStatus::Accepted);
        assert!("cancelled".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_pending_is_only_initial_state() {
        assert_eq!(RequestStatus::default(), RequestStatus::Pending);
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Declined.is_terminal());
    }

    #[test]
    fn test_blank_message_rejected() {
        use validator::Validate;

        let payload = CreateRequest {
            book_id: 1,
            message: " \t ".to_string(),
        };
        assert!(payload.validate().is_err());

        let payload = CreateRequest {
            book_id: 1,
            message: "Would love to trade".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_transitions_leave_pending_exactly_once() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Accepted));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Declined));
        // no self-transition, no transition out of terminal states
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Pending));
        assert!(!RequestStatus::Accepted.can_transition_to(RequestStatus::Declined));
        assert!(!RequestStatus::Declined.can_transition_to(RequestStatus::Accepted));
        assert!(!RequestStatus::Accepted.can_transition_to(RequestStatus::Pending));
    }
}
