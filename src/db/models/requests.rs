// src/db/models/requests.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

use super::EnumParseError;
use crate::utils::error::TaskError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            _ => Err(EnumParseError::new("priority", value)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Ongoing,
    Completed,
    Declined,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Ongoing => "ongoing",
            RequestStatus::Completed => "completed",
            RequestStatus::Declined => "declined",
        }
    }

    /// The lifecycle transition table. Anything not listed here is rejected
    /// by the handlers with an invalid-state error.
    pub const fn can_transition(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Ongoing)
                | (RequestStatus::Pending, RequestStatus::Declined)
                | (RequestStatus::Ongoing, RequestStatus::Completed)
        )
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = EnumParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "ongoing" => Ok(RequestStatus::Ongoing),
            "completed" => Ok(RequestStatus::Completed),
            "declined" => Ok(RequestStatus::Declined),
            _ => Err(EnumParseError::new("request status", value)),
        }
    }
}

/// One entry in a request's progress history.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct ProgressUpdate {
    pub percentage: i32,
    pub comment: String,
    pub updated_by: String,
    pub updated_at: NaiveDateTime,
}

/// A unit of work moving through pending/ongoing/completed/declined.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow, ToSchema)]
pub struct TaskRequest {
    pub id: i32,
    pub task_name: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub assignee: String,
    pub assigned_by: String,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub progress: i32,
    #[schema(value_type = Vec<ProgressUpdate>)]
    pub progress_updates: Json<Vec<ProgressUpdate>>,
    pub accepted_on: Option<NaiveDateTime>,
    pub declined_on: Option<NaiveDateTime>,
    pub completed_on: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewTaskRequest {
    pub task_name: String,
    pub description: String,
    pub priority: Priority,
    pub deadline: NaiveDate,
    pub assignee: String,
    pub assigned_by: String,
}

impl NewTaskRequest {
    /// Typed fields are enforced by deserialization; the string fields still
    /// need a blank check.
    pub fn validate(&self) -> Result<(), TaskError> {
        for (field, value) in [
            ("task_name", &self.task_name),
            ("description", &self.description),
            ("assignee", &self.assignee),
            ("assigned_by", &self.assigned_by),
        ] {
            if value.trim().is_empty() {
                return Err(TaskError::Validation(format!("{field} is required")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub task_name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
    pub assignee: Option<String>,
    pub assigned_by: Option<String>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeclineRequest {
    pub declined_reason: String,
    pub alternative_date: NaiveDate,
}

impl DeclineRequest {
    /// Reason must be non-empty and the proposed date may not be in the past
    /// (date-only comparison).
    pub fn validate(&self, today: NaiveDate) -> Result<(), TaskError> {
        if self.declined_reason.trim().is_empty() {
            return Err(TaskError::Validation(
                "declined_reason is required".to_string(),
            ));
        }
        if self.alternative_date < today {
            return Err(TaskError::Validation(
                "alternative_date cannot be in the past".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressRequest {
    pub progress: i32,
    pub comment: String,
    pub company_id: String,
}

/// Range check for a reported percentage.
pub fn validate_progress_value(progress: i32) -> Result<(), TaskError> {
    if !(0..=100).contains(&progress) {
        return Err(TaskError::Validation(
            "progress must be between 0 and 100".to_string(),
        ));
    }
    Ok(())
}

/// Progress may only move forward.
pub fn validate_progress_increase(current: i32, next: i32) -> Result<(), TaskError> {
    if next <= current {
        return Err(TaskError::Validation(format!(
            "progress must increase (currently at {current}%)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_request() -> NewTaskRequest {
        NewTaskRequest {
            task_name: "Quarterly report".to_string(),
            description: "Compile Q3 figures".to_string(),
            priority: Priority::High,
            deadline: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            assignee: "TS1001".to_string(),
            assigned_by: "TS2001".to_string(),
        }
    }

    #[test]
    fn transition_table_permits_only_lifecycle_moves() {
        use RequestStatus::*;
        assert!(Pending.can_transition(Ongoing));
        assert!(Pending.can_transition(Declined));
        assert!(Ongoing.can_transition(Completed));

        assert!(!Pending.can_transition(Completed));
        assert!(!Ongoing.can_transition(Declined));
        assert!(!Completed.can_transition(Ongoing));
        assert!(!Declined.can_transition(Ongoing));
        assert!(!Declined.can_transition(Completed));
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Ongoing,
            RequestStatus::Completed,
            RequestStatus::Declined,
        ] {
            let parsed = RequestStatus::try_from(status.as_str().to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(RequestStatus::try_from("paused".to_string()).is_err());
    }

    #[test]
    fn priority_round_trips_through_text() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            let parsed = Priority::try_from(priority.as_str().to_string()).unwrap();
            assert_eq!(parsed, priority);
        }
        assert!(Priority::try_from("urgent".to_string()).is_err());
    }

    #[test]
    fn new_request_rejects_blank_fields() {
        assert!(new_request().validate().is_ok());

        let mut blank_name = new_request();
        blank_name.task_name = "  ".to_string();
        assert!(blank_name.validate().is_err());

        let mut blank_assignee = new_request();
        blank_assignee.assignee = String::new();
        assert!(blank_assignee.validate().is_err());
    }

    #[test]
    fn decline_rejects_past_alternative_date() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let decline = DeclineRequest {
            declined_reason: "needs more info".to_string(),
            alternative_date: today.pred_opt().unwrap(),
        };
        assert!(decline.validate(today).is_err());
    }

    #[test]
    fn decline_accepts_today_and_future_dates() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let mut decline = DeclineRequest {
            declined_reason: "needs more info".to_string(),
            alternative_date: today,
        };
        assert!(decline.validate(today).is_ok());
        decline.alternative_date = today.succ_opt().unwrap();
        assert!(decline.validate(today).is_ok());
    }

    #[test]
    fn decline_requires_a_reason() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let decline = DeclineRequest {
            declined_reason: " ".to_string(),
            alternative_date: today,
        };
        assert!(decline.validate(today).is_err());
    }

    #[test]
    fn progress_bounds_are_inclusive() {
        assert!(validate_progress_value(0).is_ok());
        assert!(validate_progress_value(100).is_ok());
        assert!(validate_progress_value(-1).is_err());
        assert!(validate_progress_value(101).is_err());
    }

    #[test]
    fn progress_must_strictly_increase() {
        assert!(validate_progress_increase(0, 50).is_ok());
        assert!(validate_progress_increase(50, 50).is_err());
        assert!(validate_progress_increase(50, 40).is_err());
        assert!(validate_progress_increase(99, 100).is_ok());
    }
}
