// src/db/models/stats.rs
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::requests::{RequestStatus, TaskRequest};

/// Acceptance/completion/on-time rates derived from a slice of request
/// history. Pure read-side computation; every division by zero yields 0.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct EmployeeStats {
    pub total: u32,
    pub accepted: u32,
    pub declined: u32,
    pub completed: u32,
    pub acceptance_rate: f64,
    pub completion_rate: f64,
    pub on_time_rate: f64,
}

impl EmployeeStats {
    pub fn compute(requests: &[TaskRequest]) -> Self {
        let total = requests.len() as u32;
        let accepted = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Ongoing)
            .count() as u32;
        let declined = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Declined)
            .count() as u32;
        let completed_requests: Vec<&TaskRequest> = requests
            .iter()
            .filter(|r| r.status == RequestStatus::Completed)
            .collect();
        let completed = completed_requests.len() as u32;
        let on_time = completed_requests
            .iter()
            .filter(|r| {
                r.completed_on
                    .map(|done| done.date() <= r.deadline)
                    .unwrap_or(false)
            })
            .count() as u32;

        Self {
            total,
            accepted,
            declined,
            completed,
            acceptance_rate: ratio(accepted, accepted + declined),
            completion_rate: ratio(completed, total),
            on_time_rate: ratio(on_time, completed),
        }
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::requests::Priority;
    use chrono::NaiveDate;
    use sqlx::types::Json;

    fn request(status: RequestStatus) -> TaskRequest {
        let deadline = NaiveDate::from_ymd_opt(2025, 6, 20).unwrap();
        let created = deadline.and_hms_opt(9, 0, 0).unwrap();
        // Completion clears accepted_on, so only ongoing requests carry it.
        let accepted_on = (status == RequestStatus::Ongoing).then_some(created);
        TaskRequest {
            id: 1,
            task_name: "Audit".to_string(),
            description: "Audit the ledgers".to_string(),
            priority: Priority::Medium,
            deadline,
            assignee: "TS1001".to_string(),
            assigned_by: "TS2001".to_string(),
            status,
            progress: 0,
            progress_updates: Json(Vec::new()),
            accepted_on,
            declined_on: (status == RequestStatus::Declined).then_some(created),
            completed_on: (status == RequestStatus::Completed).then_some(created),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn empty_history_yields_zero_rates() {
        let stats = EmployeeStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.acceptance_rate, 0.0);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.on_time_rate, 0.0);
    }

    #[test]
    fn rates_reflect_the_history() {
        let requests = vec![
            request(RequestStatus::Completed),
            request(RequestStatus::Ongoing),
            request(RequestStatus::Declined),
            request(RequestStatus::Pending),
        ];
        let stats = EmployeeStats::compute(&requests);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.declined, 1);
        assert_eq!(stats.completed, 1);
        assert!((stats.acceptance_rate - 0.5).abs() < 1e-9);
        assert!((stats.completion_rate - 0.25).abs() < 1e-9);
        assert_eq!(stats.on_time_rate, 1.0);
    }

    #[test]
    fn late_completion_counts_against_on_time_rate() {
        let mut late = request(RequestStatus::Completed);
        late.completed_on = late
            .deadline
            .succ_opt()
            .and_then(|d| d.and_hms_opt(9, 0, 0));
        let on_time = request(RequestStatus::Completed);
        let stats = EmployeeStats::compute(&[late, on_time]);
        assert!((stats.on_time_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn declined_only_history_has_zero_acceptance() {
        let stats = EmployeeStats::compute(&[request(RequestStatus::Declined)]);
        assert_eq!(stats.acceptance_rate, 0.0);
        assert_eq!(stats.declined, 1);
    }
}
