// src/db/queries/stats.rs
use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::QueryBuilder;
use utoipa::{IntoParams, ToSchema};

use crate::app_state::AppState;
use crate::db::models::requests::TaskRequest;
use crate::db::models::stats::EmployeeStats;
use crate::db::models::user::UserProfile;
use crate::db::queries::user::MANAGER_ROLES;
use crate::utils::api_response::ApiResponse;

const REQUEST_COLUMNS: &str = "id, task_name, description, priority, deadline, assignee, \
     assigned_by, status, progress, progress_updates, accepted_on, declined_on, completed_on, \
     created_at, updated_at";

/// Optional reporting window over request creation time.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StatsWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// One employee's directory entry plus their derived rates.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeOverview {
    pub company_id: String,
    pub full_name: String,
    pub role: String,
    pub stats: EmployeeStats,
}

#[utoipa::path(
    get,
    path = "/stats/{company_id}",
    params(
        ("company_id" = String, Path, description = "Assignee company id"),
        StatsWindow
    ),
    responses(
        (status = 200, description = "Rates for the employee", body = EmployeeStats)
    ),
    tag = "Stats"
)]
pub async fn get_employee_stats(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(window): Query<StatsWindow>,
) -> Result<ApiResponse<EmployeeStats>, ApiResponse<()>> {
    let mut query = QueryBuilder::new(format!(
        "SELECT {REQUEST_COLUMNS} FROM task_requests WHERE assignee = "
    ));
    query.push_bind(&company_id);
    if let Some(from) = window.from {
        query.push(" AND created_at >= ");
        query.push_bind(from.and_hms_opt(0, 0, 0).unwrap_or_default());
    }
    if let Some(to) = window.to {
        query.push(" AND created_at <= ");
        query.push_bind(to.and_hms_opt(23, 59, 59).unwrap_or_default());
    }
    query.push(" ORDER BY created_at DESC");

    let requests = query
        .build_query_as::<TaskRequest>()
        .fetch_all(&state.pool)
        .await?;

    Ok(ApiResponse::ok(
        "Employee statistics",
        EmployeeStats::compute(&requests),
    ))
}

/// The manager view: every non-manager employee with their request history
/// collapsed into rates.
#[utoipa::path(
    get,
    path = "/stats/employees",
    responses(
        (status = 200, description = "Per-employee overview", body = Vec<EmployeeOverview>)
    ),
    tag = "Stats"
)]
pub async fn get_employee_overview(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<EmployeeOverview>>, ApiResponse<()>> {
    let excluded: Vec<String> = MANAGER_ROLES.iter().map(|r| r.to_string()).collect();
    let employees = sqlx::query_as::<_, UserProfile>(
        "SELECT id, company_id, full_name, role FROM users \
         WHERE NOT (role = ANY($1)) ORDER BY full_name",
    )
    .bind(excluded)
    .fetch_all(&state.pool)
    .await?;

    if employees.is_empty() {
        return Ok(ApiResponse::ok("Employee overview", Vec::new()));
    }

    let company_ids: Vec<String> = employees.iter().map(|e| e.company_id.clone()).collect();
    let requests = sqlx::query_as::<_, TaskRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM task_requests WHERE assignee = ANY($1) \
         ORDER BY created_at DESC"
    ))
    .bind(company_ids)
    .fetch_all(&state.pool)
    .await?;

    let mut by_assignee: HashMap<String, Vec<TaskRequest>> = HashMap::new();
    for request in requests {
        by_assignee
            .entry(request.assignee.clone())
            .or_default()
            .push(request);
    }

    let overview = employees
        .into_iter()
        .map(|employee| {
            let history = by_assignee
                .get(&employee.company_id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            EmployeeOverview {
                stats: EmployeeStats::compute(history),
                company_id: employee.company_id,
                full_name: employee.full_name,
                role: employee.role,
            }
        })
        .collect();

    Ok(ApiResponse::ok("Employee overview", overview))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(get_employee_stats, get_employee_overview),
    components(schemas(EmployeeStats, EmployeeOverview)),
    tags(
        (name = "Stats", description = "Read-only acceptance/completion/on-time reporting")
    )
)]
pub struct StatsDoc;
