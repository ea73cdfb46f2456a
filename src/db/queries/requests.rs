// src/db/queries/requests.rs
//
// The task lifecycle engine. Every transition runs inside one transaction
// with the status guard folded into the UPDATE's WHERE clause, so two
// concurrent transitions on the same request cannot both succeed; the loser
// observes zero rows and is rejected. Notification and projection rows are
// written in the same transaction, and the realtime push happens only after
// commit.
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use sqlx::{Postgres, QueryBuilder, Transaction};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::db::models::declined::DeclinedEntry;
use crate::db::models::requests::{
    validate_progress_increase, validate_progress_value, DeclineRequest, NewTaskRequest,
    ProgressRequest, ProgressUpdate, RequestStatus, TaskRequest, UpdateTaskRequest,
};
use crate::db::queries::user::display_name;
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;
use crate::utils::notification::{
    notify_progress_update, notify_task_accepted, notify_task_completed, notify_task_declined,
    notify_task_reallocated, notify_task_requested,
};

const REQUEST_COLUMNS: &str = "id, task_name, description, priority, deadline, assignee, \
     assigned_by, status, progress, progress_updates, accepted_on, declined_on, completed_on, \
     created_at, updated_at";

/// Response payload for a decline: the transitioned request plus its audit
/// snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeclineOutcome {
    pub request: TaskRequest,
    pub entry: DeclinedEntry,
}

/// Work out why a guarded transition matched no row: either the request does
/// not exist, or it is in a state the transition does not permit.
async fn reject_transition(
    tx: &mut Transaction<'_, Postgres>,
    request_id: i32,
    action: &'static str,
) -> ApiResponse<()> {
    match sqlx::query_scalar::<_, String>("SELECT status FROM task_requests WHERE id = $1")
        .bind(request_id)
        .fetch_optional(&mut **tx)
        .await
    {
        Ok(Some(status)) => TaskError::InvalidState { action, status }.into(),
        Ok(None) => TaskError::NotFound("request").into(),
        Err(e) => TaskError::Storage(e).into(),
    }
}

#[utoipa::path(
    post,
    path = "/requests",
    request_body = NewTaskRequest,
    responses(
        (status = 201, description = "Task request created", body = TaskRequest),
        (status = 400, description = "Missing or blank required field"),
        (status = 500, description = "Failed to create request")
    ),
    tag = "Requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<NewTaskRequest>,
) -> Result<ApiResponse<TaskRequest>, ApiResponse<()>> {
    payload.validate()?;

    let now = Utc::now().naive_utc();
    let mut tx = state.pool.begin().await?;

    let request = sqlx::query_as::<_, TaskRequest>(&format!(
        "INSERT INTO task_requests \
             (task_name, description, priority, deadline, assignee, assigned_by, status, \
              progress, progress_updates, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, 'pending', 0, '[]', $7, $7) \
         RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(&payload.task_name)
    .bind(&payload.description)
    .bind(payload.priority.as_str())
    .bind(payload.deadline)
    .bind(&payload.assignee)
    .bind(&payload.assigned_by)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let assigned_by_name = display_name(&state.pool, &request.assigned_by).await;
    let created = notify_task_requested(&mut tx, &request, &assigned_by_name).await?;

    tx.commit().await?;
    state.events.publish_notifications(&created);

    tracing::info!(request_id = request.id, assignee = %request.assignee, "task request created");
    Ok(ApiResponse::created("Task request created", request))
}

#[utoipa::path(
    put,
    path = "/requests/{request_id}/accept",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request accepted", body = TaskRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    ),
    tag = "Requests"
)]
pub async fn accept_request(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<ApiResponse<TaskRequest>, ApiResponse<()>> {
    let now = Utc::now().naive_utc();
    let mut tx = state.pool.begin().await?;

    let updated = sqlx::query_as::<_, TaskRequest>(&format!(
        "UPDATE task_requests SET status = 'ongoing', accepted_on = $1, updated_at = $1 \
         WHERE id = $2 AND status = 'pending' RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(now)
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(request) = updated else {
        return Err(reject_transition(&mut tx, request_id, "accept").await);
    };

    // Live projection for the collaborations listing, keyed by request id.
    sqlx::query(
        "INSERT INTO collaborations (request_id, task_name, assigned_by, assignee, deadline, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(request.id)
    .bind(&request.task_name)
    .bind(&request.assigned_by)
    .bind(&request.assignee)
    .bind(request.deadline)
    .bind(request.created_at)
    .execute(&mut *tx)
    .await?;

    let assignee_name = display_name(&state.pool, &request.assignee).await;
    let created = notify_task_accepted(&mut tx, &request, &assignee_name).await?;

    tx.commit().await?;
    state.events.publish_notifications(&created);

    tracing::info!(request_id, "request accepted");
    Ok(ApiResponse::ok("Request accepted", request))
}

#[utoipa::path(
    put,
    path = "/requests/{request_id}/decline",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    request_body = DeclineRequest,
    responses(
        (status = 201, description = "Request declined", body = DeclineOutcome),
        (status = 400, description = "Missing reason or alternative date in the past"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not pending")
    ),
    tag = "Requests"
)]
pub async fn decline_request(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
    Json(payload): Json<DeclineRequest>,
) -> Result<ApiResponse<DeclineOutcome>, ApiResponse<()>> {
    payload.validate(Utc::now().date_naive())?;

    let now = Utc::now().naive_utc();
    let mut tx = state.pool.begin().await?;

    let updated = sqlx::query_as::<_, TaskRequest>(&format!(
        "UPDATE task_requests SET status = 'declined', declined_on = $1, updated_at = $1 \
         WHERE id = $2 AND status = 'pending' RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(now)
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(request) = updated else {
        return Err(reject_transition(&mut tx, request_id, "decline").await);
    };

    let entry = sqlx::query_as::<_, DeclinedEntry>(
        "INSERT INTO declined_entries \
             (request_id, title, description, assignee, assigned_by, declined_on, \
              declined_reason, alternative_date, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $6) \
         RETURNING id, request_id, title, description, assignee, assigned_by, declined_on, \
                   declined_reason, alternative_date, created_at",
    )
    .bind(request.id)
    .bind(&request.task_name)
    .bind(&request.description)
    .bind(&request.assignee)
    .bind(&request.assigned_by)
    .bind(now)
    .bind(&payload.declined_reason)
    .bind(payload.alternative_date)
    .fetch_one(&mut *tx)
    .await?;

    let assignee_name = display_name(&state.pool, &request.assignee).await;
    let created = notify_task_declined(
        &mut tx,
        &request,
        &assignee_name,
        &payload.declined_reason,
        payload.alternative_date,
    )
    .await?;

    tx.commit().await?;
    state.events.publish_notifications(&created);

    tracing::info!(request_id, reason = %payload.declined_reason, "request declined");
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Request declined",
        DeclineOutcome { request, entry },
    ))
}

#[utoipa::path(
    put,
    path = "/requests/{request_id}/complete",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request completed", body = TaskRequest),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not ongoing")
    ),
    tag = "Requests"
)]
pub async fn complete_request(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<ApiResponse<TaskRequest>, ApiResponse<()>> {
    let now = Utc::now().naive_utc();
    let mut tx = state.pool.begin().await?;

    let updated = sqlx::query_as::<_, TaskRequest>(&format!(
        "UPDATE task_requests \
         SET status = 'completed', completed_on = $1, accepted_on = NULL, updated_at = $1 \
         WHERE id = $2 AND status = 'ongoing' RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(now)
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(request) = updated else {
        return Err(reject_transition(&mut tx, request_id, "complete").await);
    };

    sqlx::query("DELETE FROM collaborations WHERE request_id = $1")
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

    let assignee_name = display_name(&state.pool, &request.assignee).await;
    let created = notify_task_completed(&mut tx, &request, &assignee_name).await?;

    tx.commit().await?;
    state.events.publish_notifications(&created);

    tracing::info!(request_id, "request completed");
    Ok(ApiResponse::ok("Request completed", request))
}

#[utoipa::path(
    put,
    path = "/requests/{request_id}/progress",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress updated", body = TaskRequest),
        (status = 400, description = "Progress out of range or not increasing"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is not ongoing")
    ),
    tag = "Requests"
)]
pub async fn update_progress(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
    Json(payload): Json<ProgressRequest>,
) -> Result<ApiResponse<TaskRequest>, ApiResponse<()>> {
    validate_progress_value(payload.progress)?;

    let mut tx = state.pool.begin().await?;

    // Row lock so concurrent updates serialize and the monotonicity check
    // sees the latest value.
    let request = sqlx::query_as::<_, TaskRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM task_requests WHERE id = $1 FOR UPDATE"
    ))
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(TaskError::NotFound("request"))?;

    if request.status != RequestStatus::Ongoing {
        return Err(TaskError::InvalidState {
            action: "update progress on",
            status: request.status.as_str().to_string(),
        }
        .into());
    }
    validate_progress_increase(request.progress, payload.progress)?;

    let now = Utc::now().naive_utc();
    let mut updates = request.progress_updates.0.clone();
    updates.push(ProgressUpdate {
        percentage: payload.progress,
        comment: payload.comment.clone(),
        updated_by: payload.company_id.clone(),
        updated_at: now,
    });

    let updated = sqlx::query_as::<_, TaskRequest>(&format!(
        "UPDATE task_requests SET progress = $1, progress_updates = $2, updated_at = $3 \
         WHERE id = $4 RETURNING {REQUEST_COLUMNS}"
    ))
    .bind(payload.progress)
    .bind(sqlx::types::Json(&updates))
    .bind(now)
    .bind(request_id)
    .fetch_one(&mut *tx)
    .await?;

    let created = notify_progress_update(
        &mut tx,
        &updated,
        &payload.company_id,
        payload.progress,
        &payload.comment,
    )
    .await?;

    tx.commit().await?;
    state.events.publish_notifications(&created);

    Ok(ApiResponse::ok("Progress updated", updated))
}

#[utoipa::path(
    put,
    path = "/requests/{request_id}",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Request updated", body = TaskRequest),
        (status = 400, description = "No fields provided for update"),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn edit_request(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<ApiResponse<TaskRequest>, ApiResponse<()>> {
    let has_field = payload.task_name.is_some()
        || payload.description.is_some()
        || payload.priority.is_some()
        || payload.deadline.is_some()
        || payload.assignee.is_some()
        || payload.assigned_by.is_some()
        || payload.status.is_some();
    if !has_field {
        return Err(TaskError::Validation("no fields provided for update".to_string()).into());
    }

    let now = Utc::now().naive_utc();
    let mut tx = state.pool.begin().await?;

    let mut query = QueryBuilder::new("UPDATE task_requests SET updated_at = ");
    query.push_bind(now);
    if let Some(task_name) = &payload.task_name {
        query.push(", task_name = ");
        query.push_bind(task_name);
    }
    if let Some(description) = &payload.description {
        query.push(", description = ");
        query.push_bind(description);
    }
    if let Some(priority) = &payload.priority {
        query.push(", priority = ");
        query.push_bind(priority.as_str());
    }
    if let Some(deadline) = payload.deadline {
        query.push(", deadline = ");
        query.push_bind(deadline);
    }
    if let Some(assignee) = &payload.assignee {
        query.push(", assignee = ");
        query.push_bind(assignee);
    }
    if let Some(assigned_by) = &payload.assigned_by {
        query.push(", assigned_by = ");
        query.push_bind(assigned_by);
    }
    if let Some(status) = &payload.status {
        query.push(", status = ");
        query.push_bind(status.as_str());
    }
    query.push(" WHERE id = ");
    query.push_bind(request_id);
    query.push(format!(" RETURNING {REQUEST_COLUMNS}"));

    let updated = query
        .build_query_as::<TaskRequest>()
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TaskError::NotFound("request"))?;

    // Setting a request back to pending is the reallocation path and
    // re-triggers the request notification.
    let mut created = Vec::new();
    if payload.status == Some(RequestStatus::Pending) {
        let assigned_by_name = display_name(&state.pool, &updated.assigned_by).await;
        created = notify_task_reallocated(&mut tx, &updated, &assigned_by_name).await?;
    }

    tx.commit().await?;
    state.events.publish_notifications(&created);

    Ok(ApiResponse::ok("Request updated", updated))
}

#[utoipa::path(
    delete,
    path = "/requests/{request_id}",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request deleted"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Only pending requests can be deleted")
    ),
    tag = "Requests"
)]
pub async fn delete_request(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM task_requests WHERE id = $1 AND status = 'pending'")
        .bind(request_id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(reject_transition(&mut tx, request_id, "delete").await);
    }

    tx.commit().await?;
    Ok(ApiResponse::ok("Request deleted", ()))
}

#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(
        ("request_id" = i32, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request retrieved", body = TaskRequest),
        (status = 404, description = "Request not found")
    ),
    tag = "Requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<i32>,
) -> Result<ApiResponse<TaskRequest>, ApiResponse<()>> {
    let request = sqlx::query_as::<_, TaskRequest>(&format!(
        "SELECT {REQUEST_COLUMNS} FROM task_requests WHERE id = $1"
    ))
    .bind(request_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(TaskError::NotFound("request"))?;

    Ok(ApiResponse::ok("Request retrieved", request))
}

async fn list_requests(
    state: &AppState,
    filter: &str,
    company_id: Option<&str>,
) -> Result<Vec<TaskRequest>, TaskError> {
    let sql = format!(
        "SELECT {REQUEST_COLUMNS} FROM task_requests WHERE {filter} ORDER BY created_at DESC"
    );
    let mut query = sqlx::query_as::<_, TaskRequest>(&sql);
    if let Some(company_id) = company_id {
        query = query.bind(company_id.to_string());
    }
    Ok(query.fetch_all(&state.pool).await?)
}

#[utoipa::path(
    get,
    path = "/requests/pending/{company_id}",
    params(
        ("company_id" = String, Path, description = "Requester company id")
    ),
    responses(
        (status = 200, description = "Pending requests made by the user", body = Vec<TaskRequest>)
    ),
    tag = "Requests"
)]
pub async fn get_pending_requests(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<TaskRequest>>, ApiResponse<()>> {
    let requests = list_requests(
        &state,
        "status = 'pending' AND assigned_by = $1",
        Some(&company_id),
    )
    .await?;
    Ok(ApiResponse::ok("Pending requests", requests))
}

#[utoipa::path(
    get,
    path = "/requests/completed/{company_id}",
    params(
        ("company_id" = String, Path, description = "Requester company id")
    ),
    responses(
        (status = 200, description = "Completed requests made by the user", body = Vec<TaskRequest>)
    ),
    tag = "Requests"
)]
pub async fn get_completed_requests(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<TaskRequest>>, ApiResponse<()>> {
    let requests = list_requests(
        &state,
        "status = 'completed' AND assigned_by = $1",
        Some(&company_id),
    )
    .await?;
    Ok(ApiResponse::ok("Completed requests", requests))
}

#[utoipa::path(
    get,
    path = "/requests/ongoing",
    responses(
        (status = 200, description = "All ongoing requests", body = Vec<TaskRequest>)
    ),
    tag = "Requests"
)]
pub async fn get_ongoing_requests(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<TaskRequest>>, ApiResponse<()>> {
    let requests = list_requests(&state, "status = 'ongoing'", None).await?;
    Ok(ApiResponse::ok("Ongoing requests", requests))
}

#[utoipa::path(
    get,
    path = "/requests/assigned/{company_id}",
    params(
        ("company_id" = String, Path, description = "Assignee company id")
    ),
    responses(
        (status = 200, description = "Pending requests assigned to the user", body = Vec<TaskRequest>)
    ),
    tag = "Requests"
)]
pub async fn get_assigned_requests(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<TaskRequest>>, ApiResponse<()>> {
    let requests = list_requests(
        &state,
        "assignee = $1 AND status = 'pending'",
        Some(&company_id),
    )
    .await?;
    Ok(ApiResponse::ok("Assigned requests", requests))
}

#[utoipa::path(
    get,
    path = "/requests/ongoing/{company_id}",
    params(
        ("company_id" = String, Path, description = "Assignee company id")
    ),
    responses(
        (status = 200, description = "Ongoing requests for the user", body = Vec<TaskRequest>)
    ),
    tag = "Requests"
)]
pub async fn get_ongoing_requests_for(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<TaskRequest>>, ApiResponse<()>> {
    let requests = list_requests(
        &state,
        "assignee = $1 AND status = 'ongoing'",
        Some(&company_id),
    )
    .await?;
    Ok(ApiResponse::ok("Ongoing requests", requests))
}

#[utoipa::path(
    get,
    path = "/requests/declined/{id}",
    params(
        ("id" = String, Path, description = "Assignee company id")
    ),
    responses(
        (status = 200, description = "Declined requests for the user", body = Vec<TaskRequest>)
    ),
    tag = "Requests"
)]
pub async fn get_declined_requests_for(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<ApiResponse<Vec<TaskRequest>>, ApiResponse<()>> {
    let requests = list_requests(
        &state,
        "assignee = $1 AND status = 'declined'",
        Some(&company_id),
    )
    .await?;
    Ok(ApiResponse::ok("Declined requests", requests))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_request,
        accept_request,
        decline_request,
        complete_request,
        update_progress,
        edit_request,
        delete_request,
        get_request,
        get_pending_requests,
        get_completed_requests,
        get_ongoing_requests,
        get_assigned_requests,
        get_ongoing_requests_for,
        get_declined_requests_for
    ),
    components(schemas(TaskRequest, NewTaskRequest, UpdateTaskRequest, DeclineRequest, ProgressRequest, DeclineOutcome)),
    tags(
        (name = "Requests", description = "Task lifecycle endpoints")
    )
)]
pub struct RequestDoc;
