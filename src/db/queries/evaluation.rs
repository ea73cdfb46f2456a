// src/db/queries/evaluation.rs
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;

use crate::app_state::AppState;
use crate::db::models::evaluation::{Evaluation, NewEvaluation, UpdateEvaluation};
use crate::utils::api_response::ApiResponse;
use crate::utils::error::TaskError;

const EVALUATION_COLUMNS: &str =
    "id, employee, grade, notes, further_action, month, created_at, updated_at";

#[utoipa::path(
    post,
    path = "/evaluations",
    request_body = NewEvaluation,
    responses(
        (status = 201, description = "Evaluation created", body = Evaluation),
        (status = 400, description = "Missing required field")
    ),
    tag = "Evaluations"
)]
pub async fn create_evaluation(
    State(state): State<AppState>,
    Json(payload): Json<NewEvaluation>,
) -> Result<ApiResponse<Evaluation>, ApiResponse<()>> {
    for (field, value) in [
        ("employee", &payload.employee),
        ("grade", &payload.grade),
        ("month", &payload.month),
    ] {
        if value.trim().is_empty() {
            return Err(TaskError::Validation(format!("{field} is required")).into());
        }
    }

    let now = Utc::now().naive_utc();
    let evaluation = sqlx::query_as::<_, Evaluation>(&format!(
        "INSERT INTO evaluations (employee, grade, notes, further_action, month, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {EVALUATION_COLUMNS}"
    ))
    .bind(&payload.employee)
    .bind(&payload.grade)
    .bind(&payload.notes)
    .bind(&payload.further_action)
    .bind(&payload.month)
    .bind(now)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::created("Evaluation created", evaluation))
}

#[utoipa::path(
    get,
    path = "/evaluations/all",
    responses(
        (status = 200, description = "All evaluations", body = Vec<Evaluation>)
    ),
    tag = "Evaluations"
)]
pub async fn get_evaluations(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Evaluation>>, ApiResponse<()>> {
    let evaluations = sqlx::query_as::<_, Evaluation>(&format!(
        "SELECT {EVALUATION_COLUMNS} FROM evaluations ORDER BY created_at DESC"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Evaluations retrieved", evaluations))
}

#[utoipa::path(
    get,
    path = "/evaluations/{id}",
    params(
        ("id" = String, Path, description = "Month in YYYY-MM form")
    ),
    responses(
        (status = 200, description = "Evaluations for the month", body = Vec<Evaluation>)
    ),
    tag = "Evaluations"
)]
pub async fn get_evaluations_for_month(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<ApiResponse<Vec<Evaluation>>, ApiResponse<()>> {
    let evaluations = sqlx::query_as::<_, Evaluation>(&format!(
        "SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE month = $1 ORDER BY created_at DESC"
    ))
    .bind(&month)
    .fetch_all(&state.pool)
    .await?;

    Ok(ApiResponse::ok("Evaluations retrieved", evaluations))
}

#[utoipa::path(
    put,
    path = "/evaluations/{id}",
    params(
        ("id" = String, Path, description = "Employee company id")
    ),
    request_body = UpdateEvaluation,
    responses(
        (status = 200, description = "Evaluation updated", body = Evaluation),
        (status = 404, description = "Evaluation not found")
    ),
    tag = "Evaluations"
)]
pub async fn update_evaluation(
    State(state): State<AppState>,
    Path(employee): Path<String>,
    Json(payload): Json<UpdateEvaluation>,
) -> Result<ApiResponse<Evaluation>, ApiResponse<()>> {
    let evaluation = sqlx::query_as::<_, Evaluation>(&format!(
        "UPDATE evaluations SET grade = $1, notes = $2, further_action = $3, updated_at = $4 \
         WHERE employee = $5 RETURNING {EVALUATION_COLUMNS}"
    ))
    .bind(&payload.grade)
    .bind(&payload.notes)
    .bind(&payload.further_action)
    .bind(Utc::now().naive_utc())
    .bind(&employee)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(TaskError::NotFound("evaluation"))?;

    Ok(ApiResponse::ok("Evaluation updated", evaluation))
}

#[utoipa::path(
    delete,
    path = "/evaluations/{id}",
    params(
        ("id" = String, Path, description = "Employee company id")
    ),
    responses(
        (status = 200, description = "Evaluation deleted"),
        (status = 404, description = "Evaluation not found")
    ),
    tag = "Evaluations"
)]
pub async fn delete_evaluation(
    State(state): State<AppState>,
    Path(employee): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let deleted = sqlx::query("DELETE FROM evaluations WHERE employee = $1")
        .bind(&employee)
        .execute(&state.pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(TaskError::NotFound("evaluation").into());
    }

    Ok(ApiResponse::ok("Evaluation deleted", ()))
}

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_evaluation,
        get_evaluations,
        get_evaluations_for_month,
        update_evaluation,
        delete_evaluation
    ),
    components(schemas(Evaluation, NewEvaluation, UpdateEvaluation)),
    tags(
        (name = "Evaluations", description = "Monthly employee evaluations")
    )
)]
pub struct EvaluationDoc;
