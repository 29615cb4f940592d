//! Handlers for the `/workflows` resource (JSON graph documents).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use entyre_core::error::CoreError;
use entyre_core::types::DbId;
use entyre_core::workflow::{self, WorkflowMode};
use entyre_db::models::workflow::Workflow;
use entyre_db::repositories::WorkflowRepo;
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, IdPath};
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteWorkflowResponse {
    pub message: &'static str,
}

/// GET /api/v1/workflows -- newest first.
pub async fn list_workflows(State(state): State<AppState>) -> AppResult<Json<Vec<Workflow>>> {
    Ok(Json(WorkflowRepo::list(&state.pool).await?))
}

/// GET /api/v1/workflows/{id}
pub async fn get_workflow(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<Json<Workflow>> {
    Ok(Json(find_workflow(&state, id).await?))
}

/// POST /api/v1/workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    AppJson(body): AppJson<Value>,
) -> AppResult<(StatusCode, Json<Workflow>)> {
    let graph = workflow::validate(&body, WorkflowMode::Create)?.resolve(None)?;
    let created = WorkflowRepo::create(&state.pool, &graph).await?;

    tracing::info!(
        workflow_id = created.id,
        nodes = graph.nodes.len(),
        connections = graph.connections.len(),
        user_id = user.user_id,
        "Workflow created",
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/workflows/{id}
///
/// Keys absent from the body keep their stored values. Connections are
/// re-checked against the resulting node list.
pub async fn update_workflow(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<Workflow>> {
    let existing = find_workflow(&state, id).await?;
    let stored = existing.graph().map_err(|e| {
        AppError::InternalError(format!("Stored workflow {id} failed to decode: {e}"))
    })?;

    let graph = workflow::validate(&body, WorkflowMode::Update)?.resolve(Some(&stored))?;
    let updated = WorkflowRepo::update(&state.pool, id, &graph)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Workflow",
            id,
        })?;

    tracing::info!(workflow_id = id, user_id = user.user_id, "Workflow updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/workflows/{id}
pub async fn delete_workflow(
    State(state): State<AppState>,
    RequireEditor(user): RequireEditor,
    IdPath(id): IdPath,
) -> AppResult<Json<DeleteWorkflowResponse>> {
    if !WorkflowRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Workflow",
            id,
        }
        .into());
    }

    tracing::info!(workflow_id = id, user_id = user.user_id, "Workflow deleted");
    Ok(Json(DeleteWorkflowResponse {
        message: "Workflow deleted successfully",
    }))
}

async fn find_workflow(state: &AppState, id: DbId) -> AppResult<Workflow> {
    WorkflowRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Workflow",
                id,
            }
            .into()
        })
}
