use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::{Extension, Json};
use rolodex::{Claims, NewRecord, Record, RecordId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// A stored record as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RecordBody {
    /// 24-character hex id assigned by the store
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<Record> for RecordBody {
    fn from(record: Record) -> Self {
        Self {
            id: record.id.to_hex(),
            name: record.name,
            email: record.email,
        }
    }
}

/// Body of `POST /data`. An `id` in the body is echoed back but never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateRecordRequest {
    /// Echoed verbatim; empty when absent
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Body of `PUT /data`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecordRequest {
    /// Hex id of the record to update
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Query string of `DELETE /data`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Hex id of the record to delete
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub message: Vec<RecordBody>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateResponse {
    pub message: CreateRecordRequest,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

fn require_field(field: &str, value: &str) -> ServerResult<()> {
    if value.trim().is_empty() {
        return Err(ServerError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}

/// List every record
#[utoipa::path(
    get,
    path = "/data1",
    responses(
        (status = 200, description = "All records", body = ListResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    ),
    tags = ["records"],
    operation_id = "listRecords"
)]
pub async fn list_records(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<Json<ListResponse>> {
    let records = state.store.list_all().await?;

    Ok(Json(ListResponse {
        message: records.into_iter().map(RecordBody::from).collect(),
    }))
}

/// Create a record and echo the request body
#[utoipa::path(
    post,
    path = "/data",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "Record created", body = CreateResponse),
        (status = 400, description = "Invalid body", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = String),
        (status = 403, description = "No Authorization header", body = String)
    ),
    security(("bearer" = [])),
    tags = ["records"],
    operation_id = "createRecord"
)]
pub async fn create_record(
    State(state): State<Arc<ServerState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> ServerResult<Json<CreateResponse>> {
    let Json(request) = payload?;
    require_field("name", &request.name)?;
    require_field("email", &request.email)?;

    let id = state
        .store
        .insert(NewRecord::new(request.name.clone(), request.email.clone()))
        .await?;
    tracing::debug!(%id, caller = %claims.email, "record created");

    Ok(Json(CreateResponse { message: request }))
}

/// Delete a record by id. Unknown ids succeed as well.
#[utoipa::path(
    delete,
    path = "/data",
    params(DeleteQuery),
    responses(
        (status = 200, description = "Deleted, or nothing to delete", body = StatusResponse),
        (status = 400, description = "Missing or malformed id", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = String),
        (status = 403, description = "No Authorization header", body = String)
    ),
    security(("bearer" = [])),
    tags = ["records"],
    operation_id = "deleteRecord"
)]
pub async fn delete_record(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ServerResult<Json<StatusResponse>> {
    let Query(query) = query?;
    let id: RecordId = query.id.parse()?;

    state.store.delete_by_id(&id).await?;

    Ok(Json(StatusResponse::new("deleted success")))
}

/// Replace the name and email of a record. Unknown ids succeed as well.
#[utoipa::path(
    put,
    path = "/data",
    request_body = UpdateRecordRequest,
    responses(
        (status = 200, description = "Updated, or nothing to update", body = StatusResponse),
        (status = 400, description = "Invalid body or id", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = String),
        (status = 403, description = "No Authorization header", body = String)
    ),
    security(("bearer" = [])),
    tags = ["records"],
    operation_id = "updateRecord"
)]
pub async fn update_record(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<UpdateRecordRequest>, JsonRejection>,
) -> ServerResult<Json<StatusResponse>> {
    let Json(request) = payload?;
    let id: RecordId = request.id.parse()?;

    state
        .store
        .update_by_id(&Record::new(id, request.name, request.email))
        .await?;

    Ok(Json(StatusResponse::new("updated success")))
}
