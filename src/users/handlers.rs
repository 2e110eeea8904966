use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    users::{
        dto::{DeletedResponse, UserPayload},
        repo_types::{NewUser, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users).post(create_user))
        .route(
            "/user/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// POST /user
#[instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let new_user = validated(body)?;
    let user = state.users.create(&new_user).await?;

    info!(user_id = %user.id, "user created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/user/{}", user.id))],
        Json(user),
    ))
}

/// GET /user
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.users.find().await?;
    debug!(count = users.len(), "users listed");
    Ok(Json(users))
}

/// GET /user/:id
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<User>> {
    let id = user_id(id)?;
    state
        .users
        .find_one(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// PUT /user/:id, full replace of name, email and password.
#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let id = user_id(id)?;
    let new_user = validated(body)?;

    match state.users.update_by_id(id, &new_user).await? {
        Some(user) => {
            info!(user_id = %id, "user updated");
            Ok(Json(user))
        }
        None => {
            warn!(user_id = %id, "update of unknown user");
            Err(ApiError::NotFound)
        }
    }
}

/// DELETE /user/:id
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeletedResponse>> {
    let id = user_id(id)?;

    if !state.users.delete_by_id(id).await? {
        warn!(user_id = %id, "delete of unknown user");
        return Err(ApiError::NotFound);
    }

    info!(user_id = %id, "user deleted");
    Ok(Json(DeletedResponse {
        message: "user deleted",
        id,
    }))
}

fn validated(body: Result<Json<UserPayload>, JsonRejection>) -> ApiResult<NewUser> {
    let Json(payload) = body.map_err(|rej| {
        warn!(error = %rej, "rejected request body");
        ApiError::BadRequest(rej.body_text())
    })?;
    NewUser::try_from(payload).map_err(|e| {
        warn!(error = %e, "user validation failed");
        ApiError::from(e)
    })
}

// An id that is not a UUID cannot name a stored user.
fn user_id(path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Uuid> {
    path.map(|Path(id)| id).map_err(|rej| {
        debug!(error = %rej, "unparsable user id");
        ApiError::NotFound
    })
}
