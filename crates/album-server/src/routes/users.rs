use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use album_core::{ServiceError, User, UserInput, UserPatch};

use crate::routes::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Acting user id, taken from the `x-user-id` header set by whatever auth
/// proxy fronts the service.
pub struct ActingUser(pub i64);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(ActingUser)
            .ok_or_else(|| {
                ApiError::from(ServiceError::NotAuthorized(
                    "Missing or invalid x-user-id header".to_string(),
                ))
            })
    }
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    ActingUser(requester): ActingUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.get_all(requester).await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_by_id(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ActingUser(acting): ActingUser,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.update(id, patch, acting).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ActingUser(acting): ActingUser,
) -> Result<StatusCode, ApiError> {
    state.users.delete(id, acting).await?;
    Ok(StatusCode::NO_CONTENT)
}
