use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use album_core::{Exchange, ExchangeInput, Notification, NotificationInput};

use crate::routes::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", post(create_notification))
        .route("/users/{id}/notifications", get(get_inbox))
        .route(
            "/notifications/{id}/exchanges",
            get(get_thread).post(create_exchange),
        )
}

async fn create_notification(
    State(state): State<AppState>,
    Json(input): Json<NotificationInput>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state.notifications.create(input).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

async fn get_inbox(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notifications.get_all_by_user(user_id).await?))
}

#[derive(Deserialize)]
struct ExchangeRequest {
    sticker_number: Option<i64>,
    user_id: Option<i64>,
}

async fn create_exchange(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
    Json(request): Json<ExchangeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let exchange = state
        .exchanges
        .create(ExchangeInput {
            notification_id: Some(notification_id),
            sticker_number: request.sticker_number,
            user_id: request.user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(exchange)))
}

async fn get_thread(
    State(state): State<AppState>,
    Path(notification_id): Path<i64>,
) -> Result<Json<Vec<Exchange>>, ApiError> {
    Ok(Json(
        state.exchanges.get_all_by_notification(notification_id).await?,
    ))
}
